//! Display model of unsigned transactions

use super::VaultCore;
use crate::error::{VaultError, VaultResult};
use crate::registry::DecodedCall;
use crate::types::{
    ActionType, AssetTransferAction, DecodedTransaction, DecodedTxAction, Direction, TokenInfo, TransferInfo,
    TxStatus, UnknownAction, UnsignedTransaction,
};
use crate::units::{format_units, parse_units};
use serde::{Deserialize, Serialize};

/// Calls shown as asset transfers, keyed by decoded pallet name
const TRANSFER_CALLS: &[(&str, &[&str])] = &[
    ("balances", &["transfer", "transferKeepAlive", "transferAllowDeath", "transferAll"]),
    ("assets", &["transfer", "transferKeepAlive"]),
];

pub fn action_type_of(call: &DecodedCall) -> ActionType {
    let is_transfer = TRANSFER_CALLS
        .iter()
        .any(|(pallet, methods)| *pallet == call.pallet && methods.contains(&call.method.as_str()));
    if is_transfer {
        ActionType::AssetTransfer
    } else {
        ActionType::Unknown
    }
}

/// What the user asked to send, in display units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPayload {
    pub amount_to_send: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDecodedTxParams {
    pub unsigned_tx: UnsignedTransaction,
    #[serde(default)]
    pub transfer_payload: Option<TransferPayload>,
}

impl VaultCore {
    pub async fn build_decoded_tx(&self, params: &BuildDecodedTxParams) -> VaultResult<DecodedTransaction> {
        let unsigned = &params.unsigned_tx;
        let encoded_tx = &unsigned.encoded_tx;
        let (call, _) = self.decode_unsigned_tx(encoded_tx).await?;
        let owner = self.account.address.clone();

        let action = match action_type_of(&call) {
            ActionType::AssetTransfer => self.transfer_action(&call, params).await?,
            ActionType::Unknown => DecodedTxAction {
                action_type: ActionType::Unknown,
                direction: Direction::Other,
                asset_transfer: None,
                unknown_action: Some(UnknownAction {
                    from: owner.clone(),
                    to: String::new(),
                }),
            },
        };

        Ok(DecodedTransaction {
            txid: String::new(),
            owner: owner.clone(),
            signer: encoded_tx.address.clone(),
            nonce: encoded_tx.nonce,
            actions: vec![action],
            status: TxStatus::Pending,
            network_id: self.network_id.clone(),
            account_id: self.account.id.clone(),
            fee_info: unsigned.fee_info.clone().or_else(|| encoded_tx.fee_info.clone()),
            encoded_tx: encoded_tx.clone(),
        })
    }

    async fn transfer_action(&self, call: &DecodedCall, params: &BuildDecodedTxParams) -> VaultResult<DecodedTxAction> {
        let network_info = self.network_info().await?;
        let from = self.account.address.clone();
        let to = self.address_by_tx_args(call);

        let asset_id = self
            .strategy()
            .extract_asset_id(self.chain_id(), call)
            .unwrap_or_else(|| network_info.native_token_address.clone());
        let token = self.token_for(&asset_id).await?;

        let raw_amount = if call.method == "transferAll" {
            self.transfer_all_amount(params, token.decimals)?
        } else {
            call.arg_u128("value")
                .or_else(|| call.arg_u128("amount"))
                .unwrap_or(0)
        };
        let is_native = token.is_native || token.symbol == network_info.native_token_address;

        let transfer = TransferInfo {
            from: from.clone(),
            to: to.clone(),
            amount: format_units(raw_amount, token.decimals),
            icon: token.logo_uri.clone().unwrap_or_default(),
            name: token.name.clone(),
            symbol: token.symbol.clone(),
            token_id_on_network: token.address.clone(),
            is_nft: false,
            is_native,
        };
        Ok(DecodedTxAction {
            action_type: ActionType::AssetTransfer,
            direction: Direction::of_transfer(&self.account.address, &from, &to),
            asset_transfer: Some(AssetTransferAction {
                from,
                to,
                sends: vec![transfer],
                receives: Vec::new(),
            }),
            unknown_action: None,
        })
    }

    async fn token_for(&self, token_id: &str) -> VaultResult<TokenInfo> {
        self.deps
            .tokens
            .get_token(&self.account.id, &self.network_id, token_id)
            .await?
            .ok_or_else(|| VaultError::Internal(format!("Token {} not found", token_id)))
    }

    // Requested amount minus the selected fee; nothing to show without a payload
    fn transfer_all_amount(&self, params: &BuildDecodedTxParams, decimals: u32) -> VaultResult<u128> {
        let requested = match &params.transfer_payload {
            Some(payload) if !payload.amount_to_send.is_empty() => parse_units(&payload.amount_to_send, decimals)?,
            _ => return Ok(0),
        };
        let fee_info = params
            .unsigned_tx
            .fee_info
            .as_ref()
            .or(params.unsigned_tx.encoded_tx.fee_info.as_ref());
        let fee = match fee_info {
            Some(fee_info) => fee_info.total_raw(false)?,
            None => 0,
        };
        Ok(requested.saturating_sub(fee))
    }
}
