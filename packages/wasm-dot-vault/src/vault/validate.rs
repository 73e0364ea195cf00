//! Existential deposit checks

use super::{NativeAmountInfo, VaultCore};
use crate::error::{MessageKey, MinimumInfo, VaultError, VaultResult};
use crate::types::{ActionType, FeeInfoUnit, NetworkDescriptor, UnsignedTransaction};
use crate::units::{format_units, parse_units};
use crate::vault::action_type_of;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateSendAmountParams {
    pub to: String,
    /// Display units; empty skips the check
    pub amount: String,
    #[serde(default)]
    pub token_balance: String,
    #[serde(default)]
    pub is_native: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrecheckTiming {
    BeforeTransfer,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecheckParams {
    pub unsigned_tx: UnsignedTransaction,
    #[serde(default)]
    pub native_amount_info: Option<NativeAmountInfo>,
    pub precheck_timing: PrecheckTiming,
    #[serde(default)]
    pub fee_info: Option<FeeInfoUnit>,
}

fn minimum_info(min_amount: u128, network: &NetworkDescriptor) -> MinimumInfo {
    MinimumInfo {
        amount: format_units(min_amount, network.decimals),
        symbol: network.symbol.clone(),
    }
}

impl VaultCore {
    /// Recipient must end up holding at least the existential deposit.
    ///
    /// Native transfers only. Token inputs pass through unchecked; asset
    /// minimums come from [`ChainMetadataCache::get_min_amount`] with a token.
    ///
    /// [`ChainMetadataCache::get_min_amount`]: crate::cache::ChainMetadataCache::get_min_amount
    pub async fn validate_send_amount(&self, params: &ValidateSendAmountParams) -> VaultResult<bool> {
        if params.amount.is_empty() || params.to.is_empty() || !params.is_native {
            return Ok(true);
        }
        if params.to == self.account.address {
            return Ok(true);
        }
        let network = self.network().await?;
        let send_amount = parse_units(&params.amount, network.decimals)?;
        let conn = self.custom_connection().await?;
        let min_amount = self
            .deps
            .chain_cache
            .get_min_amount(&self.network_id, None, conn.as_ref())
            .await?;
        let balance = self.balance_of(&params.to).await?;

        if balance.saturating_add(send_amount) < min_amount {
            tracing::debug!(to = %params.to, balance = %balance, min_amount = %min_amount, "Recipient stays below minimum");
            return Err(VaultError::BalanceBelowMinimum {
                key: MessageKey::RecipientActivate,
                info: minimum_info(min_amount, &network),
            });
        }
        Ok(true)
    }

    /// Sender must not be left with a non-zero balance under the existential deposit
    pub async fn precheck_unsigned_tx(&self, params: &PrecheckParams) -> VaultResult<bool> {
        if params.precheck_timing != PrecheckTiming::Confirm {
            return Ok(true);
        }
        let sends_max = params
            .native_amount_info
            .as_ref()
            .and_then(|info| info.max_send_amount.as_deref())
            .is_some_and(|max| !max.is_empty());
        if sends_max {
            return Ok(true);
        }

        let encoded_tx = &params.unsigned_tx.encoded_tx;
        let (call, _) = self.decode_unsigned_tx(encoded_tx).await?;
        if action_type_of(&call) != ActionType::AssetTransfer || call.pallet != "balances" {
            return Ok(true);
        }
        // transfer_all carries no value
        let value = match call.arg_u128("value") {
            Some(value) => value,
            None => return Ok(true),
        };
        if self.address_by_tx_args(&call) == encoded_tx.address {
            return Ok(true);
        }

        let conn = self.custom_connection().await?;
        let min_amount = self
            .deps
            .chain_cache
            .get_min_amount(&self.network_id, None, conn.as_ref())
            .await?;
        let balance = self.balance_of(&encoded_tx.address).await?;
        let fee = match &params.fee_info {
            Some(fee_info) => fee_info.total_raw(true)?,
            None => 0,
        };
        let left = balance.saturating_sub(value).saturating_sub(fee);

        if left > 0 && left < min_amount {
            let network = self.network().await?;
            return Err(VaultError::BalanceBelowMinimum {
                key: MessageKey::BalanceLowerMinimum,
                info: minimum_info(min_amount, &network),
            });
        }
        Ok(true)
    }
}
