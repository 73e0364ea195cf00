//! Transfer construction

use super::VaultCore;
use crate::address::decode_address;
use crate::cache::RegistryRequest;
use crate::error::{VaultError, VaultResult};
use crate::strategy::{TransferBuildContext, TxBaseInfo};
use crate::types::{EncodedTransaction, TokenInfo};
use crate::units::parse_units;
use serde::{Deserialize, Serialize};

/// One transfer request, amounts in display units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferParams {
    pub to: String,
    pub amount: String,
    #[serde(default)]
    pub token_info: Option<TokenInfo>,
    #[serde(default)]
    pub keep_alive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildEncodedTxParams {
    pub transfers_info: Vec<TransferParams>,
}

impl VaultCore {
    /// Chain state a new transaction is built on
    pub async fn tx_base_info(&self) -> VaultResult<TxBaseInfo> {
        let conn = self.custom_connection().await?;
        let conn = conn.as_ref();
        let cache = &self.deps.chain_cache;
        let (block, genesis_hash, version, network) = futures::try_join!(
            cache.get_block_info(&self.network_id, conn),
            cache.get_genesis_hash(&self.network_id, conn),
            cache.get_runtime_version(&self.network_id, conn),
            self.network(),
        )?;
        let request = RegistryRequest {
            network_id: self.network_id.clone(),
            metadata_hex: None,
            spec_name: Some(version.spec_name.clone()),
            spec_version: Some(version.spec_version),
        };
        let registry = cache.get_registry(request, conn).await?;
        Ok(TxBaseInfo {
            address: self.account.address.clone(),
            block_hash: block.block_hash,
            block_number: block.block_number,
            genesis_hash,
            spec_name: version.spec_name,
            spec_version: version.spec_version,
            transaction_version: version.transaction_version,
            chain_name: network.name,
            registry,
        })
    }

    /// Unsigned transfer from the vault's account
    ///
    /// Only the first transfer is used. The nonce is left at zero and filled in
    /// by [`VaultCore::update_unsigned_tx`].
    pub async fn build_encoded_tx(&self, params: &BuildEncodedTxParams) -> VaultResult<EncodedTransaction> {
        let transfer = params
            .transfers_info
            .first()
            .ok_or_else(|| VaultError::Local("transfersInfo is required".to_string()))?;
        if transfer.to.is_empty() {
            return Err(VaultError::Local("Recipient address is required".to_string()));
        }
        // Recipient must be a valid account id
        decode_address(&transfer.to, None)?;

        let network = self.network().await?;
        let network_info = self.network_info().await?;
        let base = self.tx_base_info().await?;
        let strategy = self.strategy();

        let token = transfer
            .token_info
            .as_ref()
            .filter(|token| !token.address.is_empty() && !token.is_native && token.address != network_info.native_token_address);
        let decimals = token.map(|token| token.decimals).unwrap_or(network.decimals);
        let amount = parse_units(&transfer.amount, decimals)?;

        let ctx = TransferBuildContext {
            token,
            to: &transfer.to,
            amount,
            keep_alive: transfer.keep_alive,
            base: &base,
            nonce: 0,
        };
        let mut tx = match token {
            Some(_) => strategy.build_token_transfer(&ctx)?,
            None => strategy.build_native_transfer(&ctx)?,
        };
        tx.spec_name = base.spec_name.clone();
        tx.chain_name = network.name;
        tx.metadata_rpc = String::new();
        tracing::debug!(
            network_id = %self.network_id,
            to = %transfer.to,
            amount = %amount,
            token = token.map(|t| t.address.as_str()).unwrap_or("native"),
            "Built transfer"
        );
        Ok(tx)
    }

    /// Given transaction, or a freshly built one
    pub async fn build_unsigned_tx(
        &self,
        encoded_tx: Option<EncodedTransaction>,
        params: Option<&BuildEncodedTxParams>,
    ) -> VaultResult<EncodedTransaction> {
        match (encoded_tx, params) {
            (Some(tx), _) => Ok(tx),
            (None, Some(params)) => self.build_encoded_tx(params).await,
            (None, None) => Err(VaultError::Local("encodedTx or transfersInfo is required".to_string())),
        }
    }
}
