//! Custom endpoint probing and broadcast

use super::VaultCore;
use crate::error::{VaultError, VaultResult};
use crate::rpc::{relay_call, Endpoint, ProxyRoute};
use crate::services::CustomRpcInfo;
use crate::types::{CustomRpcStatus, SignedTransaction};
use serde_json::{json, Value as Json};

impl VaultCore {
    /// Time the best header fetch on a fresh connection to `rpc_url`
    pub async fn get_custom_rpc_endpoint_status(&self, rpc_url: &str) -> VaultResult<CustomRpcStatus> {
        if rpc_url.is_empty() {
            return Err(VaultError::Internal("Invalid rpc url".to_string()));
        }
        let conn = self.deps.connections.connect(Endpoint::parse(rpc_url)?).await?;
        let start = self.deps.clock.now_ms();
        let best_block_number = conn.best_block_number().await?;
        let response_time = self.deps.clock.now_ms().saturating_sub(start);
        conn.disconnect().await?;
        Ok(CustomRpcStatus {
            response_time,
            best_block_number,
        })
    }

    /// Submit through the RPC relay
    pub async fn broadcast_transaction(&self, signed_tx: &SignedTransaction) -> VaultResult<SignedTransaction> {
        let result = relay_call(
            &*self.deps.relay,
            &self.network_id,
            ProxyRoute::Rpc,
            "author_submitExtrinsic",
            vec![json!(signed_tx.raw_tx)],
        )
        .await?;
        let txid = match result {
            Json::String(hash) => hash,
            other => return Err(VaultError::Rpc(format!("Unexpected submit response: {}", other))),
        };
        tracing::info!(network_id = %self.network_id, txid = %txid, "Broadcast transaction");
        Ok(SignedTransaction {
            txid,
            ..signed_tx.clone()
        })
    }

    /// Submit straight to a custom endpoint
    pub async fn broadcast_transaction_from_custom_rpc(
        &self,
        custom_rpc: &CustomRpcInfo,
        signed_tx: &SignedTransaction,
    ) -> VaultResult<SignedTransaction> {
        if custom_rpc.rpc.is_empty() {
            return Err(VaultError::Internal("Invalid rpc url".to_string()));
        }
        let conn = self.deps.connections.connect(Endpoint::parse(&custom_rpc.rpc)?).await?;
        let txid = conn.submit_extrinsic(&signed_tx.raw_tx).await?;
        tracing::info!(network_id = %self.network_id, rpc = %custom_rpc.rpc, txid = %txid, "Broadcast transaction");
        Ok(SignedTransaction {
            txid,
            ..signed_tx.clone()
        })
    }
}
