//! Fee estimation through the custom endpoint

use super::VaultCore;
use crate::error::{VaultError, VaultResult};
use crate::extrinsic::serialize_signed;
use crate::rpc::{json_field_u128, ChainConnection};
use crate::types::{EncodedTransaction, EstimateFeeResponse, FeeData, GasFee};
use crate::units::format_units;
use base64::prelude::*;

/// MultiSignature stand-in: sr25519 type byte and a constant 64-byte body
fn fake_signature() -> Vec<u8> {
    let mut signature = vec![0x01];
    signature.extend([0x42; 64]);
    signature
}

// Runtime APIs take the extrinsic followed by its length (u32 LE)
fn with_length(tx: &[u8]) -> Vec<u8> {
    let mut args = tx.to_vec();
    args.extend((tx.len() as u32).to_le_bytes());
    args
}

async fn partial_fee(conn: &dyn ChainConnection, tx: &[u8]) -> VaultResult<u128> {
    let info = conn
        .call("transactionPaymentApi", "queryInfo", with_length(tx))
        .await?;
    json_field_u128(&info, "partialFee")
        .ok_or_else(|| VaultError::Rpc(format!("queryInfo returned no partialFee: {}", info)))
}

async fn inclusion_fee(conn: &dyn ChainConnection, tx: &[u8]) -> VaultResult<u128> {
    let details = conn
        .call("transactionPaymentCallApi", "queryCallFeeDetails", with_length(tx))
        .await?;
    let base = json_field_u128(&details, "inclusionFee.baseFee");
    let len = json_field_u128(&details, "inclusionFee.lenFee");
    match (base, len) {
        (Some(base), Some(len)) => Ok(base.saturating_add(len)),
        _ => Err(VaultError::Rpc(format!("queryCallFeeDetails returned no inclusionFee: {}", details))),
    }
}

impl VaultCore {
    /// Candidate signed transaction for fee queries, base64 encoded
    pub async fn build_estimate_fee_params(&self, encoded_tx: &EncodedTransaction) -> VaultResult<String> {
        let registry = self.registry_for(encoded_tx).await?;
        let signed = serialize_signed(encoded_tx, &registry, &fake_signature())?;
        Ok(BASE64_STANDARD.encode(signed))
    }

    /// Partial fee of a candidate transaction, reported as gas limit × one raw unit
    pub async fn estimate_fee_by_rpc(&self, encoded_tx_base64: &str) -> VaultResult<EstimateFeeResponse> {
        let live = self.require_connection().await?;
        if encoded_tx_base64.is_empty() {
            return Err(VaultError::Internal("No encodedTx".to_string()));
        }
        let tx = BASE64_STANDARD
            .decode(encoded_tx_base64)
            .map_err(|e| VaultError::InvalidInput(format!("Invalid base64 transaction: {}", e)))?;
        let network = self.network().await?;

        let fee = match partial_fee(&*live.conn, &tx).await {
            Ok(fee) => fee,
            Err(err) => {
                tracing::warn!(network_id = %self.network_id, error = %err, "queryInfo failed, using call fee details");
                inclusion_fee(&*live.conn, &tx).await?
            }
        };
        let gas_limit = fee.to_string();

        Ok(EstimateFeeResponse {
            is_eip1559: false,
            fee_decimals: network.decimals,
            fee_symbol: network.symbol.clone(),
            native_decimals: network.decimals,
            native_symbol: network.symbol,
            base_fee: "0".to_string(),
            gas: vec![GasFee {
                gas_price: format_units(1, network.decimals),
                gas_limit: gas_limit.clone(),
                gas_limit_for_display: Some(gas_limit),
            }],
            fee_data: vec![FeeData {
                extra_tip: "0".to_string(),
            }],
        })
    }
}
