//! Unsigned transaction updates (nonce, fee, tip, era)

use super::VaultCore;
use crate::era::{Era, DEFAULT_ERA_PERIOD};
use crate::error::VaultResult;
use crate::strategy::UpdateContext;
use crate::types::{FeeInfoUnit, UnsignedTransaction};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeAmountInfo {
    /// Set when the user chose to send the whole balance
    #[serde(default)]
    pub max_send_amount: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUnsignedTxParams {
    pub unsigned_tx: UnsignedTransaction,
    /// Explicit nonce; also pins block hash and era
    #[serde(default)]
    pub nonce: Option<u64>,
    #[serde(default)]
    pub fee_info: Option<FeeInfoUnit>,
    #[serde(default)]
    pub native_amount_info: Option<NativeAmountInfo>,
}

impl VaultCore {
    pub async fn update_unsigned_tx(&self, params: &UpdateUnsignedTxParams) -> VaultResult<UnsignedTransaction> {
        let mut encoded_tx = params.unsigned_tx.encoded_tx.clone();
        if let Some(nonce) = params.nonce {
            encoded_tx.nonce = nonce;
        }
        if let Some(fee_info) = &params.fee_info {
            encoded_tx.fee_info = Some(fee_info.clone());
        }
        let extra_tip = match &params.fee_info {
            Some(fee_info) => fee_info.extra_tip_raw()?,
            None => 0,
        };

        let (call, _) = self.decode_unsigned_tx(&encoded_tx).await?;
        let ctx = UpdateContext {
            vault: self,
            encoded_tx: &encoded_tx,
            call: &call,
            params,
        };
        if let Some(mut replaced) = self.strategy().update_unsigned_tx(ctx).await? {
            if replaced.fee_info.is_none() {
                replaced.fee_info = encoded_tx.fee_info.clone();
            }
            encoded_tx = replaced;
        }

        if params.nonce.is_none() && !encoded_tx.is_from_dapp {
            let conn = self.custom_connection().await?;
            let block = self
                .deps
                .chain_cache
                .get_block_info(&self.network_id, conn.as_ref())
                .await?;
            encoded_tx.era = Era::mortal(DEFAULT_ERA_PERIOD, block.block_number).to_hex();
            encoded_tx.block_hash = block.block_hash;
            encoded_tx.block_number = block.block_number;
        }

        let has_fee_dot = params.fee_info.as_ref().is_some_and(|fee| fee.fee_dot.is_some());
        if has_fee_dot && !encoded_tx.is_from_dapp {
            encoded_tx.tip = extra_tip;
        }

        Ok(UnsignedTransaction {
            encoded_tx,
            fee_info: params.fee_info.clone().or_else(|| params.unsigned_tx.fee_info.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::to_hex;
    use crate::methods;
    use crate::test_utils::{fee_info, test_registry, Harness, BLOCK_HASH, BLOCK_NUMBER, BOB};
    use crate::types::EncodedTransaction;
    use crate::vault::{BuildEncodedTxParams, TransferParams};

    async fn stale_tx(harness: &Harness, from_dapp: bool) -> EncodedTransaction {
        let params = BuildEncodedTxParams {
            transfers_info: vec![TransferParams {
                to: BOB.to_string(),
                amount: "1".to_string(),
                token_info: None,
                keep_alive: true,
            }],
        };
        let mut tx = harness.vault().build_encoded_tx(&params).await.unwrap();
        tx.block_hash = "0x01".to_string();
        tx.block_number = 5;
        tx.era = Era::mortal(64, 5).to_hex();
        tx.is_from_dapp = from_dapp;
        tx
    }

    fn params(tx: EncodedTransaction, nonce: Option<u64>) -> UpdateUnsignedTxParams {
        UpdateUnsignedTxParams {
            unsigned_tx: UnsignedTransaction {
                encoded_tx: tx,
                fee_info: None,
            },
            nonce,
            fee_info: Some(fee_info("156000000", "0.5")),
            native_amount_info: None,
        }
    }

    #[tokio::test]
    async fn test_refreshes_era_and_sets_tip() {
        let harness = Harness::polkadot();
        let tx = stale_tx(&harness, false).await;
        let updated = harness.vault().update_unsigned_tx(&params(tx, None)).await.unwrap();

        let encoded = &updated.encoded_tx;
        assert_eq!(encoded.block_hash, BLOCK_HASH);
        assert_eq!(encoded.block_number, BLOCK_NUMBER);
        assert_eq!(encoded.era, Era::mortal(64, BLOCK_NUMBER).to_hex());
        assert_eq!(encoded.tip, 5_000_000_000);
        assert!(encoded.fee_info.is_some());
        assert!(updated.fee_info.is_some());
    }

    #[tokio::test]
    async fn test_explicit_nonce_keeps_block() {
        let harness = Harness::polkadot();
        let tx = stale_tx(&harness, false).await;
        let updated = harness.vault().update_unsigned_tx(&params(tx, Some(12))).await.unwrap();

        let encoded = &updated.encoded_tx;
        assert_eq!(encoded.nonce, 12);
        assert_eq!(encoded.block_number, 5);
        assert_eq!(encoded.era, Era::mortal(64, 5).to_hex());
        assert_eq!(serde_json::to_value(encoded).unwrap()["nonce"], "0x0c");
    }

    #[tokio::test]
    async fn test_dapp_tx_keeps_block_and_tip() {
        let harness = Harness::polkadot();
        let tx = stale_tx(&harness, true).await;
        let updated = harness.vault().update_unsigned_tx(&params(tx, None)).await.unwrap();

        let encoded = &updated.encoded_tx;
        assert_eq!(encoded.block_hash, "0x01");
        assert_eq!(encoded.block_number, 5);
        assert_eq!(encoded.tip, 0);
        assert!(encoded.fee_info.is_some());
    }

    #[tokio::test]
    async fn test_max_send_rewrites_to_transfer_all() {
        let harness = Harness::polkadot();
        // Sender holds exactly 3 DOT
        harness.profile.set_balance(&harness.vault().account_address().to_string(), 30_000_000_000);
        let tx = stale_tx(&harness, false).await;
        let mut params = params(tx.clone(), None);
        params.native_amount_info = Some(NativeAmountInfo {
            max_send_amount: Some("3".to_string()),
        });

        let updated = harness.vault().update_unsigned_tx(&params).await.unwrap();
        let registry = test_registry();
        let expected = to_hex(&registry.encode_call(&methods::transfer_all(BOB, false).unwrap()).unwrap());
        assert_eq!(updated.encoded_tx.method, expected);

        // Below the balance nothing changes
        params.native_amount_info = Some(NativeAmountInfo {
            max_send_amount: Some("2.9".to_string()),
        });
        let updated = harness.vault().update_unsigned_tx(&params).await.unwrap();
        assert_eq!(updated.encoded_tx.method, tx.method);
    }
}
