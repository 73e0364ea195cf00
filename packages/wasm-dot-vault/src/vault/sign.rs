//! Signing and account discovery through a keyring

use super::VaultCore;
use crate::codec::to_hex;
use crate::error::VaultResult;
use crate::extrinsic::{serialize_signed, signing_payload, tx_id};
use crate::keyring::{DerivedAccount, KeyringStrategy, PrepareAccountsParams, SignRequest};
use crate::types::{SignedTransaction, UnsignedTransaction};

impl VaultCore {
    pub async fn sign_transaction(
        &self,
        keyring: &dyn KeyringStrategy,
        unsigned_tx: &UnsignedTransaction,
    ) -> VaultResult<SignedTransaction> {
        let network = self.network().await?;
        let prefix = self.network_info().await?.address_prefix;
        let mut encoded_tx = unsigned_tx.encoded_tx.clone();
        encoded_tx.chain_name = network.name;

        let registry = self.registry_for(&encoded_tx).await?;
        let payload = signing_payload(&encoded_tx, &registry)?;
        let request = SignRequest {
            payload: &payload,
            path: &self.account.path,
            chain_id: self.chain_id(),
            address_prefix: prefix,
        };
        let signature = keyring.sign(request).await?;
        let signed = serialize_signed(&encoded_tx, &registry, &signature)?;

        let txid = tx_id(&signed);
        tracing::debug!(
            network_id = %self.network_id,
            wallet_type = keyring.wallet_type().as_str(),
            txid = %txid,
            "Signed transaction"
        );
        Ok(SignedTransaction {
            txid,
            raw_tx: to_hex(&signed),
            encoded_tx,
            signature: to_hex(&signature),
        })
    }

    /// Accounts at `indexes` under the default derivation template
    pub async fn prepare_accounts(
        &self,
        keyring: &dyn KeyringStrategy,
        indexes: &[u32],
        watch_address: Option<&str>,
    ) -> VaultResult<Vec<DerivedAccount>> {
        let settings = self.vault_settings().await?;
        let template = settings.default_derive_info()?.template.clone();
        let params = PrepareAccountsParams {
            indexes: indexes.to_vec(),
            template,
            address_prefix: self.network_info().await?.address_prefix,
            chain_id: self.chain_id().to_string(),
            watch_address: watch_address.map(str::to_string),
        };
        keyring.prepare_accounts(&params).await
    }
}
