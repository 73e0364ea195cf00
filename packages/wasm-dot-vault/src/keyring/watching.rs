//! Watch-only and external wallets

use super::{DerivedAccount, KeyringStrategy, PrepareAccountsParams, SignRequest, WalletType};
use crate::address::{decode_address, encode_ss58};
use crate::codec::to_hex;
use crate::error::{VaultError, VaultResult};
use futures::future::{FutureExt, LocalBoxFuture};

/// Knows an address, holds no key
#[derive(Debug, Clone, Copy)]
pub struct WatchOnlyKeyring {
    wallet_type: WalletType,
}

impl WatchOnlyKeyring {
    pub fn new(wallet_type: WalletType) -> Self {
        Self { wallet_type }
    }
}

impl KeyringStrategy for WatchOnlyKeyring {
    fn wallet_type(&self) -> WalletType {
        self.wallet_type
    }

    /// The watched address, re-encoded with the network prefix
    fn prepare_accounts<'a>(
        &'a self,
        params: &'a PrepareAccountsParams,
    ) -> LocalBoxFuture<'a, VaultResult<Vec<DerivedAccount>>> {
        async move {
            let address = params
                .watch_address
                .as_deref()
                .filter(|address| !address.is_empty())
                .ok_or_else(|| VaultError::Local("Watch address is required".to_string()))?;
            let account_id = decode_address(address, None)?;
            Ok(vec![DerivedAccount {
                path: String::new(),
                public_key: to_hex(&account_id),
                address: encode_ss58(&account_id, params.address_prefix)?,
            }])
        }
        .boxed_local()
    }

    fn sign<'a>(&'a self, _request: SignRequest<'a>) -> LocalBoxFuture<'a, VaultResult<Vec<u8>>> {
        let wallet_type = self.wallet_type;
        async move {
            Err(VaultError::NotImplemented(format!(
                "signTransaction for {} wallets",
                wallet_type.as_str()
            )))
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ALICE, ALICE_PUBKEY};

    fn params(watch_address: Option<&str>) -> PrepareAccountsParams {
        PrepareAccountsParams {
            indexes: Vec::new(),
            template: String::new(),
            address_prefix: 42,
            chain_id: "westend".to_string(),
            watch_address: watch_address.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_watch_address_is_normalized() {
        let keyring = WatchOnlyKeyring::new(WalletType::Watching);
        let hex_address = format!("0x{}", ALICE_PUBKEY);
        let accounts = keyring.prepare_accounts(&params(Some(&hex_address))).await.unwrap();
        assert_eq!(accounts[0].address, ALICE);
        assert_eq!(accounts[0].public_key, hex_address);

        assert!(keyring.prepare_accounts(&params(None)).await.is_err());
    }

    #[tokio::test]
    async fn test_cannot_sign() {
        let keyring = WatchOnlyKeyring::new(WalletType::External);
        let request = SignRequest {
            payload: &[1, 2, 3],
            path: "",
            chain_id: "polkadot",
            address_prefix: 0,
        };
        assert!(matches!(keyring.sign(request).await, Err(VaultError::NotImplemented(_))));
    }
}
