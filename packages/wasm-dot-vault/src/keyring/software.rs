//! HD and imported wallets

use super::{DerivedAccount, KeyringStrategy, PrepareAccountsParams, SignRequest, SigningAuthority, WalletType};
use crate::address::encode_ss58;
use crate::codec::to_hex;
use crate::error::VaultResult;
use crate::extrinsic::{payload_to_sign, signature_type};
use futures::future::{FutureExt, LocalBoxFuture};
use std::rc::Rc;

pub struct SoftwareKeyring {
    wallet_type: WalletType,
    authority: Rc<dyn SigningAuthority>,
}

impl SoftwareKeyring {
    pub fn new(wallet_type: WalletType, authority: Rc<dyn SigningAuthority>) -> Self {
        Self { wallet_type, authority }
    }
}

impl KeyringStrategy for SoftwareKeyring {
    fn wallet_type(&self) -> WalletType {
        self.wallet_type
    }

    fn prepare_accounts<'a>(
        &'a self,
        params: &'a PrepareAccountsParams,
    ) -> LocalBoxFuture<'a, VaultResult<Vec<DerivedAccount>>> {
        async move {
            params
                .paths()
                .map(|path| -> VaultResult<DerivedAccount> {
                    let public_key = self.authority.public_key(&path)?;
                    Ok(DerivedAccount {
                        address: encode_ss58(&public_key, params.address_prefix)?,
                        public_key: to_hex(&public_key),
                        path,
                    })
                })
                .collect()
        }
        .boxed_local()
    }

    fn sign<'a>(&'a self, request: SignRequest<'a>) -> LocalBoxFuture<'a, VaultResult<Vec<u8>>> {
        async move {
            let message = payload_to_sign(request.payload.to_vec());
            let signature = self.authority.sign(request.path, &message)?;
            let mut multi = Vec::with_capacity(65);
            multi.push(signature_type::ED25519);
            multi.extend_from_slice(&signature);
            Ok(multi)
        }
        .boxed_local()
    }
}
