//! Signers per wallet type
//!
//! Every wallet type maps to one [`KeyringStrategy`]: software keys for HD and
//! imported wallets, a hardware device for `hw`, and watch-only keyrings that
//! can list an address but never sign.

pub mod ed25519;
pub mod hardware;
pub mod software;
pub mod watching;

pub use ed25519::Ed25519Authority;
pub use hardware::{
    convert_device_response, device_network_label, DeviceAddress, DeviceAddressRequest, DeviceResponse,
    DeviceSignRequest, DeviceSignature, HardwareDevice, HardwareKeyring,
};
pub use software::SoftwareKeyring;
pub use watching::WatchOnlyKeyring;

use crate::error::{VaultError, VaultResult};
use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletType {
    Hd,
    Qr,
    Hw,
    Imported,
    Watching,
    External,
}

impl WalletType {
    pub fn as_str(self) -> &'static str {
        match self {
            WalletType::Hd => "hd",
            WalletType::Qr => "qr",
            WalletType::Hw => "hw",
            WalletType::Imported => "imported",
            WalletType::Watching => "watching",
            WalletType::External => "external",
        }
    }
}

impl std::str::FromStr for WalletType {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hd" => Ok(WalletType::Hd),
            "qr" => Ok(WalletType::Qr),
            "hw" => Ok(WalletType::Hw),
            "imported" => Ok(WalletType::Imported),
            "watching" => Ok(WalletType::Watching),
            "external" => Ok(WalletType::External),
            other => Err(VaultError::InvalidInput(format!("Unknown wallet type: {}", other))),
        }
    }
}

/// Account discovery request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareAccountsParams {
    pub indexes: Vec<u32>,
    /// Derivation template with an `{index}` placeholder
    pub template: String,
    pub address_prefix: u16,
    pub chain_id: String,
    /// Address of watch-only accounts
    pub watch_address: Option<String>,
}

impl PrepareAccountsParams {
    pub fn paths(&self) -> impl Iterator<Item = String> + '_ {
        self.indexes
            .iter()
            .map(|index| self.template.replace("{index}", &index.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedAccount {
    pub path: String,
    /// Hex public key, empty when unknown
    pub public_key: String,
    pub address: String,
}

/// What to sign
#[derive(Debug, Clone, Copy)]
pub struct SignRequest<'a> {
    /// Full signing payload (call, extras, additional signed)
    pub payload: &'a [u8],
    pub path: &'a str,
    pub chain_id: &'a str,
    pub address_prefix: u16,
}

pub trait KeyringStrategy {
    fn wallet_type(&self) -> WalletType;

    fn prepare_accounts<'a>(
        &'a self,
        params: &'a PrepareAccountsParams,
    ) -> LocalBoxFuture<'a, VaultResult<Vec<DerivedAccount>>>;

    /// MultiSignature over the request payload
    fn sign<'a>(&'a self, request: SignRequest<'a>) -> LocalBoxFuture<'a, VaultResult<Vec<u8>>>;

    fn sign_message<'a>(&'a self, _message: &'a [u8], _path: &'a str) -> LocalBoxFuture<'a, VaultResult<Vec<u8>>> {
        let wallet_type = self.wallet_type();
        async move {
            Err(VaultError::NotImplemented(format!(
                "signMessage for {} wallets",
                wallet_type.as_str()
            )))
        }
        .boxed_local()
    }
}

/// Key material held outside the vault, addressed by derivation path
pub trait SigningAuthority {
    fn public_key(&self, path: &str) -> VaultResult<[u8; 32]>;

    fn sign(&self, path: &str, message: &[u8]) -> VaultResult<[u8; 64]>;
}

/// Signers a wallet can provide
#[derive(Clone, Default)]
pub struct KeyringBackends {
    pub authority: Option<Rc<dyn SigningAuthority>>,
    pub device: Option<Rc<dyn HardwareDevice>>,
}

/// Keyring for a wallet type
pub fn keyring_for(wallet_type: WalletType, backends: &KeyringBackends) -> VaultResult<Box<dyn KeyringStrategy>> {
    let missing = |what: &str| VaultError::Internal(format!("{} wallet has no {}", wallet_type.as_str(), what));
    match wallet_type {
        WalletType::Hd | WalletType::Imported => {
            let authority = backends.authority.clone().ok_or_else(|| missing("signing authority"))?;
            Ok(Box::new(SoftwareKeyring::new(wallet_type, authority)))
        }
        WalletType::Hw => {
            let device = backends.device.clone().ok_or_else(|| missing("hardware device"))?;
            Ok(Box::new(HardwareKeyring::new(device)))
        }
        WalletType::Watching | WalletType::External => Ok(Box::new(WatchOnlyKeyring::new(wallet_type))),
        WalletType::Qr => Err(VaultError::NotImplemented("qr wallets".to_string())),
    }
}
