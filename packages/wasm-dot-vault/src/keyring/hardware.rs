//! Hardware wallets
//!
//! The device is reached through [`HardwareDevice`]; transport and wire
//! protocol belong to the host. Requests carry the device's own network label,
//! which differs from the chain id for some networks.

use super::{DerivedAccount, KeyringStrategy, PrepareAccountsParams, SignRequest, WalletType};
use crate::address::encode_ss58;
use crate::codec::{from_hex, to_hex};
use crate::error::{DeviceError, VaultResult};
use crate::extrinsic::signature_type;
use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Chain ids the device knows under another name
const DEVICE_NETWORK_LABELS: &[(&str, &str)] = &[("asset-hub-polkadot", "polkadot-assethub")];

pub fn device_network_label(chain_id: &str) -> &str {
    DEVICE_NETWORK_LABELS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, label)| *label)
        .unwrap_or(chain_id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAddressRequest {
    pub path: String,
    pub prefix: u16,
    pub network: String,
    pub show_on_device: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAddress {
    pub path: String,
    #[serde(default)]
    pub address: Option<String>,
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSignRequest {
    pub path: String,
    pub prefix: u16,
    pub network: String,
    /// Hex signing payload, unhashed
    pub raw_tx: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSignature {
    /// Hex Ed25519 signature without type prefix
    pub signature: String,
}

/// Device reply envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceResponse<T> {
    Success(T),
    Failure { code: Option<i64>, error: String },
}

/// Unwrap a device reply, failures become [`DeviceError`]
pub fn convert_device_response<T>(response: DeviceResponse<T>) -> VaultResult<T> {
    match response {
        DeviceResponse::Success(payload) => Ok(payload),
        DeviceResponse::Failure { code, error } => {
            tracing::warn!(code = ?code, error = %error, "Device request failed");
            Err(DeviceError { code, message: error }.into())
        }
    }
}

pub trait HardwareDevice {
    fn get_addresses(
        &self,
        requests: Vec<DeviceAddressRequest>,
    ) -> LocalBoxFuture<'_, DeviceResponse<Vec<DeviceAddress>>>;

    fn sign_transaction(&self, request: DeviceSignRequest) -> LocalBoxFuture<'_, DeviceResponse<DeviceSignature>>;
}

pub struct HardwareKeyring {
    device: Rc<dyn HardwareDevice>,
}

impl HardwareKeyring {
    pub fn new(device: Rc<dyn HardwareDevice>) -> Self {
        Self { device }
    }
}

impl KeyringStrategy for HardwareKeyring {
    fn wallet_type(&self) -> WalletType {
        WalletType::Hw
    }

    fn prepare_accounts<'a>(
        &'a self,
        params: &'a PrepareAccountsParams,
    ) -> LocalBoxFuture<'a, VaultResult<Vec<DerivedAccount>>> {
        async move {
            let network = device_network_label(&params.chain_id).to_string();
            let requests = params
                .paths()
                .map(|path| DeviceAddressRequest {
                    path,
                    prefix: params.address_prefix,
                    network: network.clone(),
                    show_on_device: false,
                })
                .collect();
            let addresses = convert_device_response(self.device.get_addresses(requests).await)?;

            addresses
                .into_iter()
                .map(|item| -> VaultResult<DerivedAccount> {
                    let address = match item.address.filter(|address| !address.is_empty()) {
                        Some(address) => address,
                        None => encode_ss58(&from_hex(&item.public_key)?, params.address_prefix)?,
                    };
                    Ok(DerivedAccount {
                        path: item.path,
                        public_key: item.public_key,
                        address,
                    })
                })
                .collect()
        }
        .boxed_local()
    }

    fn sign<'a>(&'a self, request: SignRequest<'a>) -> LocalBoxFuture<'a, VaultResult<Vec<u8>>> {
        async move {
            let device_request = DeviceSignRequest {
                path: request.path.to_string(),
                prefix: request.address_prefix,
                network: device_network_label(request.chain_id).to_string(),
                raw_tx: to_hex(request.payload),
            };
            let reply = convert_device_response(self.device.sign_transaction(device_request).await)?;
            let mut multi = vec![signature_type::ED25519];
            multi.extend(from_hex(&reply.signature)?);
            Ok(multi)
        }
        .boxed_local()
    }
}
