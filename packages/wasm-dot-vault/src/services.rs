//! Wallet services the vault consults but does not own

use crate::config::VaultSettings;
use crate::error::VaultResult;
use crate::types::{AccountTokenItem, NetworkDescriptor, TokenInfo};
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

/// Custom endpoint configured for a network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRpcInfo {
    pub rpc: String,
    #[serde(default)]
    pub is_custom_network: bool,
}

pub trait NetworkSettingsResolver {
    fn get_network<'a>(&'a self, network_id: &'a str) -> LocalBoxFuture<'a, VaultResult<NetworkDescriptor>>;

    fn get_vault_settings<'a>(&'a self, network_id: &'a str) -> LocalBoxFuture<'a, VaultResult<VaultSettings>>;

    fn get_custom_rpc_for_network<'a>(
        &'a self,
        network_id: &'a str,
    ) -> LocalBoxFuture<'a, VaultResult<Option<CustomRpcInfo>>>;
}

pub trait TokenService {
    /// Token metadata by id on network
    fn get_token<'a>(
        &'a self,
        account_id: &'a str,
        network_id: &'a str,
        token_id_on_network: &'a str,
    ) -> LocalBoxFuture<'a, VaultResult<Option<TokenInfo>>>;

    /// Token held by an account, with its balance
    fn fetch_account_token<'a>(
        &'a self,
        network_id: &'a str,
        account_address: &'a str,
        token_address: &'a str,
    ) -> LocalBoxFuture<'a, VaultResult<Option<AccountTokenItem>>>;
}

pub trait AccountProfileService {
    /// Raw balance of `address`
    fn fetch_account_balance<'a>(
        &'a self,
        account_id: &'a str,
        network_id: &'a str,
        address: &'a str,
    ) -> LocalBoxFuture<'a, VaultResult<u128>>;
}
