//! Vault configuration
//!
//! Settings are supplied once per implementation, validated, and then shared
//! read-only between the vault, its strategy and its keyrings.

use crate::error::{VaultError, VaultResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

/// Key of the fallback entry in keyed settings maps
pub const DEFAULT_KEY: &str = "default";

/// Highest SS58 prefix that still fits the two-byte encoding
const MAX_ADDRESS_PREFIX: u16 = 16383;

/// Account derivation template ("m/44'/354'/0'/0'/{index}'")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeriveInfo {
    pub template: String,
    pub coin_type: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl DeriveInfo {
    /// Expand the template for an account index
    pub fn path_for(&self, index: u32) -> String {
        self.template.replace("{index}", &index.to_string())
    }
}

/// Per-network options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    #[serde(deserialize_with = "prefix_from_any")]
    pub address_prefix: u16,
    #[serde(default)]
    pub native_token_address: String,
}

/// Implementation-wide settings as returned by `getVaultSettings`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultSettings {
    /// Implementation name ("dot")
    #[serde(rename = "impl")]
    pub impl_name: String,
    pub coin_type: String,
    /// Derivation templates keyed by template name, "default" is required
    pub account_derive_info: HashMap<String, DeriveInfo>,
    /// Options keyed by network id, "default" is the fallback
    pub network_info: HashMap<String, NetworkInfo>,
    #[serde(default)]
    pub sign_only_full_tx_required: bool,
}

/// Validated settings shared between collaborators
pub type SharedSettings = Rc<VaultSettings>;

impl VaultSettings {
    /// Validate and freeze settings
    pub fn validated(self) -> VaultResult<SharedSettings> {
        if self.impl_name.trim().is_empty() {
            return Err(VaultError::InvalidInput("Settings impl is empty".to_string()));
        }
        if self.coin_type.trim().is_empty() {
            return Err(VaultError::InvalidInput("Settings coinType is empty".to_string()));
        }
        let default_derive = self.account_derive_info.get(DEFAULT_KEY).ok_or_else(|| {
            VaultError::InvalidInput("Settings require a default accountDeriveInfo".to_string())
        })?;
        if !default_derive.template.contains("{index}") {
            return Err(VaultError::InvalidInput(format!(
                "Derivation template has no index placeholder: {}",
                default_derive.template
            )));
        }
        if let Some((network_id, info)) = self
            .network_info
            .iter()
            .find(|(_, info)| info.address_prefix > MAX_ADDRESS_PREFIX)
        {
            return Err(VaultError::InvalidInput(format!(
                "Address prefix {} of {} is out of range",
                info.address_prefix, network_id
            )));
        }
        Ok(Rc::new(self))
    }

    /// Default derivation template
    pub fn default_derive_info(&self) -> VaultResult<&DeriveInfo> {
        self.account_derive_info
            .get(DEFAULT_KEY)
            .ok_or_else(|| VaultError::Internal("Missing default accountDeriveInfo".to_string()))
    }

    /// Network options for `network_id`, falling back to the default entry
    pub fn network_info(&self, network_id: &str) -> VaultResult<&NetworkInfo> {
        self.network_info
            .get(network_id)
            .or_else(|| self.network_info.get(DEFAULT_KEY))
            .ok_or_else(|| VaultError::Internal(format!("No network info for {}", network_id)))
    }
}

/// Expiry of each memoized value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// Metadata, runtime version, genesis hash, registry and minimum amounts
    pub chain_static: Duration,
    /// Latest block info
    pub block_info: Duration,
    /// Per-account balance lookups
    pub balance: Duration,
    /// Live connections to custom endpoints
    pub connection: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            chain_static: Duration::from_secs(10 * 60),
            block_info: Duration::from_secs(10),
            balance: Duration::from_secs(10),
            connection: Duration::from_secs(10),
        }
    }
}

// Prefixes arrive as strings ("0") from the settings service
fn prefix_from_any<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u16),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
