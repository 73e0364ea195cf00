//! Transaction pipeline for one account on one DOT network
//!
//! build → decode → update → estimate fee → sign → broadcast. Every step
//! resolves chain data through [`ChainMetadataCache`] and reaches the chain
//! through the custom endpoint of the network when one is configured, the
//! RPC relay otherwise.

mod build;
mod custom_rpc;
mod decode;
mod fee;
mod sign;
mod tokens;
mod update;
mod validate;

pub use build::{BuildEncodedTxParams, TransferParams};
pub use decode::{action_type_of, BuildDecodedTxParams, TransferPayload};
pub use tokens::TokenListParams;
pub use update::{NativeAmountInfo, UpdateUnsignedTxParams};
pub use validate::{PrecheckParams, PrecheckTiming, ValidateSendAmountParams};

use crate::address::{encode_ss58, validate_address};
use crate::cache::{AsyncCache, CacheName, ChainMetadataCache, Clock, RegistryRequest};
use crate::codec::from_hex;
use crate::config::{CacheTtls, NetworkInfo, SharedSettings};
use crate::error::{VaultError, VaultResult};
use crate::registry::{ChainRegistry, DecodedCall};
use crate::rpc::{ConnectionFactory, Endpoint, LiveConnection, RpcRelay};
use crate::services::{AccountProfileService, NetworkSettingsResolver, TokenService};
use crate::strategy::{select_strategy, SubVaultStrategy};
use crate::types::{chain_id_of, AccountAddressDetail, AddressValidation, EncodedTransaction, NetworkDescriptor, VaultAccount};
use futures::future::FutureExt;
use std::cell::OnceCell;
use std::rc::Rc;

/// Collaborators a vault reaches the outside world through
#[derive(Clone)]
pub struct VaultDeps {
    pub relay: Rc<dyn RpcRelay>,
    pub connections: Rc<dyn ConnectionFactory>,
    pub settings: Rc<dyn NetworkSettingsResolver>,
    pub tokens: Rc<dyn TokenService>,
    pub profile: Rc<dyn AccountProfileService>,
    /// Shared by every vault of the wallet
    pub chain_cache: ChainMetadataCache,
    pub clock: Rc<dyn Clock>,
    pub ttls: CacheTtls,
}

pub struct VaultCore {
    network_id: String,
    account: VaultAccount,
    deps: VaultDeps,
    strategy: OnceCell<&'static dyn SubVaultStrategy>,
    network: OnceCell<NetworkDescriptor>,
    settings: OnceCell<SharedSettings>,
    connections: AsyncCache<LiveConnection>,
    balances: AsyncCache<u128>,
}

impl VaultCore {
    pub fn new(network_id: &str, account: VaultAccount, deps: VaultDeps) -> Self {
        let connections = AsyncCache::new("connection", deps.ttls.connection, deps.clock.clone());
        let balances = AsyncCache::new("balance", deps.ttls.balance, deps.clock.clone());
        Self {
            network_id: network_id.to_string(),
            account,
            deps,
            strategy: OnceCell::new(),
            network: OnceCell::new(),
            settings: OnceCell::new(),
            connections,
            balances,
        }
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    /// Chain id of the network ("dot--kusama-assethub" -> "kusama-assethub")
    pub fn chain_id(&self) -> &str {
        chain_id_of(&self.network_id)
    }

    pub fn account(&self) -> &VaultAccount {
        &self.account
    }

    pub fn account_address(&self) -> &str {
        &self.account.address
    }

    pub fn deps(&self) -> &VaultDeps {
        &self.deps
    }

    /// Strategy for this network, resolved on first use
    pub fn strategy(&self) -> &'static dyn SubVaultStrategy {
        *self
            .strategy
            .get_or_init(|| select_strategy(&self.network_id, self.chain_id()))
    }

    pub async fn network(&self) -> VaultResult<NetworkDescriptor> {
        if let Some(network) = self.network.get() {
            return Ok(network.clone());
        }
        let network = self.deps.settings.get_network(&self.network_id).await?;
        Ok(self.network.get_or_init(|| network).clone())
    }

    pub async fn vault_settings(&self) -> VaultResult<SharedSettings> {
        if let Some(settings) = self.settings.get() {
            return Ok(settings.clone());
        }
        let settings = self
            .deps
            .settings
            .get_vault_settings(&self.network_id)
            .await?
            .validated()?;
        Ok(self.settings.get_or_init(|| settings).clone())
    }

    pub async fn network_info(&self) -> VaultResult<NetworkInfo> {
        let settings = self.vault_settings().await?;
        settings.network_info(&self.network_id).cloned()
    }

    /// Live connection to the network's custom endpoint, if it has one
    pub async fn custom_connection(&self) -> VaultResult<Option<LiveConnection>> {
        let info = match self.deps.settings.get_custom_rpc_for_network(&self.network_id).await? {
            Some(info) if info.is_custom_network && !info.rpc.is_empty() => info,
            _ => return Ok(None),
        };
        let key = format!("{}-{}", self.network_id, info.rpc);
        let factory = self.deps.connections.clone();
        let url = info.rpc;
        let connection = self
            .connections
            .get_or_fetch(&key, move || {
                async move {
                    let endpoint = Endpoint::parse(&url)?;
                    let conn = factory.connect(endpoint).await?;
                    Ok(LiveConnection { url, conn })
                }
                .boxed_local()
            })
            .await?;
        Ok(Some(connection))
    }

    /// Custom connection, required by RPC-only operations
    async fn require_connection(&self) -> VaultResult<LiveConnection> {
        self.custom_connection()
            .await?
            .ok_or_else(|| VaultError::Internal("No RPC url".to_string()))
    }

    /// Raw balance of `address`, memoized briefly
    pub async fn balance_of(&self, address: &str) -> VaultResult<u128> {
        let profile = self.deps.profile.clone();
        let account_id = self.account.id.clone();
        let network_id = self.network_id.clone();
        let address_owned = address.to_string();
        self.balances
            .get_or_fetch(address, move || {
                async move {
                    profile
                        .fetch_account_balance(&account_id, &network_id, &address_owned)
                        .await
                }
                .boxed_local()
            })
            .await
    }

    /// Registry matching the runtime an unsigned transaction was built for
    pub async fn registry_for(&self, tx: &EncodedTransaction) -> VaultResult<Rc<ChainRegistry>> {
        let conn = self.custom_connection().await?;
        let request = RegistryRequest {
            network_id: self.network_id.clone(),
            metadata_hex: Some(tx.metadata_rpc.clone()),
            spec_name: Some(tx.spec_name.clone()),
            spec_version: Some(tx.spec_version),
        };
        self.deps.chain_cache.get_registry(request, conn.as_ref()).await
    }

    /// Decode the call of an unsigned transaction
    pub async fn decode_unsigned_tx(&self, tx: &EncodedTransaction) -> VaultResult<(DecodedCall, Rc<ChainRegistry>)> {
        let registry = self.registry_for(tx).await?;
        let prefix = self.network_info().await?.address_prefix;
        let call = registry.decode_call(&from_hex(&tx.method)?, prefix)?;
        Ok((call, registry))
    }

    /// Recipient of a decoded call: strategy first, then `dest`
    pub fn address_by_tx_args(&self, call: &DecodedCall) -> String {
        self.strategy()
            .get_address_by_tx_args(call)
            .or_else(|| call.arg_address("dest"))
            .unwrap_or_default()
    }

    /// Drop memoized values, e.g. after the custom endpoint changed
    pub fn invalidate_cache(&self, name: CacheName) {
        match name {
            CacheName::Connection => self.connections.clear(),
            CacheName::Balance => self.balances.clear(),
            other => self.deps.chain_cache.invalidate(other),
        }
    }

    /// Address forms for `account`, re-encoded with the network prefix when the public key is known
    pub async fn build_account_address_detail(
        &self,
        account: &VaultAccount,
        external_account_address: Option<&str>,
    ) -> VaultResult<AccountAddressDetail> {
        let base_address = if account.address.is_empty() {
            external_account_address.unwrap_or_default().to_string()
        } else {
            account.address.clone()
        };
        let address = match account.pub_key.as_deref() {
            Some(pub_key) if !pub_key.is_empty() => {
                let prefix = self.network_info().await?.address_prefix;
                encode_ss58(&from_hex(pub_key)?, prefix)?
            }
            _ => base_address.clone(),
        };
        Ok(AccountAddressDetail {
            network_id: self.network_id.clone(),
            normalized_address: base_address.clone(),
            display_address: address.clone(),
            address,
            base_address,
            is_valid: true,
            allow_empty_address: false,
        })
    }

    pub async fn validate_address(&self, address: &str) -> VaultResult<AddressValidation> {
        let prefix = self.network_info().await?.address_prefix;
        Ok(AddressValidation {
            is_valid: validate_address(address, Some(prefix)),
            normalized_address: address.to_string(),
            display_address: address.to_string(),
        })
    }
}
