//! Per-network chain data: metadata, runtime version, genesis hash, latest
//! block, registry and minimum balances
//!
//! Values come from the live connection when the network has a custom
//! endpoint, otherwise from the RPC relay. Keys carry the endpoint URL so
//! switching endpoints never serves another node's data.

use super::{AsyncCache, CacheName, Clock};
use crate::config::CacheTtls;
use crate::error::{VaultError, VaultResult};
use crate::registry::ChainRegistry;
use crate::rpc::{json_field_u128, json_u128, relay_call, BlockInfo, LiveConnection, ProxyRoute, RpcRelay, RuntimeVersion};
use futures::future::FutureExt;
use serde_json::{json, Value as Json};
use std::rc::Rc;

/// What a registry should be built from; missing parts are resolved from the chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryRequest {
    pub network_id: String,
    /// Metadata blob, empty means "fetch"
    pub metadata_hex: Option<String>,
    pub spec_name: Option<String>,
    pub spec_version: Option<u32>,
}

impl RegistryRequest {
    /// Registry for whatever runtime the chain currently runs
    pub fn latest(network_id: &str) -> Self {
        Self {
            network_id: network_id.to_string(),
            ..Default::default()
        }
    }

    fn pinned_spec(&self) -> Option<(&str, u32)> {
        match (self.spec_name.as_deref(), self.spec_version) {
            (Some(name), Some(version)) if !name.is_empty() => Some((name, version)),
            _ => None,
        }
    }

    fn metadata(&self) -> Option<&str> {
        self.metadata_hex.as_deref().filter(|m| !m.is_empty())
    }
}

struct Inner {
    relay: Rc<dyn RpcRelay>,
    metadata: AsyncCache<String>,
    runtime_version: AsyncCache<RuntimeVersion>,
    genesis_hash: AsyncCache<String>,
    block_info: AsyncCache<BlockInfo>,
    registry: AsyncCache<Rc<ChainRegistry>>,
    min_amount: AsyncCache<u128>,
}

/// Memoized chain data shared by every vault of the wallet
#[derive(Clone)]
pub struct ChainMetadataCache {
    inner: Rc<Inner>,
}

fn cache_key(network_id: &str, conn: Option<&LiveConnection>) -> String {
    match conn {
        Some(live) => format!("{}@{}", network_id, live.url),
        None => network_id.to_string(),
    }
}

fn expect_string(value: Json, what: &str) -> VaultResult<String> {
    match value {
        Json::String(s) => Ok(s),
        other => Err(VaultError::Rpc(format!("Unexpected {} response: {}", what, other))),
    }
}

impl ChainMetadataCache {
    pub fn new(relay: Rc<dyn RpcRelay>, clock: Rc<dyn Clock>, ttls: CacheTtls) -> Self {
        let chain_static = ttls.chain_static;
        Self {
            inner: Rc::new(Inner {
                relay,
                metadata: AsyncCache::new("metadata", chain_static, clock.clone()),
                runtime_version: AsyncCache::new("runtime_version", chain_static, clock.clone()),
                genesis_hash: AsyncCache::new("genesis_hash", chain_static, clock.clone()),
                block_info: AsyncCache::new("block_info", ttls.block_info, clock.clone()),
                registry: AsyncCache::new("registry", chain_static, clock.clone()),
                min_amount: AsyncCache::new("min_amount", chain_static, clock),
            }),
        }
    }

    /// Hex encoded runtime metadata
    pub async fn get_metadata(&self, network_id: &str, conn: Option<&LiveConnection>) -> VaultResult<String> {
        let relay = self.inner.relay.clone();
        let live = conn.cloned();
        let network_id = network_id.to_string();
        let key = cache_key(&network_id, conn);
        self.inner
            .metadata
            .get_or_fetch(&key, move || {
                async move {
                    match live {
                        Some(live) => live.conn.metadata_hex().await,
                        None => {
                            let value =
                                relay_call(&*relay, &network_id, ProxyRoute::Rpc, "state_getMetadata", vec![]).await?;
                            expect_string(value, "state_getMetadata")
                        }
                    }
                }
                .boxed_local()
            })
            .await
    }

    pub async fn get_runtime_version(
        &self,
        network_id: &str,
        conn: Option<&LiveConnection>,
    ) -> VaultResult<RuntimeVersion> {
        let relay = self.inner.relay.clone();
        let live = conn.cloned();
        let network_id = network_id.to_string();
        let key = cache_key(&network_id, conn);
        self.inner
            .runtime_version
            .get_or_fetch(&key, move || {
                async move {
                    match live {
                        Some(live) => live.conn.runtime_version().await,
                        None => {
                            let value = relay_call(
                                &*relay,
                                &network_id,
                                ProxyRoute::Rpc,
                                "state_getRuntimeVersion",
                                vec![],
                            )
                            .await?;
                            Ok(serde_json::from_value(value)?)
                        }
                    }
                }
                .boxed_local()
            })
            .await
    }

    pub async fn get_genesis_hash(&self, network_id: &str, conn: Option<&LiveConnection>) -> VaultResult<String> {
        let relay = self.inner.relay.clone();
        let live = conn.cloned();
        let network_id = network_id.to_string();
        let key = cache_key(&network_id, conn);
        self.inner
            .genesis_hash
            .get_or_fetch(&key, move || {
                async move {
                    match live {
                        Some(live) => live.conn.genesis_hash().await,
                        None => {
                            let value =
                                relay_call(&*relay, &network_id, ProxyRoute::Rpc, "chain_getBlockHash", vec![json!(0)])
                                    .await?;
                            expect_string(value, "chain_getBlockHash")
                        }
                    }
                }
                .boxed_local()
            })
            .await
    }

    /// Best block hash and number
    pub async fn get_block_info(&self, network_id: &str, conn: Option<&LiveConnection>) -> VaultResult<BlockInfo> {
        let relay = self.inner.relay.clone();
        let live = conn.cloned();
        let network_id = network_id.to_string();
        let key = cache_key(&network_id, conn);
        self.inner
            .block_info
            .get_or_fetch(&key, move || {
                async move {
                    match live {
                        Some(live) => live.conn.block_info().await,
                        None => relay_block_info(&*relay, &network_id).await,
                    }
                }
                .boxed_local()
            })
            .await
    }

    /// Registry for the requested (or current) runtime
    pub async fn get_registry(
        &self,
        request: RegistryRequest,
        conn: Option<&LiveConnection>,
    ) -> VaultResult<Rc<ChainRegistry>> {
        let base = cache_key(&request.network_id, conn);
        let key = match request.pinned_spec() {
            Some((name, version)) => format!("{}#{}:{}", base, name, version),
            None => format!("{}#*", base),
        };
        let this = self.clone();
        let live = conn.cloned();
        self.inner
            .registry
            .get_or_fetch(&key, move || {
                async move {
                    let conn = live.as_ref();
                    let metadata = match request.metadata() {
                        Some(metadata) => metadata.to_string(),
                        None => this.get_metadata(&request.network_id, conn).await?,
                    };
                    let (spec_name, spec_version) = match request.pinned_spec() {
                        Some((name, version)) => (name.to_string(), version),
                        None => {
                            let version = this.get_runtime_version(&request.network_id, conn).await?;
                            (version.spec_name, version.spec_version)
                        }
                    };
                    tracing::debug!(
                        network_id = %request.network_id,
                        spec_name = %spec_name,
                        spec_version,
                        "Building registry"
                    );
                    let registry = ChainRegistry::from_metadata_hex(&metadata, &spec_name, spec_version)?;
                    Ok(Rc::new(registry))
                }
                .boxed_local()
            })
            .await
    }

    /// Existential deposit, or the asset's minimum balance when `token` is set
    pub async fn get_min_amount(
        &self,
        network_id: &str,
        token: Option<&str>,
        conn: Option<&LiveConnection>,
    ) -> VaultResult<u128> {
        let key = format!("{}:{}", cache_key(network_id, conn), token.unwrap_or("native"));
        let this = self.clone();
        let live = conn.cloned();
        let network_id = network_id.to_string();
        let token = token.map(str::to_string);
        self.inner
            .min_amount
            .get_or_fetch(&key, move || {
                async move {
                    match (token, live) {
                        (Some(token), Some(live)) => {
                            let asset = live.conn.query("assets.asset", vec![json!(token)]).await?;
                            Ok(json_field_u128(&asset, "minBalance").unwrap_or(0))
                        }
                        (Some(token), None) => {
                            let relay = this.inner.relay.clone();
                            match relay_call(&*relay, &network_id, ProxyRoute::ClientQuery, "assets.asset", vec![json!(token)])
                                .await
                            {
                                Ok(asset) => Ok(json_field_u128(&asset, "minBalance").unwrap_or(0)),
                                Err(err) => {
                                    tracing::warn!(network_id = %network_id, token = %token, error = %err, "Asset min balance lookup failed");
                                    Ok(0)
                                }
                            }
                        }
                        (None, Some(live)) => {
                            let registry = this.get_registry(RegistryRequest::latest(&network_id), Some(&live)).await?;
                            registry.constant_u128("Balances", "ExistentialDeposit")
                        }
                        (None, None) => {
                            let relay = this.inner.relay.clone();
                            let value = relay_call(
                                &*relay,
                                &network_id,
                                ProxyRoute::Consts,
                                "balances.existentialDeposit",
                                vec![],
                            )
                            .await?;
                            json_u128(&value).ok_or_else(|| {
                                VaultError::Rpc(format!("Unexpected existentialDeposit response: {}", value))
                            })
                        }
                    }
                }
                .boxed_local()
            })
            .await
    }

    /// Drop every entry of the named cache
    pub fn invalidate(&self, name: CacheName) {
        match name {
            CacheName::Metadata => self.inner.metadata.clear(),
            CacheName::RuntimeVersion => self.inner.runtime_version.clear(),
            CacheName::GenesisHash => self.inner.genesis_hash.clear(),
            CacheName::BlockInfo => self.inner.block_info.clear(),
            CacheName::Registry => self.inner.registry.clear(),
            CacheName::MinAmount => self.inner.min_amount.clear(),
            // Owned by the vault
            CacheName::Connection | CacheName::Balance => {}
        }
    }
}

async fn relay_block_info(relay: &dyn RpcRelay, network_id: &str) -> VaultResult<BlockInfo> {
    let hash = relay_call(relay, network_id, ProxyRoute::Rpc, "chain_getBlockHash", vec![]).await?;
    let block_hash = expect_string(hash, "chain_getBlockHash")?;
    let block = relay_call(
        relay,
        network_id,
        ProxyRoute::Rpc,
        "chain_getBlock",
        vec![json!(block_hash)],
    )
    .await?;
    let number = block
        .pointer("/block/header/number")
        .and_then(json_u128)
        .ok_or_else(|| VaultError::Rpc(format!("Block {} has no header number", block_hash)))?;
    Ok(BlockInfo {
        block_hash,
        block_number: number as u64,
    })
}
