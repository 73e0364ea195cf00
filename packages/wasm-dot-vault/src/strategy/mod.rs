//! Chain-specific vault behavior
//!
//! Sub-chains override parts of the transfer pipeline (token transfers,
//! destination lookup, token enumeration, unsigned tx rewrites). Strategies
//! are tried in order and the first whose predicate matches wins; [`Common`]
//! handles everything else. A vault resolves its strategy once.

pub mod asset_hub;
pub mod common;

pub use asset_hub::AssetHubKusama;
pub use common::Common;

use crate::codec::to_hex;
use crate::era::{Era, DEFAULT_ERA_PERIOD};
use crate::error::VaultResult;
use crate::extrinsic::{signed_extensions, EXTRINSIC_VERSION};
use crate::registry::{ChainRegistry, DecodedCall};
use crate::rpc::LiveConnection;
use crate::types::{AccountTokenItem, EncodedTransaction, TokenInfo};
use crate::vault::{UpdateUnsignedTxParams, VaultCore};
use futures::future::{FutureExt, LocalBoxFuture};
use std::rc::Rc;

/// Chain state every new transaction is built on
#[derive(Debug, Clone)]
pub struct TxBaseInfo {
    /// Sender SS58 address
    pub address: String,
    pub block_hash: String,
    pub block_number: u64,
    pub genesis_hash: String,
    pub spec_name: String,
    pub spec_version: u32,
    pub transaction_version: u32,
    /// Network display name
    pub chain_name: String,
    pub registry: Rc<ChainRegistry>,
}

impl TxBaseInfo {
    /// Unsigned transaction around encoded call data, mortal from the base block
    pub fn encoded_tx(&self, method: &[u8], nonce: u64, tip: u128) -> EncodedTransaction {
        EncodedTransaction {
            address: self.address.clone(),
            block_hash: self.block_hash.clone(),
            block_number: self.block_number,
            era: Era::mortal(DEFAULT_ERA_PERIOD, self.block_number).to_hex(),
            genesis_hash: self.genesis_hash.clone(),
            metadata_rpc: String::new(),
            method: to_hex(method),
            nonce,
            spec_version: self.spec_version,
            tip,
            transaction_version: self.transaction_version,
            signed_extensions: signed_extensions(&self.registry),
            version: EXTRINSIC_VERSION,
            spec_name: self.spec_name.clone(),
            chain_name: self.chain_name.clone(),
            fee_info: None,
            is_from_dapp: false,
        }
    }
}

/// Inputs of a transfer build
#[derive(Debug, Clone, Copy)]
pub struct TransferBuildContext<'a> {
    /// Token being sent; `None` for the native token
    pub token: Option<&'a TokenInfo>,
    pub to: &'a str,
    /// Raw amount
    pub amount: u128,
    pub keep_alive: bool,
    pub base: &'a TxBaseInfo,
    pub nonce: u64,
}

#[derive(Clone, Copy)]
pub struct TokenDetailContext<'a> {
    pub vault: &'a VaultCore,
    pub contract: &'a str,
    pub account_address: &'a str,
    pub conn: Option<&'a LiveConnection>,
}

#[derive(Clone, Copy)]
pub struct TokenListContext<'a> {
    pub vault: &'a VaultCore,
    pub conn: &'a LiveConnection,
    pub account_address: &'a str,
}

#[derive(Clone, Copy)]
pub struct UpdateContext<'a> {
    pub vault: &'a VaultCore,
    pub encoded_tx: &'a EncodedTransaction,
    pub call: &'a DecodedCall,
    pub params: &'a UpdateUnsignedTxParams,
}

pub trait SubVaultStrategy: Sync {
    fn name(&self) -> &'static str;

    fn supports_network(&self, network_id: &str, chain_id: &str) -> bool;

    fn build_token_transfer(&self, ctx: &TransferBuildContext<'_>) -> VaultResult<EncodedTransaction> {
        common::build_token_transfer(ctx)
    }

    fn build_native_transfer(&self, ctx: &TransferBuildContext<'_>) -> VaultResult<EncodedTransaction> {
        common::build_native_transfer(ctx)
    }

    /// Recipient of a decoded call, when this chain knows better than `dest`
    fn get_address_by_tx_args(&self, _call: &DecodedCall) -> Option<String> {
        None
    }

    /// Token id of a decoded transfer; `None` means the native token
    fn extract_asset_id(&self, _chain_id: &str, _call: &DecodedCall) -> Option<String> {
        None
    }

    fn fetch_token_detail_by_rpc<'a>(
        &'a self,
        _ctx: TokenDetailContext<'a>,
    ) -> LocalBoxFuture<'a, VaultResult<Option<AccountTokenItem>>> {
        async { Ok(None) }.boxed_local()
    }

    /// Tokens held besides the native one
    fn fetch_additional_account_tokens<'a>(
        &'a self,
        _ctx: TokenListContext<'a>,
    ) -> LocalBoxFuture<'a, VaultResult<Vec<AccountTokenItem>>> {
        async { Ok(Vec::new()) }.boxed_local()
    }

    /// Replacement transaction, if the update calls for one
    fn update_unsigned_tx<'a>(
        &'a self,
        ctx: UpdateContext<'a>,
    ) -> LocalBoxFuture<'a, VaultResult<Option<EncodedTransaction>>> {
        common::update_unsigned_tx(ctx).boxed_local()
    }
}

static STRATEGIES: &[&dyn SubVaultStrategy] = &[&AssetHubKusama];

static FALLBACK: Common = Common;

/// First strategy supporting the network, or [`Common`]
pub fn select_strategy(network_id: &str, chain_id: &str) -> &'static dyn SubVaultStrategy {
    let strategy = STRATEGIES
        .iter()
        .copied()
        .find(|s| s.supports_network(network_id, chain_id))
        .unwrap_or(&FALLBACK);
    tracing::debug!(network_id, chain_id, strategy = strategy.name(), "Selected sub-vault strategy");
    strategy
}
