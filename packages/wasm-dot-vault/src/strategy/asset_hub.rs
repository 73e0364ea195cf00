//! Kusama Asset Hub: assets-pallet tokens next to the native balance

use super::{common, SubVaultStrategy, TokenDetailContext, TokenListContext, UpdateContext};
use crate::address::decode_address;
use crate::codec::{from_hex, to_hex};
use crate::error::{MessageKey, VaultError, VaultResult};
use crate::methods;
use crate::registry::DecodedCall;
use crate::rpc::{json_field_u128, json_u128};
use crate::types::{AccountTokenItem, ActionType, EncodedTransaction, TokenInfo};
use crate::units::{format_units, parse_raw};
use crate::vault::action_type_of;
use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::{json, Value as Json};

const NETWORK_ID: &str = "dot--kusama-assethub";
const CHAIN_ID: &str = "kusama-assethub";

#[derive(Debug, Default, Clone, Copy)]
pub struct AssetHubKusama;

impl SubVaultStrategy for AssetHubKusama {
    fn name(&self) -> &'static str {
        "asset-hub-kusama"
    }

    fn supports_network(&self, network_id: &str, chain_id: &str) -> bool {
        network_id == NETWORK_ID || chain_id == CHAIN_ID
    }

    fn get_address_by_tx_args(&self, call: &DecodedCall) -> Option<String> {
        ["target", "dest"]
            .iter()
            .find_map(|name| call.arg(name).and_then(|v| v.get("id")).and_then(Json::as_str))
            .map(str::to_string)
    }

    fn extract_asset_id(&self, chain_id: &str, call: &DecodedCall) -> Option<String> {
        if chain_id != CHAIN_ID || call.pallet != "assets" {
            return None;
        }
        match call.arg("id")? {
            Json::String(id) => Some(id.clone()),
            Json::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    fn fetch_token_detail_by_rpc<'a>(
        &'a self,
        ctx: TokenDetailContext<'a>,
    ) -> LocalBoxFuture<'a, VaultResult<Option<AccountTokenItem>>> {
        async move {
            let conn = match ctx.conn {
                Some(live) if !ctx.account_address.is_empty() => &live.conn,
                _ => return Ok(None),
            };
            let metadata = conn.query("assets.metadata", vec![json!(ctx.contract)]).await?;
            let account = conn
                .query("assets.account", vec![json!(ctx.contract), json!(ctx.account_address)])
                .await?;
            if metadata.is_null() || account.is_null() {
                return Ok(None);
            }
            let balance = json_field_u128(&account, "balance").unwrap_or(0);
            Ok(Some(asset_item(ctx.contract, &metadata, balance)))
        }
        .boxed_local()
    }

    fn fetch_additional_account_tokens<'a>(
        &'a self,
        ctx: TokenListContext<'a>,
    ) -> LocalBoxFuture<'a, VaultResult<Vec<AccountTokenItem>>> {
        async move {
            if ctx.account_address.is_empty() {
                return Ok(Vec::new());
            }
            let conn = &ctx.conn.conn;
            let asset_ids: Vec<u128> = conn
                .query_entries("assets.asset")
                .await?
                .iter()
                .filter_map(|(keys, _)| keys.first().and_then(json_u128))
                .collect();

            let account_hex = to_hex(&decode_address(ctx.account_address, None)?);
            let keys = asset_ids
                .iter()
                .map(|id| vec![json!(id.to_string()), json!(account_hex)])
                .collect();
            let balances = conn.query_multi("assets.account", keys).await?;

            let mut tokens = Vec::new();
            for (id, entry) in asset_ids.iter().zip(balances) {
                let balance = match json_field_u128(&entry, "balance") {
                    Some(balance) if balance > 0 => balance,
                    _ => continue,
                };
                let contract = id.to_string();
                let metadata = conn.query("assets.metadata", vec![json!(contract)]).await?;
                tokens.push(asset_item(&contract, &metadata, balance));
            }
            Ok(tokens)
        }
        .boxed_local()
    }

    fn update_unsigned_tx<'a>(
        &'a self,
        ctx: UpdateContext<'a>,
    ) -> LocalBoxFuture<'a, VaultResult<Option<EncodedTransaction>>> {
        async move {
            if action_type_of(ctx.call) != ActionType::AssetTransfer {
                return common::update_unsigned_tx(ctx).await;
            }
            let (asset_id, to) = match (ctx.call.arg_u128("id"), self.get_address_by_tx_args(ctx.call)) {
                (Some(asset_id), Some(to)) => (asset_id.to_string(), to),
                _ => return common::update_unsigned_tx(ctx).await,
            };
            let amount = ctx.call.arg_u128("amount").unwrap_or(0);

            let vault = ctx.vault;
            let from = vault.account_address();
            let held = vault
                .deps()
                .tokens
                .fetch_account_token(vault.network_id(), from, &asset_id)
                .await?
                .ok_or_else(|| VaultError::InternalKeyed {
                    key: MessageKey::IncorrectTokenAddress,
                    message: format!("No token info for asset {}", asset_id),
                })?;
            let balance = parse_raw(&held.balance)?;
            if amount < balance {
                return Ok(None);
            }

            // Rebuild against fresh chain state, same transfer
            let keep_alive = ctx.call.method.contains("KeepAlive");
            let base = vault.tx_base_info().await?;
            let payload = methods::assets_transfer(methods::parse_asset_id(&held.info.address)?, &to, amount, keep_alive)?;
            let method = base.registry.encode_call(&payload)?;
            tracing::debug!(asset_id = %asset_id, amount = %amount, "Rebuilding asset transfer of full balance");
            Ok(Some(base.encoded_tx(&method, ctx.encoded_tx.nonce, 0)))
        }
        .boxed_local()
    }
}

fn asset_item(contract: &str, metadata: &Json, balance: u128) -> AccountTokenItem {
    let decimals = json_field_u128(metadata, "decimals").unwrap_or(0) as u32;
    AccountTokenItem {
        info: TokenInfo {
            address: contract.to_string(),
            decimals,
            name: text_field(metadata, "name"),
            symbol: text_field(metadata, "symbol"),
            logo_uri: Some(String::new()),
            is_native: false,
            unique_key: None,
        },
        balance: balance.to_string(),
        balance_parsed: format_units(balance, decimals),
        fiat_value: "0".to_string(),
        frozen_balance: None,
    }
}

// Asset names are `BoundedVec<u8>`, rendered as hex by most nodes
fn text_field(value: &Json, name: &str) -> String {
    let raw = value.get(name).and_then(Json::as_str).unwrap_or_default();
    if raw.starts_with("0x") {
        if let Some(text) = from_hex(raw).ok().and_then(|bytes| String::from_utf8(bytes).ok()) {
            return text;
        }
    }
    raw.to_string()
}
