//! Balances and token lists read straight from the custom endpoint

use super::VaultCore;
use crate::codec::{blake2_256, to_hex};
use crate::error::{VaultError, VaultResult};
use crate::rpc::json_field_u128;
use crate::strategy::{TokenDetailContext, TokenListContext};
use crate::types::{
    AccountDetails, AccountToken, AccountTokenItem, TokenData, TokenFiat, TokenInfo, TokenListResponse,
};
use crate::units::format_units;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListParams {
    pub account_address: String,
    /// Token addresses to leave out
    #[serde(default)]
    pub hidden_tokens: Vec<String>,
}

fn fiat(item: &AccountTokenItem) -> f64 {
    item.fiat_value.parse().unwrap_or(0.0)
}

// Native first, then by fiat value, descending
fn by_native_then_fiat(a: &AccountTokenItem, b: &AccountTokenItem) -> Ordering {
    b.info
        .is_native
        .cmp(&a.info.is_native)
        .then_with(|| fiat(b).partial_cmp(&fiat(a)).unwrap_or(Ordering::Equal))
}

impl VaultCore {
    /// Nonce, free and frozen balance from `system.account`
    pub async fn fetch_account_details_by_rpc(&self, account_address: &str) -> VaultResult<AccountDetails> {
        let live = self.require_connection().await?;
        let account = live.conn.query("system.account", vec![json!(account_address)]).await?;
        let network = self.network().await?;

        let balance = json_field_u128(&account, "data.free").unwrap_or(0);
        let frozen = json_field_u128(&account, "data.frozen").unwrap_or(0);
        let nonce = json_field_u128(&account, "nonce").unwrap_or(0) as u64;
        Ok(AccountDetails {
            address: account_address.to_string(),
            balance: balance.to_string(),
            balance_parsed: format_units(balance, network.decimals),
            frozen_balance: frozen.to_string(),
            nonce,
        })
    }

    /// Balances of the listed tokens; unknown tokens are left out
    pub async fn fetch_token_details_by_rpc(
        &self,
        account_address: &str,
        contracts: &[String],
    ) -> VaultResult<Vec<AccountTokenItem>> {
        let network_info = self.network_info().await?;
        let conn = self.custom_connection().await?;
        let items = futures::future::try_join_all(contracts.iter().map(|contract| {
            let native = *contract == network_info.native_token_address;
            let conn = conn.as_ref();
            async move {
                if native {
                    return self.native_token_item(account_address).await.map(Some);
                }
                let ctx = TokenDetailContext {
                    vault: self,
                    contract,
                    account_address,
                    conn,
                };
                self.strategy().fetch_token_detail_by_rpc(ctx).await
            }
        }))
        .await?;
        Ok(items.into_iter().flatten().collect())
    }

    async fn native_token_item(&self, account_address: &str) -> VaultResult<AccountTokenItem> {
        let network = self.network().await?;
        let network_info = self.network_info().await?;
        let details = self.fetch_account_details_by_rpc(account_address).await?;
        Ok(AccountTokenItem {
            info: TokenInfo {
                address: network_info.native_token_address,
                decimals: network.decimals,
                name: network.shortname,
                symbol: network.symbol,
                logo_uri: Some(network.logo_uri),
                is_native: true,
                unique_key: None,
            },
            balance: details.balance,
            balance_parsed: details.balance_parsed,
            fiat_value: "0".to_string(),
            frozen_balance: Some(details.frozen_balance),
        })
    }

    /// Native token followed by whatever the strategy enumerates
    pub async fn fetch_token_list_by_rpc(&self, params: &TokenListParams) -> VaultResult<TokenListResponse> {
        let live = self.require_connection().await?;
        let network_info = self.network_info().await?;
        let address = params.account_address.as_str();

        let mut items = self
            .fetch_token_details_by_rpc(address, &[network_info.native_token_address.clone()])
            .await?;
        if items.is_empty() {
            return Err(VaultError::Internal("Native token details unavailable".to_string()));
        }
        let ctx = TokenListContext {
            vault: self,
            conn: &live,
            account_address: address,
        };
        items.extend(self.strategy().fetch_additional_account_tokens(ctx).await?);

        let hidden: HashSet<&str> = params.hidden_tokens.iter().map(String::as_str).collect();
        items.sort_by(by_native_then_fiat);
        items.retain(|item| !hidden.contains(item.info.address.as_str()));
        let mut seen = HashSet::new();
        items.retain(|item| seen.insert(item.info.address.clone()));

        tracing::debug!(network_id = %self.network_id, count = items.len(), "Fetched token list");
        Ok(TokenListResponse {
            tokens: token_data(&self.network_id, address, &items)?,
            risk_tokens: token_data(&self.network_id, address, &[])?,
            small_balance_tokens: token_data(&self.network_id, address, &[])?,
        })
    }
}

/// Keyed token list with a fingerprint of its content
fn token_data(network_id: &str, account_address: &str, items: &[AccountTokenItem]) -> VaultResult<TokenData> {
    let mut map = BTreeMap::new();
    let mut data = Vec::with_capacity(items.len());
    for item in items {
        let id = item.info.unique_key.as_deref().unwrap_or(&item.info.address);
        let key = format!("{}_{}_{}", network_id, account_address, id);
        map.insert(
            key.clone(),
            TokenFiat {
                price: 0,
                price24h: 0,
                balance: item.balance.clone(),
                balance_parsed: item.balance_parsed.clone(),
                fiat_value: "0".to_string(),
            },
        );
        data.push(AccountToken {
            key,
            info: TokenInfo {
                unique_key: None,
                ..item.info.clone()
            },
        });
    }

    // Entries carry no explicit order and no fiat value yet
    data.sort_by(|a, b| b.info.is_native.cmp(&a.info.is_native));

    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    let fingerprint = format!("{}__{}__{}", network_id, keys.join(","), serde_json::to_string(&data)?);
    Ok(TokenData {
        keys: to_hex(&blake2_256(fingerprint.as_bytes())),
        map,
        data,
    })
}
