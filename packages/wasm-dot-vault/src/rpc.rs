//! Chain I/O collaborators
//!
//! Two ways to reach a chain: the generic RPC relay (batched proxy requests
//! routed by the backend) and a live connection to a custom endpoint. Both
//! are supplied by the host; the vault only describes what it needs.

use crate::error::{VaultError, VaultResult};
use crate::units::parse_raw;
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::rc::Rc;
use url::Url;

/// Relay route of one proxied call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProxyRoute {
    /// JSON-RPC method ("state_getMetadata")
    Rpc,
    /// Storage query by pallet path ("assets.asset")
    ClientQuery,
    /// Pallet constant ("balances.existentialDeposit")
    Consts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyParams {
    pub method: String,
    pub params: Vec<Json>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyCall {
    pub route: ProxyRoute,
    pub params: ProxyParams,
}

/// Batched request; the relay answers with one value per call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    pub network_id: String,
    pub body: Vec<ProxyCall>,
}

impl ProxyRequest {
    /// Request with a single call
    pub fn single(network_id: &str, route: ProxyRoute, method: &str, params: Vec<Json>) -> Self {
        Self {
            network_id: network_id.to_string(),
            body: vec![ProxyCall {
                route,
                params: ProxyParams {
                    method: method.to_string(),
                    params,
                },
            }],
        }
    }
}

/// Backend relay (`sendProxyRequest`)
pub trait RpcRelay {
    fn send_proxy_request(&self, request: ProxyRequest) -> LocalBoxFuture<'_, VaultResult<Vec<Json>>>;
}

/// Send one call through the relay and return its single result
pub async fn relay_call(
    relay: &dyn RpcRelay,
    network_id: &str,
    route: ProxyRoute,
    method: &str,
    params: Vec<Json>,
) -> VaultResult<Json> {
    let request = ProxyRequest::single(network_id, route, method, params);
    relay
        .send_proxy_request(request)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| VaultError::Rpc(format!("Empty relay response for {}", method)))
}

/// Runtime version as reported by `state_getRuntimeVersion`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeVersion {
    pub spec_name: String,
    pub spec_version: u32,
    pub transaction_version: u32,
}

/// Latest block reference used for mortality
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInfo {
    pub block_hash: String,
    pub block_number: u64,
}

/// Live connection to a chain endpoint
///
/// Storage queries take a pallet path ("system.account") and JSON keys and
/// return decoded JSON values (`null` for absent entries).
pub trait ChainConnection {
    fn metadata_hex(&self) -> LocalBoxFuture<'_, VaultResult<String>>;

    fn runtime_version(&self) -> LocalBoxFuture<'_, VaultResult<RuntimeVersion>>;

    fn genesis_hash(&self) -> LocalBoxFuture<'_, VaultResult<String>>;

    /// Best block hash and number
    fn block_info(&self) -> LocalBoxFuture<'_, VaultResult<BlockInfo>>;

    /// Number in the best header
    fn best_block_number(&self) -> LocalBoxFuture<'_, VaultResult<u64>>;

    fn query<'a>(&'a self, path: &'a str, keys: Vec<Json>) -> LocalBoxFuture<'a, VaultResult<Json>>;

    /// All entries of a storage map as (keys, value)
    fn query_entries<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, VaultResult<Vec<(Vec<Json>, Json)>>>;

    fn query_multi<'a>(
        &'a self,
        path: &'a str,
        keys: Vec<Vec<Json>>,
    ) -> LocalBoxFuture<'a, VaultResult<Vec<Json>>>;

    /// Runtime API call (`api` and `method` in lower camel case) with SCALE encoded arguments
    fn call<'a>(&'a self, api: &'a str, method: &'a str, args: Vec<u8>) -> LocalBoxFuture<'a, VaultResult<Json>>;

    /// `author_submitExtrinsic`, returns the transaction hash
    fn submit_extrinsic<'a>(&'a self, raw_tx: &'a str) -> LocalBoxFuture<'a, VaultResult<String>>;

    fn disconnect(&self) -> LocalBoxFuture<'_, VaultResult<()>>;
}

/// Custom endpoint transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Http(Url),
    WebSocket(Url),
}

impl Endpoint {
    pub fn parse(url: &str) -> VaultResult<Self> {
        let parsed = Url::parse(url.trim())
            .map_err(|e| VaultError::InvalidInput(format!("Invalid rpc url {}: {}", url, e)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(Endpoint::Http(parsed)),
            "ws" | "wss" => Ok(Endpoint::WebSocket(parsed)),
            scheme => Err(VaultError::InvalidInput(format!(
                "Unsupported rpc url scheme: {}",
                scheme
            ))),
        }
    }

    pub fn url(&self) -> &Url {
        match self {
            Endpoint::Http(url) | Endpoint::WebSocket(url) => url,
        }
    }
}

/// Opens live connections
pub trait ConnectionFactory {
    fn connect(&self, endpoint: Endpoint) -> LocalBoxFuture<'_, VaultResult<Rc<dyn ChainConnection>>>;
}

/// A connection together with the endpoint URL it was opened for
#[derive(Clone)]
pub struct LiveConnection {
    pub url: String,
    pub conn: Rc<dyn ChainConnection>,
}

impl std::fmt::Debug for LiveConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveConnection").field("url", &self.url).finish()
    }
}

/// Read an integer from JSON (number, decimal string or hex string)
pub fn json_u128(value: &Json) -> Option<u128> {
    match value {
        Json::Number(n) => n.as_u64().map(u128::from),
        Json::String(s) => parse_raw(s).ok(),
        _ => None,
    }
}

/// Read a field path ("data.free") as an integer
pub fn json_field_u128(value: &Json, path: &str) -> Option<u128> {
    path.split('.')
        .try_fold(value, |current, key| current.get(key))
        .and_then(json_u128)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_parse() {
        assert!(matches!(
            Endpoint::parse("https://rpc.polkadot.io").unwrap(),
            Endpoint::Http(_)
        ));
        assert!(matches!(
            Endpoint::parse("wss://rpc.polkadot.io").unwrap(),
            Endpoint::WebSocket(_)
        ));
        assert!(Endpoint::parse("ftp://rpc.polkadot.io").is_err());
        assert!(Endpoint::parse("").is_err());
    }

    #[test]
    fn test_proxy_request_shape() {
        let request = ProxyRequest::single("dot--polkadot", ProxyRoute::ClientQuery, "assets.asset", vec![json!("1984")]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["networkId"], "dot--polkadot");
        assert_eq!(value["body"][0]["route"], "clientQuery");
        assert_eq!(value["body"][0]["params"]["method"], "assets.asset");
    }

    #[test]
    fn test_json_numbers() {
        assert_eq!(json_u128(&json!(42)), Some(42));
        assert_eq!(json_u128(&json!("0x2a")), Some(42));
        assert_eq!(json_u128(&json!("340282366920938463463374607431768211455")), Some(u128::MAX));
        assert_eq!(json_field_u128(&json!({"data": {"free": "7"}}), "data.free"), Some(7));
        assert_eq!(json_field_u128(&json!({}), "data.free"), None);
    }
}
