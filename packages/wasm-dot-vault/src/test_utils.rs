//! Fixtures and in-memory collaborators for unit tests
//!
//! The runtime metadata is generated from `TypeInfo` definitions below, laid
//! out like a Polkadot runtime (System 0, Balances 5, Assets 50) so encoded
//! calls carry real pallet and call indices.

#![allow(dead_code)]

use crate::cache::{ChainMetadataCache, Clock};
use crate::codec::to_hex;
use crate::config::{CacheTtls, DeriveInfo, NetworkInfo, VaultSettings, DEFAULT_KEY};
use crate::era::{Era, DEFAULT_ERA_PERIOD};
use crate::error::{VaultError, VaultResult};
use crate::extrinsic::{signed_extensions, EXTRINSIC_VERSION};
use crate::keyring::hardware::{
    DeviceAddress, DeviceAddressRequest, DeviceResponse, DeviceSignRequest, DeviceSignature, HardwareDevice,
};
use crate::methods;
use crate::registry::ChainRegistry;
use crate::rpc::{
    BlockInfo, ChainConnection, ConnectionFactory, Endpoint, LiveConnection, ProxyRequest, ProxyRoute, RpcRelay,
    RuntimeVersion,
};
use crate::services::{AccountProfileService, CustomRpcInfo, NetworkSettingsResolver, TokenService};
use crate::types::{AccountTokenItem, EncodedTransaction, FeeCommon, FeeDot, FeeInfoUnit, GasFee, NetworkDescriptor, TokenInfo, VaultAccount};
use crate::units::format_units;
use crate::vault::{VaultCore, VaultDeps};
use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::{json, Value as Json};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Duration;

/// Ed25519 seed of the test account
pub const ALICE_SEED: [u8; 32] = [0x2a; 32];
pub const ALICE_PUBKEY: &str = "197f6b23e16c8532c6abc838facd5ea789be0c76b2920334039bfa8b3d368d61";
/// `ALICE_PUBKEY` with prefix 42
pub const ALICE: &str = "5Ce8uUJNZWQfhFkc5MexTUfESZPmewQ8MwXcFL1j4XadQAKH";
pub const BOB: &str = "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty";

pub const DERIVE_TEMPLATE: &str = "m/44'/354'/{index}'/0'/0'";
pub const ACCOUNT_PATH: &str = "m/44'/354'/0'/0'/0'";

pub const GENESIS_HASH: &str = "0x91b171bb158e2d3848fa23a9f1c25182fb8e20313b2c1eb49219da7a70ce90c3";
pub const BLOCK_HASH: &str = "0xabababababababababababababababababababababababababababababababab";
pub const BLOCK_NUMBER: u64 = 1000;
pub const SPEC_NAME: &str = "polkadot";
pub const SPEC_VERSION: u32 = 1_002_000;
pub const TX_VERSION: u32 = 26;
/// One DOT
pub const EXISTENTIAL_DEPOSIT: u128 = 10_000_000_000;
pub const SUBMITTED_HASH: &str = "0x5c3a4e0d6bb8b1f0a9e2c6d4f1e7a3b9c8d2e5f4a1b6c3d7e9f0a2b4c6d8e0f1";

pub const POLKADOT: &str = "dot--polkadot";
pub const KUSAMA_ASSET_HUB: &str = "dot--kusama-assethub";

// =============================================================================
// Runtime metadata
// =============================================================================

#[allow(non_camel_case_types)]
mod runtime {
    use scale_info::TypeInfo;

    #[derive(TypeInfo)]
    pub struct Runtime;

    #[derive(TypeInfo)]
    pub struct AccountId32(pub [u8; 32]);

    #[derive(TypeInfo)]
    pub enum MultiAddress {
        #[codec(index = 0)]
        Id(AccountId32),
        #[codec(index = 1)]
        Index(#[codec(compact)] u32),
        #[codec(index = 2)]
        Raw(Vec<u8>),
        #[codec(index = 3)]
        Address32([u8; 32]),
        #[codec(index = 4)]
        Address20([u8; 20]),
    }

    #[derive(TypeInfo)]
    pub enum MultiSignature {
        #[codec(index = 0)]
        Ed25519([u8; 64]),
        #[codec(index = 1)]
        Sr25519([u8; 64]),
        #[codec(index = 2)]
        Ecdsa([u8; 65]),
    }

    #[derive(TypeInfo)]
    pub enum SystemCall {
        #[codec(index = 0)]
        remark { remark: Vec<u8> },
    }

    #[derive(TypeInfo)]
    pub enum BalancesCall {
        #[codec(index = 0)]
        transfer_allow_death {
            dest: MultiAddress,
            #[codec(compact)]
            value: u128,
        },
        #[codec(index = 3)]
        transfer_keep_alive {
            dest: MultiAddress,
            #[codec(compact)]
            value: u128,
        },
        #[codec(index = 4)]
        transfer_all { dest: MultiAddress, keep_alive: bool },
    }

    #[derive(TypeInfo)]
    pub enum AssetsCall {
        #[codec(index = 8)]
        transfer {
            #[codec(compact)]
            id: u32,
            target: MultiAddress,
            #[codec(compact)]
            amount: u128,
        },
        #[codec(index = 9)]
        transfer_keep_alive {
            #[codec(compact)]
            id: u32,
            target: MultiAddress,
            #[codec(compact)]
            amount: u128,
        },
    }

    #[derive(TypeInfo)]
    pub enum RuntimeCall {
        #[codec(index = 0)]
        System(SystemCall),
        #[codec(index = 5)]
        Balances(BalancesCall),
        #[codec(index = 50)]
        Assets(AssetsCall),
    }

    #[derive(TypeInfo)]
    pub enum RuntimeEvent {
        #[codec(index = 0)]
        System,
    }

    #[derive(TypeInfo)]
    pub enum RuntimeError {
        #[codec(index = 0)]
        System,
    }
}

const EXTENSIONS: &[&str] = &[
    "CheckNonZeroSender",
    "CheckSpecVersion",
    "CheckTxVersion",
    "CheckGenesis",
    "CheckMortality",
    "CheckNonce",
    "CheckWeight",
    "ChargeTransactionPayment",
    "CheckMetadataHash",
];

fn pallet(
    name: &'static str,
    index: u8,
    calls: scale_info::MetaType,
    constants: Vec<frame_metadata::v15::PalletConstantMetadata>,
) -> frame_metadata::v15::PalletMetadata {
    frame_metadata::v15::PalletMetadata {
        name,
        storage: None,
        calls: Some(frame_metadata::v15::PalletCallMetadata { ty: calls }),
        event: None,
        constants,
        error: None,
        index,
        docs: vec![],
    }
}

/// SCALE encoded `RuntimeMetadataPrefixed` as returned by `state_getMetadata`
pub fn test_metadata_hex() -> String {
    use frame_metadata::v15::{
        CustomMetadata, ExtrinsicMetadata, OuterEnums, PalletConstantMetadata, RuntimeMetadataV15,
        SignedExtensionMetadata,
    };
    use frame_metadata::RuntimeMetadataPrefixed;
    use parity_scale_codec::Encode;
    use runtime::*;
    use scale_info::meta_type;

    let existential_deposit = PalletConstantMetadata {
        name: "ExistentialDeposit",
        ty: meta_type::<u128>(),
        value: EXISTENTIAL_DEPOSIT.encode(),
        docs: vec![],
    };
    let pallets = vec![
        pallet("System", 0, meta_type::<SystemCall>(), vec![]),
        pallet("Balances", 5, meta_type::<BalancesCall>(), vec![existential_deposit]),
        pallet("Assets", 50, meta_type::<AssetsCall>(), vec![]),
    ];
    let extrinsic = ExtrinsicMetadata {
        version: EXTRINSIC_VERSION,
        address_ty: meta_type::<MultiAddress>(),
        call_ty: meta_type::<RuntimeCall>(),
        signature_ty: meta_type::<MultiSignature>(),
        extra_ty: meta_type::<()>(),
        signed_extensions: EXTENSIONS
            .iter()
            .map(|&identifier| SignedExtensionMetadata {
                identifier,
                ty: meta_type::<()>(),
                additional_signed: meta_type::<()>(),
            })
            .collect(),
    };
    let outer_enums = OuterEnums {
        call_enum_ty: meta_type::<RuntimeCall>(),
        event_enum_ty: meta_type::<RuntimeEvent>(),
        error_enum_ty: meta_type::<RuntimeError>(),
    };
    let metadata = RuntimeMetadataV15::new(
        pallets,
        extrinsic,
        meta_type::<Runtime>(),
        vec![],
        outer_enums,
        CustomMetadata { map: BTreeMap::new() },
    );
    to_hex(&RuntimeMetadataPrefixed::from(metadata).encode())
}

pub fn test_registry() -> ChainRegistry {
    ChainRegistry::from_metadata_hex(&test_metadata_hex(), SPEC_NAME, SPEC_VERSION).unwrap()
}

/// 1.5 DOT from ALICE to BOB, keep-alive, at the fixture block
pub fn encoded_transfer(registry: &ChainRegistry) -> EncodedTransaction {
    let payload = methods::balances_transfer(BOB, 15_000_000_000, true).unwrap();
    let method = registry.encode_call(&payload).unwrap();
    EncodedTransaction {
        address: ALICE.to_string(),
        block_hash: BLOCK_HASH.to_string(),
        block_number: BLOCK_NUMBER,
        era: Era::mortal(DEFAULT_ERA_PERIOD, BLOCK_NUMBER).to_hex(),
        genesis_hash: GENESIS_HASH.to_string(),
        metadata_rpc: String::new(),
        method: to_hex(&method),
        nonce: 0,
        spec_version: SPEC_VERSION,
        tip: 0,
        transaction_version: TX_VERSION,
        signed_extensions: signed_extensions(registry),
        version: EXTRINSIC_VERSION,
        spec_name: SPEC_NAME.to_string(),
        chain_name: "Polkadot".to_string(),
        fee_info: None,
        is_from_dapp: false,
    }
}

/// DOT fee of `gas_limit` raw units, with an optional extra tip in DOT
pub fn fee_info(gas_limit: &str, extra_tip: &str) -> FeeInfoUnit {
    FeeInfoUnit {
        common: FeeCommon {
            fee_decimals: 10,
            fee_symbol: "DOT".to_string(),
            native_decimals: 10,
            native_symbol: "DOT".to_string(),
            base_fee: None,
        },
        gas: Some(GasFee {
            gas_price: "0.0000000001".to_string(),
            gas_limit: gas_limit.to_string(),
            gas_limit_for_display: None,
        }),
        fee_dot: (!extra_tip.is_empty()).then(|| FeeDot {
            extra_tip_in_dot: extra_tip.to_string(),
        }),
    }
}

// =============================================================================
// Async helpers
// =============================================================================

#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<u64>,
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        self.now_ms.set(self.now_ms.get() + by.as_millis() as u64);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

/// Pending on first poll, ready on the second
#[derive(Debug, Default)]
pub struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

pub fn live_connection(conn: Rc<MockConnection>) -> LiveConnection {
    LiveConnection {
        url: "wss://mock.example".to_string(),
        conn,
    }
}

// =============================================================================
// Chain I/O
// =============================================================================

/// Relay answering like a Polkadot node behind the backend proxy
pub struct MockRelay {
    calls: RefCell<Vec<String>>,
    /// Fail the next proxied call
    pub fail_next: Cell<bool>,
    pub existential_deposit: Cell<u128>,
}

impl Default for MockRelay {
    fn default() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_next: Cell::new(false),
            existential_deposit: Cell::new(EXISTENTIAL_DEPOSIT),
        }
    }
}

impl MockRelay {
    pub fn count(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|m| *m == method).count()
    }

    fn respond(&self, route: ProxyRoute, method: &str, params: &[Json]) -> VaultResult<Json> {
        let value = match (route, method) {
            (ProxyRoute::Rpc, "state_getMetadata") => json!(test_metadata_hex()),
            (ProxyRoute::Rpc, "state_getRuntimeVersion") => json!({
                "specName": SPEC_NAME,
                "specVersion": SPEC_VERSION,
                "transactionVersion": TX_VERSION,
            }),
            (ProxyRoute::Rpc, "chain_getBlockHash") if params.is_empty() => json!(BLOCK_HASH),
            (ProxyRoute::Rpc, "chain_getBlockHash") => json!(GENESIS_HASH),
            (ProxyRoute::Rpc, "chain_getBlock") => json!({
                "block": { "header": { "number": format!("0x{:x}", BLOCK_NUMBER) } }
            }),
            (ProxyRoute::Rpc, "author_submitExtrinsic") => json!(SUBMITTED_HASH),
            (ProxyRoute::ClientQuery, "assets.asset") => match params.first().and_then(Json::as_str) {
                Some("1984") => json!({ "minBalance": "70000" }),
                _ => Json::Null,
            },
            (ProxyRoute::Consts, "balances.existentialDeposit") => {
                json!(self.existential_deposit.get().to_string())
            }
            _ => return Err(VaultError::Rpc(format!("Unexpected relay call {}", method))),
        };
        Ok(value)
    }
}

impl RpcRelay for MockRelay {
    fn send_proxy_request(&self, request: ProxyRequest) -> LocalBoxFuture<'_, VaultResult<Vec<Json>>> {
        async move {
            let mut results = Vec::with_capacity(request.body.len());
            for call in &request.body {
                self.calls.borrow_mut().push(call.params.method.clone());
                if self.fail_next.replace(false) {
                    return Err(VaultError::Rpc("relay unavailable".to_string()));
                }
                YieldOnce::default().await;
                results.push(self.respond(call.route, &call.params.method, &call.params.params)?);
            }
            Ok(results)
        }
        .boxed_local()
    }
}

/// Scripted custom endpoint
#[derive(Default)]
pub struct MockConnection {
    calls: RefCell<Vec<String>>,
    storage: RefCell<HashMap<String, Json>>,
    entries: RefCell<HashMap<String, Vec<(Vec<Json>, Json)>>>,
    multi: RefCell<HashMap<String, Vec<Json>>>,
    runtime_calls: RefCell<HashMap<String, Json>>,
    last_call_args: RefCell<Vec<u8>>,
    latency: RefCell<Option<(Rc<ManualClock>, u64)>>,
    submitted: RefCell<Vec<String>>,
}

fn storage_key(path: &str, keys: &Json) -> String {
    format!("{}:{}", path, keys)
}

impl MockConnection {
    pub fn count(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|c| *c == name).count()
    }

    fn record(&self, name: &str) {
        self.calls.borrow_mut().push(name.to_string());
    }

    /// Value of a storage entry; `keys` is a JSON array
    pub fn set_storage(&self, path: &str, keys: Json, value: Json) {
        self.storage.borrow_mut().insert(storage_key(path, &keys), value);
    }

    pub fn set_entries(&self, path: &str, entries: Vec<(Vec<Json>, Json)>) {
        self.entries.borrow_mut().insert(path.to_string(), entries);
    }

    /// Values returned by `query_multi`, in key order
    pub fn set_multi(&self, path: &str, values: Vec<Json>) {
        self.multi.borrow_mut().insert(path.to_string(), values);
    }

    /// Result of a runtime API method
    pub fn set_call(&self, method: &str, result: Json) {
        self.runtime_calls.borrow_mut().insert(method.to_string(), result);
    }

    pub fn last_call_args(&self) -> Vec<u8> {
        self.last_call_args.borrow().clone()
    }

    /// Advance `clock` by `ms` whenever the best header is fetched
    pub fn set_latency_ms(&self, clock: Rc<ManualClock>, ms: u64) {
        *self.latency.borrow_mut() = Some((clock, ms));
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.borrow().clone()
    }

    fn lookup(&self, path: &str, keys: Vec<Json>) -> Json {
        self.storage
            .borrow()
            .get(&storage_key(path, &Json::Array(keys)))
            .cloned()
            .unwrap_or(Json::Null)
    }
}

impl ChainConnection for MockConnection {
    fn metadata_hex(&self) -> LocalBoxFuture<'_, VaultResult<String>> {
        self.record("metadata_hex");
        async { Ok(test_metadata_hex()) }.boxed_local()
    }

    fn runtime_version(&self) -> LocalBoxFuture<'_, VaultResult<RuntimeVersion>> {
        self.record("runtime_version");
        async {
            Ok(RuntimeVersion {
                spec_name: SPEC_NAME.to_string(),
                spec_version: SPEC_VERSION,
                transaction_version: TX_VERSION,
            })
        }
        .boxed_local()
    }

    fn genesis_hash(&self) -> LocalBoxFuture<'_, VaultResult<String>> {
        self.record("genesis_hash");
        async { Ok(GENESIS_HASH.to_string()) }.boxed_local()
    }

    fn block_info(&self) -> LocalBoxFuture<'_, VaultResult<BlockInfo>> {
        self.record("block_info");
        async {
            Ok(BlockInfo {
                block_hash: BLOCK_HASH.to_string(),
                block_number: BLOCK_NUMBER,
            })
        }
        .boxed_local()
    }

    fn best_block_number(&self) -> LocalBoxFuture<'_, VaultResult<u64>> {
        self.record("best_block_number");
        async move {
            if let Some((clock, ms)) = self.latency.borrow().as_ref() {
                clock.advance(Duration::from_millis(*ms));
            }
            Ok(BLOCK_NUMBER)
        }
        .boxed_local()
    }

    fn query<'a>(&'a self, path: &'a str, keys: Vec<Json>) -> LocalBoxFuture<'a, VaultResult<Json>> {
        self.record("query");
        async move { Ok(self.lookup(path, keys)) }.boxed_local()
    }

    fn query_entries<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, VaultResult<Vec<(Vec<Json>, Json)>>> {
        self.record("query_entries");
        async move { Ok(self.entries.borrow().get(path).cloned().unwrap_or_default()) }.boxed_local()
    }

    fn query_multi<'a>(
        &'a self,
        path: &'a str,
        keys: Vec<Vec<Json>>,
    ) -> LocalBoxFuture<'a, VaultResult<Vec<Json>>> {
        self.record("query_multi");
        async move {
            if let Some(values) = self.multi.borrow().get(path) {
                return Ok(values.clone());
            }
            Ok(keys.into_iter().map(|k| self.lookup(path, k)).collect())
        }
        .boxed_local()
    }

    fn call<'a>(&'a self, api: &'a str, method: &'a str, args: Vec<u8>) -> LocalBoxFuture<'a, VaultResult<Json>> {
        self.record(method);
        async move {
            *self.last_call_args.borrow_mut() = args;
            self.runtime_calls
                .borrow()
                .get(method)
                .cloned()
                .ok_or_else(|| VaultError::Rpc(format!("{}_{} unavailable", api, method)))
        }
        .boxed_local()
    }

    fn submit_extrinsic<'a>(&'a self, raw_tx: &'a str) -> LocalBoxFuture<'a, VaultResult<String>> {
        self.record("submit_extrinsic");
        async move {
            self.submitted.borrow_mut().push(raw_tx.to_string());
            Ok(SUBMITTED_HASH.to_string())
        }
        .boxed_local()
    }

    fn disconnect(&self) -> LocalBoxFuture<'_, VaultResult<()>> {
        self.record("disconnect");
        async { Ok(()) }.boxed_local()
    }
}

/// Hands out the same connection for every endpoint
pub struct MockConnectionFactory {
    connection: Rc<MockConnection>,
    pub connects: Cell<usize>,
}

impl ConnectionFactory for MockConnectionFactory {
    fn connect(&self, _endpoint: Endpoint) -> LocalBoxFuture<'_, VaultResult<Rc<dyn ChainConnection>>> {
        async move {
            YieldOnce::default().await;
            self.connects.set(self.connects.get() + 1);
            let conn: Rc<dyn ChainConnection> = self.connection.clone();
            Ok(conn)
        }
        .boxed_local()
    }
}

// =============================================================================
// Wallet services
// =============================================================================

#[derive(Default)]
pub struct MockSettingsResolver {
    pub custom_rpc: RefCell<Option<CustomRpcInfo>>,
}

impl NetworkSettingsResolver for MockSettingsResolver {
    fn get_network<'a>(&'a self, network_id: &'a str) -> LocalBoxFuture<'a, VaultResult<NetworkDescriptor>> {
        async move {
            let (name, symbol, decimals) = match network_id {
                POLKADOT => ("Polkadot", "DOT", 10),
                KUSAMA_ASSET_HUB => ("Kusama Asset Hub", "KSM", 12),
                other => return Err(VaultError::Internal(format!("Unknown network {}", other))),
            };
            Ok(NetworkDescriptor {
                id: network_id.to_string(),
                name: name.to_string(),
                shortname: symbol.to_string(),
                symbol: symbol.to_string(),
                decimals,
                logo_uri: String::new(),
            })
        }
        .boxed_local()
    }

    fn get_vault_settings<'a>(&'a self, _network_id: &'a str) -> LocalBoxFuture<'a, VaultResult<VaultSettings>> {
        async {
            let derive = DeriveInfo {
                template: DERIVE_TEMPLATE.to_string(),
                coin_type: "354".to_string(),
                label: None,
            };
            let network_info = |native: &str| NetworkInfo {
                address_prefix: 42,
                native_token_address: native.to_string(),
            };
            Ok(VaultSettings {
                impl_name: "dot".to_string(),
                coin_type: "354".to_string(),
                account_derive_info: HashMap::from([(DEFAULT_KEY.to_string(), derive)]),
                network_info: HashMap::from([
                    (DEFAULT_KEY.to_string(), network_info("DOT")),
                    (KUSAMA_ASSET_HUB.to_string(), network_info("KSM")),
                ]),
                sign_only_full_tx_required: false,
            })
        }
        .boxed_local()
    }

    fn get_custom_rpc_for_network<'a>(
        &'a self,
        _network_id: &'a str,
    ) -> LocalBoxFuture<'a, VaultResult<Option<CustomRpcInfo>>> {
        async move { Ok(self.custom_rpc.borrow().clone()) }.boxed_local()
    }
}

/// Knows DOT, KSM and USDt (asset 1984)
#[derive(Default)]
pub struct MockTokenService {
    pub balances: RefCell<HashMap<String, u128>>,
}

fn known_token(token_id: &str) -> Option<TokenInfo> {
    let (name, symbol, decimals, is_native) = match token_id {
        "DOT" => ("Polkadot", "DOT", 10, true),
        "KSM" => ("Kusama", "KSM", 12, true),
        "1984" => ("Tether USD", "USDt", 6, false),
        _ => return None,
    };
    Some(TokenInfo {
        address: token_id.to_string(),
        decimals,
        name: name.to_string(),
        symbol: symbol.to_string(),
        logo_uri: None,
        is_native,
        unique_key: None,
    })
}

impl TokenService for MockTokenService {
    fn get_token<'a>(
        &'a self,
        _account_id: &'a str,
        _network_id: &'a str,
        token_id_on_network: &'a str,
    ) -> LocalBoxFuture<'a, VaultResult<Option<TokenInfo>>> {
        async move { Ok(known_token(token_id_on_network)) }.boxed_local()
    }

    fn fetch_account_token<'a>(
        &'a self,
        _network_id: &'a str,
        _account_address: &'a str,
        token_address: &'a str,
    ) -> LocalBoxFuture<'a, VaultResult<Option<AccountTokenItem>>> {
        async move {
            let Some(info) = known_token(token_address) else {
                return Ok(None);
            };
            let balance = self.balances.borrow().get(token_address).copied().unwrap_or(0);
            Ok(Some(AccountTokenItem {
                balance: balance.to_string(),
                balance_parsed: format_units(balance, info.decimals),
                fiat_value: "0".to_string(),
                frozen_balance: None,
                info,
            }))
        }
        .boxed_local()
    }
}

#[derive(Default)]
pub struct MockProfile {
    balances: RefCell<HashMap<String, u128>>,
}

impl MockProfile {
    pub fn set_balance(&self, address: &str, balance: u128) {
        self.balances.borrow_mut().insert(address.to_string(), balance);
    }
}

impl AccountProfileService for MockProfile {
    fn fetch_account_balance<'a>(
        &'a self,
        _account_id: &'a str,
        _network_id: &'a str,
        address: &'a str,
    ) -> LocalBoxFuture<'a, VaultResult<u128>> {
        async move { Ok(self.balances.borrow().get(address).copied().unwrap_or(0)) }.boxed_local()
    }
}

/// Device that knows one key and signs with a fixed signature
#[derive(Default)]
pub struct MockDevice {
    pub address_requests: RefCell<Vec<DeviceAddressRequest>>,
    pub sign_requests: RefCell<Vec<DeviceSignRequest>>,
    pub reject: Cell<bool>,
}

impl HardwareDevice for MockDevice {
    fn get_addresses(
        &self,
        requests: Vec<DeviceAddressRequest>,
    ) -> LocalBoxFuture<'_, DeviceResponse<Vec<DeviceAddress>>> {
        self.address_requests.borrow_mut().extend(requests.iter().cloned());
        let addresses = requests
            .into_iter()
            .map(|request| DeviceAddress {
                path: request.path,
                address: None,
                public_key: format!("0x{}", ALICE_PUBKEY),
            })
            .collect();
        async move { DeviceResponse::Success(addresses) }.boxed_local()
    }

    fn sign_transaction(&self, request: DeviceSignRequest) -> LocalBoxFuture<'_, DeviceResponse<DeviceSignature>> {
        self.sign_requests.borrow_mut().push(request);
        let response = if self.reject.get() {
            DeviceResponse::Failure {
                code: Some(803),
                error: "Action cancelled by user".to_string(),
            }
        } else {
            DeviceResponse::Success(DeviceSignature {
                signature: hex::encode([0x11u8; 64]),
            })
        };
        async move { response }.boxed_local()
    }
}

// =============================================================================
// Harness
// =============================================================================

/// A vault for ALICE wired to in-memory collaborators
pub struct Harness {
    pub relay: Rc<MockRelay>,
    pub connection: Rc<MockConnection>,
    pub factory: Rc<MockConnectionFactory>,
    pub settings: Rc<MockSettingsResolver>,
    pub tokens: Rc<MockTokenService>,
    pub profile: Rc<MockProfile>,
    pub clock: Rc<ManualClock>,
    vault: VaultCore,
}

impl Harness {
    pub fn new(network_id: &str) -> Self {
        let relay = Rc::new(MockRelay::default());
        let connection = Rc::new(MockConnection::default());
        let factory = Rc::new(MockConnectionFactory {
            connection: connection.clone(),
            connects: Cell::new(0),
        });
        let settings = Rc::new(MockSettingsResolver::default());
        let tokens = Rc::new(MockTokenService::default());
        let profile = Rc::new(MockProfile::default());
        let clock = Rc::new(ManualClock::default());

        let deps = VaultDeps {
            relay: relay.clone(),
            connections: factory.clone(),
            settings: settings.clone(),
            tokens: tokens.clone(),
            profile: profile.clone(),
            chain_cache: ChainMetadataCache::new(relay.clone(), clock.clone(), CacheTtls::default()),
            clock: clock.clone(),
            ttls: CacheTtls::default(),
        };
        let account = VaultAccount {
            id: "hd-1--m/44'/354'/0'/0'/0'".to_string(),
            address: ALICE.to_string(),
            pub_key: Some(ALICE_PUBKEY.to_string()),
            path: ACCOUNT_PATH.to_string(),
        };
        Self {
            vault: VaultCore::new(network_id, account, deps),
            relay,
            connection,
            factory,
            settings,
            tokens,
            profile,
            clock,
        }
    }

    pub fn polkadot() -> Self {
        Self::new(POLKADOT)
    }

    pub fn asset_hub() -> Self {
        Self::new(KUSAMA_ASSET_HUB)
    }

    /// Configure a custom endpoint for the network
    pub fn with_custom_rpc(self, url: &str) -> Self {
        *self.settings.custom_rpc.borrow_mut() = Some(CustomRpcInfo {
            rpc: url.to_string(),
            is_custom_network: true,
        });
        self
    }

    pub fn vault(&self) -> &VaultCore {
        &self.vault
    }
}
