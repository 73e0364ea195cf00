//! Call payloads for the pallets the vault transfers through
//!
//! Payloads are built with the subxt dynamic API and encoded against the
//! registry of the target runtime, so pallet and call indices always come
//! from live metadata.

use crate::address::decode_address;
use crate::error::{VaultError, VaultResult};
use crate::registry::ChainRegistry;
use subxt_core::{
    ext::scale_value::{Composite, Value},
    tx::payload::{dynamic, DynamicPayload},
};

// =============================================================================
// Balances pallet
// =============================================================================

/// `balances.transfer_keep_alive` or `balances.transfer_allow_death`
pub fn balances_transfer(to: &str, amount: u128, keep_alive: bool) -> VaultResult<DynamicPayload> {
    let method = if keep_alive {
        "transfer_keep_alive"
    } else {
        "transfer_allow_death"
    };
    balances(method, to, amount)
}

/// Native transfer resolved against the runtime: older runtimes only expose `transfer`
pub fn native_transfer_for(
    registry: &ChainRegistry,
    to: &str,
    amount: u128,
    keep_alive: bool,
) -> VaultResult<Vec<u8>> {
    let payload = if !keep_alive
        && !registry.has_call("Balances", "transfer_allow_death")
        && registry.has_call("Balances", "transfer")
    {
        balances("transfer", to, amount)?
    } else {
        balances_transfer(to, amount, keep_alive)?
    };
    registry.encode_call(&payload)
}

/// `balances.transfer_all`
pub fn transfer_all(to: &str, keep_alive: bool) -> VaultResult<DynamicPayload> {
    Ok(dynamic(
        "Balances",
        "transfer_all",
        named([
            ("dest", multi_address(to)?),
            ("keep_alive", Value::bool(keep_alive)),
        ]),
    ))
}

fn balances(method: &str, to: &str, amount: u128) -> VaultResult<DynamicPayload> {
    Ok(dynamic(
        "Balances",
        method,
        named([("dest", multi_address(to)?), ("value", Value::u128(amount))]),
    ))
}

// =============================================================================
// Assets pallet
// =============================================================================

/// `assets.transfer_keep_alive` or `assets.transfer`
pub fn assets_transfer(asset_id: u32, to: &str, amount: u128, keep_alive: bool) -> VaultResult<DynamicPayload> {
    let method = if keep_alive {
        "transfer_keep_alive"
    } else {
        "transfer"
    };
    Ok(dynamic(
        "Assets",
        method,
        named([
            ("id", Value::u128(asset_id as u128)),
            ("target", multi_address(to)?),
            ("amount", Value::u128(amount)),
        ]),
    ))
}

/// Parse a token address into an asset id
pub fn parse_asset_id(address: &str) -> VaultResult<u32> {
    address
        .trim()
        .parse()
        .map_err(|_| VaultError::InvalidInput(format!("Invalid asset id: {}", address)))
}

// =============================================================================
// Helpers
// =============================================================================

fn named<const N: usize>(fields: [(&str, Value<()>); N]) -> Composite<()> {
    Composite::Named(
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

/// SS58 (or 0x account id) to `MultiAddress::Id`
fn multi_address(address: &str) -> VaultResult<Value<()>> {
    let account = decode_address(address, None)?;
    Ok(Value::unnamed_variant("Id", [Value::from_bytes(account)]))
}
