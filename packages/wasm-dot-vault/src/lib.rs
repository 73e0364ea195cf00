//! wasm-dot-vault: Polkadot-family transaction vault
//!
//! This crate provides:
//! - Runtime metadata caching with in-flight request coalescing
//! - Transaction building, fee estimation, decoding and signing for DOT and
//!   Asset Hub tokens
//! - Account, balance and token list lookups over a relay or a custom endpoint
//! - Keyrings for HD, imported, hardware and watch-only wallets
//!
//! # Architecture
//!
//! The crate follows a two-layer architecture:
//! - **Core layer** (`src/*.rs`): Pure Rust logic, no WASM dependencies
//! - **WASM layer** (`src/wasm/*.rs`): Thin wrappers with `#[wasm_bindgen]`
//!   over the stateless helpers
//!
//! Network access, settings, token data and hardware devices are host
//! collaborators behind the traits in [`rpc`], [`services`] and [`keyring`].
//! [`VaultCore`] needs those collaborators, so it is driven from Rust hosts
//! only and has no `#[wasm_bindgen]` export.

pub mod address;
pub mod cache;
pub mod codec;
pub mod config;
pub mod era;
pub mod error;
pub mod extrinsic;
pub mod keyring;
pub mod methods;
pub mod registry;
pub mod rpc;
pub mod services;
pub mod strategy;
pub mod types;
pub mod units;
pub mod vault;
pub mod wasm;

#[cfg(test)]
mod test_utils;

// Re-export main types for convenience
pub use address::{decode_ss58, encode_ss58, validate_address};
pub use cache::{CacheName, ChainMetadataCache, Clock, SystemClock};
pub use config::{CacheTtls, VaultSettings};
pub use error::{VaultError, VaultResult};
pub use keyring::{keyring_for, KeyringBackends, KeyringStrategy, WalletType};
pub use registry::ChainRegistry;
pub use types::{EncodedTransaction, SignedTransaction, UnsignedTransaction};
pub use vault::{VaultCore, VaultDeps};
