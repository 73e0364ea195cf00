//! Shared types for DOT vault transactions

use crate::codec::hex_number;
use crate::error::VaultError;
use crate::units::{parse_raw, parse_units};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Network as supplied by the network settings resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    /// Network id ("dot--polkadot", "dot--kusama-assethub")
    pub id: String,
    /// Chain display name ("Polkadot")
    pub name: String,
    #[serde(default)]
    pub shortname: String,
    pub symbol: String,
    pub decimals: u32,
    #[serde(default)]
    pub logo_uri: String,
}

impl NetworkDescriptor {
    /// Chain id: the part after the `--` separator ("dot--polkadot" -> "polkadot")
    pub fn chain_id(&self) -> &str {
        chain_id_of(&self.id)
    }
}

/// Split a network id into its chain id
pub fn chain_id_of(network_id: &str) -> &str {
    network_id
        .split_once("--")
        .map(|(_, chain_id)| chain_id)
        .unwrap_or(network_id)
}

/// Account the vault operates on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultAccount {
    pub id: String,
    /// SS58 address on this network
    pub address: String,
    /// Hex public key, when known
    #[serde(default)]
    pub pub_key: Option<String>,
    /// Derivation path ("m/44'/354'/0'/0'/0'")
    #[serde(default)]
    pub path: String,
}

/// Token descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    /// Token id on network (asset id for the assets pallet, native token address otherwise)
    pub address: String,
    pub decimals: u32,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub logo_uri: Option<String>,
    #[serde(default)]
    pub is_native: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_key: Option<String>,
}

/// Fee fields shared by every fee model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeCommon {
    pub fee_decimals: u32,
    pub fee_symbol: String,
    pub native_decimals: u32,
    pub native_symbol: String,
    #[serde(default)]
    pub base_fee: Option<String>,
}

/// Gas-limit-only fee (gas price is one raw unit expressed in display units)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasFee {
    pub gas_price: String,
    pub gas_limit: String,
    #[serde(default)]
    pub gas_limit_for_display: Option<String>,
}

/// DOT specific fee extras
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeDot {
    /// Extra tip in display units
    pub extra_tip_in_dot: String,
}

/// Fee selected by the user, attached to an unsigned transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeInfoUnit {
    pub common: FeeCommon,
    #[serde(default)]
    pub gas: Option<GasFee>,
    #[serde(default)]
    pub fee_dot: Option<FeeDot>,
}

impl FeeInfoUnit {
    /// Fee in raw units: gasLimit × gasPrice (+ baseFee) shifted by fee decimals
    pub fn total_raw(&self, include_base_fee: bool) -> Result<u128, VaultError> {
        let decimals = self.common.fee_decimals;
        let gas = match &self.gas {
            Some(gas) => {
                let limit = parse_raw(&gas.gas_limit)?;
                let price = parse_units(&gas.gas_price, decimals)?;
                limit.saturating_mul(price)
            }
            None => 0,
        };
        let base = match (&self.common.base_fee, include_base_fee) {
            (Some(base_fee), true) if !base_fee.is_empty() => parse_units(base_fee, decimals)?,
            _ => 0,
        };
        Ok(gas.saturating_add(base))
    }

    /// Extra tip in raw units (user tip shifted by fee decimals)
    pub fn extra_tip_raw(&self) -> Result<u128, VaultError> {
        match &self.fee_dot {
            Some(fee_dot) if !fee_dot.extra_tip_in_dot.is_empty() => {
                parse_units(&fee_dot.extra_tip_in_dot, self.common.fee_decimals)
            }
            _ => Ok(0),
        }
    }
}

/// Unsigned transaction payload passed between build, update, estimate and sign
///
/// Numeric fields travel as left-padded hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedTransaction {
    /// Sender SS58 address
    pub address: String,
    pub block_hash: String,
    #[serde(with = "hex_number")]
    pub block_number: u64,
    /// Hex encoded era
    pub era: String,
    pub genesis_hash: String,
    /// Metadata blob; emptied after build, resolved from cache when needed
    #[serde(default)]
    pub metadata_rpc: String,
    /// Hex encoded call data (pallet index, call index, arguments)
    pub method: String,
    #[serde(with = "hex_number")]
    pub nonce: u64,
    #[serde(with = "hex_number")]
    pub spec_version: u32,
    #[serde(with = "hex_number")]
    pub tip: u128,
    #[serde(with = "hex_number")]
    pub transaction_version: u32,
    #[serde(default)]
    pub signed_extensions: Vec<String>,
    pub version: u8,
    pub spec_name: String,
    #[serde(default)]
    pub chain_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_info: Option<FeeInfoUnit>,
    #[serde(default)]
    pub is_from_dapp: bool,
}

/// Unsigned transaction with its selected fee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    pub encoded_tx: EncodedTransaction,
    #[serde(default)]
    pub fee_info: Option<FeeInfoUnit>,
}

/// Terminal state of the lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    /// Blake2-256 of the signed extrinsic, or the id returned by broadcast
    pub txid: String,
    /// Hex encoded signed extrinsic
    pub raw_tx: String,
    pub encoded_tx: EncodedTransaction,
    /// Hex encoded MultiSignature (type byte + signature)
    pub signature: String,
}

/// Classified action of a decoded transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    AssetTransfer,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Send,
    Receive,
    #[serde(rename = "self")]
    SelfSend,
    Other,
}

impl Direction {
    /// Direction of a transfer relative to `owner`
    pub fn of_transfer(owner: &str, from: &str, to: &str) -> Self {
        match (from == owner, to == owner) {
            (true, true) => Direction::SelfSend,
            (true, false) => Direction::Send,
            (false, true) => Direction::Receive,
            (false, false) => Direction::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

/// One transferred asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInfo {
    pub from: String,
    pub to: String,
    /// Amount in display units
    pub amount: String,
    pub icon: String,
    pub name: String,
    pub symbol: String,
    pub token_id_on_network: String,
    pub is_nft: bool,
    pub is_native: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransferAction {
    pub from: String,
    pub to: String,
    pub sends: Vec<TransferInfo>,
    pub receives: Vec<TransferInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownAction {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedTxAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_transfer: Option<AssetTransferAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_action: Option<UnknownAction>,
}

/// Display model of an unsigned transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedTransaction {
    pub txid: String,
    pub owner: String,
    pub signer: String,
    pub nonce: u64,
    pub actions: Vec<DecodedTxAction>,
    pub status: TxStatus,
    pub network_id: String,
    pub account_id: String,
    #[serde(default)]
    pub fee_info: Option<FeeInfoUnit>,
    pub encoded_tx: EncodedTransaction,
}

/// Address forms of an account on one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAddressDetail {
    pub network_id: String,
    pub normalized_address: String,
    pub display_address: String,
    pub address: String,
    pub base_address: String,
    pub is_valid: bool,
    pub allow_empty_address: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressValidation {
    pub is_valid: bool,
    pub normalized_address: String,
    pub display_address: String,
}

/// `system.account` summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetails {
    pub address: String,
    pub balance: String,
    pub balance_parsed: String,
    pub frozen_balance: String,
    pub nonce: u64,
}

/// Token with the account's balance in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountTokenItem {
    pub info: TokenInfo,
    /// Raw balance
    pub balance: String,
    pub balance_parsed: String,
    pub fiat_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen_balance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenFiat {
    pub price: u32,
    pub price24h: u32,
    pub balance: String,
    pub balance_parsed: String,
    pub fiat_value: String,
}

/// Token list entry, keyed into [`TokenData::map`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountToken {
    #[serde(rename = "$key")]
    pub key: String,
    #[serde(flatten)]
    pub info: TokenInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub map: BTreeMap<String, TokenFiat>,
    pub data: Vec<AccountToken>,
    /// Fingerprint of keys and entries, changes whenever the list does
    pub keys: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListResponse {
    pub tokens: TokenData,
    pub risk_tokens: TokenData,
    pub small_balance_tokens: TokenData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeData {
    pub extra_tip: String,
}

/// Fee estimate in the gas-limit-only model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateFeeResponse {
    #[serde(rename = "isEIP1559")]
    pub is_eip1559: bool,
    pub fee_decimals: u32,
    pub fee_symbol: String,
    pub native_decimals: u32,
    pub native_symbol: String,
    pub base_fee: String,
    pub gas: Vec<GasFee>,
    pub fee_data: Vec<FeeData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRpcStatus {
    /// Milliseconds taken to fetch the best header
    pub response_time: u64,
    pub best_block_number: u64,
}
