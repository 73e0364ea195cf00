//! Error types for wasm-dot-vault

use thiserror::Error;
use wasm_bindgen::prelude::*;

/// Message keys the UI layer localizes. Only the key travels with the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    /// "Recipient needs at least {amount} {unit} to be activated"
    RecipientActivate,
    /// "Balance after sending must stay above {amount} {symbol}"
    BalanceLowerMinimum,
    /// "Incorrect token address"
    IncorrectTokenAddress,
}

impl MessageKey {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKey::RecipientActivate => "form__amount_recipient_activate",
            MessageKey::BalanceLowerMinimum => "msg__balance_lower_minimum",
            MessageKey::IncorrectTokenAddress => "send__engine_incorrect_token_address",
        }
    }
}

/// Human-readable minimum attached to balance errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinimumInfo {
    /// Minimum in display units (e.g. "0.0000000001")
    pub amount: String,
    /// Token symbol
    pub symbol: String,
}

/// Failure reported by a hardware device
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Device error{}: {message}", .code.map(|c| format!(" ({})", c)).unwrap_or_default())]
pub struct DeviceError {
    pub code: Option<i64>,
    pub message: String,
}

/// Main error type for wasm-dot-vault operations
///
/// `Clone` is required: results of coalesced cache fetches are handed to
/// every waiting caller.
#[derive(Debug, Clone, Error)]
pub enum VaultError {
    /// Caller precondition failed (missing recipient, missing RPC url)
    #[error("Local error: {0}")]
    Local(String),
    /// Required dependency or state missing
    #[error("Internal error: {0}")]
    Internal(String),
    /// Internal failure the UI reports with a localized message
    #[error("Internal error: {message}")]
    InternalKeyed { key: MessageKey, message: String },
    /// Balance would drop (or stay) below the chain minimum
    #[error("Balance below minimum: {} {}", .info.amount, .info.symbol)]
    BalanceBelowMinimum { key: MessageKey, info: MinimumInfo },
    /// Transfer value could not be used
    #[error("Invalid transfer value: {0}")]
    InvalidTransferValue(String),
    /// Signing device failure
    #[error(transparent)]
    Device(#[from] DeviceError),
    /// Invalid SS58 address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    /// Invalid transaction format
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    /// SCALE codec decode error
    #[error("SCALE decode error: {0}")]
    ScaleDecode(String),
    /// Metadata could not be used
    #[error("Metadata error: {0}")]
    Metadata(String),
    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// RPC relay or connection failure
    #[error("RPC error: {0}")]
    Rpc(String),
    /// Operation is not available for this keyring
    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

impl VaultError {
    /// Localized message key, for errors that carry one
    pub fn message_key(&self) -> Option<MessageKey> {
        match self {
            VaultError::BalanceBelowMinimum { key, .. } | VaultError::InternalKeyed { key, .. } => Some(*key),
            _ => None,
        }
    }
}

impl From<parity_scale_codec::Error> for VaultError {
    fn from(err: parity_scale_codec::Error) -> Self {
        VaultError::ScaleDecode(err.to_string())
    }
}

impl From<hex::FromHexError> for VaultError {
    fn from(err: hex::FromHexError) -> Self {
        VaultError::InvalidInput(format!("Invalid hex: {}", err))
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        VaultError::InvalidInput(format!("Invalid JSON: {}", err))
    }
}

// REQUIRED: Converts to JS Error with stack trace
impl From<VaultError> for JsValue {
    fn from(err: VaultError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

pub type VaultResult<T> = Result<T, VaultError>;
