//! Hex and hashing helpers shared by the encoders

use crate::error::VaultError;
use blake2::{digest::consts::U32, Blake2b, Digest};

/// Hex-encode a number, left-padded to an even number of digits ("0x05", "0x0100")
pub fn hexlify_padded(value: u128) -> String {
    let digits = format!("{:x}", value);
    if digits.len() % 2 == 1 {
        format!("0x0{}", digits)
    } else {
        format!("0x{}", digits)
    }
}

/// Encode bytes as `0x` prefixed hex
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode hex with or without `0x` prefix
pub fn from_hex(value: &str) -> Result<Vec<u8>, VaultError> {
    let value = value.strip_prefix("0x").unwrap_or(value);
    Ok(hex::decode(value)?)
}

/// Parse hex string to 32-byte hash
pub fn parse_hash(value: &str) -> Result<[u8; 32], VaultError> {
    let bytes = from_hex(value)?;
    bytes.as_slice().try_into().map_err(|_| {
        VaultError::InvalidInput(format!("Hash must be 32 bytes, got {}", bytes.len()))
    })
}

/// Blake2-256 hash
pub fn blake2_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Serde adapter storing integers as padded hex strings
///
/// Deserialization also accepts JSON numbers and decimal strings, since
/// dApp-supplied payloads use both.
pub mod hex_number {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Copy + Into<u128>,
    {
        serializer.serialize_str(&super::hexlify_padded((*value).into()))
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<u128>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NumberOrString {
            Number(u64),
            String(String),
        }

        let value = match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => n as u128,
            NumberOrString::String(s) if s.is_empty() => 0,
            NumberOrString::String(s) => crate::units::parse_raw(&s).map_err(de::Error::custom)?,
        };
        T::try_from(value).map_err(|_| de::Error::custom("number out of range"))
    }
}
