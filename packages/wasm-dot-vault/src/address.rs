//! SS58 address encoding and decoding for Polkadot/Substrate chains
//!
//! Uses the bs58 crate for base58 encoding, matching the Substrate ecosystem.
//! See: https://docs.substrate.io/reference/address-formats/

use crate::error::VaultError;
use blake2::{Blake2b512, Digest};

/// SS58 prefix for checksum calculation
const SS58_PREFIX: &[u8] = b"SS58PRE";

/// Raw 32-byte account identifier
pub type AccountId = [u8; 32];

/// Encode a public key to SS58 address format
///
/// # Arguments
/// * `public_key` - 32-byte public key
/// * `prefix` - Network prefix (0 for Polkadot, 2 for Kusama, 42 for generic Substrate)
pub fn encode_ss58(public_key: &[u8], prefix: u16) -> Result<String, VaultError> {
    if public_key.len() != 32 {
        return Err(VaultError::InvalidAddress(format!(
            "Public key must be 32 bytes, got {}",
            public_key.len()
        )));
    }

    let mut payload = encode_prefix(prefix)?;
    payload.extend_from_slice(public_key);

    // Checksum is the first 2 bytes of Blake2b-512("SS58PRE" || payload)
    let checksum = ss58_checksum(&payload);
    payload.extend_from_slice(&checksum[..2]);

    Ok(bs58::encode(&payload).into_string())
}

/// Decode an SS58 address to public key and prefix
pub fn decode_ss58(address: &str) -> Result<(AccountId, u16), VaultError> {
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|e| VaultError::InvalidAddress(format!("Invalid base58: {}", e)))?;

    if decoded.len() < 35 {
        return Err(VaultError::InvalidAddress("Address too short".to_string()));
    }

    let (prefix, prefix_len) = decode_prefix(&decoded)?;

    let checksum_start = decoded.len() - 2;
    let public_key = &decoded[prefix_len..checksum_start];
    let checksum = &decoded[checksum_start..];

    let account: AccountId = public_key.try_into().map_err(|_| {
        VaultError::InvalidAddress(format!("Invalid public key length: {}", public_key.len()))
    })?;

    let expected_checksum = ss58_checksum(&decoded[..checksum_start]);
    if checksum != &expected_checksum[..2] {
        return Err(VaultError::InvalidAddress("Invalid checksum".to_string()));
    }

    Ok((account, prefix))
}

/// Decode either an SS58 address or a `0x` prefixed 32-byte hex account id
///
/// When `expected_prefix` is set, SS58 input must carry that prefix.
pub fn decode_address(address: &str, expected_prefix: Option<u16>) -> Result<AccountId, VaultError> {
    if let Some(stripped) = address.strip_prefix("0x") {
        let bytes = hex::decode(stripped)?;
        return bytes.as_slice().try_into().map_err(|_| {
            VaultError::InvalidAddress(format!("Hex account must be 32 bytes, got {}", bytes.len()))
        });
    }

    let (account, prefix) = decode_ss58(address)?;
    if let Some(expected) = expected_prefix {
        if prefix != expected {
            return Err(VaultError::InvalidAddress(format!(
                "Expected prefix {}, got {}",
                expected, prefix
            )));
        }
    }
    Ok(account)
}

/// Validate an SS58 address
pub fn validate_address(address: &str, expected_prefix: Option<u16>) -> bool {
    match decode_ss58(address) {
        Ok((_, prefix)) => expected_prefix.map_or(true, |expected| prefix == expected),
        Err(_) => false,
    }
}

/// Encode SS58 prefix (supports single and two-byte prefixes)
fn encode_prefix(prefix: u16) -> Result<Vec<u8>, VaultError> {
    if prefix < 64 {
        Ok(vec![prefix as u8])
    } else if prefix < 16384 {
        let first = ((prefix & 0b0000_0000_1111_1100) as u8) >> 2 | 0b0100_0000;
        let second = ((prefix >> 8) as u8) | ((prefix & 0b0000_0000_0000_0011) as u8) << 6;
        Ok(vec![first, second])
    } else {
        Err(VaultError::InvalidAddress(format!("Invalid prefix: {}", prefix)))
    }
}

/// Decode SS58 prefix from raw bytes
fn decode_prefix(data: &[u8]) -> Result<(u16, usize), VaultError> {
    if data[0] < 64 {
        Ok((data[0] as u16, 1))
    } else if data[0] < 128 {
        if data.len() < 2 {
            return Err(VaultError::InvalidAddress(
                "Address too short for two-byte prefix".to_string(),
            ));
        }
        let lower = (data[0] & 0b0011_1111) << 2 | (data[1] >> 6);
        let upper = data[1] & 0b0011_1111;
        Ok((((upper as u16) << 8) | (lower as u16), 2))
    } else {
        Err(VaultError::InvalidAddress(format!(
            "Invalid prefix byte: {}",
            data[0]
        )))
    }
}

fn ss58_checksum(payload: &[u8]) -> [u8; 64] {
    let mut hasher = Blake2b512::new();
    hasher.update(SS58_PREFIX);
    hasher.update(payload);
    let result = hasher.finalize();
    let mut checksum = [0u8; 64];
    checksum.copy_from_slice(&result);
    checksum
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBKEY: &str = "61b18c6dc02ddcabdeac56cb4f21a971cc41cc97640f6f85b073480008c53a0d";

    #[test]
    fn test_encode_decode_roundtrip() {
        let pubkey = hex::decode(PUBKEY).unwrap();

        let address = encode_ss58(&pubkey, 42).unwrap();
        assert_eq!(address, "5EGoFA95omzemRssELLDjVenNZ68aXyUeqtKQScXSEBvVJkr");

        let (decoded_pubkey, prefix) = decode_ss58(&address).unwrap();
        assert_eq!(decoded_pubkey.to_vec(), pubkey);
        assert_eq!(prefix, 42);
    }

    #[test]
    fn test_two_byte_prefix_roundtrip() {
        let pubkey = hex::decode(PUBKEY).unwrap();
        let address = encode_ss58(&pubkey, 1284).unwrap();
        let (decoded, prefix) = decode_ss58(&address).unwrap();
        assert_eq!(decoded.to_vec(), pubkey);
        assert_eq!(prefix, 1284);
    }

    #[test]
    fn test_decode_address_accepts_hex_account() {
        let account = decode_address(&format!("0x{}", PUBKEY), Some(0)).unwrap();
        assert_eq!(hex::encode(account), PUBKEY);
    }

    #[test]
    fn test_decode_address_checks_prefix() {
        let address = "5EGoFA95omzemRssELLDjVenNZ68aXyUeqtKQScXSEBvVJkr";
        assert!(decode_address(address, Some(42)).is_ok());
        assert!(decode_address(address, Some(0)).is_err());
        assert!(decode_address(address, None).is_ok());
    }

    #[test]
    fn test_validate_address() {
        let valid = "5EGoFA95omzemRssELLDjVenNZ68aXyUeqtKQScXSEBvVJkr";
        assert!(validate_address(valid, Some(42)));
        assert!(validate_address(valid, None));
        assert!(!validate_address(valid, Some(0)));

        assert!(!validate_address("invalid", None));
    }

    #[test]
    fn test_invalid_pubkey_length() {
        assert!(encode_ss58(&[0u8; 16], 42).is_err());
    }
}
