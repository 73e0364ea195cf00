//! Extrinsic payload and signed transaction serialization
//!
//! Both the signing payload and the signed extrinsic are laid out from the
//! runtime's signed-extension list, so the bytes follow whatever extensions
//! the target chain declares.

use crate::address::{decode_address, AccountId};
use crate::codec::{blake2_256, from_hex, parse_hash, to_hex};
use crate::era::Era;
use crate::error::{VaultError, VaultResult};
use crate::registry::ChainRegistry;
use crate::types::EncodedTransaction;
use parity_scale_codec::{Compact, Encode};

/// Extrinsic format version emitted for signed transactions
pub const EXTRINSIC_VERSION: u8 = 4;

/// Payloads longer than this are hashed before signing
const MAX_UNHASHED_PAYLOAD: usize = 256;

/// MultiSignature type prefixes
pub mod signature_type {
    pub const ED25519: u8 = 0x00;
    pub const SR25519: u8 = 0x01;
    pub const ECDSA: u8 = 0x02;
}

/// Fields of the transaction the signed extensions encode
struct ExtensionInput {
    era: Era,
    nonce: u64,
    tip: u128,
    spec_version: u32,
    transaction_version: u32,
    genesis_hash: [u8; 32],
    block_hash: [u8; 32],
}

impl ExtensionInput {
    fn from_tx(tx: &EncodedTransaction) -> VaultResult<Self> {
        Ok(Self {
            era: Era::from_hex(&tx.era)?,
            nonce: tx.nonce,
            tip: tx.tip,
            spec_version: tx.spec_version,
            transaction_version: tx.transaction_version,
            genesis_hash: parse_hash(&tx.genesis_hash)?,
            block_hash: parse_hash(&tx.block_hash)?,
        })
    }

    /// Bytes an extension contributes to the extrinsic body
    fn encode_extra(&self, identifier: &str, out: &mut Vec<u8>) {
        match identifier {
            "CheckMortality" | "CheckEra" => out.extend(self.era.encode()),
            "CheckNonce" => Compact(self.nonce).encode_to(out),
            "ChargeTransactionPayment" => Compact(self.tip).encode_to(out),
            "ChargeAssetTxPayment" => {
                Compact(self.tip).encode_to(out);
                // fee asset: None
                out.push(0x00);
            }
            // mode: disabled
            "CheckMetadataHash" => out.push(0x00),
            _ => {}
        }
    }

    /// Implicit data an extension adds to the signing payload
    fn encode_additional(&self, identifier: &str, out: &mut Vec<u8>) {
        match identifier {
            "CheckSpecVersion" => self.spec_version.encode_to(out),
            "CheckTxVersion" => self.transaction_version.encode_to(out),
            "CheckGenesis" => out.extend_from_slice(&self.genesis_hash),
            "CheckMortality" | "CheckEra" => {
                if self.era.is_immortal() {
                    out.extend_from_slice(&self.genesis_hash);
                } else {
                    out.extend_from_slice(&self.block_hash);
                }
            }
            // metadata hash: None
            "CheckMetadataHash" => out.push(0x00),
            _ => {}
        }
    }
}

/// Extensions with no extra or additional bytes
const EMPTY_EXTENSIONS: &[&str] = &[
    "CheckNonZeroSender",
    "CheckWeight",
    "PrevalidateAttests",
    "StorageWeightReclaim",
];

const KNOWN_EXTENSIONS: &[&str] = &[
    "CheckSpecVersion",
    "CheckTxVersion",
    "CheckGenesis",
    "CheckMortality",
    "CheckEra",
    "CheckNonce",
    "ChargeTransactionPayment",
    "ChargeAssetTxPayment",
    "CheckMetadataHash",
];

fn extension_ids(registry: &ChainRegistry) -> Vec<String> {
    registry
        .metadata()
        .extrinsic()
        .signed_extensions()
        .iter()
        .map(|ext| ext.identifier().to_string())
        .collect()
}

/// Signed extension identifiers declared by the runtime, in order
pub fn signed_extensions(registry: &ChainRegistry) -> Vec<String> {
    let ids = extension_ids(registry);
    for id in &ids {
        if !KNOWN_EXTENSIONS.contains(&id.as_str()) && !EMPTY_EXTENSIONS.contains(&id.as_str()) {
            tracing::warn!(extension = %id, "Unknown signed extension, encoding as empty");
        }
    }
    ids
}

/// Raw signing payload: call, extras, additional signed data
///
/// This is what hardware devices receive; use [`payload_to_sign`] for the
/// bytes a key actually signs.
pub fn signing_payload(tx: &EncodedTransaction, registry: &ChainRegistry) -> VaultResult<Vec<u8>> {
    let input = ExtensionInput::from_tx(tx)?;
    let extensions = extension_ids(registry);

    let mut payload = from_hex(&tx.method)?;
    for id in &extensions {
        input.encode_extra(id, &mut payload);
    }
    for id in &extensions {
        input.encode_additional(id, &mut payload);
    }
    Ok(payload)
}

/// Bytes to sign: the payload, or its Blake2-256 hash when longer than 256 bytes
pub fn payload_to_sign(payload: Vec<u8>) -> Vec<u8> {
    if payload.len() > MAX_UNHASHED_PAYLOAD {
        blake2_256(&payload).to_vec()
    } else {
        payload
    }
}

/// Serialize a signed v4 extrinsic
///
/// `signature` is a MultiSignature: type prefix followed by the raw signature.
pub fn serialize_signed(
    tx: &EncodedTransaction,
    registry: &ChainRegistry,
    signature: &[u8],
) -> VaultResult<Vec<u8>> {
    check_signature(signature)?;
    let signer: AccountId = decode_address(&tx.address, None)?;
    let input = ExtensionInput::from_tx(tx)?;

    let mut body = vec![0x80 | EXTRINSIC_VERSION];

    // Signer (MultiAddress::Id)
    body.push(0x00);
    body.extend_from_slice(&signer);

    body.extend_from_slice(signature);

    for id in extension_ids(registry) {
        input.encode_extra(&id, &mut body);
    }

    body.extend(from_hex(&tx.method)?);

    let mut result = Compact(body.len() as u32).encode();
    result.extend(body);
    Ok(result)
}

/// Transaction id: Blake2-256 of the signed extrinsic
pub fn tx_id(signed: &[u8]) -> String {
    to_hex(&blake2_256(signed))
}

fn check_signature(signature: &[u8]) -> VaultResult<()> {
    let expected = match signature.first() {
        Some(&signature_type::ED25519) | Some(&signature_type::SR25519) => 65,
        Some(&signature_type::ECDSA) => 66,
        Some(other) => {
            return Err(VaultError::InvalidTransaction(format!(
                "Unsupported signature type: {}",
                other
            )))
        }
        None => return Err(VaultError::InvalidTransaction("Empty signature".to_string())),
    };
    if signature.len() != expected {
        return Err(VaultError::InvalidTransaction(format!(
            "Signature must be {} bytes, got {}",
            expected,
            signature.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{encoded_transfer, test_registry, ALICE_PUBKEY, GENESIS_HASH};

    #[test]
    fn test_signed_extensions_order() {
        let registry = test_registry();
        assert_eq!(
            signed_extensions(&registry),
            vec![
                "CheckNonZeroSender",
                "CheckSpecVersion",
                "CheckTxVersion",
                "CheckGenesis",
                "CheckMortality",
                "CheckNonce",
                "CheckWeight",
                "ChargeTransactionPayment",
                "CheckMetadataHash",
            ]
        );
    }

    #[test]
    fn test_signing_payload_layout() {
        let registry = test_registry();
        let tx = encoded_transfer(&registry);
        let method = from_hex(&tx.method).unwrap();

        let payload = signing_payload(&tx, &registry).unwrap();
        assert!(payload.starts_with(&method));

        let extra = &payload[method.len()..];
        // era(2) nonce(1) tip(1) mode(1)
        assert_eq!(&extra[..2], &Era::from_hex(&tx.era).unwrap().encode()[..]);
        assert_eq!(extra[2], 0x00);
        assert_eq!(extra[3], 0x00);
        assert_eq!(extra[4], 0x00);

        let additional = &extra[5..];
        assert_eq!(&additional[..4], &tx.spec_version.to_le_bytes());
        assert_eq!(&additional[4..8], &tx.transaction_version.to_le_bytes());
        assert_eq!(to_hex(&additional[8..40]), GENESIS_HASH);
        assert_eq!(to_hex(&additional[40..72]), tx.block_hash);
        assert_eq!(additional[72], 0x00);
        assert_eq!(additional.len(), 73);
    }

    #[test]
    fn test_payload_hashing_threshold() {
        assert_eq!(payload_to_sign(vec![1u8; 256]).len(), 256);
        assert_eq!(payload_to_sign(vec![1u8; 257]).len(), 32);
    }

    #[test]
    fn test_serialize_signed() {
        let registry = test_registry();
        let tx = encoded_transfer(&registry);
        let mut signature = vec![signature_type::ED25519];
        signature.extend_from_slice(&[0x42; 64]);

        let signed = serialize_signed(&tx, &registry, &signature).unwrap();
        let method = from_hex(&tx.method).unwrap();
        let body_len = 1 + 33 + 65 + 2 + 1 + 1 + 1 + method.len();

        // compact length prefix (two-byte mode for 64..16383)
        let prefix = Compact(body_len as u32).encode();
        assert_eq!(&signed[..prefix.len()], &prefix[..]);
        let body = &signed[prefix.len()..];
        assert_eq!(body[0], 0x84);
        assert_eq!(body[1], 0x00);
        assert_eq!(hex::encode(&body[2..34]), ALICE_PUBKEY);
        assert!(body.ends_with(&method));
        assert_eq!(tx_id(&signed).len(), 66);
    }

    #[test]
    fn test_serialize_rejects_bad_signature() {
        let registry = test_registry();
        let tx = encoded_transfer(&registry);
        assert!(serialize_signed(&tx, &registry, &[0x00; 64]).is_err());
        assert!(serialize_signed(&tx, &registry, &[0x07; 65]).is_err());
    }
}
