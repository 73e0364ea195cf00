//! In-memory Ed25519 keys

use super::SigningAuthority;
use crate::error::{VaultError, VaultResult};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use std::collections::HashMap;

/// Signing keys by derivation path
///
/// Keys are supplied already derived; the wallet owns derivation and storage.
#[derive(Default)]
pub struct Ed25519Authority {
    keys: HashMap<String, SigningKey>,
}

impl Ed25519Authority {
    pub fn from_seeds<I, P>(seeds: I) -> Self
    where
        I: IntoIterator<Item = (P, [u8; 32])>,
        P: Into<String>,
    {
        let keys = seeds
            .into_iter()
            .map(|(path, seed)| (path.into(), SigningKey::from_bytes(&seed)))
            .collect();
        Self { keys }
    }

    pub fn insert(&mut self, path: impl Into<String>, seed: [u8; 32]) {
        self.keys.insert(path.into(), SigningKey::from_bytes(&seed));
    }

    fn key(&self, path: &str) -> VaultResult<&SigningKey> {
        self.keys
            .get(path)
            .ok_or_else(|| VaultError::Internal(format!("No key for path {}", path)))
    }
}

impl std::fmt::Debug for Ed25519Authority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Authority")
            .field("paths", &self.keys.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl SigningAuthority for Ed25519Authority {
    fn public_key(&self, path: &str) -> VaultResult<[u8; 32]> {
        Ok(self.key(path)?.verifying_key().to_bytes())
    }

    fn sign(&self, path: &str, message: &[u8]) -> VaultResult<[u8; 64]> {
        Ok(self.key(path)?.sign(message).to_bytes())
    }
}

/// Check a raw Ed25519 signature
pub fn verify(public_key: &[u8; 32], message: &[u8], signature: &[u8]) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let Ok(signature) = ed25519_dalek::Signature::from_slice(signature) else {
        return false;
    };
    key.verify(message, &signature).is_ok()
}
