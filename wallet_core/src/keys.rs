//! Key generation, deterministic derivation, and import/export helpers.

use bln_crypto::blake2b_256;
use bln_types::{KeyPair, PrivateKey};

use crate::error::WalletError;

/// Generate a new random key pair (used for ad-hoc wallet keys).
pub fn generate_keypair() -> KeyPair {
    bln_crypto::generate_keypair()
}

/// Derive a deterministic private key from a wallet seed and an index.
///
/// `private = BLAKE2b(seed || index_be32)`, matching the wallet's
/// deterministic-key row scheme (see `keystore::Keystore`).
pub fn deterministic_private_key(seed: &[u8; 32], index: u32) -> PrivateKey {
    let mut input = [0u8; 36];
    input[0..32].copy_from_slice(seed);
    input[32..36].copy_from_slice(&index.to_be_bytes());
    PrivateKey(blake2b_256(&input))
}

/// Export a private key as bytes (for backup).
pub fn export_private_key(key: &PrivateKey) -> Vec<u8> {
    key.0.to_vec()
}

/// Import a private key from bytes (for restoration).
pub fn import_private_key(bytes: &[u8]) -> Result<PrivateKey, WalletError> {
    if bytes.len() != 32 {
        return Err(WalletError::Key(format!(
            "private key must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    let mut key_bytes = [0u8; 32];
    key_bytes.copy_from_slice(bytes);
    Ok(PrivateKey(key_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_keypair_has_valid_lengths() {
        let kp = generate_keypair();
        assert_eq!(kp.public.as_bytes().len(), 32);
        assert_eq!(kp.private.0.len(), 32);
    }

    #[test]
    fn generated_keypairs_are_unique() {
        let kp1 = generate_keypair();
        let kp2 = generate_keypair();
        assert_ne!(kp1.public.as_bytes(), kp2.public.as_bytes());
    }

    #[test]
    fn deterministic_derivation_is_stable() {
        let seed = [7u8; 32];
        let a = deterministic_private_key(&seed, 0);
        let b = deterministic_private_key(&seed, 0);
        assert_eq!(a.0, b.0);
    }

    #[test]
    fn deterministic_derivation_varies_by_index() {
        let seed = [7u8; 32];
        let a = deterministic_private_key(&seed, 0);
        let b = deterministic_private_key(&seed, 1);
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn deterministic_derivation_varies_by_seed() {
        let a = deterministic_private_key(&[1u8; 32], 0);
        let b = deterministic_private_key(&[2u8; 32], 0);
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn export_import_roundtrip() {
        let original = PrivateKey([42u8; 32]);
        let exported = export_private_key(&original);
        let imported = import_private_key(&exported).unwrap();
        assert_eq!(original.0, imported.0);
    }

    #[test]
    fn import_rejects_wrong_length() {
        assert!(import_private_key(&[0u8; 16]).is_err());
        assert!(import_private_key(&[0u8; 64]).is_err());
    }
}
