//! BIP39 mnemonic generation and wallet seed derivation.
//!
//! Generates a 24-word mnemonic (256-bit entropy) and derives the wallet's
//! 32-byte deterministic seed from it. The seed itself then feeds the
//! wallet's deterministic key derivation (`BLAKE2b(seed || index)`, see
//! `wallet_core::keys`) rather than a BIP44 HD path — this crate's job ends
//! at producing a recoverable 32-byte seed from a human-readable phrase.

use bip39::Mnemonic;
use thiserror::Error;

use crate::hash::blake2b_256;

/// Errors arising from mnemonic operations.
#[derive(Debug, Error)]
pub enum MnemonicError {
    #[error("invalid mnemonic phrase: {0}")]
    InvalidMnemonic(String),
}

/// Generate a new 24-word BIP39 mnemonic from 256-bit entropy.
pub fn generate_mnemonic() -> Result<String, MnemonicError> {
    let mut entropy = [0u8; 32];
    rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut entropy);
    let mnemonic = Mnemonic::from_entropy(&entropy)
        .map_err(|e| MnemonicError::InvalidMnemonic(e.to_string()))?;
    Ok(mnemonic.to_string())
}

/// Derive the wallet's 32-byte deterministic seed from a mnemonic phrase.
///
/// The BIP39 seed (PBKDF2-HMAC-SHA512 with "mnemonic" as salt, 2048 rounds)
/// is 64 bytes; we fold it down to 32 with Blake2b rather than truncating,
/// so every bit of the BIP39 seed contributes to the wallet seed.
pub fn seed_from_mnemonic(mnemonic: &str) -> Result<[u8; 32], MnemonicError> {
    let mnemonic = Mnemonic::parse_normalized(mnemonic)
        .map_err(|e| MnemonicError::InvalidMnemonic(e.to_string()))?;
    let bip39_seed = mnemonic.to_seed_normalized("");
    Ok(blake2b_256(&bip39_seed))
}

/// Validate that a mnemonic phrase is a valid BIP39 mnemonic.
pub fn validate_mnemonic(mnemonic: &str) -> bool {
    Mnemonic::parse_normalized(mnemonic).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_24_words() {
        let mnemonic = generate_mnemonic().unwrap();
        let words: Vec<&str> = mnemonic.split_whitespace().collect();
        assert_eq!(words.len(), 24);
    }

    #[test]
    fn generated_mnemonic_is_valid() {
        let mnemonic = generate_mnemonic().unwrap();
        assert!(validate_mnemonic(&mnemonic));
    }

    #[test]
    fn seed_from_mnemonic_deterministic() {
        let mnemonic = generate_mnemonic().unwrap();
        let s1 = seed_from_mnemonic(&mnemonic).unwrap();
        let s2 = seed_from_mnemonic(&mnemonic).unwrap();
        assert_eq!(s1, s2);
    }

    #[test]
    fn different_mnemonics_produce_different_seeds() {
        let m1 = generate_mnemonic().unwrap();
        let m2 = generate_mnemonic().unwrap();
        assert_ne!(m1, m2);
        assert_ne!(
            seed_from_mnemonic(&m1).unwrap(),
            seed_from_mnemonic(&m2).unwrap()
        );
    }

    #[test]
    fn invalid_mnemonic_rejected() {
        assert!(!validate_mnemonic("not a valid mnemonic phrase"));
        assert!(!validate_mnemonic(""));
    }

    #[test]
    fn seed_from_invalid_mnemonic_fails() {
        let result = seed_from_mnemonic("invalid words here");
        assert!(result.is_err());
    }

    #[test]
    fn known_mnemonic_produces_consistent_seed() {
        let mnemonic = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon art";
        assert!(validate_mnemonic(mnemonic));
        let s1 = seed_from_mnemonic(mnemonic).unwrap();
        let s2 = seed_from_mnemonic(mnemonic).unwrap();
        assert_eq!(s1, s2);
    }
}
