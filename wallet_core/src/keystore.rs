//! Multi-slot wallet key store.
//!
//! One `KeystoreFile` holds everything a wallet needs to recover its keys:
//! a password-wrapped `wallet_key` used to encrypt everything else, a
//! deterministic seed for indexed key derivation, and a map of imported
//! ("ad-hoc") keys. This mirrors the teacher's original single-key
//! Argon2id + AEAD file, generalized to the multi-key, multi-account shape
//! a wallet process actually needs: CTR keystreams instead of an AEAD tag
//! (`wallet_key` itself is the thing under password protection, not each
//! individual plaintext), and a deterministic index so new accounts don't
//! need a round trip to generate and encrypt a fresh random key each time.

use aes::cipher::{KeyIvInit, StreamCipher};
use aes::Aes256;
use argon2::{Algorithm, Argon2, Params, Version};
use ctr::Ctr128BE;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use bln_crypto::blake2b_256;
use bln_types::{Account, PrivateKey, PublicKey};

use crate::error::WalletError;
use crate::keys::deterministic_private_key;

type Aes256Ctr = Ctr128BE<Aes256>;

const ARGON2_MEMORY_KIB: u32 = 65536;
const ARGON2_ITERATIONS: u32 = 3;
const ARGON2_PARALLELISM: u32 = 1;
const CURRENT_VERSION: u32 = 1;

/// A wallet's persisted key material. Serializes directly to/from JSON.
///
/// `wallet_key_ciphertext` and `seed_ciphertext` are meaningless without
/// the password; `check` lets [`attempt_password`] verify a candidate
/// password without ever decrypting the seed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeystoreFile {
    pub version: u32,
    pub salt: String,
    pub wallet_key_ciphertext: String,
    pub check: String,
    pub representative: Option<String>,
    pub seed_ciphertext: String,
    pub deterministic_index: u32,
    /// account address (hex pubkey form) -> hex ciphertext of the private key.
    pub adhoc_keys: HashMap<String, String>,
    /// account addresses with no private key material at all.
    pub watch_only: Vec<String>,
}

/// The wallet key recovered from a successful [`attempt_password`] call.
/// Callers hold this for the lifetime of an unlocked session; it is never
/// itself persisted.
#[derive(Clone)]
pub struct WalletKey(pub [u8; 32]);

fn ctr_crypt(key: &[u8; 32], iv: &[u8; 16], data: &mut [u8]) {
    let mut cipher = Aes256Ctr::new(key.into(), iv.into());
    cipher.apply_keystream(data);
}

fn iv_for(label: &[u8]) -> [u8; 16] {
    let full = blake2b_256(label);
    let mut iv = [0u8; 16];
    iv.copy_from_slice(&full[0..16]);
    iv
}

fn derive_password_key(password: &str, salt: &[u8; 32]) -> Result<[u8; 32], WalletError> {
    let params = Params::new(
        ARGON2_MEMORY_KIB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
        Some(32),
    )
    .map_err(|e| WalletError::Key(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let mut output = [0u8; 32];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut output)
        .map_err(|e| WalletError::Key(format!("argon2 hashing failed: {e}")))?;
    Ok(output)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(s: &str) -> Result<Vec<u8>, WalletError> {
    if s.len() % 2 != 0 {
        return Err(WalletError::Key("odd-length hex string".into()));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|e| WalletError::Key(format!("invalid hex at {i}: {e}")))
        })
        .collect()
}

fn hex32(s: &str) -> Result<[u8; 32], WalletError> {
    let v = hex_decode(s)?;
    v.try_into()
        .map_err(|v: Vec<u8>| WalletError::Key(format!("expected 32 bytes, got {}", v.len())))
}

impl KeystoreFile {
    /// Create a fresh keystore, locked under `password`. Returns the file
    /// plus the plaintext seed (the caller derives the first account from
    /// it and should drop it as soon as it's no longer needed).
    pub fn create(password: &str) -> Result<(Self, [u8; 32]), WalletError> {
        let mut rng = rand::thread_rng();

        let mut salt = [0u8; 32];
        rng.fill_bytes(&mut salt);

        let mut wallet_key = [0u8; 32];
        rng.fill_bytes(&mut wallet_key);

        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);

        let password_key = derive_password_key(password, &salt)?;

        let mut wallet_key_ct = wallet_key;
        ctr_crypt(&password_key, &iv_for(b"wallet_key"), &mut wallet_key_ct);

        let mut check = [0u8; 32];
        ctr_crypt(&wallet_key, &iv_for(b"check"), &mut check);

        let mut seed_ct = seed;
        ctr_crypt(&wallet_key, &iv_for(b"seed"), &mut seed_ct);

        let file = KeystoreFile {
            version: CURRENT_VERSION,
            salt: hex_encode(&salt),
            wallet_key_ciphertext: hex_encode(&wallet_key_ct),
            check: hex_encode(&check),
            representative: None,
            seed_ciphertext: hex_encode(&seed_ct),
            deterministic_index: 0,
            adhoc_keys: HashMap::new(),
            watch_only: Vec::new(),
        };

        Ok((file, seed))
    }

    /// Derive a candidate `wallet_key` from `password` and verify it
    /// against the stored `check` value without ever touching the seed.
    pub fn attempt_password(&self, password: &str) -> Result<WalletKey, WalletError> {
        if self.version != CURRENT_VERSION {
            return Err(WalletError::Key(format!(
                "unsupported keystore version: {}",
                self.version
            )));
        }
        let salt = hex32(&self.salt)?;
        let password_key = derive_password_key(password, &salt)?;

        let mut wallet_key = hex32(&self.wallet_key_ciphertext)?;
        ctr_crypt(&password_key, &iv_for(b"wallet_key"), &mut wallet_key);

        let mut candidate_check = [0u8; 32];
        ctr_crypt(&wallet_key, &iv_for(b"check"), &mut candidate_check);

        let stored_check = hex32(&self.check)?;
        if candidate_check != stored_check {
            return Err(WalletError::WalletLocked);
        }
        Ok(WalletKey(wallet_key))
    }

    /// Re-encrypt `wallet_key` under a new password. The wallet key itself
    /// (and therefore every value encrypted under it) is unchanged.
    pub fn rekey(&mut self, wallet_key: &WalletKey, new_password: &str) -> Result<(), WalletError> {
        let mut rng = rand::thread_rng();
        let mut new_salt = [0u8; 32];
        rng.fill_bytes(&mut new_salt);

        let new_password_key = derive_password_key(new_password, &new_salt)?;
        let mut wallet_key_ct = wallet_key.0;
        ctr_crypt(&new_password_key, &iv_for(b"wallet_key"), &mut wallet_key_ct);

        self.salt = hex_encode(&new_salt);
        self.wallet_key_ciphertext = hex_encode(&wallet_key_ct);
        Ok(())
    }

    /// Decrypt the deterministic seed. Requires the unlocked `wallet_key`.
    pub fn seed(&self, wallet_key: &WalletKey) -> Result<[u8; 32], WalletError> {
        let mut seed = hex32(&self.seed_ciphertext)?;
        ctr_crypt(&wallet_key.0, &iv_for(b"seed"), &mut seed);
        Ok(seed)
    }

    /// Derive the next deterministic key and advance `deterministic_index`.
    pub fn next_deterministic_key(
        &mut self,
        wallet_key: &WalletKey,
    ) -> Result<(PrivateKey, u32), WalletError> {
        let seed = self.seed(wallet_key)?;
        let index = self.deterministic_index;
        self.deterministic_index = self
            .deterministic_index
            .checked_add(1)
            .ok_or_else(|| WalletError::Other("deterministic index exhausted".into()))?;
        Ok((deterministic_private_key(&seed, index), index))
    }

    /// Re-derive a previously issued deterministic key by its index.
    pub fn deterministic_key_at(
        &self,
        wallet_key: &WalletKey,
        index: u32,
    ) -> Result<PrivateKey, WalletError> {
        let seed = self.seed(wallet_key)?;
        Ok(deterministic_private_key(&seed, index))
    }

    /// Import an ad-hoc private key, encrypted under `wallet_key` with an
    /// IV derived from its own public key.
    pub fn insert_adhoc_key(
        &mut self,
        wallet_key: &WalletKey,
        public: &PublicKey,
        private: &PrivateKey,
    ) -> String {
        let pub_hex = hex_encode(public.as_bytes());
        let mut ct = private.0;
        ctr_crypt(&wallet_key.0, &iv_for(public.as_bytes()), &mut ct);
        self.adhoc_keys.insert(pub_hex.clone(), hex_encode(&ct));
        pub_hex
    }

    /// Decrypt a previously imported ad-hoc key.
    pub fn adhoc_key(&self, wallet_key: &WalletKey, public: &PublicKey) -> Result<PrivateKey, WalletError> {
        let pub_hex = hex_encode(public.as_bytes());
        let ct_hex = self
            .adhoc_keys
            .get(&pub_hex)
            .ok_or_else(|| WalletError::Key("no ad-hoc key for this account".into()))?;
        let mut private = hex32(ct_hex)?;
        ctr_crypt(&wallet_key.0, &iv_for(public.as_bytes()), &mut private);
        Ok(PrivateKey(private))
    }

    /// Record a watch-only account: no key material, just a reminder the
    /// wallet tracks this address.
    pub fn insert_watch_only(&mut self, public: &PublicKey) {
        let pub_hex = hex_encode(public.as_bytes());
        if !self.watch_only.contains(&pub_hex) {
            self.watch_only.push(pub_hex);
        }
    }

    pub fn set_representative(&mut self, representative: &Account) {
        self.representative = Some(representative.as_str().to_string());
    }
}

/// Save a keystore to a JSON file.
pub fn save_keystore(keystore: &KeystoreFile, path: &Path) -> Result<(), WalletError> {
    let json = serde_json::to_string_pretty(keystore)
        .map_err(|e| WalletError::Other(format!("JSON serialization failed: {e}")))?;
    std::fs::write(path, json)
        .map_err(|e| WalletError::Other(format!("failed to write keystore file: {e}")))?;
    Ok(())
}

/// Load a keystore from a JSON file.
pub fn load_keystore(path: &Path) -> Result<KeystoreFile, WalletError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| WalletError::Other(format!("failed to read keystore file: {e}")))?;
    serde_json::from_str(&json)
        .map_err(|e| WalletError::Other(format!("invalid keystore JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_unlock_roundtrip() {
        let (file, seed) = KeystoreFile::create("hunter2").unwrap();
        let wallet_key = file.attempt_password("hunter2").unwrap();
        assert_eq!(file.seed(&wallet_key).unwrap(), seed);
    }

    #[test]
    fn wrong_password_is_locked() {
        let (file, _seed) = KeystoreFile::create("hunter2").unwrap();
        let result = file.attempt_password("wrong");
        assert!(matches!(result, Err(WalletError::WalletLocked)));
    }

    #[test]
    fn rekey_preserves_seed() {
        let (mut file, seed) = KeystoreFile::create("old-pw").unwrap();
        let wallet_key = file.attempt_password("old-pw").unwrap();
        file.rekey(&wallet_key, "new-pw").unwrap();

        assert!(file.attempt_password("old-pw").is_err());
        let relocked = file.attempt_password("new-pw").unwrap();
        assert_eq!(file.seed(&relocked).unwrap(), seed);
    }

    #[test]
    fn deterministic_keys_are_indexed_and_advance() {
        let (mut file, _seed) = KeystoreFile::create("pw").unwrap();
        let wallet_key = file.attempt_password("pw").unwrap();

        let (k0, idx0) = file.next_deterministic_key(&wallet_key).unwrap();
        let (k1, idx1) = file.next_deterministic_key(&wallet_key).unwrap();
        assert_eq!(idx0, 0);
        assert_eq!(idx1, 1);
        assert_ne!(k0.0, k1.0);
        assert_eq!(file.deterministic_index, 2);

        let rederived = file.deterministic_key_at(&wallet_key, 0).unwrap();
        assert_eq!(rederived.0, k0.0);
    }

    #[test]
    fn adhoc_key_roundtrip() {
        let (mut file, _seed) = KeystoreFile::create("pw").unwrap();
        let wallet_key = file.attempt_password("pw").unwrap();

        let kp = crate::keys::generate_keypair();
        file.insert_adhoc_key(&wallet_key, &kp.public, &kp.private);

        let recovered = file.adhoc_key(&wallet_key, &kp.public).unwrap();
        assert_eq!(recovered.0, kp.private.0);
    }

    #[test]
    fn watch_only_has_no_key_material() {
        let (mut file, _seed) = KeystoreFile::create("pw").unwrap();
        let kp = crate::keys::generate_keypair();
        file.insert_watch_only(&kp.public);

        let pub_hex = hex_encode(kp.public.as_bytes());
        assert!(file.watch_only.contains(&pub_hex));
        assert!(!file.adhoc_keys.contains_key(&pub_hex));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (file, seed) = KeystoreFile::create("pw").unwrap();
        let dir = std::env::temp_dir().join("bln-keystore-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test-keystore.json");

        save_keystore(&file, &path).unwrap();
        let loaded = load_keystore(&path).unwrap();
        let wallet_key = loaded.attempt_password("pw").unwrap();
        assert_eq!(loaded.seed(&wallet_key).unwrap(), seed);

        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_dir(&dir);
    }

    #[test]
    fn unsupported_version_rejected() {
        let (mut file, _seed) = KeystoreFile::create("pw").unwrap();
        file.version = 99;
        assert!(file.attempt_password("pw").is_err());
    }
}
