//! One-way schemes. Secrets can be verified but never recovered.

use super::{DecryptError, EncryptError, EncryptionScheme, payload_for};
use crate::config::SchemeKind;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Argon2id PHC strings (`argon2:$argon2id$...`).
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Scheme;

impl EncryptionScheme for Argon2Scheme {
    fn kind(&self) -> SchemeKind {
        SchemeKind::Argon2
    }

    fn encrypt(&self, plaintext: &str) -> Result<String, EncryptError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| EncryptError::Hash(e.to_string()))?;
        Ok(format!("{}:{}", SchemeKind::Argon2.prefix(), hash))
    }

    fn decrypt(&self, _stored: &str) -> Result<Zeroizing<String>, DecryptError> {
        Err(DecryptError::Irreversible(SchemeKind::Argon2.prefix()))
    }

    fn verify(&self, plaintext: &str, stored: &str) -> bool {
        let Ok(payload) = payload_for(SchemeKind::Argon2, stored) else {
            return false;
        };
        let Ok(hash) = PasswordHash::new(payload) else {
            return false;
        };
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &hash)
            .is_ok()
    }
}

/// Salted SHA-256 (`sha256:<salt hex>$<digest hex>`).
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Scheme;

impl Sha256Scheme {
    fn digest(salt: &[u8], plaintext: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(plaintext.as_bytes());
        hasher.finalize().to_vec()
    }
}

impl EncryptionScheme for Sha256Scheme {
    fn kind(&self) -> SchemeKind {
        SchemeKind::Sha256
    }

    fn encrypt(&self, plaintext: &str) -> Result<String, EncryptError> {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        Ok(format!(
            "{}:{}${}",
            SchemeKind::Sha256.prefix(),
            hex::encode(salt),
            hex::encode(Self::digest(&salt, plaintext))
        ))
    }

    fn decrypt(&self, _stored: &str) -> Result<Zeroizing<String>, DecryptError> {
        Err(DecryptError::Irreversible(SchemeKind::Sha256.prefix()))
    }

    fn verify(&self, plaintext: &str, stored: &str) -> bool {
        let Ok(payload) = payload_for(SchemeKind::Sha256, stored) else {
            return false;
        };
        let Some((salt, digest)) = payload.split_once('$') else {
            return false;
        };
        match (hex::decode(salt), hex::decode(digest)) {
            (Ok(salt), Ok(expected)) => {
                bool::from(Self::digest(&salt, plaintext).ct_eq(&expected))
            }
            _ => false,
        }
    }
}
