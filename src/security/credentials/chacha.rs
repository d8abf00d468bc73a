//! `chacha20` scheme: ChaCha20-Poly1305 with a configured key.

use super::{DecryptError, EncryptError, EncryptionScheme, payload_for};
use crate::config::SchemeKind;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use rand::RngCore;
use zeroize::{ZeroizeOnDrop, Zeroizing};

const NONCE_LEN: usize = 12;

/// Reversible authenticated encryption. Payload is base64(nonce || ciphertext).
#[derive(Clone, ZeroizeOnDrop)]
pub struct ChaChaScheme {
    key: [u8; 32],
}

impl ChaChaScheme {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Build from a base64-encoded 32-byte key.
    pub fn from_base64_key(encoded: &str) -> Result<Self, EncryptError> {
        let bytes = Zeroizing::new(
            STANDARD
                .decode(encoded.trim())
                .map_err(|_| EncryptError::InvalidKey)?,
        );
        let key: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| EncryptError::InvalidKey)?;
        Ok(Self::new(key))
    }

    fn cipher(&self) -> Result<ChaCha20Poly1305, EncryptError> {
        ChaCha20Poly1305::new_from_slice(&self.key).map_err(|_| EncryptError::InvalidKey)
    }
}

impl EncryptionScheme for ChaChaScheme {
    fn kind(&self) -> SchemeKind {
        SchemeKind::Chacha20
    }

    fn encrypt(&self, plaintext: &str) -> Result<String, EncryptError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher()?
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| EncryptError::Cipher(e.to_string()))?;

        let mut payload = nonce_bytes.to_vec();
        payload.extend(ciphertext);
        Ok(format!(
            "{}:{}",
            SchemeKind::Chacha20.prefix(),
            STANDARD.encode(payload)
        ))
    }

    fn decrypt(&self, stored: &str) -> Result<Zeroizing<String>, DecryptError> {
        let payload = payload_for(SchemeKind::Chacha20, stored)?;
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| DecryptError::Malformed(e.to_string()))?;
        if bytes.len() < NONCE_LEN {
            return Err(DecryptError::Malformed("ciphertext too short".to_string()));
        }

        let (nonce, data) = bytes.split_at(NONCE_LEN);
        let cipher = self
            .cipher()
            .map_err(|e| DecryptError::Malformed(e.to_string()))?;
        let plaintext = Zeroizing::new(
            cipher
                .decrypt(Nonce::from_slice(nonce), data)
                .map_err(|_| DecryptError::Malformed("authentication failed".to_string()))?,
        );
        String::from_utf8(plaintext.to_vec())
            .map(Zeroizing::new)
            .map_err(|e| DecryptError::Malformed(e.to_string()))
    }
}
