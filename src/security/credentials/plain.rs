//! `plain` scheme: base64 only.

use super::{DecryptError, EncryptError, EncryptionScheme, payload_for};
use crate::config::SchemeKind;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use zeroize::Zeroizing;

/// Stores secrets base64-encoded. Offers no protection at rest.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainScheme;

impl EncryptionScheme for PlainScheme {
    fn kind(&self) -> SchemeKind {
        SchemeKind::Plain
    }

    fn encrypt(&self, plaintext: &str) -> Result<String, EncryptError> {
        Ok(format!(
            "{}:{}",
            SchemeKind::Plain.prefix(),
            STANDARD.encode(plaintext)
        ))
    }

    fn decrypt(&self, stored: &str) -> Result<Zeroizing<String>, DecryptError> {
        let payload = payload_for(SchemeKind::Plain, stored)?;
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| DecryptError::Malformed(e.to_string()))?;
        String::from_utf8(bytes)
            .map(Zeroizing::new)
            .map_err(|e| DecryptError::Malformed(e.to_string()))
    }
}
