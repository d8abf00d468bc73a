//! Credential service.
//!
//! Account secrets are stored as `scheme:payload` strings. The active
//! [`EncryptionScheme`] is chosen at startup from configuration and may be
//! replaced at runtime; callers only ever talk to [`CredentialService`].
//!
//! Reversible schemes (`plain`, `chacha20`) allow SENDPASS-style recovery.
//! One-way schemes (`argon2`, `sha256`) fail decryption structurally with
//! [`DecryptError::Irreversible`], which is distinct from bad input.

mod chacha;
mod hash;
mod plain;

pub use chacha::ChaChaScheme;
pub use hash::{Argon2Scheme, Sha256Scheme};
pub use plain::PlainScheme;

use crate::config::{EncryptionConfig, SchemeKind};
use parking_lot::RwLock;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{info, warn};
use zeroize::Zeroizing;

/// Plaintext used by the load-time compatibility self-test.
const SELF_TEST_PLAINTEXT: &str = "tmp";

/// Errors produced when decrypting a stored secret.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecryptError {
    /// The active scheme cannot reverse secrets at all.
    #[error("{0} secrets cannot be decrypted")]
    Irreversible(&'static str),
    /// The secret was produced by a different scheme.
    #[error("secret uses scheme {found}, active scheme is {expected}")]
    ForeignScheme {
        expected: &'static str,
        found: String,
    },
    #[error("malformed secret: {0}")]
    Malformed(String),
}

impl DecryptError {
    /// True when no input could ever decrypt under the active scheme.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Irreversible(_))
    }
}

/// Errors produced when encrypting a secret.
#[derive(Debug, Error)]
pub enum EncryptError {
    #[error("invalid encryption key")]
    InvalidKey,
    #[error("cipher failure: {0}")]
    Cipher(String),
    #[error("hash failure: {0}")]
    Hash(String),
}

/// A credential encryption scheme.
pub trait EncryptionScheme: Send + Sync {
    fn kind(&self) -> SchemeKind;

    /// Produce a stored secret (`scheme:payload`) from a plaintext password.
    fn encrypt(&self, plaintext: &str) -> Result<String, EncryptError>;

    /// Recover the plaintext from a stored secret.
    fn decrypt(&self, stored: &str) -> Result<Zeroizing<String>, DecryptError>;

    /// Check a candidate password against a stored secret.
    fn verify(&self, plaintext: &str, stored: &str) -> bool {
        match self.decrypt(stored) {
            Ok(recovered) => bool::from(recovered.as_bytes().ct_eq(plaintext.as_bytes())),
            Err(_) => false,
        }
    }
}

/// Split a stored secret into the payload for `kind`.
pub(crate) fn payload_for(kind: SchemeKind, stored: &str) -> Result<&str, DecryptError> {
    let (prefix, payload) = stored
        .split_once(':')
        .ok_or_else(|| DecryptError::Malformed("missing scheme prefix".to_string()))?;
    if prefix != kind.prefix() {
        return Err(DecryptError::ForeignScheme {
            expected: kind.prefix(),
            found: prefix.to_string(),
        });
    }
    Ok(payload)
}

/// Build the scheme named in configuration.
pub fn build_scheme(config: &EncryptionConfig) -> Result<Arc<dyn EncryptionScheme>, EncryptError> {
    Ok(match config.scheme {
        SchemeKind::Plain => Arc::new(PlainScheme),
        SchemeKind::Chacha20 => {
            let key = config.key.as_deref().ok_or(EncryptError::InvalidKey)?;
            Arc::new(ChaChaScheme::from_base64_key(key)?)
        }
        SchemeKind::Argon2 => Arc::new(Argon2Scheme),
        SchemeKind::Sha256 => Arc::new(Sha256Scheme),
    })
}

/// Process-wide holder of the active encryption scheme.
pub struct CredentialService {
    scheme: RwLock<Arc<dyn EncryptionScheme>>,
}

impl CredentialService {
    pub fn new(scheme: Arc<dyn EncryptionScheme>) -> Self {
        Self {
            scheme: RwLock::new(scheme),
        }
    }

    /// Build the service with the scheme selected in configuration.
    pub fn from_config(config: &EncryptionConfig) -> Result<Self, EncryptError> {
        Ok(Self::new(build_scheme(config)?))
    }

    /// Snapshot of the active scheme; the lock is released on return.
    pub fn active(&self) -> Arc<dyn EncryptionScheme> {
        self.scheme.read().clone()
    }

    pub fn scheme_kind(&self) -> SchemeKind {
        self.active().kind()
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptError> {
        self.active().encrypt(plaintext)
    }

    pub fn decrypt(&self, stored: &str) -> Result<Zeroizing<String>, DecryptError> {
        self.active().decrypt(stored)
    }

    pub fn verify(&self, plaintext: &str, stored: &str) -> bool {
        self.active().verify(plaintext, stored)
    }

    /// Encrypt then decrypt a throwaway value with the active scheme.
    ///
    /// Fails with [`DecryptError::Irreversible`] under one-way schemes.
    pub fn self_test(&self) -> Result<(), DecryptError> {
        let scheme = self.active();
        let stored = scheme
            .encrypt(SELF_TEST_PLAINTEXT)
            .map_err(|e| DecryptError::Malformed(e.to_string()))?;
        let recovered = scheme.decrypt(&stored)?;
        if recovered.as_str() != SELF_TEST_PLAINTEXT {
            return Err(DecryptError::Malformed("round trip mismatch".to_string()));
        }
        Ok(())
    }

    /// Swap the active scheme and re-run the compatibility self-test.
    ///
    /// Returns whether secrets can be recovered under the new scheme.
    pub fn replace_scheme(&self, scheme: Arc<dyn EncryptionScheme>) -> bool {
        let previous = {
            let mut guard = self.scheme.write();
            let previous = guard.kind();
            *guard = scheme;
            previous
        };
        let reversible = self.self_test().is_ok();
        if reversible {
            info!(from = previous.prefix(), to = self.scheme_kind().prefix(), "Encryption scheme replaced");
        } else {
            warn!(
                from = previous.prefix(),
                to = self.scheme_kind().prefix(),
                "Encryption scheme replaced; password recovery is no longer possible"
            );
        }
        reversible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_test_passes_for_reversible_schemes() {
        assert!(CredentialService::new(Arc::new(PlainScheme)).self_test().is_ok());
        let chacha = ChaChaScheme::new([9u8; 32]);
        assert!(CredentialService::new(Arc::new(chacha)).self_test().is_ok());
    }

    #[test]
    fn self_test_fails_structurally_for_one_way_schemes() {
        let err = CredentialService::new(Arc::new(Argon2Scheme))
            .self_test()
            .unwrap_err();
        assert!(err.is_structural());

        let err = CredentialService::new(Arc::new(Sha256Scheme))
            .self_test()
            .unwrap_err();
        assert_eq!(err, DecryptError::Irreversible("sha256"));
    }

    #[test]
    fn replace_scheme_reports_reversibility() {
        let service = CredentialService::new(Arc::new(PlainScheme));
        assert!(!service.replace_scheme(Arc::new(Argon2Scheme)));
        assert_eq!(service.scheme_kind(), SchemeKind::Argon2);
        assert!(service.replace_scheme(Arc::new(PlainScheme)));
    }

    #[test]
    fn foreign_secret_is_not_structural() {
        let service = CredentialService::new(Arc::new(PlainScheme));
        let err = service.decrypt("argon2:$argon2id$...").unwrap_err();
        assert!(matches!(err, DecryptError::ForeignScheme { .. }));
        assert!(!err.is_structural());
    }

    #[test]
    fn missing_prefix_is_malformed() {
        let service = CredentialService::new(Arc::new(PlainScheme));
        assert!(matches!(
            service.decrypt("nocolon"),
            Err(DecryptError::Malformed(_))
        ));
    }

    #[test]
    fn build_scheme_follows_config() {
        let config = EncryptionConfig {
            scheme: SchemeKind::Sha256,
            key: None,
        };
        assert_eq!(build_scheme(&config).unwrap().kind(), SchemeKind::Sha256);

        let config = EncryptionConfig {
            scheme: SchemeKind::Chacha20,
            key: None,
        };
        assert!(matches!(build_scheme(&config), Err(EncryptError::InvalidKey)));
    }

    #[test]
    fn verify_works_for_every_scheme() {
        let schemes: Vec<Arc<dyn EncryptionScheme>> = vec![
            Arc::new(PlainScheme),
            Arc::new(ChaChaScheme::new([1u8; 32])),
            Arc::new(Argon2Scheme),
            Arc::new(Sha256Scheme),
        ];
        for scheme in schemes {
            let service = CredentialService::new(scheme);
            let stored = service.encrypt("correct horse").unwrap();
            assert!(service.verify("correct horse", &stored));
            assert!(!service.verify("wrong horse", &stored));
        }
    }
}
