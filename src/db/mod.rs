//! Account storage.
//!
//! The persistent nickname database is owned by the host daemon. Services
//! only consume it through [`IdentityStore`]; [`MemoryIdentityStore`] is the
//! in-process implementation used by the console binary and tests.

mod accounts;

pub use accounts::{Identity, IdentityStore, MemoryIdentityStore};

use crate::security::EncryptError;
use thiserror::Error;

/// Account storage errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("account already exists: {0}")]
    AccountExists(String),
    #[error("failed to encrypt password: {0}")]
    Encrypt(#[from] EncryptError),
}
