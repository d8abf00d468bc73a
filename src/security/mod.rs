//! Security module for services.
//!
//! Provides:
//! - **Privileges**: enumerated operator privilege tokens and per-account sets
//! - **Credentials**: the swappable encryption scheme behind stored secrets
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Security Module                    │
//! ├──────────────────────┬──────────────────────────────┤
//! │     Privileges       │        Credentials           │
//! │ "operserv/set" <-> enum │ plain | chacha20 (reversible) │
//! │ PrivilegeSet         │ argon2 | sha256 (one-way)    │
//! └──────────────────────┴──────────────────────────────┘
//! ```

pub mod credentials;
pub mod privilege;

pub use credentials::{CredentialService, DecryptError, EncryptError, EncryptionScheme};
pub use privilege::{Privilege, PrivilegeSet};
