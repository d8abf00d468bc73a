//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServicesConfig, EncryptionConfig)
//! - [`mail`]: Outbound mail configuration (MailConfig)
//! - [`validation`]: Startup validation

mod mail;
mod types;
pub mod validation;

pub use mail::MailConfig;
pub use types::{
    AccountBlock, BotServConfig, CapabilitiesConfig, Config, ConfigError, EncryptionConfig,
    NetworkConfig, OperServConfig, SchemeKind, ServicesConfig,
};
