//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::mail::MailConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Services configuration.
///
/// Every section is optional; a missing section falls back to its defaults.
/// Values are read-only once the services core is running.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Network identity.
    #[serde(default)]
    pub network: NetworkConfig,
    /// Service agent nicknames and listing behaviour.
    #[serde(default)]
    pub services: ServicesConfig,
    /// Initial values for the global capability flags.
    #[serde(default)]
    pub capabilities: CapabilitiesConfig,
    /// OperServ options.
    #[serde(default)]
    pub operserv: OperServConfig,
    /// BotServ options.
    #[serde(default)]
    pub botserv: BotServConfig,
    /// Outbound mail.
    #[serde(default)]
    pub mail: MailConfig,
    /// Credential encryption.
    #[serde(default)]
    pub encryption: EncryptionConfig,
    /// Seed accounts (console binary and tests).
    #[serde(default)]
    pub accounts: Vec<AccountBlock>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

/// Network identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Network name (e.g., "Straylight"), used in outgoing mail.
    #[serde(default = "default_network_name")]
    pub name: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: default_network_name(),
        }
    }
}

fn default_network_name() -> String {
    "LocalNet".to_string()
}

/// Service agent configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServicesConfig {
    #[serde(default = "default_nickserv")]
    pub nickserv: String,
    #[serde(default = "default_chanserv")]
    pub chanserv: String,
    #[serde(default = "default_botserv")]
    pub botserv: String,
    #[serde(default = "default_operserv")]
    pub operserv: String,
    /// Hide commands the requester lacks the privilege for in HELP listings.
    #[serde(default = "default_true")]
    pub hide_privileged_commands: bool,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            nickserv: default_nickserv(),
            chanserv: default_chanserv(),
            botserv: default_botserv(),
            operserv: default_operserv(),
            hide_privileged_commands: true,
        }
    }
}

fn default_nickserv() -> String {
    "NickServ".to_string()
}

fn default_chanserv() -> String {
    "ChanServ".to_string()
}

fn default_botserv() -> String {
    "BotServ".to_string()
}

fn default_operserv() -> String {
    "OperServ".to_string()
}

/// Initial capability flag values (equivalent to the -readonly, -debug and
/// -noexpire startup switches).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapabilitiesConfig {
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub debug: u32,
    #[serde(default)]
    pub noexpire: bool,
}

/// OperServ configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperServConfig {
    /// Allow operators to toggle SUPERADMIN on their own session.
    #[serde(default)]
    pub superadmin: bool,
}

/// BotServ configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotServConfig {
    /// Minimum channel population before an assigned bot joins.
    #[serde(default = "default_min_users")]
    pub min_users: u32,
    /// Prefix for in-channel fantasy commands.
    #[serde(default = "default_fantasy_character")]
    pub fantasy_character: String,
}

impl Default for BotServConfig {
    fn default() -> Self {
        Self {
            min_users: default_min_users(),
            fantasy_character: default_fantasy_character(),
        }
    }
}

fn default_min_users() -> u32 {
    1
}

fn default_fantasy_character() -> String {
    "!".to_string()
}

/// Credential schemes selectable at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemeKind {
    /// Base64 encoding only, fully reversible.
    #[default]
    Plain,
    /// ChaCha20-Poly1305 with a configured key, reversible.
    Chacha20,
    /// Argon2 password hash, one-way.
    Argon2,
    /// Salted SHA-256, one-way.
    Sha256,
}

impl SchemeKind {
    /// Prefix used in stored secrets (`plain:...`).
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Chacha20 => "chacha20",
            Self::Argon2 => "argon2",
            Self::Sha256 => "sha256",
        }
    }
}

/// Encryption configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EncryptionConfig {
    #[serde(default)]
    pub scheme: SchemeKind,
    /// Base64 32-byte key, required by the `chacha20` scheme.
    #[serde(default)]
    pub key: Option<String>,
}

/// A seed account.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountBlock {
    pub name: String,
    /// Plaintext password, encrypted with the active scheme on load.
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Privilege tokens, e.g. "operserv/set".
    #[serde(default)]
    pub privileges: Vec<String>,
}

pub(super) fn default_true() -> bool {
    true
}
