//! Outbound mail configuration.

use serde::Deserialize;
use std::time::Duration;

/// Mail configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Whether services may send mail at all.
    #[serde(default)]
    pub enabled: bool,
    /// Restrict mail-sending commands to privileged operators.
    #[serde(default)]
    pub restrict: bool,
    /// Path to a sendmail-compatible binary. When unset, mail is logged only.
    #[serde(default)]
    pub sendmail_path: Option<String>,
    /// Envelope and header sender address.
    #[serde(default = "default_send_from")]
    pub send_from: String,
    /// Minimum seconds between two mails requested by the same user (0 = off).
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
    /// Upper bound on a single send.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl MailConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            restrict: false,
            sendmail_path: None,
            send_from: default_send_from(),
            delay_secs: default_delay_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_send_from() -> String {
    "services@localhost".to_string()
}

fn default_delay_secs() -> u64 {
    300
}

fn default_timeout_secs() -> u64 {
    10
}
