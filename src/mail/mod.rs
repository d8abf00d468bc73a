//! Notification service.
//!
//! Services send mail to the address stored on a nickname (password
//! recovery, registration confirmation). The actual delivery mechanism is a
//! [`MailTransport`] selected at startup and replaceable at runtime; this
//! module owns the policy around it: the global on/off switch, per-user send
//! delay and a bounded send time so a stalled transport cannot hold a
//! command forever. Failed sends are reported once and never retried.

mod transport;

pub use transport::{LogTransport, SendmailTransport};

use crate::casemap::irc_to_lower;
use crate::config::MailConfig;
use crate::db::Identity;
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};
use zeroize::Zeroizing;

/// A fully addressed message ready for a transport.
#[derive(Clone)]
pub struct Mail {
    pub to_name: String,
    pub to_address: String,
    /// Service agent the mail is sent on behalf of.
    pub from_agent: String,
    pub from_address: String,
    pub subject: String,
    pub body: Zeroizing<String>,
}

impl fmt::Debug for Mail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mail")
            .field("to_name", &self.to_name)
            .field("to_address", &self.to_address)
            .field("from_agent", &self.from_agent)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

/// Transport-level failures.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("mailer exited with status {0:?}")]
    Exited(Option<i32>),
    #[error("mail rejected: {0}")]
    Rejected(String),
}

/// Something that can deliver a [`Mail`].
#[async_trait]
pub trait MailTransport: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, mail: &Mail) -> Result<(), MailError>;
}

/// Why a notification was not sent.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("mail is disabled")]
    Disabled,
    #[error("no valid address for {0}")]
    NoAddress(String),
    #[error("mail delay not elapsed, {remaining_secs}s remaining")]
    Throttled { remaining_secs: u64 },
    #[error("mail send timed out after {0:?}")]
    Timeout(Duration),
    #[error("mail transport failed: {0}")]
    Transport(#[from] MailError),
}

/// Send-delay state of one requester or recipient key.
#[derive(Debug, Clone, Copy)]
enum SendMark {
    /// A send holding this key has not finished yet.
    InFlight,
    Sent(Instant),
}

/// Process-wide mail sender.
pub struct NotificationService {
    transport: RwLock<Arc<dyn MailTransport>>,
    config: MailConfig,
    /// Folded requester nick / recipient account -> send-delay state.
    /// Only populated when a delay is configured.
    last_sent: DashMap<String, SendMark>,
}

/// Keys held in-flight for one send. Released on drop unless committed.
struct Reservation<'a> {
    marks: &'a DashMap<String, SendMark>,
    keys: Vec<String>,
    committed: bool,
}

impl Reservation<'_> {
    fn commit(mut self) {
        let now = Instant::now();
        for key in &self.keys {
            self.marks.insert(key.clone(), SendMark::Sent(now));
        }
        self.committed = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for key in &self.keys {
            self.marks
                .remove_if(key, |_, mark| matches!(mark, SendMark::InFlight));
        }
    }
}

/// A deliverable address: `local@domain` with nothing that could smuggle
/// extra recipients into the message headers.
fn valid_address(address: &str) -> bool {
    if address
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, ',' | '<' | '>' | '"' | ';'))
    {
        return false;
    }
    address
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty() && !domain.contains('@'))
}

impl NotificationService {
    pub fn new(config: MailConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            transport: RwLock::new(transport),
            config,
            last_sent: DashMap::new(),
        }
    }

    /// Pick the transport from configuration: sendmail when a binary is
    /// configured, otherwise log-only.
    pub fn from_config(config: &MailConfig) -> Self {
        let transport: Arc<dyn MailTransport> = match &config.sendmail_path {
            Some(path) => Arc::new(SendmailTransport::new(path)),
            None => Arc::new(LogTransport),
        };
        Self::new(config.clone(), transport)
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn restricted(&self) -> bool {
        self.config.restrict
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.read().name()
    }

    /// Number of requester/recipient keys currently under a send delay.
    pub fn tracked(&self) -> usize {
        self.last_sent.len()
    }

    /// Swap the delivery mechanism.
    pub fn replace_transport(&self, transport: Arc<dyn MailTransport>) {
        let name = transport.name();
        *self.transport.write() = transport;
        info!(transport = name, "Mail transport replaced");
    }

    /// Send `subject`/`body` to `recipient` on behalf of `from_agent`.
    ///
    /// `requester` is the nick that triggered the mail; the send delay is
    /// enforced for both the requester and the recipient account. Both keys
    /// are held from before the transport is awaited until it finishes, so
    /// concurrent sends sharing either key are throttled. A failed or
    /// abandoned send does not arm the delay.
    pub async fn send(
        &self,
        requester: &str,
        recipient: &Identity,
        from_agent: &str,
        subject: &str,
        body: Zeroizing<String>,
    ) -> Result<(), NotificationError> {
        if !self.config.enabled {
            return Err(NotificationError::Disabled);
        }

        let address = recipient
            .email
            .as_deref()
            .map(str::trim)
            .filter(|a| valid_address(a))
            .ok_or_else(|| NotificationError::NoAddress(recipient.name.clone()))?;

        let keys = [
            format!("u:{}", irc_to_lower(requester)),
            format!("a:{}", irc_to_lower(&recipient.name)),
        ];
        let reservation = self.reserve(keys)?;

        let mail = Mail {
            to_name: recipient.name.clone(),
            to_address: address.to_string(),
            from_agent: from_agent.to_string(),
            from_address: self.config.send_from.clone(),
            subject: subject.to_string(),
            body,
        };

        let transport = self.transport.read().clone();
        let timeout = self.config.timeout();
        match tokio::time::timeout(timeout, transport.send(&mail)).await {
            Err(_) => {
                warn!(to = %mail.to_name, transport = transport.name(), "Mail send timed out");
                return Err(NotificationError::Timeout(timeout));
            }
            Ok(Err(e)) => {
                warn!(to = %mail.to_name, transport = transport.name(), error = %e, "Mail send failed");
                return Err(e.into());
            }
            Ok(Ok(())) => {}
        }

        if let Some(reservation) = reservation {
            reservation.commit();
        }
        info!(to = %mail.to_name, subject = %mail.subject, transport = transport.name(), "Mail sent");
        Ok(())
    }

    /// Hold `keys` for one send, or report how long the caller must wait.
    /// Returns `None` when no delay is configured.
    fn reserve(&self, keys: [String; 2]) -> Result<Option<Reservation<'_>>, NotificationError> {
        let delay = self.config.delay();
        if delay.is_zero() {
            return Ok(None);
        }
        self.last_sent.retain(|_, mark| match mark {
            SendMark::InFlight => true,
            SendMark::Sent(at) => at.elapsed() < delay,
        });

        let mut reservation = Reservation {
            marks: &self.last_sent,
            keys: Vec::with_capacity(keys.len()),
            committed: false,
        };
        for key in keys {
            match self.last_sent.entry(key.clone()) {
                Entry::Occupied(mut entry) => {
                    let remaining = match *entry.get() {
                        SendMark::InFlight => Some(delay),
                        SendMark::Sent(at) => delay.checked_sub(at.elapsed()).filter(|r| !r.is_zero()),
                    };
                    if let Some(remaining) = remaining {
                        drop(entry);
                        // Dropping `reservation` releases keys taken so far.
                        return Err(NotificationError::Throttled {
                            remaining_secs: remaining.as_secs().max(1),
                        });
                    }
                    entry.insert(SendMark::InFlight);
                }
                Entry::Vacant(entry) => {
                    entry.insert(SendMark::InFlight);
                }
            }
            reservation.keys.push(key);
        }
        Ok(Some(reservation))
    }
}
