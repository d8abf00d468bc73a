//! Services audit log.
//!
//! Commands record who did what at one of two levels: `COMMAND` for
//! ordinary use and `ADMIN` for operator actions. Entries are emitted as
//! `tracing` events on the `audit` target and kept in a bounded in-memory
//! ring for inspection.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use tracing::info;

/// Default number of entries retained in memory.
const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Command,
    Admin,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => f.write_str("COMMAND"),
            Self::Admin => f.write_str("ADMIN"),
        }
    }
}

/// One audit record.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    /// Acting nickname, or `*` for an unknown source.
    pub nick: String,
    /// Account the actor was identified to.
    pub account: Option<String>,
    /// Fully qualified command, e.g. `OperServ/SET`.
    pub command: String,
    pub detail: String,
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.level, self.nick)?;
        if let Some(account) = &self.account {
            write!(f, " ({account})")?;
        }
        write!(f, " used {}", self.command)?;
        if !self.detail.is_empty() {
            write!(f, " {}", self.detail)?;
        }
        Ok(())
    }
}

/// Bounded audit log.
#[derive(Debug)]
pub struct AuditLog {
    entries: Mutex<VecDeque<AuditEntry>>,
    capacity: usize,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl AuditLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            capacity: capacity.max(1),
        }
    }

    /// Record an entry.
    pub fn record(
        &self,
        level: LogLevel,
        nick: &str,
        account: Option<&str>,
        command: &str,
        detail: impl Into<String>,
    ) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            level,
            nick: nick.to_string(),
            account: account.map(str::to_string),
            command: command.to_string(),
            detail: detail.into(),
        };

        info!(
            target: "audit",
            level = %entry.level,
            nick = %entry.nick,
            account = entry.account.as_deref(),
            command = %entry.command,
            detail = %entry.detail,
            "{}", entry
        );

        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Oldest-first copy of the retained entries.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
