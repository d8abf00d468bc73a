//! Unified error handling for services.
//!
//! Three families:
//! - [`ServiceError`]: request-scoped failures. The dispatcher turns each one
//!   into a single reply line; none escape a dispatch.
//! - [`RegistryError`]: command registration contract violations.
//! - [`LoadError`]: a module refusing to load (incompatible configuration or
//!   missing capability). Only raised at startup.

use crate::mail::NotificationError;
use crate::security::DecryptError;
use crate::services::ServiceKind;
use thiserror::Error;

// ============================================================================
// Request errors
// ============================================================================

/// Errors that can occur while executing a service command.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("access denied")]
    AccessDenied,

    #[error("nickname not registered: {0}")]
    UnknownIdentity(String),

    /// The active backend can never perform the operation.
    #[error("{command} unavailable: {reason}")]
    CapabilityUnavailable {
        command: &'static str,
        reason: DecryptError,
    },

    #[error("notification failed: {0}")]
    Notification(#[from] NotificationError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCommand(_) => "unknown_command",
            Self::AccessDenied => "access_denied",
            Self::UnknownIdentity(_) => "unknown_identity",
            Self::CapabilityUnavailable { .. } => "capability_unavailable",
            Self::Notification(NotificationError::Throttled { .. }) => "notification_throttled",
            Self::Notification(_) => "notification_failure",
            Self::Internal(_) => "internal_error",
        }
    }

    /// The line sent back to the requester. `service` is the agent nick
    /// used in "/msg" hints.
    pub fn reply_text(&self, service: &str) -> String {
        match self {
            Self::UnknownCommand(verb) => format!(
                "Unknown command \x02{}\x02. \"/msg {} HELP\" for help.",
                verb, service
            ),
            Self::AccessDenied => "Access denied.".to_string(),
            Self::UnknownIdentity(nick) => format!("Nick \x02{}\x02 isn't registered.", nick),
            Self::CapabilityUnavailable { command, .. } => format!(
                "{} command unavailable because encryption is in use.",
                command
            ),
            Self::Notification(e) => match e {
                NotificationError::Disabled => {
                    "Services have been configured to not send mail.".to_string()
                }
                NotificationError::NoAddress(nick) => {
                    format!("E-mail for \x02{}\x02 is invalid.", nick)
                }
                NotificationError::Throttled { remaining_secs } => {
                    format!("Please wait \x02{}\x02 seconds and retry.", remaining_secs)
                }
                NotificationError::Timeout(_) | NotificationError::Transport(_) => {
                    "Unable to send mail. Please try again later.".to_string()
                }
            },
            Self::Internal(_) => "An internal error occurred.".to_string(),
        }
    }
}

// ============================================================================
// Registration errors
// ============================================================================

/// Command registration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{service} already has a command named {verb}")]
    DuplicateVerb { service: ServiceKind, verb: String },

    #[error("{verb}: minimum argument count {min} exceeds maximum {max}")]
    InvalidBounds { verb: String, min: usize, max: usize },
}

// ============================================================================
// Load errors
// ============================================================================

/// A module refused to load. The module accepts no requests.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{module}: mail is not enabled")]
    MailDisabled { module: &'static str },

    #[error("{module}: incompatible with the {scheme} encryption scheme")]
    IncompatibleEncryption {
        module: &'static str,
        scheme: &'static str,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_text_is_single_line() {
        let errors = vec![
            ServiceError::UnknownCommand("FOO".to_string()),
            ServiceError::AccessDenied,
            ServiceError::UnknownIdentity("alice".to_string()),
            ServiceError::CapabilityUnavailable {
                command: "SENDPASS",
                reason: DecryptError::Irreversible("argon2"),
            },
            ServiceError::Notification(NotificationError::Disabled),
            ServiceError::Notification(NotificationError::Throttled { remaining_secs: 9 }),
            ServiceError::Internal("boom".to_string()),
        ];
        for e in errors {
            let text = e.reply_text("NickServ");
            assert!(!text.is_empty());
            assert!(!text.contains('\n'), "{text}");
        }
    }

    #[test]
    fn unavailable_text_names_command() {
        let e = ServiceError::CapabilityUnavailable {
            command: "SENDPASS",
            reason: DecryptError::Irreversible("sha256"),
        };
        assert_eq!(
            e.reply_text("NickServ"),
            "SENDPASS command unavailable because encryption is in use."
        );
        assert_eq!(e.error_code(), "capability_unavailable");
    }

    #[test]
    fn unknown_command_hints_help() {
        let e = ServiceError::UnknownCommand("FROB".to_string());
        assert_eq!(
            e.reply_text("OperServ"),
            "Unknown command \x02FROB\x02. \"/msg OperServ HELP\" for help."
        );
    }
}
