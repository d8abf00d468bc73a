//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::{Config, SchemeKind};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("network.name is required")]
    MissingNetworkName,
    #[error("services.{0} must not be empty")]
    MissingServiceNick(&'static str),
    #[error("botserv.fantasy_character must be exactly one character, got '{0}'")]
    InvalidFantasyCharacter(String),
    #[error("encryption.key is required for the {0} scheme")]
    MissingEncryptionKey(&'static str),
    #[error("encryption.key must be 32 base64-encoded bytes")]
    InvalidEncryptionKey,
    #[error("mail.sendmail_path does not exist: {0}")]
    SendmailNotFound(String),
    #[error("mail.send_from is required when mail is enabled")]
    MissingSendFrom,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.network.name.trim().is_empty() {
        errors.push(ValidationError::MissingNetworkName);
    }

    let nicks = [
        ("nickserv", &config.services.nickserv),
        ("chanserv", &config.services.chanserv),
        ("botserv", &config.services.botserv),
        ("operserv", &config.services.operserv),
    ];
    for (key, nick) in nicks {
        if nick.trim().is_empty() {
            errors.push(ValidationError::MissingServiceNick(key));
        }
    }

    if config.botserv.fantasy_character.chars().count() != 1 {
        errors.push(ValidationError::InvalidFantasyCharacter(
            config.botserv.fantasy_character.clone(),
        ));
    }

    if config.encryption.scheme == SchemeKind::Chacha20 {
        match &config.encryption.key {
            None => errors.push(ValidationError::MissingEncryptionKey(
                SchemeKind::Chacha20.prefix(),
            )),
            Some(key) => {
                let valid = STANDARD
                    .decode(key)
                    .map(|bytes| bytes.len() == 32)
                    .unwrap_or(false);
                if !valid {
                    errors.push(ValidationError::InvalidEncryptionKey);
                }
            }
        }
    }

    if config.mail.enabled {
        if config.mail.send_from.trim().is_empty() {
            errors.push(ValidationError::MissingSendFrom);
        }
        if let Some(path) = &config.mail.sendmail_path
            && !Path::new(path).exists()
        {
            errors.push(ValidationError::SendmailNotFound(path.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = Config::default();
        config.network.name = String::new();
        config.services.operserv = " ".to_string();
        config.botserv.fantasy_character = "!!".to_string();

        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ValidationError::MissingNetworkName));
        assert!(matches!(
            errors[1],
            ValidationError::MissingServiceNick("operserv")
        ));
        assert!(matches!(
            errors[2],
            ValidationError::InvalidFantasyCharacter(_)
        ));
    }

    #[test]
    fn chacha20_requires_key() {
        let mut config = Config::default();
        config.encryption.scheme = SchemeKind::Chacha20;
        let errors = validate(&config).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::MissingEncryptionKey("chacha20")
        ));

        config.encryption.key = Some(STANDARD.encode([0u8; 16]));
        let errors = validate(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidEncryptionKey));

        config.encryption.key = Some(STANDARD.encode([7u8; 32]));
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn missing_sendmail_binary_is_reported() {
        let mut config = Config::default();
        config.mail.enabled = true;
        config.mail.sendmail_path = Some("/nonexistent/sendmail".to_string());
        let errors = validate(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::SendmailNotFound(_)));
    }
}
