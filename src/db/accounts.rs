//! Registered identities.

use super::DbError;
use crate::casemap::irc_to_lower;
use crate::config::AccountBlock;
use crate::security::{CredentialService, PrivilegeSet};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{info, warn};

/// A registered nickname and the account data services need from it.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Display form of the nickname.
    pub name: String,
    /// Stored secret (`scheme:payload`).
    pub secret: String,
    /// Notification address, if one was set.
    pub email: Option<String>,
    pub privileges: PrivilegeSet,
}

impl Identity {
    pub fn new(name: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secret: secret.into(),
            email: None,
            privileges: PrivilegeSet::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_privileges(mut self, privileges: PrivilegeSet) -> Self {
        self.privileges = privileges;
        self
    }
}

/// Read access to the nickname database.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up a nickname, case-insensitively.
    async fn find(&self, nick: &str) -> Option<Identity>;
}

/// In-memory identity store keyed by folded nickname.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    accounts: DashMap<String, Identity>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identity. Fails if the nickname is already taken.
    pub fn insert(&self, identity: Identity) -> Result<(), DbError> {
        let key = irc_to_lower(&identity.name);
        match self.accounts.entry(key) {
            Entry::Occupied(_) => Err(DbError::AccountExists(identity.name)),
            Entry::Vacant(slot) => {
                slot.insert(identity);
                Ok(())
            }
        }
    }

    pub fn remove(&self, nick: &str) -> Option<Identity> {
        self.accounts.remove(&irc_to_lower(nick)).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Build a store from `[[accounts]]` blocks, encrypting each password
    /// with the active scheme.
    pub fn from_config(
        blocks: &[AccountBlock],
        credentials: &CredentialService,
    ) -> Result<Self, DbError> {
        let store = Self::new();
        for block in blocks {
            let (privileges, unknown) = PrivilegeSet::from_tokens(&block.privileges);
            for token in unknown {
                warn!(account = %block.name, token = %token, "Ignoring unknown privilege");
            }

            let mut identity = Identity::new(&block.name, credentials.encrypt(&block.password)?)
                .with_privileges(privileges);
            identity.email = block.email.clone();
            store.insert(identity)?;
        }
        info!(count = store.len(), "Seed accounts loaded");
        Ok(store)
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find(&self, nick: &str) -> Option<Identity> {
        self.accounts
            .get(&irc_to_lower(nick))
            .map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::Privilege;
    use crate::security::credentials::PlainScheme;
    use std::sync::Arc;

    #[tokio::test]
    async fn find_is_case_insensitive() {
        let store = MemoryIdentityStore::new();
        store
            .insert(Identity::new("Alice[m]", "plain:cHc="))
            .unwrap();

        let found = store.find("ALICE{M}").await.unwrap();
        assert_eq!(found.name, "Alice[m]");
        assert!(store.find("bob").await.is_none());
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = MemoryIdentityStore::new();
        store.insert(Identity::new("alice", "plain:")).unwrap();
        let err = store.insert(Identity::new("ALICE", "plain:")).unwrap_err();
        assert!(matches!(err, DbError::AccountExists(name) if name == "ALICE"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn from_config_encrypts_and_grants() {
        let credentials = CredentialService::new(Arc::new(PlainScheme));
        let blocks = vec![AccountBlock {
            name: "oper".to_string(),
            password: "hunter2".to_string(),
            email: Some("oper@example.com".to_string()),
            privileges: vec!["operserv/set".to_string(), "bogus/token".to_string()],
        }];

        let store = MemoryIdentityStore::from_config(&blocks, &credentials).unwrap();
        let oper = store.find("oper").await.unwrap();
        assert_eq!(credentials.decrypt(&oper.secret).unwrap().as_str(), "hunter2");
        assert!(oper.privileges.contains(Privilege::OperServSet));
        assert_eq!(oper.email.as_deref(), Some("oper@example.com"));
    }
}
