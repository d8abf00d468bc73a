//! Shared services context.
//!
//! Holds everything commands need beyond the request itself. Created once at
//! startup and shared as `Arc<ServiceContext>`; it lives until shutdown.

use super::ServiceKind;
use crate::audit::AuditLog;
use crate::config::Config;
use crate::db::IdentityStore;
use crate::mail::NotificationService;
use crate::security::CredentialService;
use crate::state::CapabilityStore;
use std::sync::Arc;

pub struct ServiceContext {
    pub config: Arc<Config>,
    pub capabilities: Arc<CapabilityStore>,
    pub credentials: Arc<CredentialService>,
    pub mail: Arc<NotificationService>,
    pub identities: Arc<dyn IdentityStore>,
    pub audit: Arc<AuditLog>,
}

impl ServiceContext {
    /// Build a context whose capability store and audit log are derived from
    /// `config`.
    pub fn new(
        config: Arc<Config>,
        credentials: Arc<CredentialService>,
        mail: Arc<NotificationService>,
        identities: Arc<dyn IdentityStore>,
    ) -> Self {
        Self {
            capabilities: Arc::new(CapabilityStore::from_config(&config.capabilities)),
            audit: Arc::new(AuditLog::default()),
            config,
            credentials,
            mail,
            identities,
        }
    }

    /// Configured nick for a service agent.
    pub fn agent(&self, service: ServiceKind) -> &str {
        service.agent(&self.config.services)
    }
}
