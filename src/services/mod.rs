//! IRC services module.
//!
//! Provides the service agents (NickServ, ChanServ, BotServ, OperServ), the
//! command registry they share, and the [`Services`] façade the transport
//! talks to.
//!
//! ```text
//! PRIVMSG NickServ :SENDPASS alice
//!        │
//!        ▼
//! Services::route ── resolve target ──► Request
//!        │
//!        ▼
//! CommandRegistry::dispatch ── checks ──► Command::execute
//!        │
//!        ▼
//! Vec<ServiceEffect> ──► outbound channel
//! ```

pub mod botserv;
pub mod command;
pub mod context;
pub mod effect;
pub mod help;
pub mod nickserv;
pub mod operserv;
pub mod registry;
pub mod source;

pub use command::{Command, CommandDescriptor};
pub use context::ServiceContext;
pub use effect::{ServiceEffect, apply_effects};
pub use registry::{CommandRegistry, Request};
pub use source::CommandSource;

use crate::casemap::irc_eq;
use crate::config::ServicesConfig;
use crate::error::LoadError;
use crate::state::Session;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// The service agents commands can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceKind {
    NickServ,
    ChanServ,
    BotServ,
    OperServ,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::NickServ,
        ServiceKind::ChanServ,
        ServiceKind::BotServ,
        ServiceKind::OperServ,
    ];

    /// Canonical name, used in audit entries.
    pub fn name(self) -> &'static str {
        match self {
            Self::NickServ => "NickServ",
            Self::ChanServ => "ChanServ",
            Self::BotServ => "BotServ",
            Self::OperServ => "OperServ",
        }
    }

    /// Short target alias (`/msg NS ...`).
    pub fn alias(self) -> &'static str {
        match self {
            Self::NickServ => "NS",
            Self::ChanServ => "CS",
            Self::BotServ => "BS",
            Self::OperServ => "OS",
        }
    }

    /// Configured agent nick.
    pub fn agent(self, config: &ServicesConfig) -> &str {
        match self {
            Self::NickServ => &config.nickserv,
            Self::ChanServ => &config.chanserv,
            Self::BotServ => &config.botserv,
            Self::OperServ => &config.operserv,
        }
    }

    /// Resolve a message target to a service by configured nick or alias.
    pub fn resolve(target: &str, config: &ServicesConfig) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| irc_eq(target, kind.agent(config)) || irc_eq(target, kind.alias()))
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Entry point for the transport.
///
/// Owns the registry with every module that loaded successfully. Modules
/// that refused to load are recorded and their verbs answer "Unknown
/// command".
pub struct Services {
    ctx: Arc<ServiceContext>,
    registry: Arc<CommandRegistry>,
    outbound: mpsc::Sender<ServiceEffect>,
    failed_modules: Vec<(&'static str, String)>,
}

impl Services {
    pub fn new(ctx: Arc<ServiceContext>, outbound: mpsc::Sender<ServiceEffect>) -> Self {
        let registry = Arc::new(CommandRegistry::new());
        let mut failed_modules = Vec::new();

        for kind in ServiceKind::ALL {
            if let Err(e) = help::load(&registry, kind) {
                warn!(service = %kind, error = %e, "Failed to load HELP");
                failed_modules.push(("help", e.to_string()));
            }
        }

        let modules: [(&'static str, Result<(), LoadError>); 2] = [
            ("ns_sendpass", nickserv::load(&ctx, &registry)),
            ("os_set", operserv::load(&registry)),
        ];
        for (module, result) in modules {
            match result {
                Ok(()) => info!(module, "Module loaded"),
                Err(e) => {
                    warn!(module, error = %e, "Module not loaded");
                    failed_modules.push((module, e.to_string()));
                }
            }
        }

        Self {
            ctx,
            registry,
            outbound,
            failed_modules,
        }
    }

    pub fn ctx(&self) -> &Arc<ServiceContext> {
        &self.ctx
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Modules that refused to load, with the reason.
    pub fn failed_modules(&self) -> &[(&'static str, String)] {
        &self.failed_modules
    }

    pub fn resolve_target(&self, target: &str) -> Option<ServiceKind> {
        ServiceKind::resolve(target, &self.ctx.config.services)
    }

    /// Route a private message. Returns false when `target` is not a
    /// service, in which case nothing is sent.
    pub async fn route(&self, session: &Arc<Session>, target: &str, text: &str) -> bool {
        let Some(service) = self.resolve_target(target) else {
            return false;
        };
        let request = Request::parse(Arc::clone(session), service, text);
        let effects = self.dispatch(request).await;
        apply_effects(&self.outbound, effects).await;
        true
    }

    /// Dispatch one request and return its effects without delivering them.
    pub async fn dispatch(&self, request: Request) -> Vec<ServiceEffect> {
        self.registry.dispatch(&self.ctx, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_nicks_and_aliases_case_insensitively() {
        let config = ServicesConfig::default();
        assert_eq!(ServiceKind::resolve("nickserv", &config), Some(ServiceKind::NickServ));
        assert_eq!(ServiceKind::resolve("OS", &config), Some(ServiceKind::OperServ));
        assert_eq!(ServiceKind::resolve("bs", &config), Some(ServiceKind::BotServ));
        assert_eq!(ServiceKind::resolve("alice", &config), None);
    }

    #[test]
    fn resolves_renamed_agents() {
        let config = ServicesConfig {
            operserv: "Oper[Serv]".to_string(),
            ..ServicesConfig::default()
        };
        assert_eq!(ServiceKind::resolve("oper{serv}", &config), Some(ServiceKind::OperServ));
        assert_eq!(ServiceKind::resolve("OperServ", &config), None);
    }
}
