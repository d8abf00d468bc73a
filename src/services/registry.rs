//! Command registry and dispatch.
//!
//! The `CommandRegistry` maps (service, verb) to a command and enforces the
//! dispatch contract before any handler runs:
//!
//! 1. unknown verb → "Unknown command" reply
//! 2. unidentified requester on a command that needs an account → access denied
//! 3. argument count outside the descriptor bounds → the command's syntax path
//! 4. missing privilege → access denied
//! 5. otherwise run the handler; its errors become one reply line
//!
//! Handlers run in their own task. Dropping a dispatch future (requester
//! gone) does not interrupt the command, so audit entries and state changes
//! it makes always complete; only its replies are lost.

use super::ServiceKind;
use super::command::Command;
use super::context::ServiceContext;
use super::effect::ServiceEffect;
use super::source::CommandSource;
use crate::error::{RegistryError, ServiceError};
use crate::state::Session;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Instrument, Level, debug, error, span};

/// An inbound service command.
#[derive(Debug, Clone)]
pub struct Request {
    pub session: Arc<Session>,
    pub service: ServiceKind,
    pub verb: String,
    pub params: Vec<String>,
    /// Text as the requester typed it.
    pub raw: String,
}

impl Request {
    pub fn new(
        session: Arc<Session>,
        service: ServiceKind,
        verb: impl Into<String>,
        params: Vec<String>,
    ) -> Self {
        let verb = verb.into();
        let raw = std::iter::once(verb.as_str())
            .chain(params.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            session,
            service,
            verb,
            params,
            raw,
        }
    }

    /// Split message text into verb and arguments. Empty text asks for HELP.
    pub fn parse(session: Arc<Session>, service: ServiceKind, text: &str) -> Self {
        let mut parts = text.split_whitespace();
        let verb = parts.next().unwrap_or("HELP").to_string();
        let params = parts.map(str::to_string).collect();
        Self {
            session,
            service,
            verb,
            params,
            raw: text.trim().to_string(),
        }
    }
}

struct Registered {
    command: Arc<dyn Command>,
    count: AtomicU64,
}

/// Registry of service commands.
#[derive(Default)]
pub struct CommandRegistry {
    commands: RwLock<BTreeMap<(ServiceKind, String), Arc<Registered>>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under its descriptor's service and verb.
    pub fn register(&self, command: Arc<dyn Command>) -> Result<(), RegistryError> {
        let descriptor = command.descriptor();
        let verb = descriptor.name.to_ascii_uppercase();
        if descriptor.min_params > descriptor.max_params {
            return Err(RegistryError::InvalidBounds {
                verb,
                min: descriptor.min_params,
                max: descriptor.max_params,
            });
        }

        let service = descriptor.service;
        let mut commands = self.commands.write();
        let key = (service, verb);
        if commands.contains_key(&key) {
            return Err(RegistryError::DuplicateVerb {
                service,
                verb: key.1,
            });
        }
        debug!(service = %service, verb = %key.1, "Command registered");
        commands.insert(
            key,
            Arc::new(Registered {
                command,
                count: AtomicU64::new(0),
            }),
        );
        Ok(())
    }

    /// Remove a command. Returns whether it was registered.
    pub fn unregister(&self, service: ServiceKind, verb: &str) -> bool {
        self.commands
            .write()
            .remove(&(service, verb.to_ascii_uppercase()))
            .is_some()
    }

    /// Case-insensitive lookup.
    pub fn find(&self, service: ServiceKind, verb: &str) -> Option<Arc<dyn Command>> {
        self.lookup(service, verb).map(|r| Arc::clone(&r.command))
    }

    fn lookup(&self, service: ServiceKind, verb: &str) -> Option<Arc<Registered>> {
        self.commands
            .read()
            .get(&(service, verb.to_ascii_uppercase()))
            .cloned()
    }

    /// All commands of a service, ordered by verb.
    pub fn commands_for(&self, service: ServiceKind) -> Vec<Arc<dyn Command>> {
        self.commands
            .read()
            .iter()
            .filter(|((s, _), _)| *s == service)
            .map(|(_, r)| Arc::clone(&r.command))
            .collect()
    }

    /// Usage counts of commands that have run, most used first.
    pub fn command_stats(&self) -> Vec<(String, u64)> {
        let mut stats: Vec<_> = self
            .commands
            .read()
            .iter()
            .map(|((service, verb), r)| {
                (format!("{service}/{verb}"), r.count.load(Ordering::Relaxed))
            })
            .filter(|(_, count)| *count > 0)
            .collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        stats
    }

    /// Resolve, validate and run one request, returning the effects to deliver.
    pub async fn dispatch(
        self: &Arc<Self>,
        ctx: &Arc<ServiceContext>,
        request: Request,
    ) -> Vec<ServiceEffect> {
        let Request {
            session,
            service,
            verb,
            params,
            raw,
        } = request;
        let mut source = CommandSource::new(
            Arc::clone(&session),
            service,
            Arc::clone(ctx),
            Arc::clone(self),
        );

        let Some(registered) = self.lookup(service, &verb) else {
            debug!(service = %service, verb = %verb, uid = %session.uid(), "Unknown service command");
            let text = ServiceError::UnknownCommand(verb.to_ascii_uppercase()).reply_text(source.agent());
            source.reply(text);
            return source.into_effects();
        };
        let command = Arc::clone(&registered.command);
        let descriptor = command.descriptor();
        source.set_command(descriptor.qualified_name());

        if !descriptor.allow_unregistered && !session.is_identified() {
            debug!(command = %descriptor.qualified_name(), uid = %session.uid(), "Unidentified requester denied");
            let text = ServiceError::AccessDenied.reply_text(source.agent());
            source.reply(text);
            return source.into_effects();
        }

        if !descriptor.accepts(params.len()) {
            debug!(
                command = %descriptor.qualified_name(),
                given = params.len(),
                min = descriptor.min_params,
                max = descriptor.max_params,
                raw = %raw,
                "Syntax error"
            );
            let subcommand = params.first().map(String::as_str).unwrap_or("");
            command.on_syntax_error(&mut source, subcommand);
            return source.into_effects();
        }

        if let Some(privilege) = descriptor.permission
            && !session.has_privilege(privilege)
        {
            debug!(
                command = %descriptor.qualified_name(),
                uid = %session.uid(),
                privilege = %privilege,
                "Missing privilege"
            );
            let text = ServiceError::AccessDenied.reply_text(source.agent());
            source.reply(text);
            return source.into_effects();
        }

        registered.count.fetch_add(1, Ordering::Relaxed);

        let command_span = span!(
            Level::DEBUG,
            "services.command",
            service = %service,
            verb = %descriptor.name,
            uid = %session.uid(),
            nick = %session.nick(),
        );

        let task = tokio::spawn(
            async move {
                if let Err(e) = command.execute(&mut source, &params).await {
                    debug!(error = %e, code = e.error_code(), "Command failed");
                    let text = e.reply_text(source.agent());
                    source.reply(text);
                }
                source.into_effects()
            }
            .instrument(command_span),
        );

        match task.await {
            Ok(effects) => effects,
            Err(e) => {
                error!(service = %service, verb = %verb, error = %e, "Command task failed");
                let mut source = CommandSource::new(session, service, Arc::clone(ctx), Arc::clone(self));
                let text = ServiceError::Internal(e.to_string()).reply_text(source.agent());
                source.reply(text);
                source.into_effects()
            }
        }
    }
}
