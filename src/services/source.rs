//! Per-request command source.
//!
//! A `CommandSource` is what a command sees of the requester: the session,
//! the service it was addressed to, the shared services context, and an
//! ordered buffer of effects (reply lines, broadcasts) to deliver once the
//! command finishes.

use super::command::CommandDescriptor;
use super::context::ServiceContext;
use super::effect::ServiceEffect;
use super::registry::CommandRegistry;
use super::ServiceKind;
use crate::audit::LogLevel;
use crate::state::Session;
use std::sync::Arc;

pub struct CommandSource {
    session: Arc<Session>,
    service: ServiceKind,
    agent: String,
    command: String,
    ctx: Arc<ServiceContext>,
    registry: Arc<CommandRegistry>,
    effects: Vec<ServiceEffect>,
}

impl CommandSource {
    pub fn new(
        session: Arc<Session>,
        service: ServiceKind,
        ctx: Arc<ServiceContext>,
        registry: Arc<CommandRegistry>,
    ) -> Self {
        let agent = ctx.agent(service).to_string();
        Self {
            session,
            service,
            agent,
            command: String::new(),
            ctx,
            registry,
            effects: Vec::new(),
        }
    }

    /// Set the qualified command name used for audit entries.
    pub(super) fn set_command(&mut self, command: String) {
        self.command = command;
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn nick(&self) -> &str {
        self.session.nick()
    }

    pub fn service(&self) -> ServiceKind {
        self.service
    }

    /// Configured nick of the service agent handling this request.
    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn ctx(&self) -> &Arc<ServiceContext> {
        &self.ctx
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Queue reply text. Embedded newlines become separate lines and an
    /// empty line is sent as a single space.
    pub fn reply(&mut self, text: impl AsRef<str>) {
        for line in text.as_ref().split('\n') {
            let line = if line.is_empty() { " " } else { line };
            self.effects.push(ServiceEffect::Reply {
                target_uid: self.session.uid().to_string(),
                from: self.agent.clone(),
                text: line.to_string(),
            });
        }
    }

    /// Queue a network-wide operator notice from this service.
    pub fn globops(&mut self, text: impl Into<String>) {
        self.effects.push(ServiceEffect::Globops {
            from: self.agent.clone(),
            text: text.into(),
        });
    }

    /// Standard usage reply for a command.
    pub fn syntax_error(&mut self, descriptor: &CommandDescriptor) {
        match descriptor.syntax {
            Some(syntax) => self.reply(format!("Syntax: \x02{} {}\x02", descriptor.name, syntax)),
            None => self.reply(format!("Syntax: \x02{}\x02", descriptor.name)),
        }
        self.reply(format!(
            "\x02/msg {} HELP {}\x02 for more information.",
            self.agent, descriptor.name
        ));
    }

    /// Record an audit entry for the running command. Entries are written
    /// immediately, ahead of any queued reply.
    pub fn log(&self, level: LogLevel, detail: impl Into<String>) {
        let account = self.session.account().map(|a| a.name.as_str());
        self.ctx
            .audit
            .record(level, self.session.nick(), account, &self.command, detail);
    }

    /// Reply lines queued so far (tests and HELP output comparison).
    pub fn reply_lines(&self) -> Vec<&str> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                ServiceEffect::Reply { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn into_effects(self) -> Vec<ServiceEffect> {
        self.effects
    }
}
