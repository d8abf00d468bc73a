//! Help subsystem.
//!
//! Every service gets a `HELP` command. `HELP` alone lists the commands the
//! requester may see; `HELP VERB [topic]` asks the command for its detailed
//! text. A topic nobody recognizes is handled exactly like a syntax error on
//! `HELP`, and the syntax-error path of `HELP` is the general listing, so a
//! malformed help request always degrades to the full menu.

use super::ServiceKind;
use super::botserv;
use super::command::{Command, CommandDescriptor};
use super::registry::CommandRegistry;
use super::source::CommandSource;
use crate::error::{RegistryError, ServiceError};
use crate::state::Session;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HelpError {
    #[error("no help available for {0}")]
    UnknownTopic(String),
}

/// Whether `descriptor` shows up for `session` in listings and detailed help.
pub fn is_visible(descriptor: &CommandDescriptor, session: &Session, hide_privileged: bool) -> bool {
    match descriptor.permission {
        None => true,
        Some(_) if !hide_privileged => true,
        Some(privilege) => session.has_privilege(privilege),
    }
}

fn header(source: &CommandSource) -> String {
    let agent = source.agent();
    match source.service() {
        ServiceKind::NickServ => format!(
            "\x02{agent}\x02 allows you to \"register\" a nickname and\n\
             prevent others from using it. The following\n\
             commands allow for registration and maintenance of\n\
             nicknames; to use them, type \x02/msg {agent} \x1fcommand\x1f\x02.\n\
             For more information on a specific command, type\n\
             \x02/msg {agent} HELP \x1fcommand\x1f\x02."
        ),
        ServiceKind::ChanServ => format!(
            "\x02{agent}\x02 allows you to register and control various\n\
             aspects of channels. To use a command, type\n\
             \x02/msg {agent} \x1fcommand\x1f\x02.\n\
             For more information on a specific command, type\n\
             \x02/msg {agent} HELP \x1fcommand\x1f\x02."
        ),
        ServiceKind::BotServ => format!(
            "\x02{agent}\x02 allows you to have a bot on your own channel.\n\
             Available commands are listed below; to use them, type\n\
             \x02/msg {agent} \x1fcommand\x1f\x02. For more information on a\n\
             specific command, type \x02/msg {agent} HELP \x1fcommand\x1f\x02."
        ),
        ServiceKind::OperServ => format!(
            "\x02{agent}\x02 commands:\n\
             Notice: All commands sent to {agent} are logged!"
        ),
    }
}

/// The filtered command listing for the requester's service.
pub fn general_listing(source: &mut CommandSource) {
    let text = header(source);
    source.reply(text);
    source.reply("");

    let hide = source.ctx().config.services.hide_privileged_commands;
    let commands = source.registry().commands_for(source.service());
    for command in commands {
        if is_visible(command.descriptor(), source.session(), hide) {
            command.on_serv_help(source);
        }
    }

    if source.service() == ServiceKind::BotServ {
        let footer = botserv::help_footer(source.ctx());
        source.reply("");
        source.reply(footer);
    }
}

/// Detailed help for `topic` (a verb) with an optional subcommand.
pub fn describe(source: &mut CommandSource, topic: &str, subcommand: &str) -> Result<(), HelpError> {
    let unknown = || HelpError::UnknownTopic(topic.to_ascii_uppercase());
    let command = source
        .registry()
        .find(source.service(), topic)
        .ok_or_else(unknown)?;

    let hide = source.ctx().config.services.hide_privileged_commands;
    if !is_visible(command.descriptor(), source.session(), hide) {
        return Err(unknown());
    }
    if command.on_help(source, subcommand) {
        Ok(())
    } else {
        Err(unknown())
    }
}

/// `HELP` for one service.
pub struct HelpCommand {
    descriptor: CommandDescriptor,
}

impl HelpCommand {
    pub fn new(service: ServiceKind) -> Self {
        Self {
            descriptor: CommandDescriptor::new(service, "HELP", 0, 2).allow_unregistered(),
        }
    }
}

#[async_trait]
impl Command for HelpCommand {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    async fn execute(&self, source: &mut CommandSource, params: &[String]) -> Result<(), ServiceError> {
        let Some(topic) = params.first() else {
            general_listing(source);
            return Ok(());
        };
        let subcommand = params.get(1).map(String::as_str).unwrap_or("");
        if let Err(HelpError::UnknownTopic(_)) = describe(source, topic, subcommand) {
            self.on_syntax_error(source, topic);
        }
        Ok(())
    }

    fn on_syntax_error(&self, source: &mut CommandSource, _subcommand: &str) {
        general_listing(source);
    }
}

pub fn load(registry: &CommandRegistry, service: ServiceKind) -> Result<(), RegistryError> {
    registry.register(Arc::new(HelpCommand::new(service)))
}
