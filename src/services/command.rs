//! Command descriptors and the handler trait.

use super::ServiceKind;
use super::source::CommandSource;
use crate::error::ServiceError;
use crate::security::Privilege;
use async_trait::async_trait;

/// Static description of a registered command: who owns it, how many
/// arguments it takes and who may run it.
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    pub service: ServiceKind,
    /// Uppercase verb.
    pub name: &'static str,
    /// Inclusive argument bounds.
    pub min_params: usize,
    pub max_params: usize,
    /// Privilege required to run the command; `None` means unrestricted.
    pub permission: Option<Privilege>,
    /// Whether sessions without an identified account may use it.
    pub allow_unregistered: bool,
    /// One-line summary for service listings.
    pub description: &'static str,
    /// Argument synopsis for syntax errors, e.g. `\x1fnickname\x1f`.
    pub syntax: Option<&'static str>,
}

impl CommandDescriptor {
    pub const fn new(
        service: ServiceKind,
        name: &'static str,
        min_params: usize,
        max_params: usize,
    ) -> Self {
        Self {
            service,
            name,
            min_params,
            max_params,
            permission: None,
            allow_unregistered: false,
            description: "",
            syntax: None,
        }
    }

    pub const fn permission(mut self, privilege: Privilege) -> Self {
        self.permission = Some(privilege);
        self
    }

    pub const fn allow_unregistered(mut self) -> Self {
        self.allow_unregistered = true;
        self
    }

    pub const fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub const fn syntax(mut self, syntax: &'static str) -> Self {
        self.syntax = Some(syntax);
        self
    }

    /// Whether `count` arguments satisfy the bounds.
    pub fn accepts(&self, count: usize) -> bool {
        (self.min_params..=self.max_params).contains(&count)
    }

    /// `Service/VERB`, as used in audit entries.
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.service, self.name)
    }
}

/// A service command.
///
/// The dispatcher has already checked identification, argument count and
/// the descriptor's privilege by the time `execute` runs.
#[async_trait]
pub trait Command: Send + Sync {
    fn descriptor(&self) -> &CommandDescriptor;

    async fn execute(
        &self,
        source: &mut CommandSource,
        params: &[String],
    ) -> Result<(), ServiceError>;

    /// Detailed help for `HELP VERB [subcommand]`. Returns false when the
    /// subcommand is not a known topic.
    fn on_help(&self, _source: &mut CommandSource, _subcommand: &str) -> bool {
        false
    }

    /// Called instead of `execute` when the arguments do not fit.
    fn on_syntax_error(&self, source: &mut CommandSource, _subcommand: &str) {
        source.syntax_error(self.descriptor());
    }

    /// One line in the service's command listing.
    fn on_serv_help(&self, source: &mut CommandSource) {
        let descriptor = self.descriptor();
        if !descriptor.description.is_empty() {
            source.reply(format!(
                "    {:<14}{}",
                descriptor.name, descriptor.description
            ));
        }
    }
}
