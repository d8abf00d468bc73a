//! SET command handler for OperServ.
//!
//! Owns the values of the process-wide capability flags. Enforcing
//! read-only or no-expire mode elsewhere is not its concern.

use crate::audit::LogLevel;
use crate::error::ServiceError;
use crate::security::Privilege;
use crate::services::ServiceKind;
use crate::services::command::{Command, CommandDescriptor};
use crate::services::source::CommandSource;
use crate::state::DEBUG_ON_LEVEL;
use async_trait::async_trait;

/// A parsed `SET DEBUG` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSetting {
    On,
    Off,
    Level(u32),
}

impl DebugSetting {
    /// `ON`, `OFF`, or an unsigned decimal level. A level of zero is `Off`.
    pub fn parse(setting: &str) -> Option<Self> {
        if setting.eq_ignore_ascii_case("ON") {
            return Some(Self::On);
        }
        if setting.eq_ignore_ascii_case("OFF") {
            return Some(Self::Off);
        }
        if setting.is_empty() || !setting.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match setting.parse::<u32>().ok()? {
            0 => Some(Self::Off),
            n => Some(Self::Level(n)),
        }
    }

    pub fn level(self) -> u32 {
        match self {
            Self::On => DEBUG_ON_LEVEL,
            Self::Off => 0,
            Self::Level(n) => n,
        }
    }
}

fn parse_switch(setting: &str) -> Option<bool> {
    if setting.eq_ignore_ascii_case("ON") {
        Some(true)
    } else if setting.eq_ignore_ascii_case("OFF") {
        Some(false)
    } else {
        None
    }
}

fn state_line(name: &str, enabled: bool) -> String {
    if enabled {
        format!("{name} is enabled")
    } else {
        format!("{name} is disabled")
    }
}

/// `SET <option> <setting>`.
pub struct SetCommand {
    descriptor: CommandDescriptor,
}

impl Default for SetCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl SetCommand {
    pub fn new() -> Self {
        Self {
            descriptor: CommandDescriptor::new(ServiceKind::OperServ, "SET", 1, 2)
                .permission(Privilege::OperServSet)
                .description("Set various global Services options")
                .syntax("\x1foption\x1f \x1fsetting\x1f"),
        }
    }

    fn do_list(&self, source: &mut CommandSource) {
        source.log(LogLevel::Admin, "LIST");
        let flags = source.ctx().capabilities.snapshot();
        source.reply(state_line("READONLY", flags.readonly));
        source.reply(state_line("DEBUG", flags.debug > 0));
        source.reply(state_line("NOEXPIRE", flags.noexpire));
    }

    fn do_readonly(&self, source: &mut CommandSource, setting: &str) {
        match parse_switch(setting) {
            Some(on) => {
                source.ctx().capabilities.set_readonly(on);
                source.log(LogLevel::Admin, format!("READONLY {}", if on { "ON" } else { "OFF" }));
                source.reply(if on {
                    "Services are now in \x02read-only\x02 mode."
                } else {
                    "Services are now in \x02read-write\x02 mode."
                });
            }
            None => source.reply("Setting for READONLY must be \x02on\x02 or \x02off\x02."),
        }
    }

    fn do_noexpire(&self, source: &mut CommandSource, setting: &str) {
        match parse_switch(setting) {
            Some(on) => {
                source.ctx().capabilities.set_noexpire(on);
                source.log(LogLevel::Admin, format!("NOEXPIRE {}", if on { "ON" } else { "OFF" }));
                source.reply(if on {
                    "Services are now in \x02no expire\x02 mode."
                } else {
                    "Services are now in \x02expire\x02 mode."
                });
            }
            None => source.reply("Setting for NOEXPIRE must be \x02on\x02 or \x02off\x02."),
        }
    }

    fn do_superadmin(&self, source: &mut CommandSource, setting: &str) {
        if !source.ctx().config.operserv.superadmin {
            source.reply("SuperAdmin setting not enabled in services.conf");
            return;
        }
        let Some(on) = parse_switch(setting) else {
            source.reply(
                "Setting for SuperAdmin must be \x02on\x02 or \x02off\x02 (must be enabled in services.conf)",
            );
            return;
        };

        source.session().set_super_admin(on);
        let nick = source.nick().to_string();
        if on {
            source.log(LogLevel::Admin, "SUPERADMIN ON");
            source.reply("You are now a SuperAdmin");
            source.globops(format!("{nick} is now a Super-Admin"));
        } else {
            source.log(LogLevel::Admin, "SUPERADMIN OFF");
            source.reply("You are no longer a SuperAdmin");
            source.globops(format!("{nick} is no longer a Super-Admin"));
        }
    }

    fn do_debug(&self, source: &mut CommandSource, setting: &str) {
        let Some(debug) = DebugSetting::parse(setting) else {
            source.reply("Setting for DEBUG must be \x02ON\x02, \x02OFF\x02, or a positive number.");
            return;
        };

        source.ctx().capabilities.set_debug(debug.level());
        match debug {
            DebugSetting::On => {
                source.log(LogLevel::Admin, "DEBUG ON");
                source.reply("Services are now in debug mode.");
            }
            DebugSetting::Off => {
                source.log(LogLevel::Admin, "DEBUG OFF");
                source.reply("Services are now in non-debug mode.");
            }
            DebugSetting::Level(n) => {
                source.log(LogLevel::Admin, format!("DEBUG {n}"));
                source.reply(format!("Services are now in debug mode (level {n})."));
            }
        }
    }
}

#[async_trait]
impl Command for SetCommand {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    async fn execute(&self, source: &mut CommandSource, params: &[String]) -> Result<(), ServiceError> {
        let option = params[0].to_ascii_uppercase();
        let setting = params.get(1).map(String::as_str).unwrap_or("");

        if option == "LIST" {
            self.do_list(source);
            return Ok(());
        }

        let handler: fn(&Self, &mut CommandSource, &str) = match option.as_str() {
            "READONLY" => Self::do_readonly,
            "NOEXPIRE" => Self::do_noexpire,
            "SUPERADMIN" => Self::do_superadmin,
            "DEBUG" => Self::do_debug,
            _ => {
                source.reply(format!("Unknown option \x02{}\x02.", params[0]));
                return Ok(());
            }
        };

        if setting.is_empty() {
            self.on_syntax_error(source, &option);
            return Ok(());
        }
        handler(self, source, setting);
        Ok(())
    }

    fn on_help(&self, source: &mut CommandSource, subcommand: &str) -> bool {
        let text = match subcommand.to_ascii_uppercase().as_str() {
            "" => {
                source.syntax_error(&self.descriptor);
                "Sets various global Services options.  Option names\n\
                 currently defined are:\n\
                 \x20   READONLY   Set read-only or read-write mode\n\
                 \x20   DEBUG      Activate or deactivate debug mode\n\
                 \x20   NOEXPIRE   Activate or deactivate no expire mode\n\
                 \x20   SUPERADMIN Activate or deactivate super-admin mode\n\
                 \x20   LIST       List the options"
                    .to_string()
            }
            "LIST" => format!(
                "Syntax: \x02LIST\x02\n\
                 Display the various {} settings",
                source.agent()
            ),
            "READONLY" => "Syntax: \x02READONLY {ON | OFF}\x02\n\
                 \n\
                 Sets read-only mode on or off.  In read-only mode, normal\n\
                 users will not be allowed to modify any Services data,\n\
                 including channel and nickname access lists, etc.  IRCops\n\
                 with sufficient Services privileges will be able to modify\n\
                 Services' AKILL list and drop or forbid nicknames and\n\
                 channels, but any such changes will not be saved unless\n\
                 read-only mode is deactivated before Services is terminated\n\
                 or restarted.\n\
                 \n\
                 This option is equivalent to the command-line option\n\
                 \x02-readonly\x02."
                .to_string(),
            "DEBUG" => "Syntax: \x02DEBUG {ON | OFF | \x1flevel\x1f}\x02\n\
                 Sets debug mode on or off. A numeric level sets how much\n\
                 detail is logged; 0 is the same as OFF.\n\
                 This option is equivalent to the command-line option\n\
                 \x02-debug\x02."
                .to_string(),
            "NOEXPIRE" => "Syntax: \x02NOEXPIRE {ON | OFF}\x02\n\
                 Sets no expire mode on or off. In no expire mode, nicks,\n\
                 channels, akills and exceptions won't expire until the\n\
                 option is unset.\n\
                 This option is equivalent to the command-line option\n\
                 \x02-noexpire\x02."
                .to_string(),
            "SUPERADMIN" => "Syntax: \x02SUPERADMIN {ON | OFF}\x02\n\
                 Setting this will grant you extra privileges such as the\n\
                 ability to be \"founder\" on all channel's etc...\n\
                 This option is \x02not\x02 persistent, and should only be used when\n\
                 needed, and set back to OFF when no longer needed."
                .to_string(),
            _ => return false,
        };
        if subcommand.is_empty() {
            source.reply("");
        }
        source.reply(text);
        true
    }
}
