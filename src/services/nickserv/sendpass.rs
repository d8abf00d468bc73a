//! SENDPASS command handler for NickServ.

use crate::audit::LogLevel;
use crate::error::{LoadError, ServiceError};
use crate::security::Privilege;
use crate::services::ServiceKind;
use crate::services::command::{Command, CommandDescriptor};
use crate::services::context::ServiceContext;
use crate::services::source::CommandSource;
use async_trait::async_trait;
use tracing::debug;
use zeroize::Zeroizing;

const MODULE: &str = "ns_sendpass";

/// Mails the recovered password of a nickname to its owner.
pub struct SendpassCommand {
    descriptor: CommandDescriptor,
}

impl SendpassCommand {
    /// Check mail and the encryption scheme before accepting requests.
    ///
    /// Refuses to load when mail is off or the active scheme cannot give a
    /// password back.
    pub fn load(ctx: &ServiceContext) -> Result<Self, LoadError> {
        if !ctx.mail.enabled() {
            return Err(LoadError::MailDisabled { module: MODULE });
        }
        if let Err(e) = ctx.credentials.self_test() {
            debug!(error = %e, "SENDPASS self-test failed");
            return Err(LoadError::IncompatibleEncryption {
                module: MODULE,
                scheme: ctx.credentials.scheme_kind().prefix(),
            });
        }
        Ok(Self {
            descriptor: CommandDescriptor::new(ServiceKind::NickServ, "SENDPASS", 1, 1)
                .allow_unregistered()
                .description("Forgot your password? Try this")
                .syntax("\x1fnickname\x1f"),
        })
    }
}

fn mail_body(nick: &str, password: &str, network: &str) -> Zeroizing<String> {
    Zeroizing::new(format!(
        "Hi,\n\
         \n\
         You have requested to receive the password of nickname {nick} by e-mail.\n\
         The password is {password}. For security purposes, you should change it as soon as you receive this mail.\n\
         \n\
         If you don't know why this mail was sent to you, please ignore it silently.\n\
         \n\
         {network} administrators."
    ))
}

#[async_trait]
impl Command for SendpassCommand {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    async fn execute(&self, source: &mut CommandSource, params: &[String]) -> Result<(), ServiceError> {
        let nick = params[0].as_str();
        let ctx = source.ctx().clone();
        let restricted = ctx.mail.restricted();

        if restricted && !source.session().has_privilege(Privilege::NickServSendpass) {
            return Err(ServiceError::AccessDenied);
        }

        let identity = ctx
            .identities
            .find(nick)
            .await
            .ok_or_else(|| ServiceError::UnknownIdentity(nick.to_string()))?;

        let password = ctx
            .credentials
            .decrypt(&identity.secret)
            .map_err(|reason| ServiceError::CapabilityUnavailable {
                command: "SENDPASS",
                reason,
            })?;

        let subject = format!("Nickname password ({})", identity.name);
        let body = mail_body(&identity.name, &password, &ctx.config.network.name);
        drop(password);

        ctx.mail
            .send(source.nick(), &identity, source.agent(), &subject, body)
            .await?;

        let level = if restricted { LogLevel::Admin } else { LogLevel::Command };
        source.log(level, format!("for {}", identity.name));
        source.reply(format!("Password of \x02{}\x02 has been sent.", nick));
        Ok(())
    }

    fn on_help(&self, source: &mut CommandSource, _subcommand: &str) -> bool {
        source.reply(
            "Syntax: \x02SENDPASS \x1fnickname\x1f\x02\n\
             \n\
             Send the password of the given nickname to the e-mail address\n\
             set in the nickname record. This command is really useful\n\
             to deal with lost passwords.\n\
             \n\
             May be limited to \x02IRC operators\x02 on certain networks.",
        );
        true
    }
}
