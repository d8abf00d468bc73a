//! Mail transports.

use super::{Mail, MailError, MailTransport};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// Strip characters that would let a value break out of its header line.
fn header_safe(value: &str) -> String {
    value.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

/// Render `mail` as an RFC 5322 message.
pub(crate) fn render(mail: &Mail) -> String {
    let date = chrono::Utc::now().to_rfc2822();
    let mut message = format!(
        "From: {} <{}>\r\nTo: \"{}\" <{}>\r\nSubject: {}\r\nDate: {}\r\nContent-Type: text/plain; charset=UTF-8\r\n\r\n",
        header_safe(&mail.from_agent),
        header_safe(&mail.from_address),
        header_safe(&mail.to_name),
        header_safe(&mail.to_address),
        header_safe(&mail.subject),
        date,
    );
    for line in mail.body.lines() {
        message.push_str(line);
        message.push_str("\r\n");
    }
    message
}

/// Pipes messages into a sendmail-compatible binary (`sendmail -t`).
#[derive(Debug, Clone)]
pub struct SendmailTransport {
    path: String,
}

impl SendmailTransport {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MailTransport for SendmailTransport {
    fn name(&self) -> &'static str {
        "sendmail"
    }

    async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        let mut child = Command::new(&self.path)
            .arg("-t")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(render(mail).as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let status = child.wait().await?;
        debug!(path = %self.path, status = ?status.code(), "sendmail finished");
        if status.success() {
            Ok(())
        } else {
            Err(MailError::Exited(status.code()))
        }
    }
}

/// Records sends in the log without delivering anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        info!(
            to = %mail.to_address,
            from = %mail.from_agent,
            subject = %mail.subject,
            "Mail not delivered (no sendmail configured)"
        );
        Ok(())
    }
}
