//! slservices - console front end for the services core.
//!
//! Reads `<nick> <target> <text>` lines on stdin, routes them to the service
//! agents and prints every outbound effect on stdout.

use slircd_services::casemap::irc_to_lower;
use slircd_services::config::{Config, validation};
use slircd_services::db::{IdentityStore, MemoryIdentityStore};
use slircd_services::mail::NotificationService;
use slircd_services::security::CredentialService;
use slircd_services::services::{ServiceContext, Services};
use slircd_services::state::Session;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validation::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "{} configuration error(s) in {}",
            errors.len(),
            config_path
        ));
    }

    info!(
        network = %config.network.name,
        scheme = config.encryption.scheme.prefix(),
        mail = config.mail.enabled,
        "Starting slservices"
    );

    let config = Arc::new(config);
    let credentials = Arc::new(CredentialService::from_config(&config.encryption)?);
    let mail = Arc::new(NotificationService::from_config(&config.mail));
    let identities = Arc::new(MemoryIdentityStore::from_config(&config.accounts, &credentials)?);

    let ctx = Arc::new(ServiceContext::new(
        Arc::clone(&config),
        credentials,
        mail,
        Arc::clone(&identities) as Arc<dyn IdentityStore>,
    ));

    let (tx, mut rx) = mpsc::channel(256);
    let services = Services::new(ctx, tx);
    for (module, reason) in services.failed_modules() {
        warn!(module, reason = %reason, "Running without module");
    }

    let printer = tokio::spawn(async move {
        while let Some(effect) = rx.recv().await {
            println!("{effect}");
        }
    });

    let mut sessions: HashMap<String, Arc<Session>> = HashMap::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.splitn(3, ' ');
        let (Some(nick), Some(target)) = (parts.next(), parts.next()) else {
            warn!(line = %line, "Expected <nick> <target> <text>");
            continue;
        };
        let text = parts.next().unwrap_or("");

        let key = irc_to_lower(nick);
        let session = match sessions.get(&key) {
            Some(session) => Arc::clone(session),
            None => {
                let uid = format!("000AAA{:03}", sessions.len());
                let session = match identities.find(nick).await {
                    Some(account) => Session::identified(uid, nick, account),
                    None => Session::new(uid, nick),
                };
                let session = Arc::new(session);
                sessions.insert(key, Arc::clone(&session));
                session
            }
        };

        if !services.route(&session, target, text).await {
            warn!(target = %target, "Not a service");
        }
    }

    info!(stats = ?services.registry().command_stats(), "Shutting down");
    drop(services);
    printer.await?;
    Ok(())
}
