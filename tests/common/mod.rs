//! Integration test common infrastructure.
//!
//! Builds a complete services instance in-process with an in-memory
//! identity store and a mail transport that records instead of sending.

use async_trait::async_trait;
use parking_lot::Mutex;
use slircd_services::config::Config;
use slircd_services::db::{Identity, IdentityStore, MemoryIdentityStore};
use slircd_services::mail::{Mail, MailError, MailTransport, NotificationService};
use slircd_services::security::{CredentialService, Privilege, PrivilegeSet};
use slircd_services::services::{Request, ServiceContext, ServiceEffect, Services};
use slircd_services::state::Session;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// Mail transport that keeps every mail it is given.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Mail>>,
}

#[allow(dead_code)]
impl RecordingTransport {
    pub fn sent(&self) -> Vec<Mail> {
        self.sent.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        self.sent.lock().push(mail.clone());
        Ok(())
    }
}

/// Configuration most tests start from: mail on without a send delay,
/// reversible plain scheme, SUPERADMIN allowed.
#[allow(dead_code)]
pub fn base_config() -> Config {
    let mut config = Config::default();
    config.network.name = "TestNet".to_string();
    config.mail.enabled = true;
    config.mail.delay_secs = 0;
    config.operserv.superadmin = true;
    config
}

/// An in-process services instance.
pub struct TestServices {
    pub services: Services,
    pub identities: Arc<MemoryIdentityStore>,
    pub mailer: Arc<RecordingTransport>,
    pub outbound: mpsc::Receiver<ServiceEffect>,
    next_uid: AtomicUsize,
}

#[allow(dead_code)]
impl TestServices {
    pub fn start() -> anyhow::Result<Self> {
        Self::with_config(base_config())
    }

    pub fn with_config(config: Config) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let credentials = Arc::new(CredentialService::from_config(&config.encryption)?);
        let mailer = Arc::new(RecordingTransport::default());
        let mail = Arc::new(NotificationService::new(
            config.mail.clone(),
            Arc::clone(&mailer) as Arc<dyn MailTransport>,
        ));
        let identities = Arc::new(MemoryIdentityStore::new());

        let ctx = Arc::new(ServiceContext::new(
            config,
            credentials,
            mail,
            Arc::clone(&identities) as Arc<dyn IdentityStore>,
        ));
        let (tx, outbound) = mpsc::channel(64);

        Ok(Self {
            services: Services::new(ctx, tx),
            identities,
            mailer,
            outbound,
            next_uid: AtomicUsize::new(0),
        })
    }

    pub fn ctx(&self) -> &Arc<ServiceContext> {
        self.services.ctx()
    }

    /// Register a nickname with `password` stored under the active scheme.
    pub fn register(
        &self,
        nick: &str,
        password: &str,
        email: Option<&str>,
        privileges: &[Privilege],
    ) -> anyhow::Result<Identity> {
        let secret = self.ctx().credentials.encrypt(password)?;
        let mut identity = Identity::new(nick, secret)
            .with_privileges(privileges.iter().copied().collect::<PrivilegeSet>());
        identity.email = email.map(str::to_string);
        self.identities.insert(identity.clone())?;
        Ok(identity)
    }

    fn uid(&self) -> String {
        format!("001AAA{:03}", self.next_uid.fetch_add(1, Ordering::Relaxed))
    }

    /// A connected user that has not identified.
    pub fn guest(&self, nick: &str) -> Arc<Session> {
        Arc::new(Session::new(self.uid(), nick))
    }

    /// A connected user identified to `identity`.
    pub fn identified(&self, identity: Identity) -> Arc<Session> {
        let nick = identity.name.clone();
        Arc::new(Session::identified(self.uid(), nick, identity))
    }

    /// An identified operator holding OperServ SET.
    pub fn oper(&self, nick: &str) -> anyhow::Result<Arc<Session>> {
        let identity = self.register(nick, "operpass", None, &[Privilege::OperServSet])?;
        Ok(self.identified(identity))
    }

    /// Send `text` to the service `target` and return every effect.
    pub async fn effects(&self, session: &Arc<Session>, target: &str, text: &str) -> Vec<ServiceEffect> {
        let service = self
            .services
            .resolve_target(target)
            .unwrap_or_else(|| panic!("{target} is not a service"));
        let request = Request::parse(Arc::clone(session), service, text);
        self.services.dispatch(request).await
    }

    /// Send `text` to the service `target` and return the reply lines.
    pub async fn send(&self, session: &Arc<Session>, target: &str, text: &str) -> Vec<String> {
        replies(&self.effects(session, target, text).await)
    }
}

/// Reply text of every `Reply` effect, in order.
#[allow(dead_code)]
pub fn replies(effects: &[ServiceEffect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            ServiceEffect::Reply { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}
