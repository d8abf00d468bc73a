//! Requester sessions.
//!
//! A session is one connected user as services see it: the UID and nick the
//! transport reported, the account they identified to (if any), and the
//! session-scoped SUPERADMIN flag. Sessions are shared as `Arc<Session>`
//! between the transport and in-flight commands.

use crate::db::Identity;
use crate::security::Privilege;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct Session {
    uid: String,
    nick: String,
    account: Option<Identity>,
    super_admin: AtomicBool,
}

impl Session {
    /// An unidentified session.
    pub fn new(uid: impl Into<String>, nick: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            nick: nick.into(),
            account: None,
            super_admin: AtomicBool::new(false),
        }
    }

    /// A session identified to `account`.
    pub fn identified(uid: impl Into<String>, nick: impl Into<String>, account: Identity) -> Self {
        Self {
            account: Some(account),
            ..Self::new(uid, nick)
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn account(&self) -> Option<&Identity> {
        self.account.as_ref()
    }

    pub fn is_identified(&self) -> bool {
        self.account.is_some()
    }

    /// Whether the session holds `privilege`, directly through its account
    /// or through SUPERADMIN.
    pub fn has_privilege(&self, privilege: Privilege) -> bool {
        let Some(account) = &self.account else {
            return false;
        };
        self.is_super_admin() || account.privileges.contains(privilege)
    }

    pub fn is_super_admin(&self) -> bool {
        self.super_admin.load(Ordering::Acquire)
    }

    pub fn set_super_admin(&self, on: bool) {
        self.super_admin.store(on, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::PrivilegeSet;

    #[test]
    fn unidentified_session_has_no_privileges() {
        let session = Session::new("001AAAAAA", "guest");
        session.set_super_admin(true);
        assert!(!session.is_identified());
        assert!(!session.has_privilege(Privilege::OperServSet));
    }

    #[test]
    fn super_admin_grants_everything() {
        let account = Identity::new("oper", "plain:");
        let session = Session::identified("001AAAAAB", "oper", account);
        assert!(!session.has_privilege(Privilege::NickServSendpass));

        session.set_super_admin(true);
        for p in Privilege::ALL {
            assert!(session.has_privilege(p));
        }
    }

    #[test]
    fn account_grants_are_honoured() {
        let account = Identity::new("oper", "plain:")
            .with_privileges(PrivilegeSet::from_iter([Privilege::OperServSet]));
        let session = Session::identified("001AAAAAC", "oper", account);
        assert!(session.has_privilege(Privilege::OperServSet));
        assert!(!session.has_privilege(Privilege::NickServSendpass));
    }
}
