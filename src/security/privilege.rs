//! Operator privileges.
//!
//! Privileges are granted to accounts as string tokens in configuration and
//! the account database ("operserv/set"). Inside services they are an
//! enumerated set; the token spelling is kept stable so existing grants
//! continue to work.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single privilege a command may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Privilege {
    /// Use SENDPASS when mail is restricted.
    NickServSendpass,
    /// Use OperServ SET.
    OperServSet,
}

impl Privilege {
    /// Every known privilege, in token order.
    pub const ALL: [Privilege; 2] = [Privilege::NickServSendpass, Privilege::OperServSet];

    /// The token as stored in account grants.
    pub const fn token(self) -> &'static str {
        match self {
            Self::NickServSendpass => "nickserv/sendpass",
            Self::OperServSet => "operserv/set",
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown privilege token: {0}")]
pub struct UnknownPrivilege(pub String);

impl FromStr for Privilege {
    type Err = UnknownPrivilege;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.token().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPrivilege(s.to_string()))
    }
}

/// The privileges held by one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivilegeSet(HashSet<Privilege>);

impl PrivilegeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, privilege: Privilege) -> bool {
        self.0.insert(privilege)
    }

    pub fn remove(&mut self, privilege: Privilege) -> bool {
        self.0.remove(&privilege)
    }

    pub fn contains(&self, privilege: Privilege) -> bool {
        self.0.contains(&privilege)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse configured tokens, returning the set and the tokens that were
    /// not recognised.
    pub fn from_tokens<I, S>(tokens: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        let mut unknown = Vec::new();
        for token in tokens {
            match token.as_ref().parse::<Privilege>() {
                Ok(p) => {
                    set.insert(p);
                }
                Err(UnknownPrivilege(t)) => unknown.push(t),
            }
        }
        (set, unknown)
    }
}

impl FromIterator<Privilege> for PrivilegeSet {
    fn from_iter<T: IntoIterator<Item = Privilege>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
