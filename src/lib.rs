//! slircd-services - command-processing core for IRC network services.
//!
//! Service agents (NickServ, ChanServ, BotServ, OperServ) receive line-based
//! commands from users, check them against each command's contract and reply
//! through service effects. Commands share a process-wide capability store,
//! a credential service with a swappable encryption scheme and an outbound
//! mail notifier.

pub mod audit;
pub mod casemap;
pub mod config;
pub mod db;
pub mod error;
pub mod mail;
pub mod security;
pub mod services;
pub mod state;
