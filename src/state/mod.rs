//! State management module.
//!
//! Contains the process-wide capability flags and per-requester sessions.

mod capabilities;
mod session;

pub use capabilities::{CapabilitySnapshot, CapabilityStore, DEBUG_ON_LEVEL};
pub use session::Session;
