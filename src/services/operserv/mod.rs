//! OperServ - network operator services.
//!
//! Handles:
//! - SET <option> [setting] - Global services options (READONLY, DEBUG, ...)

mod set;

pub use set::{DebugSetting, SetCommand};

use super::registry::CommandRegistry;
use crate::error::LoadError;
use std::sync::Arc;

/// Register OperServ's commands.
pub fn load(registry: &CommandRegistry) -> Result<(), LoadError> {
    registry.register(Arc::new(SetCommand::new()))?;
    Ok(())
}
