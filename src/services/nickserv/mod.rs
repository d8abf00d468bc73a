//! NickServ - nickname services.
//!
//! Handles:
//! - SENDPASS <nick> - Mail a nickname's password to its registered address

mod sendpass;

pub use sendpass::SendpassCommand;

use super::context::ServiceContext;
use super::registry::CommandRegistry;
use crate::error::LoadError;
use std::sync::Arc;

/// Register NickServ's commands.
pub fn load(ctx: &ServiceContext, registry: &CommandRegistry) -> Result<(), LoadError> {
    let sendpass = SendpassCommand::load(ctx)?;
    registry.register(Arc::new(sendpass))?;
    Ok(())
}
