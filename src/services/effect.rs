//! Service effects and their delivery.
//!
//! Commands never talk to the transport directly. They produce effects;
//! the services façade forwards them, in order, to the outbound channel the
//! transport drains.

use std::fmt;
use tokio::sync::mpsc;
use tracing::debug;

/// Unified effect type returned by all service commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEffect {
    /// Send a NOTICE from a service agent to one user.
    Reply {
        /// Target UID to route the reply to.
        target_uid: String,
        /// Service agent nick.
        from: String,
        text: String,
    },

    /// Network-wide operator notice (GLOBOPS) from a service agent.
    Globops { from: String, text: String },
}

impl fmt::Display for ServiceEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reply {
                target_uid,
                from,
                text,
            } => write!(f, ":{} NOTICE {} :{}", from, target_uid, text),
            Self::Globops { from, text } => write!(f, ":{} GLOBOPS :{}", from, text),
        }
    }
}

/// Apply a list of service effects sequentially.
///
/// A closed channel means the transport (or the requester) is gone; the
/// remaining effects are dropped silently.
pub async fn apply_effects(outbound: &mpsc::Sender<ServiceEffect>, effects: Vec<ServiceEffect>) {
    for effect in effects {
        if outbound.send(effect).await.is_err() {
            debug!("Outbound channel closed, dropping remaining effects");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(text: &str) -> ServiceEffect {
        ServiceEffect::Reply {
            target_uid: "001AAAAAA".to_string(),
            from: "OperServ".to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn effects_are_delivered_in_order() {
        let (tx, mut rx) = mpsc::channel(8);
        apply_effects(&tx, vec![reply("one"), reply("two")]).await;
        assert_eq!(rx.recv().await, Some(reply("one")));
        assert_eq!(rx.recv().await, Some(reply("two")));
    }

    #[tokio::test]
    async fn closed_channel_is_ignored() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        apply_effects(&tx, vec![reply("lost")]).await;
    }

    #[test]
    fn display_renders_protocol_lines() {
        assert_eq!(reply("hi").to_string(), ":OperServ NOTICE 001AAAAAA :hi");
        let g = ServiceEffect::Globops {
            from: "OperServ".to_string(),
            text: "oper is now a Super-Admin".to_string(),
        };
        assert_eq!(g.to_string(), ":OperServ GLOBOPS :oper is now a Super-Admin");
    }
}
