//! Global capability flags.
//!
//! Read-only, debug and no-expire modes are process-wide. They are seeded
//! from configuration at startup and afterwards only changed by OperServ SET.
//! Each flag is an independent atomic so readers never block on a writer.

use crate::config::CapabilitiesConfig;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Debug level stored by `DEBUG ON`.
pub const DEBUG_ON_LEVEL: u32 = 1;

/// Point-in-time copy of all capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySnapshot {
    pub readonly: bool,
    pub debug: u32,
    pub noexpire: bool,
}

/// Process-wide capability flags.
#[derive(Debug, Default)]
pub struct CapabilityStore {
    readonly: AtomicBool,
    debug: AtomicU32,
    noexpire: AtomicBool,
}

impl CapabilityStore {
    pub fn new(initial: CapabilitySnapshot) -> Self {
        Self {
            readonly: AtomicBool::new(initial.readonly),
            debug: AtomicU32::new(initial.debug),
            noexpire: AtomicBool::new(initial.noexpire),
        }
    }

    pub fn from_config(config: &CapabilitiesConfig) -> Self {
        Self::new(CapabilitySnapshot {
            readonly: config.readonly,
            debug: config.debug,
            noexpire: config.noexpire,
        })
    }

    pub fn readonly(&self) -> bool {
        self.readonly.load(Ordering::Acquire)
    }

    /// Set read-only mode, returning the previous value.
    pub fn set_readonly(&self, on: bool) -> bool {
        self.readonly.swap(on, Ordering::AcqRel)
    }

    pub fn debug_level(&self) -> u32 {
        self.debug.load(Ordering::Acquire)
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_level() > 0
    }

    /// Set the debug level (0 = off), returning the previous level.
    pub fn set_debug(&self, level: u32) -> u32 {
        self.debug.swap(level, Ordering::AcqRel)
    }

    pub fn noexpire(&self) -> bool {
        self.noexpire.load(Ordering::Acquire)
    }

    /// Set no-expire mode, returning the previous value.
    pub fn set_noexpire(&self, on: bool) -> bool {
        self.noexpire.swap(on, Ordering::AcqRel)
    }

    pub fn snapshot(&self) -> CapabilitySnapshot {
        CapabilitySnapshot {
            readonly: self.readonly(),
            debug: self.debug_level(),
            noexpire: self.noexpire(),
        }
    }
}
