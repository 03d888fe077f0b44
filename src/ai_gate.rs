//! # Feature: Single-Flight AI Gate
//!
//! At most one generation request runs at a time, bot-wide. Callers that find
//! the gate held are turned away immediately; nothing queues.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false
//!
//! The gate is per process. Running several shards as separate processes gives
//! each its own gate.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct AiGate {
    busy: AtomicBool,
}

impl AiGate {
    pub const fn new() -> Self {
        AiGate {
            busy: AtomicBool::new(false),
        }
    }

    /// Marks the gate held and returns a permit, or `None` if it already was.
    pub fn try_acquire(&self) -> Option<AiPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| AiPermit { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the gate when dropped.
#[derive(Debug)]
#[must_use = "the gate is released as soon as the permit is dropped"]
pub struct AiPermit<'a> {
    gate: &'a AiGate,
}

impl Drop for AiPermit<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}
