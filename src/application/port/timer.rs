// SPDX-License-Identifier: MPL-2.0
//! Timer port.
//!
//! The scheduler never sleeps or spawns on its own; every countdown tick and
//! interval firing is a callback registered on a [`ClockTimer`]. This keeps
//! the state machine testable with a deterministic clock.

use std::fmt;
use std::time::Duration;

/// Callback invoked when a timer fires.
pub type TimerCallback = Box<dyn FnMut() + Send + 'static>;

/// Opaque identifier of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Timer facility shared by the scheduler.
///
/// # Contract
///
/// - Callbacks are never invoked synchronously from `schedule_*`.
/// - After `cancel` returns, the callback of that handle is not started again.
///   A firing that is already running may finish.
/// - Cancelling an unknown or already cancelled handle is a no-op.
pub trait ClockTimer: Send + Sync {
    /// Runs `callback` once after `delay`.
    fn schedule_once(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;

    /// Runs `callback` every `period`, first after one full period.
    fn schedule_repeating(&self, period: Duration, callback: TimerCallback) -> TimerHandle;

    /// Cancels a pending or repeating timer.
    fn cancel(&self, handle: TimerHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_displays_id() {
        assert_eq!(TimerHandle::new(7).to_string(), "timer#7");
        assert_eq!(TimerHandle::new(7).id(), 7);
    }
}
