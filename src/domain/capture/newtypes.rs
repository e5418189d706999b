// SPDX-License-Identifier: MPL-2.0
//! Capture timing newtypes.

use std::time::Duration;

/// Number of countdown ticks (one per second) before capturing begins.
pub const COUNTDOWN_START: u32 = 3;

/// Interval bounds in seconds.
pub mod interval_bounds {
    /// Minimum interval between two recurring captures.
    pub const MIN: u32 = 1;
    /// Default interval between two recurring captures.
    pub const DEFAULT: u32 = 5;
}

/// Interval between recurring captures, guaranteed to be at least one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalSeconds(u32);

impl IntervalSeconds {
    /// Creates a new interval, raising values below the minimum to one second.
    #[must_use]
    pub fn new(seconds: u32) -> Self {
        Self(seconds.max(interval_bounds::MIN))
    }

    /// Returns the interval in whole seconds.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    /// Returns the interval as a [`Duration`].
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0))
    }
}

impl Default for IntervalSeconds {
    fn default() -> Self {
        Self(interval_bounds::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_raises_zero_to_minimum() {
        assert_eq!(IntervalSeconds::new(0).value(), 1);
    }

    #[test]
    fn new_keeps_valid_values() {
        assert_eq!(IntervalSeconds::new(1).value(), 1);
        assert_eq!(IntervalSeconds::new(42).value(), 42);
    }

    #[test]
    fn default_is_five_seconds() {
        assert_eq!(IntervalSeconds::default().value(), 5);
    }

    #[test]
    fn as_duration_converts_to_seconds() {
        assert_eq!(
            IntervalSeconds::new(7).as_duration(),
            Duration::from_secs(7)
        );
    }
}
