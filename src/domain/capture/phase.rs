// SPDX-License-Identifier: MPL-2.0
//! Observable capture cycle state.

use std::fmt;

/// Observable phase of the capture cycle.
///
/// This is the read-only view of the scheduler's session; it carries no timer
/// handles and can be freely copied to presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapturePhase {
    /// No cycle is active.
    #[default]
    Idle,
    /// Countdown before the first capture.
    CountingDown {
        /// Ticks left before capturing begins.
        remaining: u32,
    },
    /// Frames are being captured at the configured interval.
    Capturing,
}

impl CapturePhase {
    /// Returns `true` when no cycle is active.
    #[must_use]
    pub fn is_idle(self) -> bool {
        matches!(self, CapturePhase::Idle)
    }

    /// Returns the countdown value when counting down.
    #[must_use]
    pub fn countdown(self) -> Option<u32> {
        match self {
            CapturePhase::CountingDown { remaining } => Some(remaining),
            _ => None,
        }
    }
}

/// Origin of a capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureSource {
    /// First capture, taken as soon as the cycle enters capturing.
    Immediate,
    /// Capture emitted by the recurring interval timer.
    Interval,
}

impl CaptureSource {
    /// Short tag used in log lines.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            CaptureSource::Immediate => "immediate",
            CaptureSource::Interval => "interval",
        }
    }
}

impl fmt::Display for CaptureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
