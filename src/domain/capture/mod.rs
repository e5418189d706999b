// SPDX-License-Identifier: MPL-2.0
//! Capture cycle domain types.
//!
//! - [`CapturePhase`]: observable state of the capture cycle
//! - [`CaptureSource`]: why a capture was requested
//! - [`IntervalSeconds`]: validated interval between recurring captures

mod newtypes;
mod phase;

pub use newtypes::{interval_bounds, IntervalSeconds, COUNTDOWN_START};
pub use phase::{CapturePhase, CaptureSource};
