// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! This module defines abstract interfaces that infrastructure adapters implement.
//! These traits use only domain types, ensuring the application layer remains
//! independent of concrete implementations.
//!
//! # Available Ports
//!
//! - [`timer`]: One-shot and repeating timers ([`ClockTimer`])
//! - [`capture`]: Capture collaborators ([`CaptureTrigger`], [`FrameSource`],
//!   [`LocationProvider`], [`Persistor`], [`Counter`])
//!
//! # Design Notes
//!
//! - Traits are `Send + Sync` where they are shared between timer callbacks
//!   and capture tasks
//! - Methods return `Result` with [`CaptureError`](crate::error::CaptureError)
//! - Location lookups are the only asynchronous port; they return a boxed
//!   future instead of using `async fn` in traits

pub mod capture;
pub mod timer;

// Re-export main types for convenience
pub use capture::{CaptureTrigger, Counter, FrameSource, LocationProvider, Persistor};
pub use timer::{ClockTimer, TimerCallback, TimerHandle};
