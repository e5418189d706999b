// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! This module contains concrete implementations of the port traits defined in
//! `application::port`. These adapters wrap the tokio runtime, the filesystem
//! and the `image` decoder.
//!
//! # Available Adapters
//!
//! - [`timer`]: [`TokioClock`] and the virtual [`ManualClock`] (implement [`ClockTimer`])
//! - [`frame_source`]: Directory replay and live frame buffer (implement [`FrameSource`])
//! - [`location`]: Fixed position provider (implements [`LocationProvider`])
//! - [`storage`]: Output directory writer (implements [`Persistor`])
//! - [`counter`]: CBOR-backed and in-memory counters (implement [`Counter`])
//!
//! [`ClockTimer`]: crate::application::port::ClockTimer
//! [`FrameSource`]: crate::application::port::FrameSource
//! [`LocationProvider`]: crate::application::port::LocationProvider
//! [`Persistor`]: crate::application::port::Persistor
//! [`Counter`]: crate::application::port::Counter

pub mod counter;
pub mod frame_source;
pub mod location;
pub mod storage;
pub mod timer;

// Re-export main types for convenience
pub use counter::{MemoryCounter, PersistentCounter};
pub use frame_source::{DirectoryFrameSource, FrameBuffer};
pub use location::FixedLocationProvider;
pub use storage::DirectoryPersistor;
pub use timer::{ManualClock, TokioClock};
