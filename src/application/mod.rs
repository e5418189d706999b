// SPDX-License-Identifier: MPL-2.0
//! Application layer - Use cases and orchestration.
//!
//! This module contains the application layer of the Clean Architecture:
//!
//! - [`port`]: Trait definitions (interfaces) for dependency inversion
//! - [`scheduler`]: Countdown and recurring capture state machine
//! - [`pipeline`]: Per-tick capture, geotagging and persistence
//! - [`counter`]: Single-owner service around the durable capture counter
//!
//! # Dependency Rule
//!
//! - Application layer depends on domain layer (uses domain types)
//! - Infrastructure layer implements application layer ports
//! - The binary wires infrastructure adapters into application services
//!
//! # Example
//!
//! ```ignore
//! use roadlens::application::scheduler::CaptureScheduler;
//!
//! let scheduler = CaptureScheduler::new(clock, pipeline);
//! scheduler.request_start()?;
//! // ... later
//! scheduler.request_stop();
//! ```

pub mod counter;
pub mod pipeline;
pub mod port;
pub mod scheduler;
