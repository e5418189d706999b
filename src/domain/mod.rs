// SPDX-License-Identifier: MPL-2.0
//! Domain layer - Core capture rules with ZERO external dependencies.
//!
//! This module contains pure domain types, value objects, and business rules.
//! It has no dependencies on external crates (except `std`) to ensure
//! testability and architectural purity.
//!
//! # Modules
//!
//! - [`capture`]: Capture cycle types ([`CapturePhase`](capture::CapturePhase),
//!   [`CaptureSource`](capture::CaptureSource), [`IntervalSeconds`](capture::IntervalSeconds))
//! - [`metadata`]: Metadata types ([`GpsCoordinates`](metadata::GpsCoordinates),
//!   [`ExifRational`](metadata::ExifRational), [`DmsCoordinate`](metadata::DmsCoordinate))

pub mod capture;
pub mod metadata;
