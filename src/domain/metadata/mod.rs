// SPDX-License-Identifier: MPL-2.0
//! Metadata domain types.
//!
//! This module provides the pure value types used when geotagging captures:
//! - [`GpsCoordinates`]: GPS position in decimal degrees
//! - [`ExifRational`]: numerator/denominator pair as stored in EXIF
//! - [`DmsCoordinate`]: degrees, minutes, seconds as three rationals
//!
//! The binary encoding of these values lives in `crate::media::exif`.

mod types;

pub use types::{DmsCoordinate, ExifRational, GpsCoordinates};
