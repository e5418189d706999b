// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the application. Constants are organized by category.
//!
//! # Categories
//!
//! - **Capture**: Interval between captures and countdown length
//! - **Encoding**: JPEG quality of persisted frames
//! - **Naming**: File name prefix of persisted captures

use crate::domain::capture::{interval_bounds, COUNTDOWN_START};

// ==========================================================================
// Capture Defaults
// ==========================================================================

/// Default number of seconds between two captures.
pub const DEFAULT_INTERVAL_SECS: u32 = interval_bounds::DEFAULT;

/// Minimum interval between captures (in seconds).
pub const MIN_INTERVAL_SECS: u32 = interval_bounds::MIN;

/// Maximum interval accepted from configuration (one hour).
pub const MAX_INTERVAL_SECS: u32 = 3600;

/// Countdown ticks before the first capture.
pub const DEFAULT_COUNTDOWN: u32 = COUNTDOWN_START;

// ==========================================================================
// Encoding Defaults
// ==========================================================================

/// Default JPEG quality for captured frames.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Minimum JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// ==========================================================================
// Naming Defaults
// ==========================================================================

/// Prefix of capture file names.
pub const DEFAULT_APP_TAG: &str = "roadmetrics";

/// Output directory name, relative to the platform pictures directory.
pub const DEFAULT_OUTPUT_SUBDIR: &str = "RoadLens";

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    // Interval validation
    assert!(MIN_INTERVAL_SECS > 0);
    assert!(MAX_INTERVAL_SECS >= MIN_INTERVAL_SECS);
    assert!(DEFAULT_INTERVAL_SECS >= MIN_INTERVAL_SECS);
    assert!(DEFAULT_INTERVAL_SECS <= MAX_INTERVAL_SECS);
    assert!(DEFAULT_COUNTDOWN > 0);

    // Quality validation
    assert!(MIN_JPEG_QUALITY > 0);
    assert!(MAX_JPEG_QUALITY <= 100);
    assert!(DEFAULT_JPEG_QUALITY >= MIN_JPEG_QUALITY);
    assert!(DEFAULT_JPEG_QUALITY <= MAX_JPEG_QUALITY);

    assert!(!DEFAULT_APP_TAG.is_empty());
};
