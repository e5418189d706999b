// SPDX-License-Identifier: MPL-2.0
//! Test utilities for float comparisons and other common test helpers.
//!
//! This module re-exports the `approx` crate's assertion macros for float comparison,
//! which properly handle floating-point precision issues that `assert_eq!` cannot.

// Re-export approx macros for convenient use in tests
pub use approx::assert_abs_diff_eq;

use crate::media::frame_export::CapturedFrame;
use std::sync::Arc;

/// Encodes a small gradient frame, giving tests a real JPEG stream.
pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut rgba = Vec::with_capacity((4 * width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            rgba.extend_from_slice(&[(x * 16) as u8, (y * 16) as u8, 128, 255]);
        }
    }
    CapturedFrame::new(Arc::new(rgba), width, height)
        .encode_jpeg(90)
        .expect("sample frame encodes")
}
