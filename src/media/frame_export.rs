// SPDX-License-Identifier: MPL-2.0
//! Frame snapshot encoding and capture file naming.
//!
//! A [`CapturedFrame`] is an RGBA snapshot of the live video source. It is
//! encoded to JPEG with the `image` crate; compression itself is entirely
//! delegated to that encoder.

use crate::error::CaptureError;
use image_rs::codecs::jpeg::JpegEncoder;
use image_rs::{ImageBuffer, Rgba};
use std::sync::Arc;

/// File extension of persisted captures.
pub const CAPTURE_EXTENSION: &str = "jpg";

/// Suffix appended to the file stem when no location was available.
pub const NO_LOCATION_SUFFIX: &str = "_no_location";

/// An RGBA snapshot of the video source.
///
/// Uses `Arc<Vec<u8>>` so that a snapshot can be handed to a capture task
/// without copying the pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFrame {
    /// RGBA pixel data (shared reference to avoid expensive clones).
    pub rgba_data: Arc<Vec<u8>>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl CapturedFrame {
    /// Creates a new frame from RGBA data.
    #[must_use]
    pub fn new(rgba_data: Arc<Vec<u8>>, width: u32, height: u32) -> Self {
        Self {
            rgba_data,
            width,
            height,
        }
    }

    /// Returns `true` when the source has produced a frame with real dimensions.
    #[must_use]
    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Encodes the frame as a baseline JPEG.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::NotReady`] for a zero-sized frame.
    /// - [`CaptureError::EncodeFailure`] if the pixel buffer does not match the
    ///   dimensions or the encoder produced no output.
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, CaptureError> {
        if !self.has_dimensions() {
            return Err(CaptureError::NotReady);
        }

        // Requires cloning the Arc's contents, ImageBuffer wants ownership.
        let img: ImageBuffer<Rgba<u8>, _> =
            ImageBuffer::from_raw(self.width, self.height, (*self.rgba_data).clone()).ok_or_else(
                || {
                    CaptureError::EncodeFailure(format!(
                        "buffer of {} bytes does not hold a {}x{} RGBA frame",
                        self.rgba_data.len(),
                        self.width,
                        self.height
                    ))
                },
            )?;

        // JPEG has no alpha channel
        let rgb = image_rs::DynamicImage::ImageRgba8(img).to_rgb8();

        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, quality.clamp(1, 100))
            .encode_image(&rgb)
            .map_err(|e| CaptureError::EncodeFailure(e.to_string()))?;

        if encoded.is_empty() {
            return Err(CaptureError::EncodeFailure(
                "encoder produced no output".to_string(),
            ));
        }
        Ok(encoded)
    }
}

/// Builds the file name of a persisted capture.
///
/// Format: `{app_tag}_{unix_millis}.jpg`, or
/// `{app_tag}_{unix_millis}_no_location.jpg` when the capture has no GPS tags.
#[must_use]
pub fn capture_file_name(app_tag: &str, unix_millis: i64, located: bool) -> String {
    let suffix = if located { "" } else { NO_LOCATION_SUFFIX };
    format!("{app_tag}_{unix_millis}{suffix}.{CAPTURE_EXTENSION}")
}
