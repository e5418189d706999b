// SPDX-License-Identifier: MPL-2.0
//! Error types shared across the crate.
//!
//! [`CaptureError`] covers everything that can go wrong around a single capture
//! cycle or tick, [`CodecError`] is returned by the EXIF GPS codec, and
//! [`Error`] is the top-level type used by configuration and the binary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("Capture Error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Codec Error: {0}")]
    Codec(#[from] CodecError),

    #[error("Image Error: {0}")]
    Image(String),
}

/// Errors raised by the capture scheduler, the pipeline and its collaborators.
///
/// Only the scheduler rejections (`ReentrantStart`, `AlreadyActive`,
/// `IntervalLocked`) concern the cycle itself; all other variants are scoped
/// to a single tick and never stop the recurring schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// A start request arrived while another start was still being set up.
    #[error("start already in progress")]
    ReentrantStart,

    /// A start request arrived while a cycle was counting down or capturing.
    #[error("capture cycle already active")]
    AlreadyActive,

    /// The interval can only change while idle.
    #[error("interval cannot change while a cycle is active")]
    IntervalLocked,

    /// The frame source has no frame with valid dimensions yet.
    #[error("frame source not ready")]
    NotReady,

    /// No position could be obtained for this tick.
    #[error("location unavailable: {0}")]
    LocationUnavailable(String),

    /// The JPEG container handed to the codec is malformed.
    #[error("malformed JPEG container: {0}")]
    Format(String),

    /// The image encoder produced no usable output.
    #[error("encoding failed: {0}")]
    EncodeFailure(String),

    /// The capture could not be written.
    #[error("failed to persist capture: {0}")]
    Persist(String),

    /// The capture counter could not be updated.
    #[error("counter update failed: {0}")]
    Counter(String),
}

/// Errors returned by [`crate::media::exif::embed_gps`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Input is not a well-formed JPEG container.
    #[error("invalid JPEG: {0}")]
    Format(String),

    /// The EXIF block could not be encoded consistently.
    #[error("EXIF encoding failed: {0}")]
    Encoding(String),
}

impl From<CodecError> for CaptureError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Format(msg) => CaptureError::Format(msg),
            CodecError::Encoding(msg) => CaptureError::EncodeFailure(msg),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<image_rs::ImageError> for Error {
    fn from(err: image_rs::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_io_error() {
        let err = Error::Io("disk failure".to_string());
        assert_eq!(format!("{}", err), "I/O Error: disk failure");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(message) => assert!(message.contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn config_error_formats_properly() {
        let err = Error::Config("bad field".into());
        assert_eq!(format!("{}", err), "Config Error: bad field");
    }

    #[test]
    fn codec_format_maps_to_capture_format() {
        let err: CaptureError = CodecError::Format("missing SOI".into()).into();
        assert_eq!(err, CaptureError::Format("missing SOI".into()));
    }

    #[test]
    fn codec_encoding_maps_to_encode_failure() {
        let err: CaptureError = CodecError::Encoding("too large".into()).into();
        assert!(matches!(err, CaptureError::EncodeFailure(msg) if msg == "too large"));
    }

    #[test]
    fn capture_error_wraps_into_top_level() {
        let err: Error = CaptureError::NotReady.into();
        assert_eq!(err.to_string(), "Capture Error: frame source not ready");
    }
}
