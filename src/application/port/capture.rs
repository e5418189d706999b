// SPDX-License-Identifier: MPL-2.0
//! Capture collaborator ports.
//!
//! These are the thin I/O boundaries around the capture core: where frames
//! come from, where positions come from, where captures go, and how many have
//! been taken so far.

use crate::domain::capture::CaptureSource;
use crate::domain::metadata::GpsCoordinates;
use crate::error::CaptureError;
use futures_util::future::BoxFuture;
use std::path::PathBuf;

/// Receives capture requests emitted by the scheduler.
///
/// `capture` is called while the scheduler holds its session lock, so that no
/// request can be emitted after a stop has returned. Implementations must
/// return quickly and must not call back into the scheduler.
pub trait CaptureTrigger: Send + Sync {
    fn capture(&self, source: CaptureSource);
}

/// Live video source sampled by the capture path.
pub trait FrameSource: Send + Sync {
    /// Returns the current frame as encoded JPEG bytes.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::NotReady`] while the source has no valid dimensions.
    /// - [`CaptureError::EncodeFailure`] if the frame could not be encoded.
    fn current_frame(&self) -> Result<Vec<u8>, CaptureError>;
}

/// Asynchronous position lookup.
///
/// Each call is independent and may fail on its own; the returned future may
/// resolve long after the capture that requested it.
pub trait LocationProvider: Send + Sync {
    /// # Errors
    ///
    /// [`CaptureError::LocationUnavailable`] when no fix can be obtained.
    fn current_coordinate(&self) -> BoxFuture<'static, Result<GpsCoordinates, CaptureError>>;
}

/// Destination of finished captures.
pub trait Persistor: Send + Sync {
    /// Stores `bytes` under `suggested_name` and returns where they went.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Persist`] if the bytes could not be written.
    fn save(&self, bytes: &[u8], suggested_name: &str) -> Result<PathBuf, CaptureError>;
}

/// Durable count of persisted captures.
///
/// Owned by a single task (see [`crate::application::counter`]); the trait
/// therefore takes `&mut self` and only needs `Send`.
pub trait Counter: Send {
    /// Current value.
    fn value(&self) -> u64;

    /// Adds one and returns the new value.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Counter`] if the new value could not be stored.
    fn increment(&mut self) -> Result<u64, CaptureError>;

    /// Sets the value back to zero.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Counter`] if the reset could not be stored.
    fn reset(&mut self) -> Result<(), CaptureError>;
}
