// SPDX-License-Identifier: MPL-2.0
//! Frame source adapters.
//!
//! - [`DirectoryFrameSource`]: replays still images from a directory, one per
//!   request, wrapping around at the end. Useful for bench rigs and for
//!   replaying recorded drives.
//! - [`FrameBuffer`]: holds the latest frame pushed by a live video producer.

use crate::application::port::FrameSource;
use crate::error::{CaptureError, Error, Result};
use crate::media::extensions::is_image_extension;
use crate::media::frame_export::CapturedFrame;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Decodes an image file into an RGBA frame.
fn load_frame(path: &Path) -> std::result::Result<CapturedFrame, CaptureError> {
    let img = image_rs::open(path)
        .map_err(|e| CaptureError::EncodeFailure(format!("{}: {e}", path.display())))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(CapturedFrame::new(Arc::new(rgba.into_raw()), width, height))
}

/// Replays the images of a directory in file name order.
#[derive(Debug)]
pub struct DirectoryFrameSource {
    frames: Vec<PathBuf>,
    cursor: AtomicUsize,
    quality: u8,
}

impl DirectoryFrameSource {
    /// Scans `directory` for supported images.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or holds no image.
    pub fn scan(directory: &Path, quality: u8) -> Result<Self> {
        let mut frames = Vec::new();

        for entry in std::fs::read_dir(directory)? {
            let path = entry?.path();
            if path.is_file() && is_supported_image(&path) {
                frames.push(path);
            }
        }

        if frames.is_empty() {
            return Err(Error::Io(format!(
                "no images found in {}",
                directory.display()
            )));
        }

        frames.sort_by(|a, b| {
            let a_name = a.file_name().map(|n| n.to_string_lossy().to_lowercase());
            let b_name = b.file_name().map(|n| n.to_string_lossy().to_lowercase());
            a_name.cmp(&b_name)
        });

        tracing::debug!(count = frames.len(), dir = %directory.display(), "frame source ready");
        Ok(Self {
            frames,
            cursor: AtomicUsize::new(0),
            quality,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Path that the next request will read.
    #[must_use]
    pub fn peek(&self) -> Option<&Path> {
        let index = self.cursor.load(Ordering::Relaxed) % self.frames.len().max(1);
        self.frames.get(index).map(PathBuf::as_path)
    }
}

impl FrameSource for DirectoryFrameSource {
    fn current_frame(&self) -> std::result::Result<Vec<u8>, CaptureError> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.frames.len().max(1);
        let path = self.frames.get(index).ok_or(CaptureError::NotReady)?;
        load_frame(path)?.encode_jpeg(self.quality)
    }
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(is_image_extension)
}

/// Latest frame of a live producer.
///
/// The producer calls [`publish`](Self::publish) whenever a new frame is
/// decoded; captures encode whatever frame is current at that moment.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    latest: Mutex<Option<CapturedFrame>>,
    quality: u8,
}

impl FrameBuffer {
    #[must_use]
    pub fn new(quality: u8) -> Self {
        Self {
            latest: Mutex::new(None),
            quality,
        }
    }

    /// Replaces the current frame.
    pub fn publish(&self, frame: CapturedFrame) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);
    }

    /// Drops the current frame, e.g. when the producer stops.
    pub fn clear(&self) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl FrameSource for FrameBuffer {
    fn current_frame(&self) -> std::result::Result<Vec<u8>, CaptureError> {
        // Clone the Arc only; encoding happens outside the lock.
        let frame = self
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(CaptureError::NotReady)?;
        frame.encode_jpeg(self.quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_rs::{ImageBuffer, Rgb};
    use tempfile::tempdir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img: ImageBuffer<Rgb<u8>, _> = ImageBuffer::from_pixel(width, height, Rgb([10, 20, 30]));
        img.save(&path).expect("write test image");
        path
    }

    #[test]
    fn scan_rejects_empty_directory() {
        let temp_dir = tempdir().expect("create temp dir");
        std::fs::write(temp_dir.path().join("notes.txt"), "x").unwrap();
        assert!(DirectoryFrameSource::scan(temp_dir.path(), 90).is_err());
    }

    #[test]
    fn scan_rejects_missing_directory() {
        let temp_dir = tempdir().expect("create temp dir");
        assert!(DirectoryFrameSource::scan(&temp_dir.path().join("missing"), 90).is_err());
    }

    #[test]
    fn frames_cycle_in_name_order() {
        let temp_dir = tempdir().expect("create temp dir");
        write_png(temp_dir.path(), "b.png", 4, 4);
        write_png(temp_dir.path(), "a.png", 4, 4);
        let source = DirectoryFrameSource::scan(temp_dir.path(), 90).unwrap();
        assert_eq!(source.len(), 2);

        assert_eq!(source.peek(), Some(temp_dir.path().join("a.png").as_path()));
        source.current_frame().unwrap();
        assert_eq!(source.peek(), Some(temp_dir.path().join("b.png").as_path()));
        source.current_frame().unwrap();
        assert_eq!(source.peek(), Some(temp_dir.path().join("a.png").as_path()));
    }

    #[test]
    fn frames_are_encoded_as_jpeg() {
        let temp_dir = tempdir().expect("create temp dir");
        write_png(temp_dir.path(), "frame.png", 8, 6);
        let source = DirectoryFrameSource::scan(temp_dir.path(), 80).unwrap();

        let jpeg = source.current_frame().unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = image_rs::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn unreadable_frame_is_an_encode_failure() {
        let temp_dir = tempdir().expect("create temp dir");
        std::fs::write(temp_dir.path().join("broken.jpg"), b"garbage").unwrap();
        let source = DirectoryFrameSource::scan(temp_dir.path(), 90).unwrap();
        assert!(matches!(
            source.current_frame(),
            Err(CaptureError::EncodeFailure(_))
        ));
    }

    #[test]
    fn empty_buffer_is_not_ready() {
        let buffer = FrameBuffer::new(90);
        assert_eq!(buffer.current_frame(), Err(CaptureError::NotReady));
    }

    #[test]
    fn buffer_encodes_latest_frame() {
        let buffer = FrameBuffer::new(90);
        buffer.publish(CapturedFrame::new(Arc::new(vec![0u8; 4 * 4 * 2]), 4, 2));
        let jpeg = buffer.current_frame().unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        buffer.clear();
        assert_eq!(buffer.current_frame(), Err(CaptureError::NotReady));
    }

    #[test]
    fn zero_sized_frame_is_not_ready() {
        let buffer = FrameBuffer::new(90);
        buffer.publish(CapturedFrame::new(Arc::new(Vec::new()), 0, 0));
        assert_eq!(buffer.current_frame(), Err(CaptureError::NotReady));
    }
}
