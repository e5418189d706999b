// SPDX-License-Identifier: MPL-2.0
//! `roadlens` captures frames from a video source on a timer and stores them
//! as JPEG files geotagged with GPS EXIF metadata.
//!
//! It provides a countdown-then-interval capture scheduler, a pure EXIF GPS
//! codec for JPEG containers, and the adapters needed to run a capture
//! session from the command line.

#![doc(html_root_url = "https://docs.rs/roadlens/0.1.0")]

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod media;

#[cfg(test)]
mod test_utils;
