// SPDX-License-Identifier: MPL-2.0
//! Capture counter adapters.
//!
//! [`PersistentCounter`] keeps the total in a small CBOR state file so it
//! survives restarts. It is kept apart from the user-editable `settings.toml`:
//! the count is application-managed state, not a preference.
//!
//! [`MemoryCounter`] keeps the total in memory only.

use crate::application::port::Counter;
use crate::error::CaptureError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// State file name within the app data directory.
pub const STATE_FILE: &str = "capture_state.cbor";

/// Persisted counter state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaptureState {
    /// Number of captures saved since the last reset.
    #[serde(default)]
    pub images_count: u64,
}

impl CaptureState {
    /// Loads state from `path`.
    ///
    /// Returns a tuple of (state, optional_warning). A missing file is not an
    /// error; an unreadable or corrupt file yields the default state and a
    /// warning describing what went wrong.
    #[must_use]
    pub fn load_from(path: &Path) -> (Self, Option<String>) {
        if !path.exists() {
            return (Self::default(), None);
        }

        match fs::File::open(path) {
            Ok(file) => match ciborium::from_reader(BufReader::new(file)) {
                Ok(state) => (state, None),
                Err(e) => (
                    Self::default(),
                    Some(format!("could not parse {}: {e}", path.display())),
                ),
            },
            Err(e) => (
                Self::default(),
                Some(format!("could not read {}: {e}", path.display())),
            ),
        }
    }

    /// Saves state to `path`, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Counter`] describing the failed step.
    pub fn save_to(&self, path: &Path) -> Result<(), CaptureError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CaptureError::Counter(format!("could not create {}: {e}", parent.display()))
            })?;
        }

        let file = fs::File::create(path).map_err(|e| {
            CaptureError::Counter(format!("could not create {}: {e}", path.display()))
        })?;
        ciborium::into_writer(self, BufWriter::new(file)).map_err(|e| {
            CaptureError::Counter(format!("could not write {}: {e}", path.display()))
        })
    }
}

/// Counter stored in a CBOR state file.
#[derive(Debug)]
pub struct PersistentCounter {
    path: PathBuf,
    state: CaptureState,
}

impl PersistentCounter {
    /// Opens the counter stored at `path`, starting from zero if the file is
    /// missing or unreadable.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (state, warning) = CaptureState::load_from(&path);
        if let Some(warning) = warning {
            tracing::warn!(%warning, "capture counter reset to 0");
        }
        Self { path, state }
    }

    /// Opens the counter in `data_dir`.
    #[must_use]
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::open(data_dir.join(STATE_FILE))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn store(&mut self, next: CaptureState) -> Result<(), CaptureError> {
        next.save_to(&self.path)?;
        self.state = next;
        Ok(())
    }
}

impl Counter for PersistentCounter {
    fn value(&self) -> u64 {
        self.state.images_count
    }

    fn increment(&mut self) -> Result<u64, CaptureError> {
        let next = CaptureState {
            images_count: self.state.images_count.saturating_add(1),
        };
        self.store(next)?;
        Ok(next.images_count)
    }

    fn reset(&mut self) -> Result<(), CaptureError> {
        self.store(CaptureState::default())
    }
}

/// Counter that lives only as long as the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryCounter {
    value: u64,
}

impl MemoryCounter {
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self { value }
    }
}

impl Counter for MemoryCounter {
    fn value(&self) -> u64 {
        self.value
    }

    fn increment(&mut self) -> Result<u64, CaptureError> {
        self.value = self.value.saturating_add(1);
        Ok(self.value)
    }

    fn reset(&mut self) -> Result<(), CaptureError> {
        self.value = 0;
        Ok(())
    }
}
