// SPDX-License-Identifier: MPL-2.0
//! Filesystem persistence of captures.

use crate::application::port::Persistor;
use crate::error::{CaptureError, Error, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Upper bound on `-N` suffixes tried when a file name is already taken.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Writes captures into a single output directory.
///
/// Existing files are never overwritten: when the suggested name is taken,
/// a numeric suffix is added to the stem.
#[derive(Debug, Clone)]
pub struct DirectoryPersistor {
    dir: PathBuf,
}

impl DirectoryPersistor {
    /// Uses `dir` as output directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the directory cannot be created.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Io(format!("cannot create {}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn candidate(&self, suggested_name: &str, attempt: u32) -> PathBuf {
        if attempt == 0 {
            return self.dir.join(suggested_name);
        }
        let name = Path::new(suggested_name);
        let stem = name
            .file_stem()
            .map_or_else(|| suggested_name.into(), |s| s.to_string_lossy());
        match name.extension() {
            Some(ext) => self
                .dir
                .join(format!("{stem}-{attempt}.{}", ext.to_string_lossy())),
            None => self.dir.join(format!("{stem}-{attempt}")),
        }
    }
}

impl Persistor for DirectoryPersistor {
    fn save(&self, bytes: &[u8], suggested_name: &str) -> std::result::Result<PathBuf, CaptureError> {
        if suggested_name.is_empty() || suggested_name.contains(['/', '\\']) {
            return Err(CaptureError::Persist(format!(
                "invalid file name {suggested_name:?}"
            )));
        }

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.candidate(suggested_name, attempt);
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(CaptureError::Persist(format!("{}: {e}", path.display())));
                }
            };
            file.write_all(bytes)
                .and_then(|()| file.sync_all())
                .map_err(|e| CaptureError::Persist(format!("{}: {e}", path.display())))?;
            return Ok(path);
        }

        Err(CaptureError::Persist(format!(
            "no free file name for {suggested_name} in {}",
            self.dir.display()
        )))
    }
}
