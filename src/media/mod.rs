// SPDX-License-Identifier: MPL-2.0
//! Still image handling for captures.
//!
//! - [`exif`]: GPS EXIF embedding into JPEG containers
//! - [`frame_export`]: RGBA snapshot encoding and capture file naming
//! - [`metadata`]: GPS extraction from tagged captures

pub mod exif;
pub mod frame_export;
pub mod metadata;

pub use frame_export::{capture_file_name, CapturedFrame};

/// File extensions recognised by the directory frame source.
pub mod extensions {
    /// Image file extensions that the `image` crate can decode in this build.
    pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];

    /// Returns `true` if `ext` names a supported still image format.
    #[must_use]
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::extensions::is_image_extension;

    #[test]
    fn image_extensions_are_case_insensitive() {
        assert!(is_image_extension("JPG"));
        assert!(is_image_extension("png"));
        assert!(!is_image_extension("mp4"));
    }
}
