// SPDX-License-Identifier: MPL-2.0
//! GPS metadata extraction from JPEG captures.
//!
//! Reading goes through the `kamadak-exif` parser rather than our own
//! encoder, so a successful read also validates the encoded block.

use crate::domain::metadata::GpsCoordinates;
use crate::error::{Error, Result};
use std::io::Cursor;
use std::path::Path;

/// Extracts GPS coordinates from in-memory JPEG bytes.
///
/// Returns `None` when the image has no EXIF block or the block lacks any of
/// the four GPS latitude/longitude tags.
#[must_use]
pub fn read_gps(jpeg: &[u8]) -> Option<GpsCoordinates> {
    let mut reader = Cursor::new(jpeg);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;
    extract_gps_coordinates(&exif)
}

/// Extracts GPS coordinates from a JPEG file.
pub fn read_gps_from_path<P: AsRef<Path>>(path: P) -> Result<Option<GpsCoordinates>> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| Error::Io(format!("Failed to read '{}': {e}", path.display())))?;
    Ok(read_gps(&data))
}

fn extract_gps_coordinates(exif: &exif::Exif) -> Option<GpsCoordinates> {
    let lat_field = exif.get_field(exif::Tag::GPSLatitude, exif::In::PRIMARY)?;
    let lat_ref_field = exif.get_field(exif::Tag::GPSLatitudeRef, exif::In::PRIMARY)?;
    let lon_field = exif.get_field(exif::Tag::GPSLongitude, exif::In::PRIMARY)?;
    let lon_ref_field = exif.get_field(exif::Tag::GPSLongitudeRef, exif::In::PRIMARY)?;

    let lat = parse_gps_coordinate(&lat_field.value)?;
    let lon = parse_gps_coordinate(&lon_field.value)?;

    let lat_ref = lat_ref_field.display_value().to_string();
    let lon_ref = lon_ref_field.display_value().to_string();

    Some(GpsCoordinates::new(
        if lat_ref.contains('S') { -lat } else { lat },
        if lon_ref.contains('W') { -lon } else { lon },
    ))
}

/// Parse GPS coordinate from EXIF rational values (degrees, minutes, seconds).
fn parse_gps_coordinate(value: &exif::Value) -> Option<f64> {
    match value {
        exif::Value::Rational(rationals) if rationals.len() >= 3 => {
            let degrees = rationals[0].to_f64();
            let minutes = rationals[1].to_f64();
            let seconds = rationals[2].to_f64();
            Some(degrees + minutes / 60.0 + seconds / 3600.0)
        }
        _ => None,
    }
}
