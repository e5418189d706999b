// SPDX-License-Identifier: MPL-2.0
//! GPS EXIF embedding for JPEG captures.
//!
//! [`embed_gps`] is a pure transformation: it takes the JPEG bytes of a
//! capture and a coordinate, and returns a new byte vector with an EXIF APP1
//! segment carrying exactly four GPS tags (latitude, latitude reference,
//! longitude, longitude reference). The input buffer is never modified and a
//! failure never yields partial output.
//!
//! # Example
//!
//! ```
//! use roadlens::domain::metadata::GpsCoordinates;
//! use roadlens::media::exif::embed_gps;
//!
//! let jpeg = [0xFF, 0xD8, 0xFF, 0xD9];
//! let tagged = embed_gps(&jpeg, GpsCoordinates::new(48.8584, 2.2945)).unwrap();
//! assert_eq!(&tagged[..4], &[0xFF, 0xD8, 0xFF, 0xE1]);
//! assert!(embed_gps(&[0x00, 0x00], GpsCoordinates::default()).is_err());
//! ```

pub mod jpeg;
pub mod tiff;

use crate::domain::metadata::{DmsCoordinate, GpsCoordinates};
use crate::error::CodecError;
use tiff::{tag, EntryValue, ExifBlock, IfdEntry};

/// Embeds `coordinate` into `jpeg` as GPS EXIF metadata.
///
/// An existing EXIF segment is replaced; otherwise a new one is inserted right
/// after the Start-Of-Image marker.
///
/// # Errors
///
/// - [`CodecError::Format`] if `jpeg` lacks a Start-Of-Image marker or its
///   header segments are malformed.
/// - [`CodecError::Encoding`] if the coordinate is not finite or the EXIF
///   block cannot be laid out.
pub fn embed_gps(jpeg: &[u8], coordinate: GpsCoordinates) -> Result<Vec<u8>, CodecError> {
    // Validate the container first so that a bad input is reported as such.
    jpeg::scan(jpeg)?;
    let segment = build_exif_segment(coordinate)?;
    jpeg::splice_exif(jpeg, &segment)
}

/// Builds the complete APP1 segment (marker, length, `Exif\0\0`, TIFF block).
pub fn build_exif_segment(coordinate: GpsCoordinates) -> Result<Vec<u8>, CodecError> {
    let block = ExifBlock::with_gps(gps_entries(coordinate)?);
    let tiff = tiff::encode(&block)?;
    jpeg::build_app1(&tiff)
}

/// The four GPS directory entries for `coordinate`.
pub fn gps_entries(coordinate: GpsCoordinates) -> Result<Vec<IfdEntry>, CodecError> {
    if !coordinate.is_valid() {
        return Err(CodecError::Encoding(format!(
            "non-finite coordinate {coordinate:?}"
        )));
    }

    let latitude = to_dms(coordinate.latitude())?;
    let longitude = to_dms(coordinate.longitude())?;

    Ok(vec![
        IfdEntry::new(
            tag::GPS_LATITUDE_REF,
            EntryValue::Ascii(coordinate.latitude_ref().to_string()),
        ),
        IfdEntry::new(
            tag::GPS_LATITUDE,
            EntryValue::Rationals(latitude.components().to_vec()),
        ),
        IfdEntry::new(
            tag::GPS_LONGITUDE_REF,
            EntryValue::Ascii(coordinate.longitude_ref().to_string()),
        ),
        IfdEntry::new(
            tag::GPS_LONGITUDE,
            EntryValue::Rationals(longitude.components().to_vec()),
        ),
    ])
}

fn to_dms(value: f64) -> Result<DmsCoordinate, CodecError> {
    DmsCoordinate::from_decimal(value)
        .ok_or_else(|| CodecError::Encoding(format!("cannot convert {value} to DMS rationals")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metadata::ExifRational;

    fn ascii_value(entries: &[IfdEntry], wanted: u16) -> String {
        entries
            .iter()
            .find_map(|entry| match (&entry.value, entry.tag == wanted) {
                (EntryValue::Ascii(text), true) => Some(text.clone()),
                _ => None,
            })
            .expect("ascii tag present")
    }

    fn references(lat: f64, lon: f64) -> (String, String) {
        let entries = gps_entries(GpsCoordinates::new(lat, lon)).unwrap();
        (
            ascii_value(&entries, tag::GPS_LATITUDE_REF),
            ascii_value(&entries, tag::GPS_LONGITUDE_REF),
        )
    }

    #[test]
    fn null_island_encodes_north_east() {
        assert_eq!(references(0.0, 0.0), ("N".into(), "E".into()));
    }

    #[test]
    fn southern_hemisphere_encodes_south_east() {
        assert_eq!(references(-33.9, 151.2), ("S".into(), "E".into()));
    }

    #[test]
    fn western_hemisphere_encodes_north_west() {
        assert_eq!(references(48.85, -2.35), ("N".into(), "W".into()));
    }

    #[test]
    fn gps_entries_hold_exactly_four_tags() {
        let entries = gps_entries(GpsCoordinates::new(48.8584, 2.2945)).unwrap();
        let mut tags: Vec<u16> = entries.iter().map(|e| e.tag).collect();
        tags.sort_unstable();
        assert_eq!(tags, vec![1, 2, 3, 4]);
    }

    #[test]
    fn latitude_rationals_use_fixed_point_seconds() {
        let entries = gps_entries(GpsCoordinates::new(48.8584, 2.2945)).unwrap();
        let latitude = entries
            .iter()
            .find(|e| e.tag == tag::GPS_LATITUDE)
            .map(|e| e.value.clone());
        let Some(EntryValue::Rationals(values)) = latitude else {
            panic!("latitude must be rationals");
        };
        assert_eq!(values[0], ExifRational::whole(48));
        assert_eq!(values[1], ExifRational::whole(51));
        assert_eq!(values[2].denominator(), 100);
        assert!((values[2].to_f64() - 30.24).abs() <= 0.01);
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let result = build_exif_segment(GpsCoordinates::new(f64::NAN, 1.0));
        assert!(matches!(result, Err(CodecError::Encoding(_))));
    }

    #[test]
    fn embed_gps_rejects_missing_soi_without_output() {
        let input = vec![0x89, b'P', b'N', b'G'];
        let result = embed_gps(&input, GpsCoordinates::new(1.0, 1.0));
        assert!(matches!(result, Err(CodecError::Format(_))));
    }

    #[test]
    fn embed_gps_is_deterministic() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xD9];
        let coords = GpsCoordinates::new(-33.9, 151.2);
        assert_eq!(embed_gps(&jpeg, coords), embed_gps(&jpeg, coords));
    }
}
