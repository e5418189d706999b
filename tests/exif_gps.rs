// SPDX-License-Identifier: MPL-2.0
use approx::assert_abs_diff_eq;
use roadlens::domain::metadata::GpsCoordinates;
use roadlens::error::CodecError;
use roadlens::media::exif::{build_exif_segment, embed_gps, jpeg};
use roadlens::media::frame_export::CapturedFrame;
use roadlens::media::metadata::read_gps;
use std::sync::Arc;

/// Largest error introduced by storing seconds with two decimals, in degrees.
const DMS_EPSILON: f64 = 0.005 / 3600.0 + 1e-9;

fn camera_frame() -> Vec<u8> {
    let (width, height) = (32u32, 24u32);
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            rgba.extend_from_slice(&[(x * 8) as u8, (y * 10) as u8, 90, 255]);
        }
    }
    CapturedFrame::new(Arc::new(rgba), width, height)
        .encode_jpeg(90)
        .expect("frame encodes")
}

fn exif_segment_count(data: &[u8]) -> usize {
    jpeg::scan(data)
        .expect("valid container")
        .segments
        .iter()
        .filter(|segment| segment.is_exif(data))
        .count()
}

/// Inserts an XMP APP1 segment right after SOI.
fn with_xmp(original: &[u8]) -> Vec<u8> {
    let mut payload = b"http://ns.adobe.com/xap/1.0/\0".to_vec();
    payload.extend_from_slice(b"<x:xmpmeta/>");
    let len = u16::try_from(payload.len() + 2).unwrap();

    let mut out = original[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&original[2..]);
    out
}

#[test]
fn embedding_inserts_one_segment_and_keeps_every_other_byte() {
    let original = camera_frame();
    let coordinate = GpsCoordinates::new(48.8584, 2.2945);
    let segment = build_exif_segment(coordinate).unwrap();

    let tagged = embed_gps(&original, coordinate).unwrap();

    assert_eq!(tagged.len(), original.len() + segment.len());
    assert_eq!(&tagged[..2], &[0xFF, 0xD8]);
    assert_eq!(&tagged[2..2 + segment.len()], segment.as_slice());
    assert_eq!(&tagged[2 + segment.len()..], &original[2..]);
    assert_eq!(exif_segment_count(&tagged), 1);
}

#[test]
fn embedded_coordinates_read_back_within_precision() {
    let original = camera_frame();
    let cases = [
        (48.8584, 2.2945),
        (-33.8568, 151.2153),
        (40.6892, -74.0445),
        (-22.9519, -43.2105),
        (0.0, 0.0),
    ];

    for (lat, lon) in cases {
        let tagged = embed_gps(&original, GpsCoordinates::new(lat, lon)).unwrap();
        let read = read_gps(&tagged).expect("GPS tags readable");
        assert_abs_diff_eq!(read.latitude(), lat, epsilon = DMS_EPSILON);
        assert_abs_diff_eq!(read.longitude(), lon, epsilon = DMS_EPSILON);
    }
}

#[test]
fn embedding_does_not_mutate_input() {
    let original = camera_frame();
    let copy = original.clone();
    let _ = embed_gps(&original, GpsCoordinates::new(10.0, 20.0)).unwrap();
    assert_eq!(original, copy);
}

#[test]
fn re_embedding_replaces_existing_exif() {
    let original = camera_frame();
    let first = embed_gps(&original, GpsCoordinates::new(51.5007, -0.1246)).unwrap();
    let second = embed_gps(&first, GpsCoordinates::new(-1.0, 36.8)).unwrap();

    assert_eq!(second.len(), first.len());
    assert_eq!(exif_segment_count(&second), 1);

    let read = read_gps(&second).unwrap();
    assert_abs_diff_eq!(read.latitude(), -1.0, epsilon = DMS_EPSILON);
    assert_abs_diff_eq!(read.longitude(), 36.8, epsilon = DMS_EPSILON);
}

#[test]
fn xmp_segment_is_preserved() {
    let original = with_xmp(&camera_frame());
    let tagged = embed_gps(&original, GpsCoordinates::new(35.6586, 139.7454)).unwrap();

    let layout = jpeg::scan(&tagged).unwrap();
    let xmp: Vec<_> = layout
        .segments
        .iter()
        .filter(|segment| segment.marker == jpeg::APP1 && !segment.is_exif(&tagged))
        .collect();
    assert_eq!(xmp.len(), 1);
    assert!(xmp[0]
        .payload(&tagged)
        .starts_with(b"http://ns.adobe.com/xap/1.0/\0"));
    assert!(read_gps(&tagged).is_some());
}

#[test]
fn embedding_is_deterministic() {
    let original = camera_frame();
    let coordinate = GpsCoordinates::new(-12.0464, -77.0428);
    assert_eq!(
        embed_gps(&original, coordinate).unwrap(),
        embed_gps(&original, coordinate).unwrap()
    );
}

#[test]
fn non_jpeg_input_is_rejected() {
    let png_magic = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    assert!(matches!(
        embed_gps(&png_magic, GpsCoordinates::default()),
        Err(CodecError::Format(_))
    ));
    assert!(matches!(
        embed_gps(&[], GpsCoordinates::default()),
        Err(CodecError::Format(_))
    ));
}

#[test]
fn truncated_header_is_rejected() {
    let original = camera_frame();
    // Cut inside the first segment after SOI.
    let truncated = &original[..6];
    assert!(matches!(
        embed_gps(truncated, GpsCoordinates::default()),
        Err(CodecError::Format(_))
    ));
}
