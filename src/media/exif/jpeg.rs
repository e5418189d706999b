// SPDX-License-Identifier: MPL-2.0
//! JPEG marker segment scanning and EXIF APP1 splicing.

use crate::error::CodecError;

pub const MARKER_PREFIX: u8 = 0xFF;
pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOS: u8 = 0xDA;
pub const APP1: u8 = 0xE1;

/// Identifier that starts the payload of an EXIF APP1 segment.
pub const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Largest value of the 16-bit segment length field.
const MAX_SEGMENT_LEN: usize = 0xFFFF;

/// A marker segment located in the header part of a JPEG stream.
///
/// `start..end` covers the fill bytes, the marker, the length field and the
/// payload, so consecutive segments tile the header without gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub marker: u8,
    pub start: usize,
    pub end: usize,
    payload_start: usize,
}

impl Segment {
    pub fn payload<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.payload_start..self.end]
    }

    pub fn is_exif(&self, data: &[u8]) -> bool {
        self.marker == APP1 && self.payload(data).starts_with(EXIF_HEADER)
    }
}

/// Header segments of a JPEG stream and where the untouched tail begins.
///
/// The tail starts at the first SOS (scan header plus entropy-coded data) or
/// EOI marker and is never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegLayout {
    pub segments: Vec<Segment>,
    pub tail_start: usize,
}

/// Returns `true` when `data` starts with a Start-Of-Image marker.
pub fn has_soi(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == MARKER_PREFIX && data[1] == SOI
}

/// Scans the marker segments between SOI and the first scan.
pub fn scan(data: &[u8]) -> Result<JpegLayout, CodecError> {
    if !has_soi(data) {
        return Err(CodecError::Format("missing Start-Of-Image marker".to_string()));
    }

    let mut segments = Vec::new();
    let mut pos = 2;

    while pos < data.len() {
        let start = pos;
        if data[pos] != MARKER_PREFIX {
            return Err(CodecError::Format(format!(
                "expected marker at offset {pos}, found {:#04x}",
                data[pos]
            )));
        }
        // Any number of 0xFF fill bytes may precede a marker.
        while pos < data.len() && data[pos] == MARKER_PREFIX {
            pos += 1;
        }
        let Some(&marker) = data.get(pos) else {
            return Err(CodecError::Format("truncated marker".to_string()));
        };
        pos += 1;

        match marker {
            SOS | EOI => {
                return Ok(JpegLayout {
                    segments,
                    tail_start: start,
                });
            }
            SOI | 0x00 => {
                return Err(CodecError::Format(format!(
                    "unexpected marker {marker:#04x} at offset {start}"
                )));
            }
            // TEM and RSTn carry no length field.
            0x01 | 0xD0..=0xD7 => {
                segments.push(Segment {
                    marker,
                    start,
                    end: pos,
                    payload_start: pos,
                });
            }
            _ => {
                if pos + 2 > data.len() {
                    return Err(CodecError::Format(format!(
                        "truncated length of segment {marker:#04x}"
                    )));
                }
                let len = usize::from(u16::from_be_bytes([data[pos], data[pos + 1]]));
                if len < 2 {
                    return Err(CodecError::Format(format!(
                        "invalid length {len} for segment {marker:#04x}"
                    )));
                }
                let end = pos + len;
                if end > data.len() {
                    return Err(CodecError::Format(format!(
                        "segment {marker:#04x} at offset {start} overruns the stream"
                    )));
                }
                segments.push(Segment {
                    marker,
                    start,
                    end,
                    payload_start: pos + 2,
                });
                pos = end;
            }
        }
    }

    Ok(JpegLayout {
        segments,
        tail_start: data.len(),
    })
}

/// Wraps a TIFF block into a complete APP1 segment.
pub fn build_app1(tiff: &[u8]) -> Result<Vec<u8>, CodecError> {
    let len = 2 + EXIF_HEADER.len() + tiff.len();
    if len > MAX_SEGMENT_LEN {
        return Err(CodecError::Encoding(format!(
            "EXIF payload of {len} bytes does not fit in an APP1 segment"
        )));
    }

    let mut segment = Vec::with_capacity(2 + len);
    segment.push(MARKER_PREFIX);
    segment.push(APP1);
    // Checked against MAX_SEGMENT_LEN above.
    segment.extend_from_slice(&(len as u16).to_be_bytes());
    segment.extend_from_slice(EXIF_HEADER);
    segment.extend_from_slice(tiff);
    Ok(segment)
}

/// Places `app1` into `data`, replacing the existing EXIF segment if any.
///
/// The first EXIF APP1 segment is replaced in place and any further ones are
/// dropped. Without an existing EXIF segment, `app1` goes right after SOI.
/// All other bytes are copied in their original order.
pub fn splice_exif(data: &[u8], app1: &[u8]) -> Result<Vec<u8>, CodecError> {
    let layout = scan(data)?;
    let has_exif = layout.segments.iter().any(|segment| segment.is_exif(data));

    let mut out = Vec::with_capacity(data.len() + app1.len());
    out.extend_from_slice(&data[..2]);
    if !has_exif {
        out.extend_from_slice(app1);
    }

    let mut replaced = false;
    for segment in &layout.segments {
        if segment.is_exif(data) {
            if !replaced {
                out.extend_from_slice(app1);
                replaced = true;
            }
            continue;
        }
        out.extend_from_slice(&data[segment.start..segment.end]);
    }

    out.extend_from_slice(&data[layout.tail_start..]);
    Ok(out)
}
