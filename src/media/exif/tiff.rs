// SPDX-License-Identifier: MPL-2.0
//! TIFF/EXIF tag directory serializer.
//!
//! An EXIF block is a small TIFF file: an 8-byte header followed by a chain
//! of Image File Directories (IFDs). Each IFD is a count, a fixed-size array
//! of 12-byte entries, a next-IFD offset and an area holding the values that
//! do not fit in the 4-byte value slot of their entry.
//!
//! Encoding runs in two passes: [`Layout`] assigns an absolute offset to
//! every IFD, then [`encode`] emits the bytes with all pointers resolved.
//! Everything is written big-endian (`MM`).

use crate::domain::metadata::ExifRational;
use crate::error::CodecError;

/// Size of the TIFF header (`MM`, magic 42, offset of the 0th IFD).
pub const HEADER_LEN: usize = 8;

/// Size of a single IFD entry.
const ENTRY_LEN: usize = 12;

/// Inline value slot of an IFD entry.
const INLINE_LEN: usize = 4;

/// EXIF field types used by this encoder.
mod field_type {
    pub const ASCII: u16 = 2;
    pub const LONG: u16 = 4;
    pub const RATIONAL: u16 = 5;
}

/// Tag identifiers.
pub mod tag {
    pub const EXIF_IFD_POINTER: u16 = 0x8769;
    pub const GPS_IFD_POINTER: u16 = 0x8825;
    pub const INTEROP_IFD_POINTER: u16 = 0xA005;
    pub const GPS_LATITUDE_REF: u16 = 0x0001;
    pub const GPS_LATITUDE: u16 = 0x0002;
    pub const GPS_LONGITUDE_REF: u16 = 0x0003;
    pub const GPS_LONGITUDE: u16 = 0x0004;
}

/// Directories of an EXIF block, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfdKind {
    Primary,
    Exif,
    Interop,
    Gps,
}

impl IfdKind {
    const ORDER: [IfdKind; 4] = [IfdKind::Primary, IfdKind::Exif, IfdKind::Interop, IfdKind::Gps];

    fn index(self) -> usize {
        match self {
            IfdKind::Primary => 0,
            IfdKind::Exif => 1,
            IfdKind::Interop => 2,
            IfdKind::Gps => 3,
        }
    }
}

/// Value of a single directory entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
    /// NUL-terminated ASCII string; the terminator is added on encode.
    Ascii(String),
    /// Unsigned rationals.
    Rationals(Vec<ExifRational>),
    /// Pointer (LONG) to another directory, resolved during layout.
    Pointer(IfdKind),
}

impl EntryValue {
    fn field_type(&self) -> u16 {
        match self {
            EntryValue::Ascii(_) => field_type::ASCII,
            EntryValue::Rationals(_) => field_type::RATIONAL,
            EntryValue::Pointer(_) => field_type::LONG,
        }
    }

    fn count(&self) -> usize {
        match self {
            EntryValue::Ascii(text) => text.len() + 1,
            EntryValue::Rationals(values) => values.len(),
            EntryValue::Pointer(_) => 1,
        }
    }

    fn byte_len(&self) -> usize {
        match self {
            EntryValue::Ascii(text) => text.len() + 1,
            EntryValue::Rationals(values) => values.len() * 8,
            EntryValue::Pointer(_) => 4,
        }
    }

    fn write_value(&self, out: &mut Vec<u8>, layout: &Layout) {
        match self {
            EntryValue::Ascii(text) => {
                out.extend_from_slice(text.as_bytes());
                out.push(0);
            }
            EntryValue::Rationals(values) => {
                for value in values {
                    out.extend_from_slice(&value.numerator().to_be_bytes());
                    out.extend_from_slice(&value.denominator().to_be_bytes());
                }
            }
            EntryValue::Pointer(target) => {
                out.extend_from_slice(&layout.offset_of(*target).to_be_bytes());
            }
        }
    }
}

/// A single tag of a directory.
#[derive(Debug, Clone, PartialEq)]
pub struct IfdEntry {
    pub tag: u16,
    pub value: EntryValue,
}

impl IfdEntry {
    pub fn new(tag: u16, value: EntryValue) -> Self {
        Self { tag, value }
    }
}

/// A tag directory. Entries are sorted by tag on encode, as TIFF requires.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ifd {
    pub entries: Vec<IfdEntry>,
}

impl Ifd {
    fn sorted_entries(&self) -> Vec<&IfdEntry> {
        let mut entries: Vec<&IfdEntry> = self.entries.iter().collect();
        entries.sort_by_key(|entry| entry.tag);
        entries
    }

    /// Bytes occupied by out-of-line values, padded to an even length.
    fn data_len(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.value.byte_len())
            .filter(|&len| len > INLINE_LEN)
            .map(|len| len + (len & 1))
            .sum()
    }

    fn encoded_len(&self) -> usize {
        2 + self.entries.len() * ENTRY_LEN + 4 + self.data_len()
    }
}

/// Complete EXIF block: the four directories this encoder knows about.
///
/// The 0th, Exif and Interop directories only carry the pointers needed to
/// reach their children. No 1st (thumbnail) directory is written: the
/// next-IFD offset of the 0th directory is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ExifBlock {
    ifds: [Ifd; 4],
}

impl ExifBlock {
    /// Creates a block whose GPS directory holds `gps_entries`.
    pub fn with_gps(gps_entries: Vec<IfdEntry>) -> Self {
        let primary = Ifd {
            entries: vec![
                IfdEntry::new(tag::EXIF_IFD_POINTER, EntryValue::Pointer(IfdKind::Exif)),
                IfdEntry::new(tag::GPS_IFD_POINTER, EntryValue::Pointer(IfdKind::Gps)),
            ],
        };
        let exif = Ifd {
            entries: vec![IfdEntry::new(
                tag::INTEROP_IFD_POINTER,
                EntryValue::Pointer(IfdKind::Interop),
            )],
        };
        Self {
            ifds: [primary, exif, Ifd::default(), Ifd { entries: gps_entries }],
        }
    }

    pub fn ifd(&self, kind: IfdKind) -> &Ifd {
        &self.ifds[kind.index()]
    }
}

/// First pass: absolute offset of every directory from the TIFF header.
#[derive(Debug, Clone, Copy)]
struct Layout {
    offsets: [u32; 4],
    total_len: usize,
}

impl Layout {
    fn compute(block: &ExifBlock) -> Result<Self, CodecError> {
        let mut offsets = [0u32; 4];
        let mut cursor = HEADER_LEN;
        for kind in IfdKind::ORDER {
            offsets[kind.index()] = u32::try_from(cursor)
                .map_err(|_| CodecError::Encoding("EXIF block exceeds 4 GiB".to_string()))?;
            cursor += block.ifd(kind).encoded_len();
        }
        Ok(Self {
            offsets,
            total_len: cursor,
        })
    }

    fn offset_of(&self, kind: IfdKind) -> u32 {
        self.offsets[kind.index()]
    }
}

/// Serializes the block into a big-endian TIFF byte stream.
pub fn encode(block: &ExifBlock) -> Result<Vec<u8>, CodecError> {
    let layout = Layout::compute(block)?;
    let mut out = Vec::with_capacity(layout.total_len);

    out.extend_from_slice(b"MM");
    out.extend_from_slice(&42u16.to_be_bytes());
    out.extend_from_slice(&layout.offset_of(IfdKind::Primary).to_be_bytes());

    for kind in IfdKind::ORDER {
        let start = layout.offset_of(kind) as usize;
        if out.len() != start {
            return Err(CodecError::Encoding(format!(
                "{kind:?} directory expected at offset {start}, cursor at {}",
                out.len()
            )));
        }
        write_ifd(&mut out, block.ifd(kind), start, &layout)?;
    }

    if out.len() != layout.total_len {
        return Err(CodecError::Encoding(format!(
            "EXIF block length {} does not match layout {}",
            out.len(),
            layout.total_len
        )));
    }
    Ok(out)
}

fn write_ifd(out: &mut Vec<u8>, ifd: &Ifd, start: usize, layout: &Layout) -> Result<(), CodecError> {
    let entries = ifd.sorted_entries();
    let count = u16::try_from(entries.len())
        .map_err(|_| CodecError::Encoding("too many directory entries".to_string()))?;

    let mut data_offset = start + 2 + entries.len() * ENTRY_LEN + 4;
    let mut data_area = Vec::with_capacity(ifd.data_len());

    out.extend_from_slice(&count.to_be_bytes());
    for entry in entries {
        let value = &entry.value;
        let entry_count = u32::try_from(value.count())
            .map_err(|_| CodecError::Encoding(format!("tag {:#06x} too large", entry.tag)))?;

        out.extend_from_slice(&entry.tag.to_be_bytes());
        out.extend_from_slice(&value.field_type().to_be_bytes());
        out.extend_from_slice(&entry_count.to_be_bytes());

        if value.byte_len() <= INLINE_LEN {
            let slot_start = out.len();
            value.write_value(out, layout);
            out.resize(slot_start + INLINE_LEN, 0);
        } else {
            let offset = u32::try_from(data_offset)
                .map_err(|_| CodecError::Encoding("EXIF block exceeds 4 GiB".to_string()))?;
            out.extend_from_slice(&offset.to_be_bytes());

            let value_start = data_area.len();
            value.write_value(&mut data_area, layout);
            if data_area.len() % 2 == 1 {
                data_area.push(0);
            }
            data_offset += data_area.len() - value_start;
        }
    }
    // Next IFD: none, the chain ends at the 0th directory.
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&data_area);
    Ok(())
}
