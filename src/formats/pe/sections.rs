//! Section table parsing for PE files

use crate::formats::pe::types::*;
use crate::formats::pe::utils::ReadExt;
use crate::header::SectionSpan;

/// Offsets of `SizeOfRawData` and `PointerToRawData` within a section header
const SIZE_OF_RAW_DATA: usize = 16;
const POINTER_TO_RAW_DATA: usize = 20;

/// Parse the raw-data spans of `count` section headers starting at `offset`.
///
/// The table keeps file order; the last entry is the one the security
/// directory is validated against.
pub fn parse_section_headers(data: &[u8], offset: usize, count: u16) -> Result<Vec<SectionSpan>> {
    let table_len = usize::from(count) * SECTION_HEADER_SIZE;
    let table = data.read_slice_at(offset, table_len).ok_or_else(|| {
        PeError::TruncatedHeader {
            expected: offset.saturating_add(table_len),
            actual: data.len(),
        }
    })?;

    let spans = table
        .chunks_exact(SECTION_HEADER_SIZE)
        .map(|raw| {
            let u32_at = |o: usize| u32::from_le_bytes([raw[o], raw[o + 1], raw[o + 2], raw[o + 3]]);
            SectionSpan {
                pointer_to_raw_data: u32_at(POINTER_TO_RAW_DATA),
                size_of_raw_data: u32_at(SIZE_OF_RAW_DATA),
            }
        })
        .collect();

    Ok(spans)
}
