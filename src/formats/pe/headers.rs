//! PE header parsing

use crate::formats::pe::types::*;
use crate::formats::pe::utils::{check_bounds, ReadExt};

fn truncated(expected: usize, actual: usize) -> PeError {
    PeError::TruncatedHeader { expected, actual }
}

/// Parse DOS header from data
pub fn parse_dos_header(data: &[u8]) -> Result<DosHeader> {
    if data.len() < DOS_HEADER_SIZE {
        return Err(truncated(DOS_HEADER_SIZE, data.len()));
    }

    let e_magic = data
        .read_u16_le_at(0)
        .ok_or_else(|| truncated(2, data.len()))?;
    if e_magic != DOS_SIGNATURE {
        return Err(PeError::InvalidDosSignature);
    }

    let e_lfanew = data
        .read_u32_le_at(E_LFANEW_OFFSET)
        .ok_or_else(|| truncated(DOS_HEADER_SIZE, data.len()))?;

    Ok(DosHeader { e_magic, e_lfanew })
}

/// Parse COFF header from data at offset
pub fn parse_coff_header(data: &[u8], offset: usize) -> Result<CoffHeader> {
    let bytes = data
        .read_slice_at(offset, COFF_HEADER_SIZE)
        .ok_or_else(|| truncated(offset.saturating_add(COFF_HEADER_SIZE), data.len()))?;

    // Slice length is fixed above; the reads below cannot miss.
    let u16_at = |o: usize| u16::from_le_bytes([bytes[o], bytes[o + 1]]);

    Ok(CoffHeader {
        number_of_sections: u16_at(2),
        size_of_optional_header: u16_at(16),
    })
}

/// Parse optional header from data at offset.
///
/// Only the magic is required to be present for an unrecognized layout; the
/// fixed fields of PE32/PE32+ must lie inside `data`.
pub fn parse_optional_header(data: &[u8], offset: usize) -> Result<OptionalHeader> {
    let magic = data
        .read_u16_le_at(offset)
        .ok_or_else(|| truncated(offset.saturating_add(2), data.len()))?;

    let directories_at = match magic {
        PE32_MAGIC => OPT32_DATA_DIRECTORIES,
        PE32PLUS_MAGIC => OPT64_DATA_DIRECTORIES,
        _ => return Ok(OptionalHeader::Unknown { magic }),
    };

    check_bounds(offset, directories_at, data.len())
        .map_err(|_| truncated(offset.saturating_add(directories_at), data.len()))?;

    let fields = OptionalHeaderFields {
        magic,
        size_of_headers: data
            .read_u32_le_at(offset + OPT_SIZE_OF_HEADERS)
            .ok_or(PeError::InvalidOffset { offset })?,
    };

    Ok(match magic {
        PE32_MAGIC => OptionalHeader::Pe32(fields),
        _ => OptionalHeader::Pe32Plus(fields),
    })
}

/// Parse NT headers (PE signature + COFF + Optional)
pub fn parse_nt_headers(data: &[u8], offset: usize) -> Result<(CoffHeader, OptionalHeader)> {
    let signature = data
        .read_slice_at(offset, PE_SIGNATURE.len())
        .ok_or_else(|| truncated(offset.saturating_add(PE_SIGNATURE.len()), data.len()))?;

    if signature != PE_SIGNATURE {
        return Err(PeError::InvalidPeSignature);
    }

    let coff_header = parse_coff_header(data, offset + PE_SIGNATURE.len())?;

    let opt_offset = offset + PE_SIGNATURE.len() + COFF_HEADER_SIZE;
    let optional_header = parse_optional_header(data, opt_offset)?;

    Ok((coff_header, optional_header))
}
