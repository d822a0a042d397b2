//! Exclusion range calculation.
//!
//! Locates the checksum field and the security directory entry, reads the
//! directory and validates it against the section table and the file bounds.
//! A directory that fails validation never yields a descriptor.

use std::ops::Range;

use tracing::{debug, warn};

use crate::error::{HashError, Result};
use crate::header::{Bitness, HeaderDescriptor};
use crate::view::ImageView;

/// Size of `OptionalHeader.CheckSum`
pub const CHECKSUM_FIELD_SIZE: u64 = 4;
/// Size of one data directory entry
pub const SECURITY_ENTRY_SIZE: u64 = 8;

/// Security (certificate table) data directory. `virtual_address` is a file offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecurityDirectory {
    pub virtual_address: u32,
    pub size: u32,
}

impl SecurityDirectory {
    /// Whether a certificate blob is declared.
    pub fn is_present(&self) -> bool {
        self.virtual_address != 0
    }
}

/// Validated exclusion offsets for one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExclusionDescriptor {
    pub checksum_offset: u32,
    pub security_offset: u32,
    pub security_directory: SecurityDirectory,
}

impl ExclusionDescriptor {
    pub fn checksum_range(&self) -> Range<u64> {
        let start = u64::from(self.checksum_offset);
        start..start + CHECKSUM_FIELD_SIZE
    }

    pub fn security_entry_range(&self) -> Range<u64> {
        let start = u64::from(self.security_offset);
        start..start + SECURITY_ENTRY_SIZE
    }

    /// End of the hashed tail: the certificate offset when signed, else EOF.
    pub fn cert_end(&self, file_size: u32) -> u64 {
        if self.security_directory.is_present() {
            u64::from(self.security_directory.virtual_address)
        } else {
            u64::from(file_size)
        }
    }

    /// Certificate blob span, if one is declared.
    pub fn certificate_range(&self) -> Option<Range<u64>> {
        let dir = self.security_directory;
        dir.is_present().then(|| {
            let start = u64::from(dir.virtual_address);
            start..start + u64::from(dir.size)
        })
    }
}

/// Compute and validate the exclusion descriptor for an image of `file_size` bytes.
pub fn compute_exclusion(
    image: &ImageView<'_>,
    header: &HeaderDescriptor,
    file_size: u32,
) -> Result<ExclusionDescriptor> {
    let Some(bitness) = header.bitness() else {
        warn!(magic = header.magic(), "Unsupported optional header magic");
        return Err(HashError::BadOptionalHeaderMagic(header.magic()));
    };

    let nt = u64::from(header.nt_headers_offset());
    let checksum_offset = nt + u64::from(bitness.checksum_field_offset());
    let security_offset = nt + u64::from(bitness.security_entry_offset());

    if security_offset + SECURITY_ENTRY_SIZE > u64::from(file_size) {
        warn!(
            security_offset,
            file_size, "Security directory entry lies past end of file"
        );
        return Err(HashError::TruncatedHeaders {
            offset: security_offset,
            file_size,
        });
    }

    let security_directory = SecurityDirectory {
        virtual_address: image.read_u32_le(security_offset)?,
        size: image.read_u32_le(security_offset + 4)?,
    };

    debug!(
        ?bitness,
        checksum_offset,
        security_offset,
        virtual_address = security_directory.virtual_address,
        size = security_directory.size,
        "Located exclusion fields"
    );

    if security_directory.is_present() {
        validate_security_directory(header, security_offset, security_directory, file_size)?;
    }

    // Both offsets fit: security_offset + 8 <= file_size <= u32::MAX.
    Ok(ExclusionDescriptor {
        checksum_offset: checksum_offset as u32,
        security_offset: security_offset as u32,
        security_directory,
    })
}

fn validate_security_directory(
    header: &HeaderDescriptor,
    security_offset: u64,
    dir: SecurityDirectory,
    file_size: u32,
) -> Result<()> {
    let Some(last) = header.last_section() else {
        warn!(
            virtual_address = dir.virtual_address,
            "Security directory present but section table is empty"
        );
        return Err(HashError::BadSectionCount);
    };

    let lower_bound = last.raw_end().max(security_offset + SECURITY_ENTRY_SIZE);
    let va = u64::from(dir.virtual_address);
    if va < lower_bound || dir.virtual_address >= file_size {
        warn!(
            virtual_address = dir.virtual_address,
            lower_bound,
            file_size,
            "Security directory address out of bounds"
        );
        return Err(HashError::BadSecurityDirectoryVirtualAddress {
            virtual_address: dir.virtual_address,
            lower_bound,
            file_size,
        });
    }

    let available = file_size - dir.virtual_address;
    if dir.size > available {
        warn!(
            size = dir.size,
            available, "Certificate blob exceeds remaining file length"
        );
        return Err(HashError::BadSecurityDirectorySize {
            size: dir.size,
            available,
        });
    }

    Ok(())
}
