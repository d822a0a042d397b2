//! Error types for Authenticode and page hash computation.
//!
//! Validation failures are reported before any hash engine is opened; faults
//! raised while reading image bytes abort the run and drop its context.

use thiserror::Error;

use crate::formats::pe::PeError;
use crate::io::error::IoError;

/// Main error type for hashing operations.
#[derive(Debug, Error)]
pub enum HashError {
    /// Optional header magic is neither PE32 nor PE32+
    #[error("Bad optional header magic: {0:#06x}")]
    BadOptionalHeaderMagic(u16),

    /// Security directory present but the image has no sections
    #[error("Bad section count: security directory present but no sections declared")]
    BadSectionCount,

    /// Security directory overlaps section data, the headers, or lies past EOF
    #[error(
        "Bad security directory address {virtual_address:#x} (must be in [{lower_bound:#x}, {file_size:#x}))"
    )]
    BadSecurityDirectoryVirtualAddress {
        virtual_address: u32,
        lower_bound: u64,
        file_size: u32,
    },

    /// Certificate blob does not fit in the remainder of the file
    #[error("Bad security directory size {size:#x} ({available:#x} bytes available)")]
    BadSecurityDirectorySize { size: u32, available: u32 },

    /// Security directory entry lies past the end of the file
    #[error("Truncated headers: directory entry at {offset:#x} exceeds file size {file_size:#x}")]
    TruncatedHeaders { offset: u64, file_size: u32 },

    /// Resource limit exceeded
    #[error("Resource limit exceeded: {resource} ({used}/{limit})")]
    ResourceExhausted {
        resource: String,
        used: u64,
        limit: u64,
    },

    /// Digest algorithm cannot be opened
    #[error("Hash algorithm unavailable: {0}")]
    AlgorithmUnavailable(String),

    /// Out-of-bounds access while reading image bytes
    #[error("Processing fault reading {len:#x} bytes at offset {offset:#x}")]
    ProcessingFault { offset: u64, len: u64 },

    /// DOS/NT headers could not be located
    #[error("Invalid image: {0}")]
    InvalidImage(#[from] PeError),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HashError {
    /// Whether this error came from security directory or header validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::BadOptionalHeaderMagic(_)
                | Self::BadSectionCount
                | Self::BadSecurityDirectoryVirtualAddress { .. }
                | Self::BadSecurityDirectorySize { .. }
                | Self::TruncatedHeaders { .. }
        )
    }
}

impl From<IoError> for HashError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::FileTooLarge { limit, found } => Self::ResourceExhausted {
                resource: "file size".to_string(),
                used: found,
                limit,
            },
            IoError::StdIo(e) => Self::Io(e),
        }
    }
}

/// Result type alias for hashing operations
pub type Result<T> = std::result::Result<T, HashError>;
