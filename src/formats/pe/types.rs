//! Core PE data types and structures

use std::fmt;

// PE constants
pub const DOS_SIGNATURE: u16 = 0x5A4D; // MZ
pub const PE_SIGNATURE: [u8; 4] = *b"PE\0\0";
pub const PE32_MAGIC: u16 = 0x10B;
pub const PE32PLUS_MAGIC: u16 = 0x20B;

// Structure sizes
pub const DOS_HEADER_SIZE: usize = 64;
pub const COFF_HEADER_SIZE: usize = 20;
pub const SECTION_HEADER_SIZE: usize = 40;
pub const DATA_DIRECTORY_SIZE: usize = 8;

/// Offset of `e_lfanew` within the DOS header
pub const E_LFANEW_OFFSET: usize = 0x3C;

// Optional header field offsets (identical in PE32 and PE32+)
pub const OPT_SIZE_OF_HEADERS: usize = 60;
pub const OPT_CHECKSUM: usize = 64;

// Data directory array offsets within the optional header
pub const OPT32_DATA_DIRECTORIES: usize = 96;
pub const OPT64_DATA_DIRECTORIES: usize = 112;

/// Security (certificate table) data directory index
pub const IMAGE_DIRECTORY_ENTRY_SECURITY: usize = 4;

/// PE parsing error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeError {
    InvalidDosSignature,
    InvalidPeSignature,
    TruncatedHeader { expected: usize, actual: usize },
    InvalidOffset { offset: usize },
}

impl fmt::Display for PeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDosSignature => write!(f, "Invalid DOS signature"),
            Self::InvalidPeSignature => write!(f, "Invalid PE signature"),
            Self::TruncatedHeader { expected, actual } => {
                write!(
                    f,
                    "Truncated header: expected {} bytes, got {}",
                    expected, actual
                )
            }
            Self::InvalidOffset { offset } => write!(f, "Invalid file offset: 0x{:x}", offset),
        }
    }
}

impl std::error::Error for PeError {}

pub type Result<T> = std::result::Result<T, PeError>;

/// DOS header fields needed to reach the NT headers
#[derive(Debug, Clone, Copy)]
pub struct DosHeader {
    pub e_magic: u16,  // Magic number (MZ)
    pub e_lfanew: u32, // File address of PE header
}

/// COFF header fields needed to reach the section table
#[derive(Debug, Clone, Copy)]
pub struct CoffHeader {
    pub number_of_sections: u16,
    pub size_of_optional_header: u16,
}

/// Optional header fields shared by both layouts that matter for hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalHeaderFields {
    pub magic: u16,
    pub size_of_headers: u32,
}

/// Optional header tagged by layout.
///
/// An unrecognized magic is kept rather than rejected so the exclusion
/// calculator can report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionalHeader {
    Pe32(OptionalHeaderFields),
    Pe32Plus(OptionalHeaderFields),
    Unknown { magic: u16 },
}

impl OptionalHeader {
    pub fn magic(&self) -> u16 {
        match self {
            Self::Pe32(h) | Self::Pe32Plus(h) => h.magic,
            Self::Unknown { magic } => *magic,
        }
    }

    /// Declared size of headers; 0 for an unrecognized layout
    pub fn size_of_headers(&self) -> u32 {
        match self {
            Self::Pe32(h) | Self::Pe32Plus(h) => h.size_of_headers,
            Self::Unknown { .. } => 0,
        }
    }
}
