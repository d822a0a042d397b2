//! Header description consumed by the exclusion calculator and page hasher.

use serde::{Deserialize, Serialize};

use crate::formats::pe::types::{
    COFF_HEADER_SIZE, DATA_DIRECTORY_SIZE, IMAGE_DIRECTORY_ENTRY_SECURITY, OPT32_DATA_DIRECTORIES,
    OPT64_DATA_DIRECTORIES, OPT_CHECKSUM, PE32PLUS_MAGIC, PE32_MAGIC, PE_SIGNATURE,
};

const OPTIONAL_HEADER_OFFSET: u32 = (PE_SIGNATURE.len() + COFF_HEADER_SIZE) as u32;

/// Optional header layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bitness {
    /// 32-bit optional header (magic 0x10b)
    Pe32,
    /// 64-bit optional header (magic 0x20b)
    Pe32Plus,
}

impl Bitness {
    pub fn from_magic(magic: u16) -> Option<Self> {
        match magic {
            PE32_MAGIC => Some(Self::Pe32),
            PE32PLUS_MAGIC => Some(Self::Pe32Plus),
            _ => None,
        }
    }

    pub fn magic(self) -> u16 {
        match self {
            Self::Pe32 => PE32_MAGIC,
            Self::Pe32Plus => PE32PLUS_MAGIC,
        }
    }

    /// Offset of `OptionalHeader.CheckSum` from the start of the NT headers.
    pub fn checksum_field_offset(self) -> u32 {
        OPTIONAL_HEADER_OFFSET + OPT_CHECKSUM as u32
    }

    /// Offset of `DataDirectory[SECURITY]` from the start of the NT headers.
    pub fn security_entry_offset(self) -> u32 {
        let directories = match self {
            Self::Pe32 => OPT32_DATA_DIRECTORIES,
            Self::Pe32Plus => OPT64_DATA_DIRECTORIES,
        };
        OPTIONAL_HEADER_OFFSET
            + (directories + IMAGE_DIRECTORY_ENTRY_SECURITY * DATA_DIRECTORY_SIZE) as u32
    }
}

/// Raw-data extent of one section table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpan {
    pub pointer_to_raw_data: u32,
    pub size_of_raw_data: u32,
}

impl SectionSpan {
    pub fn raw_end(&self) -> u64 {
        u64::from(self.pointer_to_raw_data) + u64::from(self.size_of_raw_data)
    }
}

/// Parsed header facts needed for hashing. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDescriptor {
    magic: u16,
    size_of_headers: u32,
    nt_headers_offset: u32,
    sections: Vec<SectionSpan>,
}

impl HeaderDescriptor {
    pub fn new(
        magic: u16,
        size_of_headers: u32,
        nt_headers_offset: u32,
        sections: Vec<SectionSpan>,
    ) -> Self {
        Self {
            magic,
            size_of_headers,
            nt_headers_offset,
            sections,
        }
    }

    pub fn magic(&self) -> u16 {
        self.magic
    }

    /// Layout tag; `None` when the magic is not recognized.
    pub fn bitness(&self) -> Option<Bitness> {
        Bitness::from_magic(self.magic)
    }

    /// Declared `SizeOfHeaders`, or 0 when the layout is unsupported.
    pub fn size_of_headers(&self) -> u32 {
        match self.bitness() {
            Some(_) => self.size_of_headers,
            None => 0,
        }
    }

    /// `e_lfanew`: file offset of the NT headers.
    pub fn nt_headers_offset(&self) -> u32 {
        self.nt_headers_offset
    }

    pub fn sections(&self) -> &[SectionSpan] {
        &self.sections
    }

    pub fn number_of_sections(&self) -> usize {
        self.sections.len()
    }

    pub fn last_section(&self) -> Option<&SectionSpan> {
        self.sections.last()
    }
}
