//! PE header parser feeding the hashers.
//!
//! Locates the NT headers through `e_lfanew`, reads the COFF and optional
//! headers and the section table, and condenses them into a
//! [`HeaderDescriptor`].

pub mod headers;
pub mod sections;
pub mod types;
pub mod utils;

use headers::*;
use sections::*;
pub use types::*;

use crate::header::{HeaderDescriptor, SectionSpan};

/// Parsed DOS/NT headers and section table of an image
#[derive(Debug, Clone)]
pub struct PeHeaders {
    dos_header: DosHeader,
    optional_header: OptionalHeader,
    sections: Vec<SectionSpan>,
}

impl PeHeaders {
    /// Parse the headers of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let dos_header = parse_dos_header(data)?;
        let nt_offset = dos_header.e_lfanew as usize;

        let (coff_header, optional_header) = parse_nt_headers(data, nt_offset)?;

        let section_offset = nt_offset
            + PE_SIGNATURE.len()
            + COFF_HEADER_SIZE
            + coff_header.size_of_optional_header as usize;
        let sections =
            parse_section_headers(data, section_offset, coff_header.number_of_sections)?;

        tracing::debug!(
            e_lfanew = dos_header.e_lfanew,
            magic = optional_header.magic(),
            size_of_headers = optional_header.size_of_headers(),
            sections = sections.len(),
            "Parsed PE headers"
        );

        Ok(Self {
            dos_header,
            optional_header,
            sections,
        })
    }

    /// Get DOS header
    pub fn dos_header(&self) -> &DosHeader {
        &self.dos_header
    }

    /// Get optional header
    pub fn optional_header(&self) -> &OptionalHeader {
        &self.optional_header
    }

    /// Section raw-data spans in file order
    pub fn sections(&self) -> &[SectionSpan] {
        &self.sections
    }

    /// Condense into the descriptor consumed by the exclusion calculator.
    pub fn descriptor(&self) -> HeaderDescriptor {
        HeaderDescriptor::new(
            self.optional_header.magic(),
            self.optional_header.size_of_headers(),
            self.dos_header.e_lfanew,
            self.sections.clone(),
        )
    }
}

/// Parse `data` and return its header descriptor.
pub fn parse_headers(data: &[u8]) -> Result<HeaderDescriptor> {
    PeHeaders::parse(data).map(|h| h.descriptor())
}
