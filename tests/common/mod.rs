//! Common test utilities and helpers.
//!
//! Integration tests build their own PE images rather than depend on sample
//! binaries, so every offset below is known exactly.

#![allow(dead_code)]

use std::io::Write;

use authhash::Bitness;
use tempfile::NamedTempFile;

pub const DEFAULT_E_LFANEW: u32 = 0x80;
pub const DEFAULT_SIZE_OF_HEADERS: u32 = 0x400;

/// Builder for synthetic PE32/PE32+ images.
///
/// Sections are laid out back to back after the headers. A certificate, if
/// any, is appended at the next 8-byte boundary and the security directory
/// is pointed at it.
#[derive(Debug, Clone)]
pub struct PeBuilder {
    bitness: Bitness,
    e_lfanew: u32,
    size_of_headers: u32,
    checksum: u32,
    sections: Vec<u32>,
    certificate: Option<Vec<u8>>,
}

impl PeBuilder {
    pub fn new(bitness: Bitness) -> Self {
        Self {
            bitness,
            e_lfanew: DEFAULT_E_LFANEW,
            size_of_headers: DEFAULT_SIZE_OF_HEADERS,
            checksum: 0,
            sections: Vec::new(),
            certificate: None,
        }
    }

    pub fn pe32() -> Self {
        Self::new(Bitness::Pe32)
    }

    pub fn pe32plus() -> Self {
        Self::new(Bitness::Pe32Plus)
    }

    pub fn size_of_headers(mut self, size: u32) -> Self {
        self.size_of_headers = size;
        self
    }

    pub fn checksum(mut self, checksum: u32) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn section(mut self, raw_size: u32) -> Self {
        self.sections.push(raw_size);
        self
    }

    pub fn certificate(mut self, blob: &[u8]) -> Self {
        self.certificate = Some(blob.to_vec());
        self
    }

    pub fn checksum_offset(&self) -> usize {
        (self.e_lfanew + self.bitness.checksum_field_offset()) as usize
    }

    pub fn security_offset(&self) -> usize {
        (self.e_lfanew + self.bitness.security_entry_offset()) as usize
    }

    fn optional_header_size(&self) -> usize {
        match self.bitness {
            Bitness::Pe32 => 224,
            Bitness::Pe32Plus => 240,
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let nt = self.e_lfanew as usize;
        let opt = nt + 24;
        let table = opt + self.optional_header_size();
        let mut data = vec![0u8; self.size_of_headers as usize];

        data[0..2].copy_from_slice(b"MZ");
        for (i, b) in data[0x40..nt].iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(13).wrapping_add(1);
        }
        put_u32(&mut data, 0x3C, self.e_lfanew);
        data[nt..nt + 4].copy_from_slice(b"PE\0\0");

        let machine: u16 = match self.bitness {
            Bitness::Pe32 => 0x14c,
            Bitness::Pe32Plus => 0x8664,
        };
        put_u16(&mut data, nt + 4, machine);
        put_u16(&mut data, nt + 6, self.sections.len() as u16);
        put_u16(&mut data, nt + 20, self.optional_header_size() as u16);

        put_u16(&mut data, opt, self.bitness.magic());
        put_u32(&mut data, opt + 60, self.size_of_headers);
        put_u32(&mut data, opt + 64, self.checksum);
        let directories = match self.bitness {
            Bitness::Pe32 => 96,
            Bitness::Pe32Plus => 112,
        };
        put_u32(&mut data, opt + directories - 4, 16);

        let mut cursor = self.size_of_headers;
        for (i, &raw_size) in self.sections.iter().enumerate() {
            let entry = table + i * 40;
            data[entry..entry + 3].copy_from_slice(format!(".s{i}").as_bytes());
            put_u32(&mut data, entry + 16, raw_size);
            put_u32(&mut data, entry + 20, cursor);
            data.extend((0..raw_size).map(|j| (j as u8).wrapping_mul(7) ^ (i as u8 + 0x5A)));
            cursor += raw_size;
        }

        if let Some(blob) = &self.certificate {
            while data.len() % 8 != 0 {
                data.push(0);
            }
            let va = data.len() as u32;
            data.extend_from_slice(blob);
            let entry = self.security_offset();
            put_u32(&mut data, entry, va);
            put_u32(&mut data, entry + 4, blob.len() as u32);
        }

        data
    }
}

pub fn put_u16(data: &mut [u8], offset: usize, value: u16) {
    data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

pub fn put_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Creates a temporary file with the given content.
pub fn create_temp_file(content: &[u8]) -> anyhow::Result<NamedTempFile> {
    let mut temp_file = NamedTempFile::new()?;
    temp_file.write_all(content)?;
    temp_file.flush()?;
    Ok(temp_file)
}
