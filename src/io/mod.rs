//! Bounded, read-only file mapping for image hashing.
//!
//! This module provides a `SafeReader` that memory-maps an image file for the
//! duration of a hash run. It enforces a file size limit so a hostile path
//! cannot pull an arbitrarily large mapping into the process.

pub mod error;

use crate::io::error::{IoError, Result};
use crate::view::ImageView;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// PE offsets are 32-bit; nothing larger can be described by its headers.
pub const MAX_IMAGE_SIZE: u64 = u32::MAX as u64;

/// Defines the resource limits for I/O operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IOLimits {
    /// The absolute maximum file size that can be opened.
    pub max_file_size: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            max_file_size: 256 * 1024 * 1024, // 256MB
        }
    }
}

/// A read-only memory map over an image file, bounded by `IOLimits`.
pub struct SafeReader {
    // None when the file size is zero; memmap cannot map empty files.
    mmap: Option<Mmap>,
    file_size: u64,
}

impl SafeReader {
    /// Opens a file and memory-maps it read-only.
    ///
    /// Fails with `IoError::FileTooLarge` if the file exceeds
    /// `limits.max_file_size` or cannot be addressed with 32-bit offsets.
    pub fn open<P: AsRef<Path>>(path: P, limits: IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        debug!(
            path = %path.display(),
            size = file_size,
            limits.max_file_size = limits.max_file_size,
            "Opening image for hashing"
        );

        let limit = limits.max_file_size.min(MAX_IMAGE_SIZE);
        if file_size > limit {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = limit,
                "File is too large"
            );
            return Err(IoError::FileTooLarge {
                limit,
                found: file_size,
            });
        }

        let mmap = if file_size == 0 {
            None
        } else {
            // Safety: read-only map of a regular file; the mapping is never written through.
            Some(unsafe { Mmap::map(&file)? })
        };

        Ok(Self { mmap, file_size })
    }

    /// Returns the total size of the underlying file in bytes.
    pub fn size(&self) -> u64 {
        self.file_size
    }

    /// The mapped file contents; empty for a zero-length file.
    pub fn as_slice(&self) -> &[u8] {
        match &self.mmap {
            Some(m) => &m[..],
            None => &[],
        }
    }

    /// A bounds-checked view borrowing the mapping.
    pub fn view(&self) -> ImageView<'_> {
        ImageView::new(self.as_slice())
    }
}
