//! Bounds-checked, read-only view over image bytes.
//!
//! Every read goes through [`ImageView::span`] or [`ImageView::read_u32_le`];
//! an access outside `[0, len)` becomes [`HashError::ProcessingFault`].

use std::fmt;
use std::ops::Range;

use crate::error::{HashError, Result};
use crate::formats::pe::utils::ReadExt;

#[derive(Clone, Copy)]
pub struct ImageView<'a> {
    bytes: &'a [u8],
}

impl<'a> ImageView<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes in `[range.start, range.end)`.
    pub fn span(&self, range: Range<u64>) -> Result<&'a [u8]> {
        let fault = || HashError::ProcessingFault {
            offset: range.start,
            len: range.end.saturating_sub(range.start),
        };
        if range.end < range.start {
            return Err(fault());
        }
        let start = usize::try_from(range.start).map_err(|_| fault())?;
        let end = usize::try_from(range.end).map_err(|_| fault())?;
        self.bytes.get(start..end).ok_or_else(fault)
    }

    pub fn read_u32_le(&self, offset: u64) -> Result<u32> {
        usize::try_from(offset)
            .ok()
            .and_then(|o| self.bytes.read_u32_le_at(o))
            .ok_or(HashError::ProcessingFault { offset, len: 4 })
    }
}

impl fmt::Debug for ImageView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageView").field("len", &self.len()).finish()
    }
}

impl<'a> From<&'a [u8]> for ImageView<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}
