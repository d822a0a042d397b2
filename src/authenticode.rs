//! Authenticode and first-page hashing.
//!
//! Both hashers first compute a [`HashPlan`] from the validated descriptors,
//! resolve every hashed span against the image, and only then feed the
//! engine. A span outside the image aborts the run before any byte is hashed.

use std::ops::Range;

use tracing::{debug, trace};

use crate::engine::{Digest, HashContext};
use crate::error::{HashError, Result};
use crate::exclusion::ExclusionDescriptor;
use crate::header::HeaderDescriptor;
use crate::view::ImageView;

/// Page size used for first-page hashes
pub const DEFAULT_PAGE_SIZE: u32 = 4096;

/// Authenticode tails are padded to this alignment
const TAIL_ALIGNMENT: u64 = 8;

/// Spans a hasher feeds, skips and excludes, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashPlan {
    pub hashed: Vec<Range<u64>>,
    pub skipped: Vec<Range<u64>>,
    /// Trailing bytes left out entirely (the certificate table and anything after it)
    pub excluded: Option<Range<u64>>,
    pub padding: u64,
}

fn total(ranges: &[Range<u64>]) -> u64 {
    ranges.iter().map(|r| r.end - r.start).sum()
}

impl HashPlan {
    pub fn hashed_len(&self) -> u64 {
        total(&self.hashed)
    }

    pub fn skipped_len(&self) -> u64 {
        total(&self.skipped)
    }

    pub fn excluded_len(&self) -> u64 {
        self.excluded.as_ref().map_or(0, |r| r.end - r.start)
    }

    /// Feed the planned spans of `image` into `ctx`, pad and finalize.
    pub fn execute(&self, image: &ImageView<'_>, mut ctx: HashContext) -> Result<Digest> {
        let spans = self
            .hashed
            .iter()
            .map(|r| image.span(r.clone()))
            .collect::<Result<Vec<_>>>()?;

        for (range, bytes) in self.hashed.iter().zip(spans) {
            trace!(start = range.start, end = range.end, "Hashing span");
            ctx.update(bytes);
        }
        ctx.pad_with_zeros(self.padding);
        Ok(ctx.finalize())
    }
}

/// Plan the full-image Authenticode digest.
///
/// Fails with [`HashError::ProcessingFault`] if the descriptor's spans are
/// out of order or extend past `file_size`.
pub fn plan_authenticode(exclusion: &ExclusionDescriptor, file_size: u32) -> Result<HashPlan> {
    let checksum = exclusion.checksum_range();
    let entry = exclusion.security_entry_range();
    let file_end = u64::from(file_size);
    let cert_end = exclusion.cert_end(file_size);

    let ordered = |start: u64, end: u64| {
        if start <= end {
            Ok(())
        } else {
            Err(HashError::ProcessingFault {
                offset: start,
                len: 0,
            })
        }
    };
    ordered(checksum.end, entry.start)?;
    ordered(entry.end, cert_end)?;
    ordered(cert_end, file_end)?;

    let consumed = cert_end - entry.end;
    let remainder = consumed % TAIL_ALIGNMENT;
    let padding = if remainder == 0 {
        0
    } else {
        TAIL_ALIGNMENT - remainder
    };

    let plan = HashPlan {
        hashed: vec![0..checksum.start, checksum.end..entry.start, entry.end..cert_end],
        skipped: vec![checksum, entry],
        excluded: exclusion
            .security_directory
            .is_present()
            .then_some(cert_end..file_end),
        padding,
    };

    debug!(
        file_size,
        hashed = plan.hashed_len(),
        excluded = plan.excluded_len(),
        padding,
        "Planned authenticode digest"
    );
    Ok(plan)
}

/// Plan the first-page digest over the headers within `page_size` bytes.
///
/// Hashing stops at `SizeOfHeaders`; the remainder of the page is zero padding.
pub fn plan_first_page(
    page_size: u32,
    header: &HeaderDescriptor,
    exclusion: &ExclusionDescriptor,
) -> HashPlan {
    let page = u64::from(page_size);
    let size_of_headers = u64::from(header.size_of_headers());
    let checksum = exclusion.checksum_range();
    let entry = exclusion.security_entry_range();

    let mut plan = HashPlan::default();
    let mut run: Option<u64> = None;
    let mut o = 0u64;

    while o < page {
        let skip = if o == checksum.start {
            Some(checksum.clone())
        } else if o == entry.start {
            Some(entry.clone())
        } else {
            None
        };
        if let Some(skip) = skip {
            if let Some(start) = run.take() {
                plan.hashed.push(start..o);
            }
            o = skip.end;
            plan.skipped.push(skip);
        }
        if o >= size_of_headers {
            break;
        }
        run.get_or_insert(o);
        o += 1;
    }
    if let Some(start) = run {
        plan.hashed.push(start..o);
    }
    plan.padding = page.saturating_sub(o);

    debug!(
        page_size,
        size_of_headers,
        hashed = plan.hashed_len(),
        padding = plan.padding,
        "Planned first-page digest"
    );
    plan
}

/// Compute the Authenticode digest of `image` with `ctx`.
pub fn authenticode_digest(
    image: &ImageView<'_>,
    exclusion: &ExclusionDescriptor,
    file_size: u32,
    ctx: HashContext,
) -> Result<Digest> {
    plan_authenticode(exclusion, file_size)?.execute(image, ctx)
}

/// Compute the first-page digest of `image` with `ctx`.
pub fn first_page_digest(
    page_size: u32,
    image: &ImageView<'_>,
    header: &HeaderDescriptor,
    exclusion: &ExclusionDescriptor,
    ctx: HashContext,
) -> Result<Digest> {
    plan_first_page(page_size, header, exclusion).execute(image, ctx)
}
