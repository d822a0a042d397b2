//! Authenticode digests and first-page hashes for PE images.
//!
//! The Authenticode digest covers the whole file except the checksum field,
//! the security directory entry and the certificate table. The first-page
//! digest covers the headers inside the first memory page with the same two
//! fields skipped.

pub mod authenticode;
pub mod config;
pub mod engine;
pub mod error;
pub mod exclusion;
pub mod formats;
pub mod header;
pub mod image;
pub mod io;
pub mod logging;
pub mod report;
pub mod view;

use std::path::Path;

use rayon::prelude::*;
use tracing::info;

pub use authenticode::{HashPlan, DEFAULT_PAGE_SIZE};
pub use config::{HashConfig, IOConfig};
pub use engine::{Digest, HashAlgorithm, HashContext};
pub use error::{HashError, Result};
pub use exclusion::{compute_exclusion, ExclusionDescriptor, SecurityDirectory};
pub use header::{Bitness, HeaderDescriptor, SectionSpan};
pub use image::PeImage;
pub use io::{IOLimits, SafeReader};
pub use report::{AlgorithmDigests, ImageHashes};
pub use view::ImageView;

/// Hash an in-memory image with every algorithm in `config`.
pub fn hash_image(bytes: &[u8], config: &HashConfig) -> Result<ImageHashes> {
    let span = span_trace!("hash_image", size = bytes.len());
    let _guard = span.enter();

    let image = PeImage::from_bytes(bytes).map_err(|e| log_error!(e, "image validation"))?;
    let page_size = config.page_hash.then_some(config.page_size);

    let digests = config
        .algorithms
        .par_iter()
        .map(|&algorithm| -> Result<AlgorithmDigests> {
            let authenticode = image.authenticode_digest(algorithm)?;
            let first_page = page_size
                .map(|size| image.first_page_digest(algorithm, size))
                .transpose()?;
            Ok(AlgorithmDigests {
                algorithm,
                authenticode: authenticode.to_hex(),
                first_page: first_page.map(|d| d.to_hex()),
            })
        })
        .collect::<Result<Vec<_>>>()
        .map_err(|e| log_error!(e, "hashing"))?;

    info!(
        file_size = image.file_size(),
        signed = image.is_signed(),
        algorithms = digests.len(),
        "Hashed image"
    );

    Ok(ImageHashes {
        file_size: image.file_size(),
        bitness: image.bitness(),
        signed: image.is_signed(),
        page_size,
        digests,
    })
}

/// Map the file at `path` and hash it with every algorithm in `config`.
pub fn hash_file<P: AsRef<Path>>(path: P, config: &HashConfig) -> Result<ImageHashes> {
    let path = path.as_ref();
    let span = span_trace!("hash_file", path = %path.display());
    let _guard = span.enter();

    let reader = SafeReader::open(path, config.io.limits())
        .map_err(|e| log_error!(HashError::from(e), "open"))?;
    hash_image(reader.as_slice(), config)
}
