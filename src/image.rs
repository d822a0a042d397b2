//! A parsed and validated PE image ready for hashing.

use tracing::debug;

use crate::authenticode::{self, HashPlan};
use crate::engine::{Digest, HashAlgorithm, HashContext};
use crate::error::{HashError, Result};
use crate::exclusion::{compute_exclusion, ExclusionDescriptor};
use crate::formats::pe::parse_headers;
use crate::header::{Bitness, HeaderDescriptor};
use crate::io::MAX_IMAGE_SIZE;
use crate::view::ImageView;

/// Image bytes with their header and exclusion descriptors.
///
/// The exclusion descriptor is validated once at construction; both digests
/// reuse it.
#[derive(Debug, Clone)]
pub struct PeImage<'a> {
    view: ImageView<'a>,
    header: HeaderDescriptor,
    exclusion: ExclusionDescriptor,
    file_size: u32,
}

impl<'a> PeImage<'a> {
    /// Parse and validate `bytes`.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let header = parse_headers(bytes)?;
        Self::from_parts(ImageView::new(bytes), header)
    }

    /// Build from a view and a header descriptor produced elsewhere.
    pub fn from_parts(view: ImageView<'a>, header: HeaderDescriptor) -> Result<Self> {
        let file_size = u32::try_from(view.len()).map_err(|_| HashError::ResourceExhausted {
            resource: "image size".to_string(),
            used: view.len() as u64,
            limit: MAX_IMAGE_SIZE,
        })?;
        let exclusion = compute_exclusion(&view, &header, file_size)?;
        debug!(
            file_size,
            signed = exclusion.security_directory.is_present(),
            "Validated image"
        );
        Ok(Self {
            view,
            header,
            exclusion,
            file_size,
        })
    }

    pub fn view(&self) -> ImageView<'a> {
        self.view
    }

    pub fn header(&self) -> &HeaderDescriptor {
        &self.header
    }

    pub fn exclusion(&self) -> &ExclusionDescriptor {
        &self.exclusion
    }

    pub fn file_size(&self) -> u32 {
        self.file_size
    }

    pub fn bitness(&self) -> Option<Bitness> {
        self.header.bitness()
    }

    /// Whether the image declares an embedded signature.
    pub fn is_signed(&self) -> bool {
        self.exclusion.security_directory.is_present()
    }

    pub fn authenticode_plan(&self) -> Result<HashPlan> {
        authenticode::plan_authenticode(&self.exclusion, self.file_size)
    }

    pub fn first_page_plan(&self, page_size: u32) -> HashPlan {
        authenticode::plan_first_page(page_size, &self.header, &self.exclusion)
    }

    pub fn authenticode_digest(&self, algorithm: HashAlgorithm) -> Result<Digest> {
        authenticode::authenticode_digest(
            &self.view,
            &self.exclusion,
            self.file_size,
            HashContext::new(algorithm),
        )
    }

    pub fn first_page_digest(&self, algorithm: HashAlgorithm, page_size: u32) -> Result<Digest> {
        authenticode::first_page_digest(
            page_size,
            &self.view,
            &self.header,
            &self.exclusion,
            HashContext::new(algorithm),
        )
    }
}
