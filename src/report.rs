//! Serializable summary of the digests computed for one image.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::HashAlgorithm;
use crate::header::Bitness;

/// Digests for one algorithm, hex encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmDigests {
    pub algorithm: HashAlgorithm,
    pub authenticode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_page: Option<String>,
}

/// Hash report for one image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHashes {
    pub file_size: u32,
    pub bitness: Option<Bitness>,
    /// Image declares an embedded signature
    pub signed: bool,
    /// Page size used for `first_page`, when computed
    pub page_size: Option<u32>,
    pub digests: Vec<AlgorithmDigests>,
}

impl ImageHashes {
    pub fn get(&self, algorithm: HashAlgorithm) -> Option<&AlgorithmDigests> {
        self.digests.iter().find(|d| d.algorithm == algorithm)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ImageHashes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.digests {
            writeln!(f, "{}  {}", d.algorithm, d.authenticode)?;
            if let Some(page) = &d.first_page {
                writeln!(f, "{}-page  {}", d.algorithm, page)?;
            }
        }
        Ok(())
    }
}
