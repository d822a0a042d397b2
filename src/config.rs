//! Configuration for image hashing.
//!
//! Every field has a default, so a partial JSON document is enough to
//! override a single setting.

use serde::{Deserialize, Serialize};

use crate::authenticode::DEFAULT_PAGE_SIZE;
use crate::engine::HashAlgorithm;
use crate::io::IOLimits;

/// Master configuration for `hash_image` / `hash_file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    /// Digest algorithms to compute (default: SHA256).
    pub algorithms: Vec<HashAlgorithm>,
    /// Also compute the first-page digest (default: true).
    pub page_hash: bool,
    /// Page size for the first-page digest (default: 4096).
    pub page_size: u32,
    /// I/O configuration for the loader.
    pub io: IOConfig,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            algorithms: vec![HashAlgorithm::Sha256],
            page_hash: true,
            page_size: DEFAULT_PAGE_SIZE,
            io: IOConfig::default(),
        }
    }
}

impl HashConfig {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_algorithms(mut self, algorithms: impl IntoIterator<Item = HashAlgorithm>) -> Self {
        self.algorithms = algorithms.into_iter().collect();
        self
    }
}

/// I/O configuration for file loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IOConfig {
    /// Maximum file size to map (default: 268435456 = 256MB).
    pub max_file_size: u64,
}

impl Default for IOConfig {
    fn default() -> Self {
        Self {
            max_file_size: IOLimits::default().max_file_size,
        }
    }
}

impl IOConfig {
    pub fn limits(&self) -> IOLimits {
        IOLimits {
            max_file_size: self.max_file_size,
        }
    }
}
