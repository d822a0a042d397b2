//! Streaming hash contexts for the supported digest algorithms.
//!
//! A [`HashContext`] is opened per hashing run, fed spans of image bytes and
//! consumed by [`HashContext::finalize`]. Dropping it on an error path
//! releases the underlying primitive.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use sha1::Sha1;
use sha2::digest::DynDigest;
use sha2::{Sha256, Sha384, Sha512};

use crate::error::{HashError, Result};

const ZERO_CHUNK: [u8; 8] = [0u8; 8];

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 4] = [Self::Sha1, Self::Sha256, Self::Sha384, Self::Sha512];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha384 => "SHA384",
            Self::Sha512 => "SHA512",
        }
    }

    /// Digest length in bytes.
    pub fn digest_size(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Internal block length in bytes.
    pub fn block_size(self) -> usize {
        match self {
            Self::Sha1 | Self::Sha256 => 64,
            Self::Sha384 | Self::Sha512 => 128,
        }
    }

    fn hasher(self) -> Box<dyn DynDigest + Send> {
        match self {
            Self::Sha1 => Box::new(Sha1::default()),
            Self::Sha256 => Box::new(Sha256::default()),
            Self::Sha384 => Box::new(Sha384::default()),
            Self::Sha512 => Box::new(Sha512::default()),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashError;

    /// Accepts "SHA256", "sha-256", "Sha_256" and the like.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match normalized.as_str() {
            "SHA1" => Ok(Self::Sha1),
            "SHA256" => Ok(Self::Sha256),
            "SHA384" => Ok(Self::Sha384),
            "SHA512" => Ok(Self::Sha512),
            _ => Err(HashError::AlgorithmUnavailable(s.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An open streaming hash primitive.
pub struct HashContext {
    algorithm: HashAlgorithm,
    hasher: Box<dyn DynDigest + Send>,
    bytes_hashed: u64,
    bytes_padded: u64,
}

impl HashContext {
    /// Open a context from an algorithm identifier such as `"SHA256"`.
    pub fn open(algorithm_id: &str) -> Result<Self> {
        algorithm_id.parse().map(Self::new)
    }

    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            hasher: algorithm.hasher(),
            bytes_hashed: 0,
            bytes_padded: 0,
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn digest_size(&self) -> usize {
        self.algorithm.digest_size()
    }

    pub fn block_size(&self) -> usize {
        self.algorithm.block_size()
    }

    /// Bytes fed through [`update`](Self::update), padding included.
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes_hashed
    }

    pub fn bytes_padded(&self) -> u64 {
        self.bytes_padded
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.bytes_hashed += data.len() as u64;
    }

    /// Feed `count` zero bytes.
    pub fn pad_with_zeros(&mut self, count: u64) {
        let mut remaining = count;
        while remaining > 0 {
            let chunk = remaining.min(ZERO_CHUNK.len() as u64) as usize;
            self.update(&ZERO_CHUNK[..chunk]);
            remaining -= chunk as u64;
        }
        self.bytes_padded += count;
    }

    pub fn finalize(self) -> Digest {
        tracing::trace!(
            algorithm = %self.algorithm,
            bytes_hashed = self.bytes_hashed,
            bytes_padded = self.bytes_padded,
            "Finalizing hash context"
        );
        Digest {
            algorithm: self.algorithm,
            bytes: self.hasher.finalize(),
        }
    }
}

impl fmt::Debug for HashContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashContext")
            .field("algorithm", &self.algorithm)
            .field("bytes_hashed", &self.bytes_hashed)
            .field("bytes_padded", &self.bytes_padded)
            .finish_non_exhaustive()
    }
}

/// Finished digest, rendered as lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: HashAlgorithm,
    bytes: Box<[u8]>,
}

impl Digest {
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
