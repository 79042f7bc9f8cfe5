//! Content integrity digests for package tarballs
//!
//! Digests use the subresource-integrity shape `<algorithm>-<base64>` so they
//! can be re-derived from the raw artifact bytes with any standard tool.
//! Response bodies are hashed chunk by chunk and never buffered whole.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::StreamExt;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::config::defaults;
use crate::error::IntegrityError;
use crate::infra::http;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrityAlgorithm {
    Sha256,
    Sha384,
    /// Used for every newly computed digest
    #[default]
    Sha512,
}

impl IntegrityAlgorithm {
    /// Algorithm prefix as written in the digest string
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    fn hasher(self) -> Hasher {
        match self {
            Self::Sha256 => Hasher::Sha256(Sha256::new()),
            Self::Sha384 => Hasher::Sha384(Sha384::new()),
            Self::Sha512 => Hasher::Sha512(Sha512::new()),
        }
    }
}

impl fmt::Display for IntegrityAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IntegrityAlgorithm {
    type Err = IntegrityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            other => Err(IntegrityError::UnsupportedAlgorithm {
                algorithm: other.to_string(),
            }),
        }
    }
}

enum Hasher {
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl Hasher {
    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Sha384(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha256(h) => h.finalize().to_vec(),
            Self::Sha384(h) => h.finalize().to_vec(),
            Self::Sha512(h) => h.finalize().to_vec(),
        }
    }
}

fn format_integrity(algorithm: IntegrityAlgorithm, digest: &[u8]) -> String {
    format!("{algorithm}-{}", STANDARD.encode(digest))
}

/// Compute the integrity string of in-memory data
pub fn integrity_of(algorithm: IntegrityAlgorithm, data: &[u8]) -> String {
    let mut hasher = algorithm.hasher();
    hasher.update(data);
    format_integrity(algorithm, &hasher.finalize())
}

/// Split an integrity string into its algorithm and base64 digest
pub fn parse_integrity(value: &str) -> Result<(IntegrityAlgorithm, &str), IntegrityError> {
    let (algorithm, digest) = value
        .split_once('-')
        .filter(|(_, d)| !d.is_empty())
        .ok_or_else(|| IntegrityError::Malformed {
            value: value.to_string(),
        })?;
    if STANDARD.decode(digest).is_err() {
        return Err(IntegrityError::Malformed {
            value: value.to_string(),
        });
    }
    Ok((algorithm.parse()?, digest))
}

/// Computes integrity digests of remote artifacts
///
/// Performs no retries; a failed fetch is reported to the caller as is.
#[derive(Debug, Clone)]
pub struct IntegrityResolver {
    client: reqwest::Client,
}

impl IntegrityResolver {
    /// Create a resolver with default timeouts
    pub fn new() -> Self {
        Self::with_client(http::build_client(
            defaults::HTTP_TIMEOUT_SECS,
            defaults::HTTP_CONNECT_TIMEOUT_SECS,
        ))
    }

    /// Create a resolver sharing an existing HTTP client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Digest of the bytes at `url` using the default algorithm (sha512)
    pub async fn compute_integrity(&self, url: &str) -> Result<String, IntegrityError> {
        self.compute_with(url, IntegrityAlgorithm::default()).await
    }

    /// Digest of the bytes at `url` using `algorithm`
    pub async fn compute_with(
        &self,
        url: &str,
        algorithm: IntegrityAlgorithm,
    ) -> Result<String, IntegrityError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IntegrityError::Transport {
                url: url.to_string(),
                error: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(IntegrityError::Fetch {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let mut hasher = algorithm.hasher();
        let mut size: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| IntegrityError::Transport {
                url: url.to_string(),
                error: e.to_string(),
            })?;
            hasher.update(&chunk);
            size += chunk.len() as u64;
        }

        tracing::debug!("Hashed {size} bytes from {url}");
        Ok(format_integrity(algorithm, &hasher.finalize()))
    }

    /// Re-derive the digest of `url` with the algorithm named in `expected`
    /// and compare
    pub async fn verify(&self, url: &str, expected: &str) -> Result<bool, IntegrityError> {
        let (algorithm, _) = parse_integrity(expected)?;
        let actual = self.compute_with(url, algorithm).await?;
        Ok(actual == expected)
    }
}

impl Default for IntegrityResolver {
    fn default() -> Self {
        Self::new()
    }
}
