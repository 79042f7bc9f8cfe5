//! Registry client implementation
//!
//! Resolves package specs to an exact version and tarball URL using the npm
//! registry's JSON endpoints.

use std::collections::HashMap;

use semver::Version;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::{defaults, urls};
use crate::core::package_spec::{encode_name, PackageSpec, VersionSelector};
use crate::core::range::NpmRange;
use crate::error::MetadataError;
use crate::infra::http;

/// Outcome of resolving a spec against the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    /// Package name
    pub name: String,
    /// Exact version
    pub version: String,
    /// Tarball URL of that version
    pub tarball_url: String,
}

/// One version document (`GET /{name}/{version}` or a `versions` entry)
#[derive(Debug, Deserialize)]
struct VersionDocument {
    version: Option<String>,
    dist: Option<Dist>,
    #[serde(default)]
    deprecated: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Dist {
    tarball: Option<String>,
}

/// Full package document (`GET /{name}`)
#[derive(Debug, Deserialize)]
struct Packument {
    #[serde(default)]
    versions: HashMap<String, VersionDocument>,
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
}

/// Registry client for fetching package metadata
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// HTTP client
    client: reqwest::Client,
    /// Registry base URL, no trailing slash
    registry_url: String,
}

impl RegistryClient {
    /// Create a new registry client for the public npm registry
    pub fn new() -> Self {
        Self::with_url(urls::NPM_REGISTRY)
    }

    /// Create a registry client with a custom base URL
    pub fn with_url(registry_url: &str) -> Self {
        Self::with_client(
            http::build_client(
                defaults::HTTP_TIMEOUT_SECS,
                defaults::HTTP_CONNECT_TIMEOUT_SECS,
            ),
            registry_url,
        )
    }

    /// Create a registry client sharing an existing HTTP client
    pub fn with_client(client: reqwest::Client, registry_url: &str) -> Self {
        Self {
            client,
            registry_url: registry_url.trim_end_matches('/').to_string(),
        }
    }

    /// Get the registry URL
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    /// Resolve a spec to an exact version and its tarball URL
    pub async fn resolve(&self, spec: &PackageSpec) -> Result<ResolvedPackage, MetadataError> {
        let scoped = spec.name.starts_with('@');
        match &spec.selector {
            // The per-version endpoint does not serve scoped packages
            VersionSelector::Tag(tag) if !scoped => self.resolve_version(&spec.name, tag).await,
            VersionSelector::Exact(version) if !scoped => {
                self.resolve_version(&spec.name, &version.to_string()).await
            }
            selector => {
                let url = format!("{}/{}", self.registry_url, encode_name(&spec.name));
                let packument: Packument = self.fetch_json(&spec.name, &url).await?;
                select_from_packument(&spec.name, selector, packument)
            }
        }
    }

    async fn resolve_version(
        &self,
        name: &str,
        selector: &str,
    ) -> Result<ResolvedPackage, MetadataError> {
        let url = format!("{}/{}/{selector}", self.registry_url, encode_name(name));
        let document: VersionDocument = self.fetch_json(name, &url).await?;
        into_resolved(name, document)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        name: &str,
        url: &str,
    ) -> Result<T, MetadataError> {
        tracing::debug!("Fetching metadata from {url}");
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| MetadataError::Transport {
                name: name.to_string(),
                error: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MetadataError::NotFound {
                name: name.to_string(),
            });
        }
        if !status.is_success() {
            return Err(MetadataError::Http {
                name: name.to_string(),
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| MetadataError::Incomplete {
            name: name.to_string(),
            detail: e.to_string(),
        })
    }
}

impl Default for RegistryClient {
    fn default() -> Self {
        Self::new()
    }
}

fn into_resolved(name: &str, document: VersionDocument) -> Result<ResolvedPackage, MetadataError> {
    let incomplete = |detail: &str| MetadataError::Incomplete {
        name: name.to_string(),
        detail: detail.to_string(),
    };
    let version = document
        .version
        .filter(|v| !v.is_empty())
        .ok_or_else(|| incomplete("missing version"))?;
    let tarball_url = document
        .dist
        .and_then(|d| d.tarball)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| incomplete("missing dist.tarball"))?;
    Ok(ResolvedPackage {
        name: name.to_string(),
        version,
        tarball_url,
    })
}

fn select_from_packument(
    name: &str,
    selector: &VersionSelector,
    mut packument: Packument,
) -> Result<ResolvedPackage, MetadataError> {
    let chosen = match selector {
        VersionSelector::Tag(tag) => packument
            .dist_tags
            .get(tag)
            .cloned()
            .ok_or_else(|| MetadataError::NotFound {
                name: format!("{name}@{tag}"),
            })?,
        VersionSelector::Exact(version) => version.to_string(),
        VersionSelector::Range(range) => max_satisfying(name, range, &packument)?,
    };

    let document = packument
        .versions
        .remove(&chosen)
        .ok_or_else(|| MetadataError::NotFound {
            name: format!("{name}@{chosen}"),
        })?;
    into_resolved(name, document)
}

/// Highest matching version, preferring versions that are not deprecated
fn max_satisfying(name: &str, range: &str, packument: &Packument) -> Result<String, MetadataError> {
    let npm_range = NpmRange::parse(range).map_err(|detail| MetadataError::Incomplete {
        name: name.to_string(),
        detail,
    })?;

    let parsed: Vec<(Version, bool)> = packument
        .versions
        .iter()
        .filter_map(|(key, doc)| {
            // npm marks deprecation with a message; `false` or "" means live
            let deprecated = doc
                .deprecated
                .as_ref()
                .and_then(serde_json::Value::as_str)
                .is_some_and(|message| !message.is_empty());
            Version::parse(key).ok().map(|v| (v, deprecated))
        })
        .collect();

    let live = npm_range.max_satisfying(parsed.iter().filter(|(_, d)| !d).map(|(v, _)| v));
    let any = || npm_range.max_satisfying(parsed.iter().map(|(v, _)| v));

    live.or_else(any)
        .map(ToString::to_string)
        .ok_or_else(|| MetadataError::NoMatchingVersion {
            name: name.to_string(),
            range: range.to_string(),
        })
}
