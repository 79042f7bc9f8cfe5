//! Package specification parsing
//!
//! Accepts `name`, `name@version`, `name@tag`, `name@range` and the scoped
//! forms `@scope/name[@...]`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::defaults::DEFAULT_DIST_TAG;
use crate::error::PackageError;

/// Maximum npm package name length
const MAX_NAME_LEN: usize = 214;

fn name_regex() -> &'static Regex {
    static NAME: OnceLock<Regex> = OnceLock::new();
    NAME.get_or_init(|| {
        Regex::new(r"^(?:@[a-z0-9][a-z0-9._~-]*/)?[a-z0-9~-][a-z0-9._~-]*$")
            .expect("Invalid package name pattern")
    })
}

/// What version of a package was asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    /// A dist-tag such as `latest` or `next`
    Tag(String),
    /// One exact published version
    Exact(semver::Version),
    /// An npm range such as `^5.0.0`
    Range(String),
}

impl VersionSelector {
    /// Classify a selector string
    pub fn parse(selector: &str) -> Self {
        let selector = selector.trim();
        if selector.is_empty() {
            return Self::Tag(DEFAULT_DIST_TAG.to_string());
        }
        let bare = selector.strip_prefix('v').unwrap_or(selector);
        if let Ok(version) = semver::Version::parse(bare) {
            return Self::Exact(version);
        }
        let is_tag = selector
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() && c != 'x' && c != 'X')
            && selector
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if is_tag {
            Self::Tag(selector.to_string())
        } else {
            Self::Range(selector.to_string())
        }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => f.write_str(tag),
            Self::Exact(version) => write!(f, "{version}"),
            Self::Range(range) => f.write_str(range),
        }
    }
}

/// A parsed `name[@selector]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Package name, scope included
    pub name: String,
    /// Requested version
    pub selector: VersionSelector,
}

impl PackageSpec {
    /// Parse a command-line package spec
    pub fn parse(spec: &str) -> Result<Self, PackageError> {
        let (name, selector) = split_spec(spec.trim());
        validate_name(name).map_err(|reason| PackageError::InvalidSpec {
            spec: spec.to_string(),
            reason,
        })?;
        Ok(Self {
            name: name.to_string(),
            selector: selector.map_or_else(
                || VersionSelector::Tag(DEFAULT_DIST_TAG.to_string()),
                VersionSelector::parse,
            ),
        })
    }

    /// Build a spec from a manifest `name: range` pair
    pub fn from_manifest(name: &str, range: &str) -> Result<Self, PackageError> {
        validate_name(name).map_err(|reason| PackageError::InvalidSpec {
            spec: format!("{name}@{range}"),
            reason,
        })?;
        Ok(Self {
            name: name.to_string(),
            selector: VersionSelector::parse(range),
        })
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.selector)
    }
}

/// Split at the version `@`, ignoring the leading `@` of a scope
fn split_spec(spec: &str) -> (&str, Option<&str>) {
    match spec.rfind('@') {
        Some(pos) if pos > 0 => (&spec[..pos], Some(&spec[pos + 1..])),
        _ => (spec, None),
    }
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("package name is empty".to_string());
    }
    if name.len() > MAX_NAME_LEN {
        return Err(format!("package name exceeds {MAX_NAME_LEN} characters"));
    }
    if !name_regex().is_match(name) {
        return Err(format!("'{name}' is not a valid npm package name"));
    }
    Ok(())
}

/// Registry path segment for a package name (`@scope/name` → `@scope%2Fname`)
pub fn encode_name(name: &str) -> String {
    name.replacen('/', "%2F", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_only() {
        let spec = PackageSpec::parse("left-pad").unwrap();
        assert_eq!(spec.name, "left-pad");
        assert_eq!(spec.selector, VersionSelector::Tag("latest".to_string()));
    }

    #[test]
    fn test_parse_exact_version() {
        let spec = PackageSpec::parse("left-pad@1.0.0").unwrap();
        assert_eq!(spec.name, "left-pad");
        assert_eq!(
            spec.selector,
            VersionSelector::Exact(semver::Version::new(1, 0, 0))
        );
    }

    #[test]
    fn test_parse_scoped() {
        let spec = PackageSpec::parse("@types/node").unwrap();
        assert_eq!(spec.name, "@types/node");
        assert_eq!(spec.selector, VersionSelector::Tag("latest".to_string()));

        let spec = PackageSpec::parse("@types/node@^20.1.0").unwrap();
        assert_eq!(spec.name, "@types/node");
        assert_eq!(spec.selector, VersionSelector::Range("^20.1.0".to_string()));
    }

    #[test]
    fn test_parse_tag() {
        let spec = PackageSpec::parse("react@next").unwrap();
        assert_eq!(spec.selector, VersionSelector::Tag("next".to_string()));
    }

    #[test]
    fn test_parse_trailing_at_means_latest() {
        let spec = PackageSpec::parse("left-pad@").unwrap();
        assert_eq!(spec.name, "left-pad");
        assert_eq!(spec.selector, VersionSelector::Tag("latest".to_string()));
    }

    #[test]
    fn test_selector_classification() {
        assert!(matches!(VersionSelector::parse("~1.2.3"), VersionSelector::Range(_)));
        assert!(matches!(VersionSelector::parse("1.x"), VersionSelector::Range(_)));
        assert!(matches!(VersionSelector::parse("x"), VersionSelector::Range(_)));
        assert!(matches!(VersionSelector::parse("*"), VersionSelector::Range(_)));
        assert!(matches!(VersionSelector::parse(">=1 <2"), VersionSelector::Range(_)));
        assert!(matches!(VersionSelector::parse("v2.0.0"), VersionSelector::Exact(_)));
        assert!(matches!(VersionSelector::parse("beta"), VersionSelector::Tag(_)));
    }

    #[test]
    fn test_invalid_names_rejected() {
        for bad in ["", "Left-Pad", "has space", "@scope/", "../etc"] {
            assert!(
                matches!(PackageSpec::parse(bad), Err(PackageError::InvalidSpec { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_encode_scoped_name() {
        assert_eq!(encode_name("@types/node"), "@types%2Fnode");
        assert_eq!(encode_name("chalk"), "chalk");
    }

    #[test]
    fn test_display() {
        let spec = PackageSpec::from_manifest("chalk", "^5.0.0").unwrap();
        assert_eq!(spec.to_string(), "chalk@^5.0.0");
    }
}
