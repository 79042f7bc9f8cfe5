//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a valid unscoped npm package name
    pub fn package_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,30}[a-z0-9]?".prop_filter("Name must not be empty", |s| !s.is_empty())
    }

    /// Generate a valid semver version string
    pub fn semver_version() -> impl Strategy<Value = String> {
        (0u32..100, 0u32..100, 0u32..100)
            .prop_map(|(major, minor, patch)| format!("{major}.{minor}.{patch}"))
    }

    /// Generate a syntactically valid sha512 integrity string
    pub fn integrity() -> impl Strategy<Value = String> {
        "[A-Za-z0-9+/]{86}".prop_map(|b64| format!("sha512-{b64}=="))
    }

    /// Generate a tarball URL
    pub fn url() -> impl Strategy<Value = String> {
        (
            prop_oneof!["https", "http"],
            "[a-z]{3,10}",
            "[a-z]{2,5}",
            "[a-z0-9-]{1,20}",
        )
            .prop_map(|(scheme, domain, tld, path)| {
                format!("{scheme}://{domain}.{tld}/{path}/-/{path}-1.0.0.tgz")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_package_name_generator(name in package_name()) {
            prop_assert!(!name.is_empty());
            prop_assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }

        #[test]
        fn test_semver_version_generator(version in semver_version()) {
            prop_assert!(semver::Version::parse(&version).is_ok());
        }

        #[test]
        fn test_integrity_generator(value in integrity()) {
            prop_assert!(value.starts_with("sha512-"));
            prop_assert_eq!(value.len(), "sha512-".len() + 88);
        }
    }
}
