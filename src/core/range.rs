//! npm version range matching
//!
//! Translates npm range syntax onto [`semver::VersionReq`]. The two differ in
//! a few places: npm joins comparators with spaces, allows `||` alternatives
//! and hyphen ranges, and reads a bare version as an exact match where
//! `semver` reads it as a caret requirement.

use semver::{Version, VersionReq};

/// A parsed npm range: any alternative may match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmRange {
    alternatives: Vec<VersionReq>,
}

impl NpmRange {
    /// Parse npm range syntax
    pub fn parse(range: &str) -> Result<Self, String> {
        let alternatives = range
            .split("||")
            .map(|alt| {
                let translated = translate_alternative(alt.trim())?;
                VersionReq::parse(&translated)
                    .map_err(|e| format!("invalid range '{}': {e}", alt.trim()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alternatives })
    }

    /// Whether `version` satisfies the range
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    /// Highest version in `versions` that satisfies the range
    pub fn max_satisfying<'a, I>(&self, versions: I) -> Option<&'a Version>
    where
        I: IntoIterator<Item = &'a Version>,
    {
        versions.into_iter().filter(|v| self.matches(v)).max()
    }
}

fn translate_alternative(alt: &str) -> Result<String, String> {
    if alt.is_empty() || matches!(alt, "*" | "x" | "X") {
        return Ok("*".to_string());
    }

    if let Some((low, high)) = alt.split_once(" - ") {
        return Ok(format!(
            ">={}, <={}",
            strip_v(low.trim()),
            strip_v(high.trim())
        ));
    }

    // ">= 1.2.3" is legal npm: glue dangling operators to the next token
    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op = String::new();
    for token in alt.split_whitespace() {
        if token.chars().all(is_op_char) {
            pending_op.push_str(token);
            continue;
        }
        let token = format!("{pending_op}{token}");
        pending_op.clear();
        comparators.push(translate_comparator(&token));
    }
    if !pending_op.is_empty() {
        return Err(format!("dangling operator '{pending_op}' in '{alt}'"));
    }
    Ok(comparators.join(", "))
}

fn is_op_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '~' | '^')
}

fn translate_comparator(token: &str) -> String {
    let split = token.find(|c: char| !is_op_char(c)).unwrap_or(token.len());
    let (op, version) = token.split_at(split);
    let version = collapse_wildcards(strip_v(version));

    if version == "*" {
        return "*".to_string();
    }
    if op.is_empty() {
        // npm: a bare version is exact; a bare partial/wildcard is a range
        if version.contains('*') {
            return version;
        }
        return format!("={version}");
    }
    format!("{op}{version}")
}

fn strip_v(version: &str) -> &str {
    version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('='))
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or(version)
}

/// `1.x.x` → `1.*`, `x` → `*`
fn collapse_wildcards(version: &str) -> String {
    let mut parts = Vec::new();
    for part in version.split('.') {
        if matches!(part, "x" | "X" | "*") {
            parts.push("*");
            break;
        }
        parts.push(part);
    }
    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn satisfies(range: &str, version: &str) -> bool {
        NpmRange::parse(range).unwrap().matches(&v(version))
    }

    #[test]
    fn test_caret() {
        assert!(satisfies("^5.0.0", "5.3.0"));
        assert!(!satisfies("^5.0.0", "6.0.0"));
        assert!(!satisfies("^5.0.0", "4.9.9"));
    }

    #[test]
    fn test_tilde() {
        assert!(satisfies("~1.2.3", "1.2.9"));
        assert!(!satisfies("~1.2.3", "1.3.0"));
    }

    #[test]
    fn test_bare_version_is_exact() {
        assert!(satisfies("1.2.3", "1.2.3"));
        assert!(!satisfies("1.2.3", "1.2.4"));
        assert!(satisfies("v1.2.3", "1.2.3"));
    }

    #[test]
    fn test_bare_partial_is_range() {
        assert!(satisfies("1.2", "1.2.7"));
        assert!(!satisfies("1.2", "1.3.0"));
    }

    #[test]
    fn test_wildcards() {
        assert!(satisfies("*", "0.0.1"));
        assert!(satisfies("", "9.9.9"));
        assert!(satisfies("1.x", "1.9.0"));
        assert!(satisfies("1.x.x", "1.0.0"));
        assert!(!satisfies("1.x", "2.0.0"));
        assert!(satisfies("1.2.x", "1.2.5"));
    }

    #[test]
    fn test_space_separated_comparators() {
        assert!(satisfies(">=1.0.0 <2.0.0", "1.5.0"));
        assert!(!satisfies(">=1.0.0 <2.0.0", "2.0.0"));
        assert!(satisfies(">= 1.0.0 < 2.0.0", "1.0.0"));
    }

    #[test]
    fn test_hyphen_range() {
        assert!(satisfies("1.2.3 - 2.3.4", "2.3.4"));
        assert!(!satisfies("1.2.3 - 2.3.4", "2.3.5"));
    }

    #[test]
    fn test_alternatives() {
        assert!(satisfies("^1.0.0 || ^3.0.0", "3.1.0"));
        assert!(!satisfies("^1.0.0 || ^3.0.0", "2.0.0"));
    }

    #[test]
    fn test_dangling_operator_rejected() {
        assert!(NpmRange::parse(">=").is_err());
    }

    #[test]
    fn test_max_satisfying() {
        let versions: Vec<Version> = ["4.1.2", "5.0.0", "5.3.0", "5.4.0-beta.1", "6.0.0"]
            .iter()
            .map(|s| v(s))
            .collect();
        let range = NpmRange::parse("^5.0.0").unwrap();

        assert_eq!(range.max_satisfying(&versions), Some(&v("5.3.0")));
        assert_eq!(NpmRange::parse("^7").unwrap().max_satisfying(&versions), None);
    }
}
