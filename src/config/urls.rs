//! Registry URLs

/// Public npm registry
pub const NPM_REGISTRY: &str = "https://registry.npmjs.org";
