//! Shared HTTP client construction

use std::time::Duration;

/// Build the HTTP client used for registry and tarball requests
pub fn build_client(timeout_secs: u64, connect_timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("meow/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
