//! HTTP release-manifest checker.
//!
//! Fetches a JSON version manifest from the release endpoint and compares
//! it against the running version. Runs on the update worker thread; the
//! blocking HTTP client is deliberate.

use crate::error::{ExpanderError, Result};
use crate::update::version::{self, VersionInfo};
use std::time::Duration;

/// Release manifest endpoint checked for new versions.
const LATEST_VERSION_URL: &str = "https://updates.quillapp.dev/latest.json";

/// Queries the release endpoint for a newer version.
pub struct HttpUpdateChecker {
    url: String,
    current: (u32, u32),
    agent: ureq::Agent,
}

impl HttpUpdateChecker {
    /// Create a checker for the production release endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::with_endpoint(LATEST_VERSION_URL)
    }

    /// Create a checker against a custom endpoint (tests, staging).
    #[must_use]
    pub fn with_endpoint(url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(15))
            .timeout_read(Duration::from_secs(30))
            .build();
        Self {
            url: url.into(),
            current: version::current_version(),
            agent,
        }
    }

    /// Override the version the manifest is compared against.
    #[must_use]
    pub fn with_current_version(mut self, major: u32, minor: u32) -> Self {
        self.current = (major, minor);
        self
    }

    /// The version this checker compares against, as `major.minor`.
    #[must_use]
    pub fn current_version(&self) -> String {
        format!("{}.{}", self.current.0, self.current.1)
    }

    /// Fetch the manifest and compare versions.
    ///
    /// Returns `Some(info)` when the published release is strictly newer
    /// than the running version, `None` when up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the manifest cannot be
    /// parsed.
    pub fn check(&self) -> Result<Option<VersionInfo>> {
        let body = self
            .agent
            .get(&self.url)
            .set(
                "User-Agent",
                concat!("quill/", env!("CARGO_PKG_VERSION"), " (update-check)"),
            )
            .call()
            .map_err(|e| ExpanderError::Update(format!("version query failed: {e}")))?
            .into_string()
            .map_err(|e| ExpanderError::Update(format!("cannot read version manifest: {e}")))?;

        let info: VersionInfo = serde_json::from_str(&body)
            .map_err(|e| ExpanderError::Update(format!("cannot parse version manifest: {e}")))?;

        if info.is_newer_than(self.current.0, self.current.1) {
            Ok(Some(info))
        } else {
            Ok(None)
        }
    }
}

impl Default for HttpUpdateChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint_is_production() {
        let checker = HttpUpdateChecker::new();
        assert_eq!(checker.url, LATEST_VERSION_URL);
    }

    #[test]
    fn current_version_defaults_to_package_version() {
        let checker = HttpUpdateChecker::new();
        let (major, minor) = version::current_version();
        assert_eq!(checker.current_version(), format!("{major}.{minor}"));
    }

    #[test]
    fn current_version_override() {
        let checker = HttpUpdateChecker::new().with_current_version(7, 4);
        assert_eq!(checker.current_version(), "7.4");
    }

    #[test]
    fn check_fails_against_unreachable_endpoint() {
        // Connection refused on a closed local port.
        let checker = HttpUpdateChecker::with_endpoint("http://127.0.0.1:9/latest.json");
        assert!(checker.check().is_err());
    }
}
