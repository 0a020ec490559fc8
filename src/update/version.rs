//! Release version metadata.

use serde::{Deserialize, Serialize};

/// Metadata describing the latest published release.
///
/// Produced by the update-check worker and handed to the control task by
/// ownership transfer; the presentation layer reads it from the
/// `UpdateAvailable` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Major version number of the latest release.
    pub version_major: u32,
    /// Minor version number of the latest release.
    pub version_minor: u32,
    /// Direct download URL for the release installer.
    pub download_url: String,
    /// Release notes, if published.
    #[serde(default)]
    pub release_notes: String,
}

impl VersionInfo {
    /// Returns `true` if this release is strictly newer than `major.minor`.
    #[must_use]
    pub fn is_newer_than(&self, major: u32, minor: u32) -> bool {
        (self.version_major, self.version_minor) > (major, minor)
    }

    /// Short `major.minor` form for logs and dialogs.
    #[must_use]
    pub fn version_string(&self) -> String {
        format!("{}.{}", self.version_major, self.version_minor)
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}.{}", self.version_major, self.version_minor)
    }
}

/// The running application version as `(major, minor)`, parsed from
/// `CARGO_PKG_VERSION`.
#[must_use]
pub fn current_version() -> (u32, u32) {
    parse_major_minor(env!("CARGO_PKG_VERSION")).unwrap_or((0, 0))
}

fn parse_major_minor(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn info(major: u32, minor: u32) -> VersionInfo {
        VersionInfo {
            version_major: major,
            version_minor: minor,
            download_url: "https://example.com/quill.dmg".to_owned(),
            release_notes: String::new(),
        }
    }

    #[test]
    fn newer_major_wins() {
        assert!(info(2, 0).is_newer_than(1, 9));
    }

    #[test]
    fn newer_minor_wins() {
        assert!(info(1, 3).is_newer_than(1, 2));
    }

    #[test]
    fn same_version_is_not_newer() {
        assert!(!info(1, 2).is_newer_than(1, 2));
    }

    #[test]
    fn older_version_is_not_newer() {
        assert!(!info(1, 1).is_newer_than(1, 2));
        assert!(!info(0, 9).is_newer_than(1, 0));
    }

    #[test]
    fn version_string_is_major_dot_minor() {
        assert_eq!(info(2, 7).version_string(), "2.7");
        assert_eq!(info(2, 7).to_string(), "v2.7");
    }

    #[test]
    fn current_version_matches_package() {
        let (major, minor) = current_version();
        let expected = parse_major_minor(env!("CARGO_PKG_VERSION")).unwrap();
        assert_eq!((major, minor), expected);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_major_minor("not-a-version").is_none());
        assert!(parse_major_minor("1").is_none());
        assert_eq!(parse_major_minor("3.14.159"), Some((3, 14)));
    }

    #[test]
    fn manifest_deserializes_without_release_notes() {
        let json = r#"{"version_major":2,"version_minor":1,"download_url":"https://example.com/q.exe"}"#;
        let parsed: VersionInfo = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.version_major, 2);
        assert_eq!(parsed.version_minor, 1);
        assert!(parsed.release_notes.is_empty());
    }
}
