//! Persisted user preferences.
//!
//! Stores the subset of settings the support core needs: the auto-check
//! flag, the last update-check timestamp, and the backup location override.
//! Persisted as pretty JSON at [`crate::quill_dirs::prefs_file_path`], which
//! in portable mode keeps the settings next to the executable.
//!
//! The store is owned by the update orchestrator's control task and is
//! never shared across threads.

use crate::error::{ExpanderError, Result};
use crate::quill_dirs;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User preferences consumed by the support core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Whether automatic update checks are enabled.
    pub auto_check_for_updates: bool,
    /// Time of the last completed update check, if any.
    pub last_update_check: Option<DateTime<Utc>>,
    /// Whether backups go to `custom_backup_location` instead of the default.
    pub use_custom_backup_location: bool,
    /// User-chosen backup directory.
    pub custom_backup_location: Option<PathBuf>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            auto_check_for_updates: true,
            last_update_check: None,
            use_custom_backup_location: false,
            custom_backup_location: None,
        }
    }
}

/// Disk-backed preferences store.
#[derive(Debug)]
pub struct PrefsStore {
    /// Backing file; `None` keeps the store in memory only.
    path: Option<PathBuf>,
    prefs: Preferences,
}

impl PrefsStore {
    /// Open the store at the default preferences path.
    #[must_use]
    pub fn open_default() -> Self {
        Self::open(Some(quill_dirs::prefs_file_path()))
    }

    /// Open the store backed by `path`. A missing or unparseable file
    /// yields the default preferences.
    #[must_use]
    pub fn open(path: Option<PathBuf>) -> Self {
        let prefs = path
            .as_deref()
            .and_then(|p| std::fs::read(p).ok())
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default();
        Self { path, prefs }
    }

    /// An in-memory store that never touches the filesystem.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            prefs: Preferences::default(),
        }
    }

    /// Current preference values.
    #[must_use]
    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    /// Whether automatic update checks are enabled.
    #[must_use]
    pub fn auto_check_for_updates(&self) -> bool {
        self.prefs.auto_check_for_updates
    }

    /// Time of the last completed update check, if any.
    #[must_use]
    pub fn last_update_check(&self) -> Option<DateTime<Utc>> {
        self.prefs.last_update_check
    }

    /// Enable or disable automatic update checks.
    ///
    /// # Errors
    ///
    /// Returns an error if the preferences file cannot be written.
    pub fn set_auto_check_for_updates(&mut self, enabled: bool) -> Result<()> {
        self.prefs.auto_check_for_updates = enabled;
        self.save()
    }

    /// Record the time of the last completed update check.
    ///
    /// # Errors
    ///
    /// Returns an error if the preferences file cannot be written.
    pub fn set_last_update_check(&mut self, when: DateTime<Utc>) -> Result<()> {
        self.prefs.last_update_check = Some(when);
        self.save()
    }

    /// Enable or disable the custom backup location.
    ///
    /// # Errors
    ///
    /// Returns an error if the preferences file cannot be written.
    pub fn set_use_custom_backup_location(&mut self, enabled: bool) -> Result<()> {
        self.prefs.use_custom_backup_location = enabled;
        self.save()
    }

    /// Set or clear the custom backup directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the preferences file cannot be written.
    pub fn set_custom_backup_location(&mut self, path: Option<PathBuf>) -> Result<()> {
        self.prefs.custom_backup_location = path;
        self.save()
    }

    /// Persist the current preferences to disk.
    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ExpanderError::Prefs(format!(
                    "cannot create preferences directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.prefs)
            .map_err(|e| ExpanderError::Prefs(format!("cannot serialize preferences: {e}")))?;

        std::fs::write(path, json).map_err(|e| {
            ExpanderError::Prefs(format!(
                "cannot write preferences to {}: {e}",
                path.display()
            ))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn default_prefs_enable_auto_check() {
        let prefs = Preferences::default();
        assert!(prefs.auto_check_for_updates);
        assert!(prefs.last_update_check.is_none());
        assert!(!prefs.use_custom_backup_location);
        assert!(prefs.custom_backup_location.is_none());
    }

    #[test]
    fn open_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrefsStore::open(Some(dir.path().join("prefs.json")));
        assert!(store.auto_check_for_updates());
        assert!(store.last_update_check().is_none());
    }

    #[test]
    fn open_corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = PrefsStore::open(Some(path));
        assert!(store.auto_check_for_updates());
    }

    #[test]
    fn setters_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut store = PrefsStore::open(Some(path.clone()));
        store.set_auto_check_for_updates(false).unwrap();
        store
            .set_custom_backup_location(Some(PathBuf::from("/mnt/backups")))
            .unwrap();
        store.set_use_custom_backup_location(true).unwrap();

        let reopened = PrefsStore::open(Some(path));
        assert!(!reopened.auto_check_for_updates());
        assert!(reopened.prefs().use_custom_backup_location);
        assert_eq!(
            reopened.prefs().custom_backup_location.as_deref(),
            Some(std::path::Path::new("/mnt/backups"))
        );
    }

    #[test]
    fn last_check_timestamp_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let when = Utc::now();
        let mut store = PrefsStore::open(Some(path.clone()));
        store.set_last_update_check(when).unwrap();

        let reopened = PrefsStore::open(Some(path));
        assert_eq!(reopened.last_update_check(), Some(when));
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let mut store = PrefsStore::open(Some(path.clone()));
        store.set_auto_check_for_updates(false).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn in_memory_store_never_writes() {
        let mut store = PrefsStore::in_memory();
        store.set_auto_check_for_updates(false).unwrap();
        assert!(!store.auto_check_for_updates());
    }

    #[test]
    fn prefs_deserialize_from_partial_json() {
        // Missing fields use defaults via serde(default).
        let json = r#"{"auto_check_for_updates":false}"#;
        let prefs: Preferences = serde_json::from_str(json).unwrap();
        assert!(!prefs.auto_check_for_updates);
        assert!(prefs.last_update_check.is_none());
    }
}
