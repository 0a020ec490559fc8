//! Centralized application directory paths for quill.
//!
//! Provides a single source of truth for all filesystem paths used by the
//! app. In the default installed layout, paths resolve through the [`dirs`]
//! crate to platform-appropriate per-user locations. In **portable mode**
//! the application keeps all of its data next to the executable, so the
//! whole installation can live on removable media.
//!
//! # Directory Layout
//!
//! | Purpose | Installed (Linux) | Portable |
//! |---------|-------------------|----------|
//! | App data | `~/.local/share/quill/` | `<exe dir>/data/` |
//! | Log file | `~/.local/share/quill/log.txt` | `<exe dir>/data/log.txt` |
//! | Backups | `~/.local/share/quill/backups/` | `<exe dir>/data/backups/` |
//!
//! The PortableApps.com layout is also recognized: when the executable is
//! launched from such a tree, data lives in `../../Data/settings` relative
//! to the executable.
//!
//! # Environment Overrides
//!
//! - `QUILL_DATA_DIR`: overrides [`app_data_dir`] entirely
//! - `QUILL_PORTABLE`: forces portable mode on (`1`) or off (`0`)

use crate::prefs::Preferences;
use std::path::PathBuf;

/// Returns `true` when the app runs in portable mode.
///
/// Portable mode is forced by the `QUILL_PORTABLE` environment variable
/// (any value other than `0`), and otherwise detected from a `data`
/// directory next to the executable or a PortableApps.com tree around it.
#[must_use]
pub fn is_portable_mode() -> bool {
    if let Some(value) = std::env::var_os("QUILL_PORTABLE") {
        return value != "0";
    }
    let Some(exe_dir) = executable_dir() else {
        return false;
    };
    exe_dir.join("data").is_dir() || uses_portable_apps_layout()
}

/// Returns `true` when the executable sits inside a PortableApps.com tree.
#[must_use]
pub fn uses_portable_apps_layout() -> bool {
    executable_dir().is_some_and(|dir| dir.join("../../Data/settings").is_dir())
}

/// Application data root directory.
///
/// Used for preferences, the log file, backups, user translations, and the
/// JSON side files. Resolves to the platform-local app-data directory in
/// installed mode and to [`portable_data_dir`] in portable mode. Override
/// with the `QUILL_DATA_DIR` environment variable.
#[must_use]
pub fn app_data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("QUILL_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    if is_portable_mode() {
        return portable_data_dir();
    }
    dirs::data_local_dir()
        .map(|d| d.join("quill"))
        .unwrap_or_else(|| PathBuf::from("/tmp/quill-data"))
}

/// Data directory used in portable mode.
///
/// `<exe dir>/data`, or `../../Data/settings` relative to the executable
/// under the PortableApps.com layout.
#[must_use]
pub fn portable_data_dir() -> PathBuf {
    let exe_dir = executable_dir().unwrap_or_else(|| PathBuf::from("."));
    if uses_portable_apps_layout() {
        exe_dir.join("../../Data/settings")
    } else {
        exe_dir.join("data")
    }
}

/// Preferences file path (`app_data_dir()/prefs.json`).
///
/// In portable mode this keeps the settings next to the executable.
#[must_use]
pub fn prefs_file_path() -> PathBuf {
    app_data_dir().join("prefs.json")
}

/// Absolute path of the application log file.
#[must_use]
pub fn log_file_path() -> PathBuf {
    app_data_dir().join("log.txt")
}

/// Backup directory, honoring the user's custom location.
///
/// Falls back to [`default_backup_dir`] when the override is disabled or
/// the stored path is empty.
#[must_use]
pub fn backup_dir(prefs: &Preferences) -> PathBuf {
    if !prefs.use_custom_backup_location {
        return default_backup_dir();
    }
    match &prefs.custom_backup_location {
        Some(path) if !path.as_os_str().is_empty() => path.clone(),
        _ => default_backup_dir(),
    }
}

/// Default backup directory (`app_data_dir()/backups`).
#[must_use]
pub fn default_backup_dir() -> PathBuf {
    app_data_dir().join("backups")
}

/// Directory containing the application-provided translations.
#[must_use]
pub fn translation_root_dir() -> PathBuf {
    executable_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("translations")
}

/// Directory containing user-provided translations.
#[must_use]
pub fn user_translation_root_dir() -> PathBuf {
    app_data_dir().join("translations")
}

/// JSON file listing applications where expansion is suppressed.
#[must_use]
pub fn sensitive_applications_file_path() -> PathBuf {
    app_data_dir().join("sensitive-apps.json")
}

/// JSON file listing applications excluded from emoji substitution.
#[must_use]
pub fn emoji_excluded_apps_file_path() -> PathBuf {
    app_data_dir().join("emoji-excluded-apps.json")
}

/// Directory containing the running executable.
fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
}
