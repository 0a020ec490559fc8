//! quill: support core for the quill desktop text-expansion application.
//!
//! This crate implements the peripheral facilities of the quill desktop
//! app: scheduled update checks and filesystem path resolution.
//!
//! # Architecture
//!
//! - **Update orchestration** ([`update`]): a tokio control task owns a
//!   single-shot timer; each check runs on a dedicated worker thread and
//!   reports its outcome back over an explicit channel.
//! - **Paths** ([`quill_dirs`]): portable-aware directory helpers for app
//!   data, logs, backups, and translations.
//! - **Preferences** ([`prefs`]): JSON-persisted settings read and written
//!   on the control task only.

pub mod error;
pub mod logging;
pub mod prefs;
pub mod quill_dirs;
pub mod update;

pub use error::{ExpanderError, Result};
pub use prefs::{Preferences, PrefsStore};
pub use update::{UpdateEvent, UpdateManager, UpdateManagerHandle, VersionInfo};
