//! Software update checking for quill.
//!
//! Periodic and on-demand checks for new releases. The orchestrator owns a
//! single-shot timer, runs each check on a dedicated worker thread, and
//! reports outcomes to the presentation layer as [`UpdateEvent`]s.

pub mod checker;
pub mod manager;
pub mod version;

pub use checker::HttpUpdateChecker;
pub use manager::{
    CHECK_INTERVAL, CheckOutcome, CheckRunner, LAUNCH_CHECK_DELAY, UpdateEvent, UpdateManager,
    UpdateManagerHandle,
};
pub use version::VersionInfo;
