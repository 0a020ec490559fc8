//! Update check orchestration.
//!
//! Owns the single-shot check timer and runs each check on a dedicated
//! worker thread, created fresh per check and joined after completion. The
//! worker reports exactly one outcome followed by a completion message over
//! an explicit channel; the control task persists the last-check timestamp
//! and re-arms the timer for the full interval.

use crate::prefs::PrefsStore;
use crate::update::checker::HttpUpdateChecker;
use crate::update::version::VersionInfo;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Delay before the first check when none has ever been recorded, and the
/// floor for every computed delay.
pub const LAUNCH_CHECK_DELAY: Duration = Duration::from_secs(1);

/// Interval between automatic update checks.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Outcome reported by the update-check worker, exactly once per check.
#[derive(Debug, Clone)]
pub enum CheckOutcome {
    /// A newer release is available.
    UpdateAvailable(VersionInfo),
    /// The running version is current.
    NoUpdate,
    /// The check could not be completed.
    Error(String),
}

/// Notifications emitted for the presentation layer.
///
/// Exactly one of the three outcome events fires per check, and
/// [`UpdateEvent::CheckFinished`] always fires after it.
#[derive(Debug, Clone)]
pub enum UpdateEvent {
    /// A check has started.
    CheckStarted,
    /// A check has finished, whatever the outcome.
    CheckFinished,
    /// A newer release is available for download.
    UpdateAvailable(VersionInfo),
    /// No newer release is available.
    NoUpdateAvailable,
    /// The check failed with the given error description.
    CheckFailed(String),
}

/// Callback that performs one update check on the worker thread.
pub type CheckRunner = Box<dyn Fn() -> CheckOutcome + Send + Sync>;

enum Command {
    CheckNow,
    SetAutoCheck(bool),
    Shutdown,
}

/// Message sent by a worker thread back to the control task. The token
/// identifies which check the message belongs to.
enum WorkerMessage {
    Outcome { token: u64, outcome: CheckOutcome },
    Finished { token: u64 },
}

struct ActiveCheck {
    token: u64,
    outcome_seen: bool,
    join: Option<thread::JoinHandle<()>>,
}

/// Orchestrates periodic and on-demand update checks.
///
/// Constructed by the composition root and driven through the
/// [`UpdateManagerHandle`] returned by [`UpdateManager::run`]. All state,
/// including the preferences store, is owned by the control task; worker
/// threads only run the check callback and send messages back.
pub struct UpdateManager {
    prefs: PrefsStore,
    runner: Arc<CheckRunner>,
    event_tx: mpsc::UnboundedSender<UpdateEvent>,
    launch_delay: Duration,
    check_interval: Duration,
    deadline: Option<Instant>,
    active: Option<ActiveCheck>,
    next_token: u64,
}

impl UpdateManager {
    /// Create a manager that checks the production release endpoint.
    #[must_use]
    pub fn new(prefs: PrefsStore, event_tx: mpsc::UnboundedSender<UpdateEvent>) -> Self {
        let checker = HttpUpdateChecker::new();
        Self::with_runner(prefs, event_tx, Box::new(move || run_checker(&checker)))
    }

    /// Create a manager with a custom check runner.
    #[must_use]
    pub fn with_runner(
        prefs: PrefsStore,
        event_tx: mpsc::UnboundedSender<UpdateEvent>,
        runner: CheckRunner,
    ) -> Self {
        Self {
            prefs,
            runner: Arc::new(runner),
            event_tx,
            launch_delay: LAUNCH_CHECK_DELAY,
            check_interval: CHECK_INTERVAL,
            deadline: None,
            active: None,
            next_token: 0,
        }
    }

    /// Override the scheduling intervals.
    #[must_use]
    pub fn with_intervals(mut self, launch_delay: Duration, check_interval: Duration) -> Self {
        self.launch_delay = launch_delay;
        self.check_interval = check_interval;
        self
    }

    /// Start the control loop.
    ///
    /// The initial timer state is derived from the current auto-check
    /// preference: armed per the scheduling policy when enabled, disarmed
    /// otherwise.
    pub fn run(self) -> UpdateManagerHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.control_loop(cmd_rx));
        UpdateManagerHandle { cmd_tx, task }
    }

    async fn control_loop(mut self, mut cmd_rx: mpsc::UnboundedReceiver<Command>) {
        let (worker_tx, mut worker_rx) = mpsc::unbounded_channel();

        if self.prefs.auto_check_for_updates() {
            self.arm_from_policy();
        }

        loop {
            let timer_at = self.deadline;
            let timer = async move {
                match timer_at {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    None | Some(Command::Shutdown) => break,
                    Some(Command::CheckNow) => self.on_check_now(&worker_tx),
                    Some(Command::SetAutoCheck(enabled)) => self.on_auto_check_changed(enabled),
                },
                () = timer => {
                    self.deadline = None;
                    self.launch_check(&worker_tx);
                }
                Some(msg) = worker_rx.recv() => self.on_worker_message(msg),
            }
        }
    }

    /// Handle a manual trigger: disarm any pending timer and start a check.
    ///
    /// Ignored while a check is already in flight.
    fn on_check_now(&mut self, worker_tx: &mpsc::UnboundedSender<WorkerMessage>) {
        if self.active.is_some() {
            debug!("update check already in progress, ignoring manual trigger");
            return;
        }
        self.deadline = None;
        self.launch_check(worker_tx);
    }

    /// Persist the toggled auto-check preference and re-schedule.
    fn on_auto_check_changed(&mut self, enabled: bool) {
        if let Err(e) = self.prefs.set_auto_check_for_updates(enabled) {
            error!("cannot persist auto-check preference: {e}");
        }
        self.deadline = None;
        // With a check in flight, the completion handler re-arms from the
        // new preference value.
        if enabled && self.active.is_none() {
            self.arm_from_policy();
        }
    }

    /// Arm the timer per the scheduling policy for the current last-check
    /// timestamp.
    fn arm_from_policy(&mut self) {
        let delay = delay_until_next_check(
            self.prefs.last_update_check(),
            Utc::now(),
            self.launch_delay,
            self.check_interval,
        );
        debug!("next update check in {delay:?}");
        self.deadline = Some(Instant::now() + delay);
    }

    /// Spawn a worker thread for one check and emit `CheckStarted`.
    fn launch_check(&mut self, worker_tx: &mpsc::UnboundedSender<WorkerMessage>) {
        self.next_token += 1;
        let token = self.next_token;

        self.emit(UpdateEvent::CheckStarted);

        let runner = Arc::clone(&self.runner);
        let tx = worker_tx.clone();
        let spawned = thread::Builder::new()
            .name("update-check".to_owned())
            .spawn(move || {
                let outcome =
                    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| (*runner)()))
                        .unwrap_or_else(|_| {
                            CheckOutcome::Error("update check worker panicked".to_owned())
                        });
                let _ = tx.send(WorkerMessage::Outcome { token, outcome });
                let _ = tx.send(WorkerMessage::Finished { token });
            });

        match spawned {
            Ok(join) => {
                self.active = Some(ActiveCheck {
                    token,
                    outcome_seen: false,
                    join: Some(join),
                });
            }
            Err(e) => {
                error!("cannot spawn update check thread: {e}");
                self.emit(UpdateEvent::CheckFailed(format!(
                    "cannot start update check: {e}"
                )));
                self.emit(UpdateEvent::CheckFinished);
                if self.prefs.auto_check_for_updates() {
                    self.deadline = Some(Instant::now() + self.check_interval);
                }
            }
        }
    }

    fn on_worker_message(&mut self, msg: WorkerMessage) {
        match msg {
            WorkerMessage::Outcome { token, outcome } => self.on_worker_outcome(token, outcome),
            WorkerMessage::Finished { token } => self.on_worker_finished(token),
        }
    }

    /// Emit the event matching the worker's single outcome.
    fn on_worker_outcome(&mut self, token: u64, outcome: CheckOutcome) {
        let Some(check) = self.active.as_mut().filter(|c| c.token == token) else {
            error!("outcome from an unidentified update check (token {token})");
            return;
        };
        check.outcome_seen = true;

        match outcome {
            CheckOutcome::UpdateAvailable(info) => {
                info!("quill {info} is available for download");
                self.emit(UpdateEvent::UpdateAvailable(info));
            }
            CheckOutcome::NoUpdate => self.emit(UpdateEvent::NoUpdateAvailable),
            CheckOutcome::Error(message) => {
                warn!("update check failed: {message}");
                self.emit(UpdateEvent::CheckFailed(message));
            }
        }
    }

    /// Tear down the finished worker, persist the last-check time, and
    /// re-arm the timer for the full interval.
    fn on_worker_finished(&mut self, token: u64) {
        let Some(mut check) = self.active.take_if(|c| c.token == token) else {
            error!("completion from an unidentified update check (token {token})");
            // Keep the schedule alive even after an internal mixup.
            if self.active.is_none()
                && self.deadline.is_none()
                && self.prefs.auto_check_for_updates()
            {
                self.deadline = Some(Instant::now() + self.check_interval);
            }
            return;
        };

        if let Some(join) = check.join.take() {
            // Bounded wait: the worker already signaled completion.
            if join.join().is_err() {
                error!("update check worker thread panicked");
            }
        }

        if !check.outcome_seen {
            error!("update check finished without reporting an outcome");
            self.emit(UpdateEvent::CheckFailed(
                "check finished without an outcome".to_owned(),
            ));
        }

        self.emit(UpdateEvent::CheckFinished);

        if let Err(e) = self.prefs.set_last_update_check(Utc::now()) {
            error!("cannot persist last update check time: {e}");
        }

        if self.prefs.auto_check_for_updates() {
            self.deadline = Some(Instant::now() + self.check_interval);
        }
    }

    fn emit(&self, event: UpdateEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("update event channel closed");
        }
    }
}

/// Handle for driving a running [`UpdateManager`].
pub struct UpdateManagerHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    task: tokio::task::JoinHandle<()>,
}

impl UpdateManagerHandle {
    /// Trigger an immediate check, disarming any pending timer.
    ///
    /// Ignored while a check is already in flight.
    pub fn check_now(&self) {
        let _ = self.cmd_tx.send(Command::CheckNow);
    }

    /// Enable or disable automatic checks.
    ///
    /// Persists the preference; disarms the timer unconditionally and
    /// re-arms per the scheduling policy when enabling.
    pub fn set_auto_check_for_updates(&self, enabled: bool) {
        let _ = self.cmd_tx.send(Command::SetAutoCheck(enabled));
    }

    /// Stop the control loop and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.cmd_tx.send(Command::Shutdown);
        let _ = self.task.await;
    }
}

/// Adapt a checker result to the worker outcome contract.
fn run_checker(checker: &HttpUpdateChecker) -> CheckOutcome {
    match checker.check() {
        Ok(Some(info)) => CheckOutcome::UpdateAvailable(info),
        Ok(None) => CheckOutcome::NoUpdate,
        Err(e) => CheckOutcome::Error(e.to_string()),
    }
}

/// Delay until the next automatic check.
///
/// The short launch delay when no check has ever completed; otherwise the
/// time remaining until `last_check + interval`, never less than the launch
/// delay.
fn delay_until_next_check(
    last_check: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    launch_delay: Duration,
    interval: Duration,
) -> Duration {
    let Some(last) = last_check else {
        return launch_delay;
    };
    let due = last + chrono::Duration::milliseconds(interval.as_millis() as i64);
    let remaining = (due - now).to_std().unwrap_or(Duration::ZERO);
    remaining.max(launch_delay)
}
