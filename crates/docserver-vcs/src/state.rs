//! Synchronization state, kept for logging and diagnostics only.

use std::time::SystemTime;

/// Where the checkout is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncPhase {
    #[default]
    Uninitialized,
    Cloned,
    Synced,
    SyncFailed,
}

/// Outcome of the most recent synchronization attempts.
#[derive(Clone, Debug, Default)]
pub struct SyncState {
    pub phase: SyncPhase,
    /// When the last clone or pull finished, successfully or not.
    pub last_attempt: Option<SystemTime>,
    /// When the tree was last known to match the remote.
    pub last_success: Option<SystemTime>,
    /// Message of the last failure, cleared on success.
    pub last_error: Option<String>,
    /// Failed pulls since the last success.
    pub consecutive_failures: u32,
}

impl SyncState {
    pub(crate) fn record_clone(&mut self) {
        let now = SystemTime::now();
        self.phase = SyncPhase::Cloned;
        self.last_attempt = Some(now);
        self.last_success = Some(now);
        self.last_error = None;
        self.consecutive_failures = 0;
    }

    pub(crate) fn record_success(&mut self) {
        let now = SystemTime::now();
        self.phase = SyncPhase::Synced;
        self.last_attempt = Some(now);
        self.last_success = Some(now);
        self.last_error = None;
        self.consecutive_failures = 0;
    }

    pub(crate) fn record_failure(&mut self, error: &str) {
        self.phase = SyncPhase::SyncFailed;
        self.last_attempt = Some(SystemTime::now());
        self.last_error = Some(error.to_owned());
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }
}
