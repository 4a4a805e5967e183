//! Git-backed content synchronization for docserver.
//!
//! A [`RepoSyncer`] owns one checkout of a remote repository: it clones the
//! configured branch into the serving root at startup, then a background
//! task started with [`spawn_sync_loop`] fast-forwards it on a fixed
//! interval. Pull failures are logged and retried on the next tick; they
//! never reach request handling.
//!
//! ```text
//! Uninitialized ──clone──► Cloned ──tick──► Synced ◄──┐
//!                                 └─tick──► SyncFailed ┘ (retry every tick)
//! ```

mod config;
mod credentials;
mod error;
mod repo;
mod schedule;
mod state;

pub use config::{DEFAULT_PULL_INTERVAL, RepoConfig};
pub use credentials::GitCredentials;
pub use error::SyncError;
pub use repo::{InitOutcome, PullOutcome, RepoSyncer};
pub use schedule::{SyncHandle, Synchronize, spawn_sync_loop};
pub use state::{SyncPhase, SyncState};
