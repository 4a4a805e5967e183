//! Synchronization error types.

use std::path::PathBuf;

/// Failure while cloning or pulling the content repository.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The password file could not be read.
    #[error("Failed to read git password file {}: {source}", path.display())]
    Credentials {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any libgit2 failure (network, auth, object database, checkout).
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// The checkout is not on a branch, so there is nothing to pull into.
    #[error("Checkout at {} has a detached HEAD", .0.display())]
    DetachedHead(PathBuf),

    /// The remote did not say which branch its HEAD points at.
    #[error("Remote {0} has no default branch; set a branch explicitly")]
    NoDefaultBranch(String),

    /// The local branch has commits the remote does not.
    #[error("Branch {0} has diverged from the remote; only fast-forward pulls are supported")]
    NotFastForward(String),
}
