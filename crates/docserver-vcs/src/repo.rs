//! Clone and fast-forward pull of the content checkout.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use git2::build::CheckoutBuilder;
use git2::{Direction, FetchOptions, Remote, Repository};

use crate::config::RepoConfig;
use crate::credentials::GitCredentials;
use crate::error::SyncError;
use crate::schedule::Synchronize;
use crate::state::SyncState;

/// Name of the remote created by the initial clone.
const REMOTE_NAME: &str = "origin";

/// How the checkout came to exist at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitOutcome {
    /// The remote was freshly cloned.
    Cloned,
    /// A checkout already existed and was reused.
    Reused,
}

/// Result of a successful pull.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PullOutcome {
    /// Local branch already matched the remote.
    UpToDate,
    /// Local branch was fast-forwarded to the given commit.
    Updated(String),
}

/// Owns one git checkout and keeps it in step with its remote.
#[derive(Debug)]
pub struct RepoSyncer {
    url: String,
    branch: Option<String>,
    dir: PathBuf,
    credentials: GitCredentials,
    state: Mutex<SyncState>,
}

impl RepoSyncer {
    /// Create a syncer for checking `config` out into `dir`.
    ///
    /// Credentials are resolved here, so a missing password file fails
    /// before anything touches the network.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Credentials`] if the password file cannot be read.
    pub fn new(config: &RepoConfig, dir: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let credentials = GitCredentials::resolve(
            config.username.as_deref(),
            config.password.as_deref(),
            config.password_file.as_deref(),
        )?;

        Ok(Self {
            url: config.url.clone(),
            branch: config.branch.clone(),
            dir: dir.into(),
            credentials,
            state: Mutex::new(SyncState::default()),
        })
    }

    /// Snapshot of the current sync state.
    pub fn state(&self) -> SyncState {
        self.lock_state().clone()
    }

    /// Bring the checkout into existence.
    ///
    /// Clones the remote into the checkout directory. Files already in the
    /// directory (templates, for instance) are left alone unless the
    /// repository tracks the same path. If the directory already holds a
    /// repository with a checked-out commit it is reused and pulled once
    /// instead; a failure of that pull is logged and not returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the clone fails.
    pub fn initialize(&self) -> Result<InitOutcome, SyncError> {
        let existing = Repository::open(&self.dir)
            .ok()
            .filter(|repo| repo.head().is_ok());
        if let Some(repo) = existing {
            tracing::info!(dir = %self.dir.display(), "Reusing existing checkout");
            if !self.origin_matches(&repo) {
                tracing::warn!(
                    dir = %self.dir.display(),
                    url = %self.url,
                    "Existing checkout's origin is not the configured repository"
                );
            }
            self.lock_state().record_clone();
            self.synchronize();
            return Ok(InitOutcome::Reused);
        }

        self.clone_repo()?;
        self.lock_state().record_clone();
        Ok(InitOutcome::Cloned)
    }

    /// Clone the remote in place, limited to the configured branch if there
    /// is one.
    ///
    /// Equivalent to `git init` + `git fetch` + `git checkout`, so the
    /// directory does not have to be empty. A directory left behind by an
    /// interrupted clone is initialized again.
    fn clone_repo(&self) -> Result<(), SyncError> {
        tracing::info!(url = %self.url, branch = ?self.branch, "Cloning git repository");

        let repo = Repository::init(&self.dir)?;
        if repo.find_remote(REMOTE_NAME).is_ok() {
            repo.remote_delete(REMOTE_NAME)?;
        }
        let mut remote = match &self.branch {
            Some(branch) => {
                let refspec = format!("+refs/heads/{branch}:refs/remotes/{REMOTE_NAME}/{branch}");
                repo.remote_with_fetch(REMOTE_NAME, &self.url, &refspec)?
            }
            None => repo.remote(REMOTE_NAME, &self.url)?,
        };
        let branch = match &self.branch {
            Some(branch) => branch.clone(),
            None => self.remote_default_branch(&mut remote)?,
        };
        remote.fetch(&[branch.as_str()], Some(&mut self.fetch_options()), None)?;

        let fetched = repo.find_reference("FETCH_HEAD")?.peel_to_commit()?;
        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        repo.checkout_tree(fetched.as_object(), Some(&mut checkout))?;
        repo.branch(&branch, &fetched, true)?;
        repo.set_head(&format!("refs/heads/{branch}"))?;

        tracing::info!(dir = %self.dir.display(), branch = %branch, "Done cloning");
        Ok(())
    }

    /// Branch the remote's HEAD points at.
    fn remote_default_branch(&self, remote: &mut Remote<'_>) -> Result<String, SyncError> {
        let connection =
            remote.connect_auth(Direction::Fetch, Some(self.credentials.remote_callbacks()), None)?;
        let head = connection.default_branch()?;
        head.as_str()
            .and_then(|name| name.strip_prefix("refs/heads/"))
            .map(str::to_owned)
            .ok_or_else(|| SyncError::NoDefaultBranch(self.url.clone()))
    }

    /// Whether the checkout's remote points at the configured URL.
    fn origin_matches(&self, repo: &Repository) -> bool {
        repo.find_remote(REMOTE_NAME)
            .ok()
            .is_some_and(|remote| remote.url() == Some(self.url.as_str()))
    }

    /// Fetch the tracked branch and fast-forward the working tree.
    ///
    /// The working tree is only touched once the fetched commit is known to
    /// be a fast-forward, and the branch only moves after the tree has been
    /// written. A failed checkout therefore leaves the branch behind the
    /// remote and the next pull tries again.
    ///
    /// # Errors
    ///
    /// Returns an error on fetch failure, detached HEAD, diverged history
    /// or checkout failure.
    pub fn pull(&self) -> Result<PullOutcome, SyncError> {
        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        self.pull_with(checkout)
    }

    fn pull_with(&self, mut checkout: CheckoutBuilder<'_>) -> Result<PullOutcome, SyncError> {
        let repo = Repository::open(&self.dir)?;
        let branch = self.tracked_branch(&repo)?;

        let mut remote = repo.find_remote(REMOTE_NAME)?;
        remote.fetch(&[branch.as_str()], Some(&mut self.fetch_options()), None)?;

        let fetch_head = repo.find_reference("FETCH_HEAD")?;
        let fetched = repo.reference_to_annotated_commit(&fetch_head)?;
        let (analysis, _) = repo.merge_analysis(&[&fetched])?;

        if analysis.is_up_to_date() {
            return Ok(PullOutcome::UpToDate);
        }
        if !analysis.is_fast_forward() {
            return Err(SyncError::NotFastForward(branch));
        }

        let target = repo.find_commit(fetched.id())?;
        repo.checkout_tree(target.as_object(), Some(&mut checkout))?;

        let refname = format!("refs/heads/{branch}");
        let mut reference = repo.find_reference(&refname)?;
        reference.set_target(target.id(), "docserver: fast-forward pull")?;
        repo.set_head(&refname)?;

        Ok(PullOutcome::Updated(target.id().to_string()))
    }

    /// Configured branch, or whatever branch the checkout is on.
    fn tracked_branch(&self, repo: &Repository) -> Result<String, SyncError> {
        if let Some(branch) = &self.branch {
            return Ok(branch.clone());
        }
        let head = repo.head()?;
        if !head.is_branch() {
            return Err(SyncError::DetachedHead(self.dir.clone()));
        }
        head.shorthand()
            .map(str::to_owned)
            .ok_or_else(|| SyncError::DetachedHead(self.dir.clone()))
    }

    fn fetch_options(&self) -> FetchOptions<'static> {
        let mut options = FetchOptions::new();
        options.remote_callbacks(self.credentials.remote_callbacks());
        options
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Synchronize for RepoSyncer {
    /// Pull once, record the outcome, and log it. Never fails.
    fn synchronize(&self) {
        tracing::debug!(url = %self.url, "Pulling git repository");
        match self.pull() {
            Ok(PullOutcome::UpToDate) => {
                tracing::debug!(url = %self.url, "Checkout already up to date");
                self.lock_state().record_success();
            }
            Ok(PullOutcome::Updated(commit)) => {
                tracing::info!(url = %self.url, commit = %commit, "Done pulling");
                self.lock_state().record_success();
            }
            Err(err) => {
                let mut state = self.lock_state();
                state.record_failure(&err.to_string());
                tracing::warn!(
                    url = %self.url,
                    error = %err,
                    consecutive_failures = state.consecutive_failures,
                    "Failed pulling; serving previous checkout"
                );
            }
        }
    }
}
