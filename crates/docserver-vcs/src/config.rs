//! Repository configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Pull interval used when none is configured.
pub const DEFAULT_PULL_INTERVAL: Duration = Duration::from_secs(60);

/// Remote repository to serve content from.
#[derive(Clone)]
pub struct RepoConfig {
    /// Remote URL (any URL or local path `git` understands).
    pub url: String,
    /// Branch to track; `None` uses the remote's default branch.
    pub branch: Option<String>,
    /// Username for HTTP authentication.
    pub username: Option<String>,
    /// Literal password. Takes precedence over `password_file`.
    pub password: Option<String>,
    /// File holding the password, read once at startup.
    pub password_file: Option<PathBuf>,
    /// Time between pulls.
    pub pull_interval: Duration,
}

impl RepoConfig {
    /// Create a configuration for `url` with defaults for everything else.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            branch: None,
            username: None,
            password: None,
            password_file: None,
            pull_interval: DEFAULT_PULL_INTERVAL,
        }
    }
}

impl fmt::Debug for RepoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoConfig")
            .field("url", &self.url)
            .field("branch", &self.branch)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("password_file", &self.password_file)
            .field("pull_interval", &self.pull_interval)
            .finish()
    }
}
