//! HTTP credentials for the remote.

use std::fmt;
use std::path::Path;

use git2::{Cred, RemoteCallbacks};

use crate::error::SyncError;

/// Attempts allowed before giving up on rejected credentials.
///
/// libgit2 re-invokes the credential callback after every rejection.
const MAX_AUTH_ATTEMPTS: u32 = 2;

/// Username/password pair, either half optional.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GitCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl GitCredentials {
    /// Resolve credentials from configuration.
    ///
    /// A literal `password` wins over `password_file`. The file is read
    /// immediately and trailing line terminators are stripped.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Credentials`] if the password file cannot be read.
    pub fn resolve(
        username: Option<&str>,
        password: Option<&str>,
        password_file: Option<&Path>,
    ) -> Result<Self, SyncError> {
        let password = match (password, password_file) {
            (Some(password), _) => Some(password.to_owned()),
            (None, Some(path)) => {
                let content =
                    std::fs::read_to_string(path).map_err(|source| SyncError::Credentials {
                        path: path.to_path_buf(),
                        source,
                    })?;
                Some(content.trim_end_matches(['\r', '\n']).to_owned())
            }
            (None, None) => None,
        };

        Ok(Self {
            username: username.map(str::to_owned),
            password,
        })
    }

    /// Whether neither half is set.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }

    /// Build remote callbacks that answer authentication challenges.
    ///
    /// Without credentials, no callback is installed and libgit2 falls back
    /// to anonymous access.
    pub(crate) fn remote_callbacks(&self) -> RemoteCallbacks<'static> {
        let mut callbacks = RemoteCallbacks::new();
        if self.is_empty() {
            return callbacks;
        }

        let username = self.username.clone();
        let password = self.password.clone().unwrap_or_default();
        let mut attempts = 0;
        callbacks.credentials(move |_url, username_from_url, _allowed| {
            attempts += 1;
            if attempts > MAX_AUTH_ATTEMPTS {
                return Err(git2::Error::from_str("git credentials rejected by remote"));
            }
            let user = username
                .as_deref()
                .or(username_from_url)
                .unwrap_or_default();
            Cred::userpass_plaintext(user, &password)
        });
        callbacks
    }
}

impl fmt::Debug for GitCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitCredentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_literal_password_wins_over_file() {
        let creds =
            GitCredentials::resolve(Some("bot"), Some("literal"), Some(Path::new("/nonexistent")))
                .unwrap();

        assert_eq!(creds.username.as_deref(), Some("bot"));
        assert_eq!(creds.password.as_deref(), Some("literal"));
    }

    #[test]
    fn test_password_from_file_is_trimmed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "s3cret").unwrap();

        let creds = GitCredentials::resolve(Some("bot"), None, Some(file.path())).unwrap();

        assert_eq!(creds.password.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_password_file_keeps_inner_whitespace() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, " pass word \r\n").unwrap();

        let creds = GitCredentials::resolve(None, None, Some(file.path())).unwrap();

        assert_eq!(creds.password.as_deref(), Some(" pass word "));
    }

    #[test]
    fn test_missing_password_file_is_error() {
        let result = GitCredentials::resolve(None, None, Some(Path::new("/nonexistent/pass")));

        assert!(matches!(result, Err(SyncError::Credentials { .. })));
    }

    #[test]
    fn test_no_credentials() {
        let creds = GitCredentials::resolve(None, None, None).unwrap();

        assert!(creds.is_empty());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = GitCredentials {
            username: Some("bot".to_owned()),
            password: Some("hunter2".to_owned()),
        };

        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
