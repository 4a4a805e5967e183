//! Request path sandboxing.
//!
//! A request path is decoded, joined onto the serving root with `..`
//! collapsed lexically, and accepted only if the result still lies inside
//! the root. Containment compares whole path components, so a root of
//! `/a/b` never admits the sibling `/a/bc`.
//!
//! Symlinks inside the root are followed when the file is read; the check
//! is purely lexical.
//!
//! Repository metadata under the root (any `.git` component) is reported
//! as missing so a synced checkout never exposes its history or remote
//! configuration.

use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::error::ServeError;

/// Maps URL paths onto files below a fixed root directory.
#[derive(Clone, Debug)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver for `root`, which must already be canonical.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a URL path (without query) to an absolute filesystem path.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError::Forbidden`] if the path escapes the root and
    /// [`ServeError::NotFound`] if it points into repository metadata.
    pub fn resolve(&self, request_path: &str) -> Result<PathBuf, ServeError> {
        let decoded = percent_decode_str(request_path).decode_utf8_lossy();
        let joined = join_lexically(&self.root, Path::new(decoded.as_ref()));

        let Ok(relative) = joined.strip_prefix(&self.root) else {
            return Err(ServeError::Forbidden(request_path.to_owned()));
        };
        if relative.components().any(is_repo_metadata) {
            return Err(ServeError::NotFound(request_path.to_owned()));
        }
        Ok(joined)
    }
}

fn is_repo_metadata(component: Component<'_>) -> bool {
    matches!(component, Component::Normal(part) if part == ".git")
}

/// Join `path` onto `base`, treating `path` as relative and collapsing
/// `.` and `..` without touching the filesystem. `..` may climb above
/// `base`.
fn join_lexically(base: &Path, path: &Path) -> PathBuf {
    let mut joined = base.to_path_buf();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                joined.pop();
            }
            Component::Normal(part) => joined.push(part),
        }
    }
    joined
}
