//! HTTP server for docserver.
//!
//! Serves a directory tree: Markdown files are rendered into the page
//! template, everything else is sent as stored. When a repository is
//! configured, the directory is cloned at startup and pulled in the
//! background while requests keep reading from disk.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use docserver_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_owned(),
//!         port: 8080,
//!         root: PathBuf::from("docs"),
//!         main_template: PathBuf::from("main_template.html"),
//!         error_template: PathBuf::from("error_template.html"),
//!         highlight_style: "vs".to_owned(),
//!         strict_content_types: false,
//!         legacy_error_status: false,
//!         repo: None,
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum fallback handler
//!                        │
//!                        ├─► PathResolver ──► Forbidden (403)
//!                        ├─► read file ─────► NotFound (404)
//!                        ├─► ContentTyper ──► raw bytes
//!                        │        └─────────► MarkdownRenderer ──► page (500 on failure)
//!                        └─► ErrorPresenter for every failure
//!
//! RepoSyncer ──timer──► git pull into the same directory
//! ```

mod app;
mod content_type;
mod error;
mod error_page;
mod handlers;
mod middleware;
mod resolve;
mod state;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use docserver_renderer::{CompiledTemplate, MarkdownRenderer};
use docserver_vcs::{RepoConfig, RepoSyncer, SyncHandle, spawn_sync_loop};
use state::AppState;

pub use content_type::{ContentKind, ContentTyper};
pub use error::{ServeError, ServerError};
pub use error_page::ErrorPresenter;
pub use resolve::PathResolver;

/// Server configuration.
///
/// Built once at startup and never modified.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory to serve. Created if missing and canonicalized at startup.
    pub root: PathBuf,
    /// Page template path.
    pub main_template: PathBuf,
    /// Error page template path.
    pub error_template: PathBuf,
    /// Highlight style name handed to the page template.
    pub highlight_style: String,
    /// Reject unknown extensions with 501.
    pub strict_content_types: bool,
    /// Send every error page with a 404 status line.
    pub legacy_error_status: bool,
    /// Repository to clone into `root` and keep pulled.
    pub repo: Option<RepoConfig>,
}

/// Run the server until Ctrl-C.
///
/// Startup order: templates, serving root, repository clone, listener.
/// Any failure before the listener is bound is returned and nothing is
/// served.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let main_template = CompiledTemplate::from_file(&config.main_template)?;
    let error_template = CompiledTemplate::from_file(&config.error_template)?;

    let root = prepare_root(&config.root)?;

    let sync = match &config.repo {
        Some(repo) => Some(start_sync(repo, &root).await?),
        None => None,
    };

    let state = Arc::new(AppState {
        resolver: PathResolver::new(&root),
        typer: ContentTyper::new(config.strict_content_types),
        renderer: MarkdownRenderer::new(Box::new(main_template), config.highlight_style.clone()),
        errors: ErrorPresenter::new(Box::new(error_template))
            .with_legacy_status(config.legacy_error_status),
    });

    let app = app::create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!(address = %addr, root = %root.display(), "Starting server");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(handle) = sync {
        handle.shutdown();
    }

    result.map_err(ServerError::Io)
}

/// Create the serving root if needed and return its canonical form.
fn prepare_root(root: &Path) -> Result<PathBuf, ServerError> {
    std::fs::create_dir_all(root)?;
    Ok(root.canonicalize()?)
}

/// Clone (or reuse) the checkout, then start the pull loop.
async fn start_sync(repo: &RepoConfig, root: &Path) -> Result<SyncHandle, ServerError> {
    let syncer = Arc::new(RepoSyncer::new(repo, root).map_err(ServerError::Credentials)?);

    let init = Arc::clone(&syncer);
    let outcome = tokio::task::spawn_blocking(move || init.initialize())
        .await
        .map_err(std::io::Error::other)?
        .map_err(ServerError::Clone)?;
    tracing::info!(outcome = ?outcome, interval = ?repo.pull_interval, "Checkout ready");

    Ok(spawn_sync_loop(syncer, repo.pull_interval))
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from the loaded docserver config.
#[must_use]
pub fn server_config_from_config(config: &docserver_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        root: config.server.dir.clone(),
        main_template: config.templates.main.clone(),
        error_template: config.templates.error.clone(),
        highlight_style: config.templates.highlight_style.clone(),
        strict_content_types: config.server.strict_content_types,
        legacy_error_status: config.server.legacy_error_status,
        repo: config.git.as_ref().map(|git| RepoConfig {
            url: git.url.clone(),
            branch: git.branch.clone(),
            username: git.username.clone(),
            password: git.password.clone(),
            password_file: git.password_file.clone(),
            pull_interval: Duration::from_secs(git.pull_interval_sec),
        }),
    }
}

#[cfg(test)]
mod tests {
    use docserver_config::{Config, GitConfig};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_server_config_without_git() {
        let config = Config::default();

        let server = server_config_from_config(&config);

        assert_eq!(server.port, 80);
        assert_eq!(server.highlight_style, "vs");
        assert!(server.repo.is_none());
    }

    #[test]
    fn test_server_config_with_git() {
        let mut config = Config::default();
        config.git = Some(GitConfig {
            url: "https://git.example.com/docs.git".to_owned(),
            branch: Some("main".to_owned()),
            pull_interval_sec: 15,
            ..GitConfig::default()
        });

        let server = server_config_from_config(&config);

        let repo = server.repo.unwrap();
        assert_eq!(repo.url, "https://git.example.com/docs.git");
        assert_eq!(repo.branch.as_deref(), Some("main"));
        assert_eq!(repo.pull_interval, Duration::from_secs(15));
    }

    #[test]
    fn test_prepare_root_creates_and_canonicalizes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("site").join("..").join("site");

        let prepared = prepare_root(&root).unwrap();

        assert!(prepared.is_dir());
        assert_eq!(prepared, dir.path().canonicalize().unwrap().join("site"));
    }

    #[tokio::test]
    async fn test_missing_template_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 1,
            root: dir.path().to_path_buf(),
            main_template: dir.path().join("missing.html"),
            error_template: dir.path().join("missing-error.html"),
            highlight_style: "vs".to_owned(),
            strict_content_types: false,
            legacy_error_status: false,
            repo: None,
        };

        let err = run_server(config).await.unwrap_err();

        assert!(matches!(err, ServerError::Template(_)));
    }

    #[tokio::test]
    async fn test_missing_password_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.html"), "{{ mdHtml }}").unwrap();
        std::fs::write(dir.path().join("error.html"), "{{ msg }}").unwrap();
        let mut repo = RepoConfig::new("https://git.example.com/docs.git");
        repo.password_file = Some(dir.path().join("no-such-pass"));
        let config = ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 1,
            root: dir.path().join("site"),
            main_template: dir.path().join("main.html"),
            error_template: dir.path().join("error.html"),
            highlight_style: "vs".to_owned(),
            strict_content_types: false,
            legacy_error_status: false,
            repo: Some(repo),
        };

        let err = run_server(config).await.unwrap_err();

        assert!(matches!(err, ServerError::Credentials(_)));
    }

    #[tokio::test]
    async fn test_clone_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.html"), "{{ mdHtml }}").unwrap();
        std::fs::write(dir.path().join("error.html"), "{{ msg }}").unwrap();
        let upstream = dir.path().join("no-such-upstream");
        let config = ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 1,
            root: dir.path().join("site"),
            main_template: dir.path().join("main.html"),
            error_template: dir.path().join("error.html"),
            highlight_style: "vs".to_owned(),
            strict_content_types: false,
            legacy_error_status: false,
            repo: Some(RepoConfig::new(upstream.display().to_string())),
        };

        let err = run_server(config).await.unwrap_err();

        assert!(matches!(err, ServerError::Clone(_)));
    }
}
