//! Serve command implementation.
//!
//! Flag names keep their historical `snake_case` spelling so existing
//! deployment scripts keep working.

use std::path::PathBuf;

use clap::Args;
use docserver_config::{CliSettings, Config};
use docserver_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for serving a directory.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover docserver.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (default: 0.0.0.0).
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (default: 80).
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory to serve; the clone target when a repository is set (default: .).
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Seconds between git pulls (default: 60).
    #[arg(long = "git_pull_interval_sec")]
    git_pull_interval_sec: Option<u64>,

    /// Git repository to clone into the served directory.
    #[arg(long = "git_repo_url")]
    git_repo_url: Option<String>,

    /// Branch to check out (default: the remote's default branch).
    #[arg(long = "git_repo_branch")]
    git_repo_branch: Option<String>,

    /// Git username.
    #[arg(long = "git_auth_username")]
    git_auth_username: Option<String>,

    /// Git password. Takes precedence over --git_auth_pass_file.
    #[arg(long = "git_auth_pass", env = "DOCSERVER_GIT_AUTH_PASS", hide_env_values = true)]
    git_auth_pass: Option<String>,

    /// File containing the git password.
    #[arg(long = "git_auth_pass_file")]
    git_auth_pass_file: Option<PathBuf>,

    /// Page template (default: ./main_template.html).
    #[arg(long = "main_template_html_path")]
    main_template_html_path: Option<PathBuf>,

    /// Error page template (default: ./error_template.html).
    #[arg(long = "error_template_html_path")]
    error_template_html_path: Option<PathBuf>,

    /// Syntax highlight style name passed to the page template (default: vs).
    #[arg(long = "code_highlight_style")]
    code_highlight_style: Option<String>,

    /// Reject files with unknown extensions (501) instead of serving them raw.
    #[arg(long = "strict_content_types")]
    strict_content_types: bool,

    /// Send every error page with a 404 status line.
    #[arg(long = "legacy_error_status")]
    legacy_error_status: bool,

    /// Enable verbose output (request and sync logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = self.cli_settings();
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.highlight(&format!(
            "Serving {} on {}:{}",
            config.server.dir.display(),
            config.server.host,
            config.server.port
        ));
        if let Some(config_path) = &config.config_path {
            output.info(&format!("Config: {}", config_path.display()));
        }
        if let Some(git) = &config.git {
            output.info(&format!(
                "Repository: {} ({}), pulled every {}s",
                git.url,
                git.branch.as_deref().unwrap_or("default branch"),
                git.pull_interval_sec
            ));
        }

        let server_config = server_config_from_config(&config);
        run_server(server_config).await?;

        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            host: self.host.clone(),
            port: self.port,
            dir: self.dir.clone(),
            main_template: self.main_template_html_path.clone(),
            error_template: self.error_template_html_path.clone(),
            highlight_style: self.code_highlight_style.clone(),
            strict_content_types: self.strict_content_types.then_some(true),
            legacy_error_status: self.legacy_error_status.then_some(true),
            git_url: self.git_repo_url.clone(),
            git_branch: self.git_repo_branch.clone(),
            git_username: self.git_auth_username.clone(),
            git_password: self.git_auth_pass.clone(),
            git_password_file: self.git_auth_pass_file.clone(),
            git_pull_interval_sec: self.git_pull_interval_sec,
        }
    }
}
