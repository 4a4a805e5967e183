//! Configuration management for docserver.
//!
//! Settings are layered: built-in defaults, then an optional
//! `docserver.toml` (explicit path or discovered in the current directory
//! and its parents), then command-line flags via [`CliSettings`].
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! dir = "site"
//!
//! [templates]
//! main = "templates/main.html"
//! error = "templates/error.html"
//! highlight_style = "github"
//!
//! [git]
//! url = "https://git.example.com/team/docs.git"
//! branch = "main"
//! username = "docs-bot"
//! password = "${DOCS_GIT_TOKEN}"
//! pull_interval_sec = 60
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `server.host`, `git.url`, `git.username` and `git.password` support
//! `${VAR}` and `${VAR:-default}`.
//!
//! Relative paths in the file resolve against the file's directory;
//! relative paths given on the command line resolve against the working
//! directory.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dir: Option<PathBuf>,
    pub main_template: Option<PathBuf>,
    pub error_template: Option<PathBuf>,
    pub highlight_style: Option<String>,
    pub strict_content_types: Option<bool>,
    pub legacy_error_status: Option<bool>,
    pub git_url: Option<String>,
    pub git_branch: Option<String>,
    pub git_username: Option<String>,
    pub git_password: Option<String>,
    pub git_password_file: Option<PathBuf>,
    pub git_pull_interval_sec: Option<u64>,
}

impl CliSettings {
    fn has_git_settings(&self) -> bool {
        self.git_url.is_some()
            || self.git_branch.is_some()
            || self.git_username.is_some()
            || self.git_password.is_some()
            || self.git_password_file.is_some()
            || self.git_pull_interval_sec.is_some()
    }
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docserver.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Page and error templates.
    pub templates: TemplatesConfig,
    /// Repository backing the served directory (optional section).
    pub git: Option<GitConfig>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// HTTP server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory to serve (and clone into, when `[git]` is set).
    pub dir: PathBuf,
    /// Reject files with unknown extensions instead of serving them raw.
    pub strict_content_types: bool,
    /// Send every error page with a `404` status line.
    pub legacy_error_status: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 80,
            dir: PathBuf::from("."),
            strict_content_types: false,
            legacy_error_status: false,
        }
    }
}

/// Template configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Page template, receives `title`, `highlightJsStyle` and `mdHtml`.
    pub main: PathBuf,
    /// Error template, receives `title`, `errorCode` and `msg`.
    pub error: PathBuf,
    /// Syntax highlight style name handed to the page template.
    pub highlight_style: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            main: PathBuf::from("main_template.html"),
            error: PathBuf::from("error_template.html"),
            highlight_style: "vs".to_owned(),
        }
    }
}

/// Git repository configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Remote URL.
    pub url: String,
    /// Branch to track (default: the remote's default branch).
    pub branch: Option<String>,
    /// Username for HTTP authentication.
    pub username: Option<String>,
    /// Password; takes precedence over `password_file`.
    pub password: Option<String>,
    /// File containing the password.
    pub password_file: Option<PathBuf>,
    /// Seconds between pulls.
    pub pull_interval_sec: u64,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            branch: None,
            username: None,
            password: None,
            password_file: None,
            pull_interval_sec: 60,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`git.password`").
        field: String,
        /// Error message (e.g., "${`DOCS_GIT_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `docserver.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            let cwd = std::env::current_dir()?;
            config.apply_cli_settings(settings, &cwd);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings, resolving relative paths against `cwd`.
    fn apply_cli_settings(&mut self, settings: &CliSettings, cwd: &Path) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(dir) = &settings.dir {
            self.server.dir = cwd.join(dir);
        }
        if let Some(strict) = settings.strict_content_types {
            self.server.strict_content_types = strict;
        }
        if let Some(legacy) = settings.legacy_error_status {
            self.server.legacy_error_status = legacy;
        }
        if let Some(main) = &settings.main_template {
            self.templates.main = cwd.join(main);
        }
        if let Some(error) = &settings.error_template {
            self.templates.error = cwd.join(error);
        }
        if let Some(style) = &settings.highlight_style {
            self.templates.highlight_style.clone_from(style);
        }

        if !settings.has_git_settings() {
            return;
        }
        let git = self.git.get_or_insert_with(GitConfig::default);
        if let Some(url) = &settings.git_url {
            git.url.clone_from(url);
        }
        if let Some(branch) = &settings.git_branch {
            git.branch = Some(branch.clone());
        }
        if let Some(username) = &settings.git_username {
            git.username = Some(username.clone());
        }
        if let Some(password) = &settings.git_password {
            git.password = Some(password.clone());
        }
        if let Some(password_file) = &settings.git_password_file {
            git.password_file = Some(cwd.join(password_file));
        }
        if let Some(interval) = settings.git_pull_interval_sec {
            git.pull_interval_sec = interval;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            server: ServerConfig::default(),
            templates: TemplatesConfig::default(),
            git: None,
            config_path: None,
        };
        config.resolve_paths(base);
        config
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_git()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        require_non_empty(&self.templates.highlight_style, "templates.highlight_style")?;
        Ok(())
    }

    fn validate_git(&self) -> Result<(), ConfigError> {
        let Some(git) = &self.git else {
            return Ok(());
        };

        require_non_empty(&git.url, "git.url")?;
        if git.branch.as_deref() == Some("") {
            return Err(ConfigError::Validation(
                "git.branch cannot be empty".to_owned(),
            ));
        }
        if git.pull_interval_sec == 0 {
            return Err(ConfigError::Validation(
                "git.pull_interval_sec must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(git) = &mut self.git {
            git.url = expand::expand_env(&git.url, "git.url")?;
            expand::expand_opt(&mut git.username, "git.username")?;
            expand::expand_opt(&mut git.password, "git.password")?;
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.server.dir = config_dir.join(&self.server.dir);
        self.templates.main = config_dir.join(&self.templates.main);
        self.templates.error = config_dir.join(&self.templates.error);
        if let Some(git) = &mut self.git
            && let Some(password_file) = &git.password_file
        {
            git.password_file = Some(config_dir.join(password_file));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 80);
        assert_eq!(config.server.dir, PathBuf::from("/test/."));
        assert_eq!(
            config.templates.main,
            PathBuf::from("/test/main_template.html")
        );
        assert_eq!(
            config.templates.error,
            PathBuf::from("/test/error_template.html")
        );
        assert_eq!(config.templates.highlight_style, "vs");
        assert!(!config.server.strict_content_types);
        assert!(!config.server.legacy_error_status);
        assert!(config.git.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 80);
        assert!(config.git.is_none());
    }

    #[test]
    fn test_parse_server_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080
dir = "site"
strict_content_types = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.dir, PathBuf::from("site"));
        assert!(config.server.strict_content_types);
    }

    #[test]
    fn test_parse_git_config() {
        let toml = r#"
[git]
url = "https://git.example.com/docs.git"
branch = "main"
username = "bot"
password_file = "secrets/git-pass"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let git = config.git.unwrap();
        assert_eq!(git.url, "https://git.example.com/docs.git");
        assert_eq!(git.branch.as_deref(), Some("main"));
        assert_eq!(git.username.as_deref(), Some("bot"));
        assert_eq!(git.password_file, Some(PathBuf::from("secrets/git-pass")));
        assert_eq!(git.pull_interval_sec, 60);
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[server]
dir = "site"

[templates]
main = "tpl/main.html"
error = "/abs/error.html"

[git]
url = "https://git.example.com/docs.git"
password_file = "pass"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.server.dir, PathBuf::from("/project/site"));
        assert_eq!(config.templates.main, PathBuf::from("/project/tpl/main.html"));
        assert_eq!(config.templates.error, PathBuf::from("/abs/error.html"));
        assert_eq!(
            config.git.unwrap().password_file,
            Some(PathBuf::from("/project/pass"))
        );
    }

    #[test]
    fn test_git_section_requires_url() {
        let toml = r#"
[git]
branch = "main"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("git.url"));
    }

    #[test]
    fn test_zero_pull_interval_rejected() {
        let toml = r#"
[git]
url = "https://git.example.com/docs.git"
pull_interval_sec = 0
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_cli_settings_server() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let settings = CliSettings {
            port: Some(8080),
            dir: Some(PathBuf::from("docs")),
            main_template: Some(PathBuf::from("/etc/docserver/main.html")),
            highlight_style: Some("github".to_owned()),
            legacy_error_status: Some(true),
            ..Default::default()
        };

        config.apply_cli_settings(&settings, Path::new("/work"));

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0"); // Unchanged
        assert_eq!(config.server.dir, PathBuf::from("/work/docs"));
        assert_eq!(
            config.templates.main,
            PathBuf::from("/etc/docserver/main.html")
        );
        assert_eq!(config.templates.highlight_style, "github");
        assert!(config.server.legacy_error_status);
        assert!(config.git.is_none());
    }

    #[test]
    fn test_apply_cli_git_url_enables_git() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let settings = CliSettings {
            git_url: Some("https://git.example.com/docs.git".to_owned()),
            git_password_file: Some(PathBuf::from("pass.txt")),
            git_pull_interval_sec: Some(30),
            ..Default::default()
        };

        config.apply_cli_settings(&settings, Path::new("/work"));

        let git = config.git.as_ref().unwrap();
        assert_eq!(git.url, "https://git.example.com/docs.git");
        assert_eq!(git.password_file, Some(PathBuf::from("/work/pass.txt")));
        assert_eq!(git.pull_interval_sec, 30);
        assert!(git.branch.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_apply_cli_git_flags_override_file() {
        let toml = r#"
[git]
url = "https://git.example.com/docs.git"
branch = "main"
password = "from-file"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let settings = CliSettings {
            git_branch: Some("release".to_owned()),
            git_password: Some("from-cli".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&settings, Path::new("/work"));

        let git = config.git.unwrap();
        assert_eq!(git.url, "https://git.example.com/docs.git");
        assert_eq!(git.branch.as_deref(), Some("release"));
        assert_eq!(git.password.as_deref(), Some("from-cli"));
    }

    #[test]
    fn test_git_flag_without_url_is_invalid() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let settings = CliSettings {
            git_branch: Some("main".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&settings, Path::new("/work"));

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[server]
port = 9000
dir = "content"

[git]
url = "https://git.example.com/docs.git"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.dir, dir.path().join("content"));
        assert_eq!(config.templates.main, dir.path().join("main_template.html"));
        assert_eq!(config.config_path, Some(path));
        assert!(config.git.is_some());
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/nonexistent/docserver.toml")), None);

        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_expands_git_password() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("DOCSERVER_TEST_LOAD_PASS", "expanded");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[git]
url = "https://git.example.com/docs.git"
password = "${DOCSERVER_TEST_LOAD_PASS}"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(
            config.git.unwrap().password.as_deref(),
            Some("expanded")
        );
        unsafe {
            std::env::remove_var("DOCSERVER_TEST_LOAD_PASS");
        }
    }
}
