use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::error::{AuthError, Result};

/// Auth Session - login, refresh and persisted credentials
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Backend base URL
    #[arg(short = 'u', long, env = "AUTH_BASE_URL")]
    pub base_url: Option<String>,

    /// Path to the SQLite token store
    #[arg(short = 'd', long, env = "AUTH_DB_FILE")]
    pub db_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// HTTP connect timeout in seconds
    #[arg(long, env = "HTTP_CONNECT_TIMEOUT", default_value = "10")]
    pub http_connect_timeout: u64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "30")]
    pub http_timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Sign in and store the session
    Login {
        /// Account email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,

        /// Account password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Resume the stored session and print the status
    Status,
    /// Resume the stored session and print the current user
    Whoami,
    /// Forget the stored session
    Logout,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub db_file: PathBuf,

    // HTTP client
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,

    // Logging
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Build configuration with priority: CLI > ENV > defaults
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let base_url = args.base_url.clone().ok_or_else(|| {
            AuthError::Config(
                "AUTH_BASE_URL is required (use -u or set AUTH_BASE_URL env var)".to_string(),
            )
        })?;

        let db_file = match &args.db_file {
            Some(path) => expand_tilde(path),
            None => default_db_path().ok_or_else(|| {
                AuthError::Config(
                    "Could not determine data directory (use -d or set AUTH_DB_FILE env var)"
                        .to_string(),
                )
            })?,
        };

        Ok(Config {
            base_url: base_url.trim_end_matches('/').to_string(),
            db_file,
            http_connect_timeout: args.http_connect_timeout,
            http_request_timeout: args.http_timeout,
            log_level: args.log_level.clone(),
            log_format: args.log_format,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| {
            AuthError::Config(format!(
                "AUTH_BASE_URL is not a valid URL: {} ({})",
                self.base_url, e
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AuthError::Config(format!(
                "AUTH_BASE_URL must use http or https, got: {}",
                url.scheme()
            )));
        }

        if self.http_request_timeout == 0 {
            return Err(AuthError::Config(
                "HTTP_REQUEST_TIMEOUT must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Default token store location under the user's local data directory
fn default_db_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("auth-session").join("session.sqlite3"))
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
