//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default REST backend base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3004/api";

/// Session file location relative to the home directory.
const SESSION_FILE_IN_HOME: &str = ".purrpass/session.json";

/// Session file location relative to the platform config directory, used
/// when no home directory is known.
const SESSION_FILE_IN_CONFIG: &str = "purrpass/session.json";

/// Default lifetime of the session cookies.
pub const DEFAULT_COOKIE_MAX_AGE_DAYS: u64 = 30;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// REST backend base URL; endpoint paths are appended to it.
    pub api_base_url: String,
    /// File holding the persisted client session.
    pub session_file: PathBuf,
    /// Per-request HTTP timeout. `None` keeps the client default.
    pub http_timeout: Option<Duration>,
    /// Lifetime of the `access_token` / `user` cookies.
    pub cookie_max_age: Duration,
    /// Directory for rolling log files. `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_file: default_session_file()
                .unwrap_or_else(|| PathBuf::from(SESSION_FILE_IN_HOME)),
            http_timeout: None,
            cookie_max_age: Duration::from_secs(DEFAULT_COOKIE_MAX_AGE_DAYS * 24 * 60 * 60),
            log_dir: None,
        }
    }
}

impl PortalConfig {
    /// Build the configuration from `PURRPASS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_base_url = std::env::var("PURRPASS_API_BASE_URL")
            .unwrap_or_else(|_| defaults.api_base_url.clone());
        let api_base_url = normalize_base_url(&api_base_url)?;

        let session_file = match std::env::var("PURRPASS_SESSION_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_session_file().ok_or_else(|| ConfigError::InvalidValue {
                key: "PURRPASS_SESSION_FILE".into(),
                message: "no home or config directory found; set the path explicitly".into(),
            })?,
        };

        let http_timeout = match std::env::var("PURRPASS_HTTP_TIMEOUT_SECS") {
            Ok(raw) => Some(Duration::from_secs(parse_u64("PURRPASS_HTTP_TIMEOUT_SECS", &raw)?)),
            Err(_) => None,
        };

        let cookie_max_age = match std::env::var("PURRPASS_COOKIE_MAX_AGE_DAYS") {
            Ok(raw) => {
                let days = parse_u64("PURRPASS_COOKIE_MAX_AGE_DAYS", &raw)?;
                Duration::from_secs(days * 24 * 60 * 60)
            }
            Err(_) => defaults.cookie_max_age,
        };

        let log_dir = std::env::var("PURRPASS_LOG_DIR").ok().map(PathBuf::from);

        Ok(Self {
            api_base_url,
            session_file,
            http_timeout,
            cookie_max_age,
            log_dir,
        })
    }
}

/// Validate a base URL and strip its trailing slash so endpoint paths can be
/// appended verbatim.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        key: "PURRPASS_API_BASE_URL".into(),
        message: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            key: "PURRPASS_API_BASE_URL".into(),
            message: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

fn parse_u64(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected a whole number, got '{raw}'"),
    })
}

/// `~/.purrpass/session.json`, or the platform config directory when the
/// home directory is unknown.
fn default_session_file() -> Option<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(SESSION_FILE_IN_HOME))
        .or_else(|| dirs::config_dir().map(|config| config.join(SESSION_FILE_IN_CONFIG)))
}
