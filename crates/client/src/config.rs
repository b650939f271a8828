use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_API_PREFIX: &str = "/api/v1";
const DEFAULT_SESSION_FILE: &str = ".tesis/session.json";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a backend running locally.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, without the API prefix.
    pub api_url: String,
    /// Path prefix shared by every endpoint (default: `/api/v1`).
    pub api_prefix: String,
    /// Where the session token and user are persisted.
    pub session_file: PathBuf,
    /// Unread-notification poll period.
    pub poll_interval: Duration,
    /// Target directory for downloaded files.
    pub download_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
        }
    }
}

impl ClientConfig {
    /// Defaults pointed at `api_url`.
    pub fn for_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `TESIS_API_URL`            | `http://localhost:8080` |
    /// | `TESIS_API_PREFIX`         | `/api/v1`               |
    /// | `TESIS_SESSION_FILE`       | `.tesis/session.json`   |
    /// | `TESIS_POLL_INTERVAL_SECS` | `60`                    |
    /// | `TESIS_DOWNLOAD_DIR`       | `downloads`             |
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let poll_raw = var(
            "TESIS_POLL_INTERVAL_SECS",
            &DEFAULT_POLL_INTERVAL_SECS.to_string(),
        );
        let poll_secs: u64 = poll_raw.parse().map_err(|_| {
            ClientError::Config(format!(
                "TESIS_POLL_INTERVAL_SECS must be a valid u64, got '{poll_raw}'"
            ))
        })?;
        if poll_secs == 0 {
            return Err(ClientError::Config(
                "TESIS_POLL_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_url: var("TESIS_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            api_prefix: var("TESIS_API_PREFIX", DEFAULT_API_PREFIX),
            session_file: PathBuf::from(var("TESIS_SESSION_FILE", DEFAULT_SESSION_FILE)),
            poll_interval: Duration::from_secs(poll_secs),
            download_dir: PathBuf::from(var("TESIS_DOWNLOAD_DIR", DEFAULT_DOWNLOAD_DIR)),
        })
    }
}
