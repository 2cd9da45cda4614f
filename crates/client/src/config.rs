use std::time::Duration;

use docsort_core::options::{ProcessingOptions, DEFAULT_DPI, DEFAULT_MODEL, DEFAULT_SLEEP_SEC};

use crate::error::ClientError;

/// Default backend location (uvicorn's default bind).
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Default cadence of the status poll loop.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1200;
/// Default deadline for a single status request.
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 10_000;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a backend running locally.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL without a trailing `/`. Every API path and
    /// download link is resolved against it.
    pub base_url: String,
    /// Fixed interval between status polls.
    pub poll_interval: Duration,
    /// Per-request timeout. `None` lets a request hang until the
    /// connection drops.
    pub request_timeout: Option<Duration>,
    /// Deadline for one status request. A poll that takes longer fails
    /// and the next tick retries.
    pub poll_timeout: Duration,
    /// Parameters sent with every submission unless overridden.
    pub options: ProcessingOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            request_timeout: None,
            poll_timeout: Duration::from_millis(DEFAULT_POLL_TIMEOUT_MS),
            options: ProcessingOptions::default(),
        }
    }
}

impl ClientConfig {
    /// Build a config pointing at `base_url` with every other field at
    /// its default.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                  |
    /// |--------------------------------|--------------------------|
    /// | `DOCSORT_BASE_URL`             | `http://localhost:8000`  |
    /// | `DOCSORT_POLL_INTERVAL_MS`     | `1200`                   |
    /// | `DOCSORT_REQUEST_TIMEOUT_SECS` | unset                    |
    /// | `DOCSORT_POLL_TIMEOUT_MS`      | `10000`                  |
    /// | `DOCSORT_DPI`                  | `150`                    |
    /// | `DOCSORT_SLEEP_SEC`            | `3`                      |
    /// | `DOCSORT_MODEL`                | Llama 4 Scout            |
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through
    /// `lookup`, so callers can supply their own source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("DOCSORT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let base_url = normalize_base_url(&base_url);
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "DOCSORT_BASE_URL must start with http:// or https://, got: '{base_url}'"
            )));
        }

        let poll_ms: u64 = parse_var(&lookup, "DOCSORT_POLL_INTERVAL_MS")?
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        if poll_ms == 0 {
            return Err(ClientError::Config(
                "DOCSORT_POLL_INTERVAL_MS must be greater than zero".into(),
            ));
        }

        let request_timeout = parse_var::<u64, _>(&lookup, "DOCSORT_REQUEST_TIMEOUT_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let poll_timeout_ms: u64 = parse_var(&lookup, "DOCSORT_POLL_TIMEOUT_MS")?
            .unwrap_or(DEFAULT_POLL_TIMEOUT_MS);
        if poll_timeout_ms == 0 {
            return Err(ClientError::Config(
                "DOCSORT_POLL_TIMEOUT_MS must be greater than zero".into(),
            ));
        }

        let options = ProcessingOptions {
            dpi: parse_var(&lookup, "DOCSORT_DPI")?.unwrap_or(DEFAULT_DPI),
            sleep_sec: parse_var(&lookup, "DOCSORT_SLEEP_SEC")?.unwrap_or(DEFAULT_SLEEP_SEC),
            model: lookup("DOCSORT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
        };
        options.validate()?;

        Ok(Self {
            base_url,
            poll_interval: Duration::from_millis(poll_ms),
            request_timeout,
            poll_timeout: Duration::from_millis(poll_timeout_ms),
            options,
        })
    }

    /// Absolute URL for a backend path such as `/api/process`.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ClientError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            ClientError::Config(format!("{key} must be a valid number, got: '{raw}'"))
        }),
    }
}
