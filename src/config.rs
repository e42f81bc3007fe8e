//! Client configuration, read from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Backend origin used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default HTTP request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Artificial delay of the title-suggestion refresh.
pub const DEFAULT_SUGGESTION_DELAY: Duration = Duration::from_millis(1500);

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, without a trailing slash.
    pub api_url: String,
    /// Where the session is persisted between runs.
    pub session_path: PathBuf,
    /// Per-request timeout.
    pub http_timeout: Duration,
    /// Command the post is piped into on "copy to clipboard".
    pub clipboard_command: Option<String>,
    /// Directory for the log file. Logs go to stderr when unset.
    pub log_dir: Option<PathBuf>,
    /// Delay before shuffled title suggestions are shown.
    pub suggestion_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_path: default_session_path(std::env::var("HOME").ok()),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            clipboard_command: None,
            log_dir: None,
            suggestion_delay: DEFAULT_SUGGESTION_DELAY,
        }
    }
}

impl ClientConfig {
    /// Build config from the process environment.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `EASYGEN_API_URL` (or `NEXT_PUBLIC_API_URL`) | `http://localhost:8000` |
    /// | `EASYGEN_SESSION_PATH` | `$HOME/.easygen/session.json` |
    /// | `EASYGEN_HTTP_TIMEOUT_SECS` | `30` |
    /// | `EASYGEN_CLIPBOARD_CMD` | unset (copying is unavailable) |
    /// | `EASYGEN_LOG_DIR` | unset |
    /// | `EASYGEN_SUGGESTION_DELAY_MS` | `1500` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = get("EASYGEN_API_URL")
            .or_else(|| get("NEXT_PUBLIC_API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = api_url.trim().trim_end_matches('/').to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "EASYGEN_API_URL".into(),
                message: format!("expected an http(s) origin, got {api_url:?}"),
            });
        }

        let session_path = get("EASYGEN_SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_session_path(get("HOME")));

        let http_timeout = match get("EASYGEN_HTTP_TIMEOUT_SECS") {
            Some(raw) => match parse_number("EASYGEN_HTTP_TIMEOUT_SECS", &raw)? {
                0 => {
                    return Err(ConfigError::InvalidValue {
                        key: "EASYGEN_HTTP_TIMEOUT_SECS".into(),
                        message: "timeout must be at least one second".into(),
                    });
                }
                secs => Duration::from_secs(secs),
            },
            None => DEFAULT_HTTP_TIMEOUT,
        };

        let suggestion_delay = match get("EASYGEN_SUGGESTION_DELAY_MS") {
            Some(raw) => {
                Duration::from_millis(parse_number("EASYGEN_SUGGESTION_DELAY_MS", &raw)?)
            }
            None => DEFAULT_SUGGESTION_DELAY,
        };

        Ok(Self {
            api_url,
            session_path,
            http_timeout,
            clipboard_command: get("EASYGEN_CLIPBOARD_CMD"),
            log_dir: get("EASYGEN_LOG_DIR").map(PathBuf::from),
            suggestion_delay,
        })
    }

    /// Absolute URL for a backend endpoint path such as `/auth/login/`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_url, endpoint)
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected a whole number, got {raw:?}"),
    })
}

/// `$HOME/.easygen/session.json`, relative to the working directory when
/// `HOME` is unset.
fn default_session_path(home: Option<String>) -> PathBuf {
    PathBuf::from(home.unwrap_or_else(|| ".".to_string()))
        .join(".easygen")
        .join("session.json")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = ClientConfig::from_lookup(lookup(&[("HOME", "/home/ada")])).unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(
            config.session_path,
            PathBuf::from("/home/ada/.easygen/session.json")
        );
        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
        assert_eq!(config.suggestion_delay, DEFAULT_SUGGESTION_DELAY);
        assert!(config.log_dir.is_none());
        assert!(config.clipboard_command.is_none());
    }

    #[test]
    fn session_path_only_consults_the_lookup() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(
            config.session_path,
            PathBuf::from("./.easygen/session.json")
        );
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = ClientConfig::from_lookup(lookup(&[("EASYGEN_HTTP_TIMEOUT_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "EASYGEN_HTTP_TIMEOUT_SECS"
        ));
    }

    #[test]
    fn next_public_api_url_is_a_fallback() {
        let config = ClientConfig::from_lookup(lookup(&[(
            "NEXT_PUBLIC_API_URL",
            "https://api.easygen.example/",
        )]))
        .unwrap();
        assert_eq!(config.api_url, "https://api.easygen.example");
        assert_eq!(
            config.endpoint_url("/auth/login/"),
            "https://api.easygen.example/auth/login/"
        );

        let config = ClientConfig::from_lookup(lookup(&[
            ("NEXT_PUBLIC_API_URL", "https://ignored.example"),
            ("EASYGEN_API_URL", "http://127.0.0.1:9000"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn rejects_non_http_origin() {
        let err = ClientConfig::from_lookup(lookup(&[("EASYGEN_API_URL", "ftp://x")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn rejects_bad_timeout() {
        let err =
            ClientConfig::from_lookup(lookup(&[("EASYGEN_HTTP_TIMEOUT_SECS", "soon")]))
                .unwrap_err();
        assert!(err.to_string().contains("EASYGEN_HTTP_TIMEOUT_SECS"));
    }

    #[test]
    fn explicit_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("EASYGEN_SESSION_PATH", "/tmp/s.json"),
            ("EASYGEN_HTTP_TIMEOUT_SECS", "5"),
            ("EASYGEN_CLIPBOARD_CMD", "wl-copy"),
            ("EASYGEN_LOG_DIR", "/var/log/easygen"),
            ("EASYGEN_SUGGESTION_DELAY_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.session_path, PathBuf::from("/tmp/s.json"));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.clipboard_command.as_deref(), Some("wl-copy"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/easygen")));
        assert_eq!(config.suggestion_delay, Duration::ZERO);
    }
}
