//! Configuration for the streaming client.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use dirstream_connection::RetryPolicy;

use crate::error::{ClientError, Result};

/// Configuration for the streaming client.
///
/// Built once and validated before the client starts; nothing mutates it
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// WebSocket server receiving the stream.
    pub server_url: Url,

    /// Root of the observed directory tree.
    pub root: PathBuf,

    /// Reconnect attempts before giving up; -1 retries forever.
    pub max_reconnect_attempts: i32,

    /// Fixed wait between reconnect attempts, in milliseconds.
    pub retry_interval_ms: u64,

    /// Follow symbolic links while scanning and watching.
    pub follow_symlinks: bool,

    /// Log full message payloads.
    pub debug: bool,
}

impl ClientConfig {
    /// Create a configuration with default retry behavior.
    pub fn new(server_url: Url, root: impl Into<PathBuf>) -> Result<Self> {
        let config = Self {
            server_url,
            root: root.into(),
            max_reconnect_attempts: -1,
            retry_interval_ms: 2000,
            follow_symlinks: false,
            debug: false,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the reconnect attempt budget; -1 retries forever.
    pub fn with_max_reconnect_attempts(mut self, attempts: i32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Set the wait between reconnect attempts.
    pub fn with_retry_interval_ms(mut self, interval_ms: u64) -> Self {
        self.retry_interval_ms = interval_ms;
        self
    }

    /// Follow symbolic links while scanning and watching.
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Log full message payloads.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Check for values the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        match self.server_url.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(ClientError::InvalidConfiguration(format!(
                    "unsupported url scheme `{other}`, expected ws or wss"
                )));
            }
        }

        if self.root.as_os_str().is_empty() {
            return Err(ClientError::InvalidConfiguration(
                "root path must not be empty".to_string(),
            ));
        }

        if self.max_reconnect_attempts < -1 {
            return Err(ClientError::InvalidConfiguration(format!(
                "max reconnect attempts must be -1 (unlimited) or non-negative, got {}",
                self.max_reconnect_attempts
            )));
        }

        if self.retry_interval_ms == 0 {
            return Err(ClientError::InvalidConfiguration(
                "retry interval must be at least 1ms".to_string(),
            ));
        }

        Ok(())
    }

    /// Retry policy derived from this configuration.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_reconnect_attempts,
            Duration::from_millis(self.retry_interval_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_url() -> Url {
        Url::parse("ws://127.0.0.1:12345").unwrap()
    }

    #[test]
    fn test_defaults_retry_forever_every_two_seconds() {
        let config = ClientConfig::new(test_url(), "/srv/tree").unwrap();

        assert_eq!(config.max_reconnect_attempts, -1);
        assert_eq!(config.retry_interval_ms, 2000);
        assert!(!config.follow_symlinks);
        assert!(!config.debug);
    }

    #[test]
    fn test_builders_override_defaults() {
        let config = ClientConfig::new(test_url(), "/srv/tree")
            .unwrap()
            .with_max_reconnect_attempts(5)
            .with_retry_interval_ms(250)
            .with_follow_symlinks(true)
            .with_debug(true);

        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.interval, Duration::from_millis(250));
        assert!(config.follow_symlinks);
        assert!(config.debug);
    }

    #[test]
    fn test_non_websocket_scheme_is_rejected() {
        let url = Url::parse("http://127.0.0.1:12345").unwrap();

        let result = ClientConfig::new(url, "/srv/tree");

        assert!(matches!(result, Err(ClientError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_secure_websocket_scheme_is_accepted() {
        let url = Url::parse("wss://stream.example.com/ingest").unwrap();

        assert!(ClientConfig::new(url, "/srv/tree").is_ok());
    }

    #[test]
    fn test_zero_retry_interval_is_rejected() {
        let config = ClientConfig::new(test_url(), "/srv/tree")
            .unwrap()
            .with_retry_interval_ms(0);

        assert!(matches!(
            config.validate(),
            Err(ClientError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_empty_root_is_rejected() {
        let result = ClientConfig::new(test_url(), "");

        assert!(matches!(result, Err(ClientError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_attempts_below_the_unlimited_sentinel_are_rejected() {
        let config = ClientConfig::new(test_url(), "/srv/tree")
            .unwrap()
            .with_max_reconnect_attempts(-2);

        assert!(matches!(
            config.validate(),
            Err(ClientError::InvalidConfiguration(_))
        ));
    }
}
