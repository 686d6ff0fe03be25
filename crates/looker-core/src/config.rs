use crate::{Error, Result};
use std::fmt;
use std::time::Duration;
use tracing::Dispatch;
use url::Url;

const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);
const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for one Looker instance
///
/// Built once and never mutated by the downloader.
#[derive(Clone)]
pub struct ConnectionConfig {
    host: String,
    username: String,
    password: String,
    interactive: bool,
    settle_timeout: Duration,
    poll_interval: Duration,
    login_timeout: Duration,
    logger: Option<Dispatch>,
}

impl ConnectionConfig {
    /// Create a config for `host`, which must be an absolute http(s) URL
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let host = normalize_host(&host.into())?;

        Ok(Self {
            host,
            username: username.into(),
            password: password.into(),
            interactive: false,
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            logger: None,
        })
    }

    /// Show the browser window instead of running headless
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// How long to wait for the downloaded archive to appear
    pub fn with_settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }

    /// How often to look for the downloaded archive while settling
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Upper bound on network-idle and post-login navigation waits
    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Route this downloader's log events to `logger` instead of the global subscriber
    pub fn with_logger(mut self, logger: impl Into<Dispatch>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn interactive(&self) -> bool {
        self.interactive
    }

    pub fn settle_timeout(&self) -> Duration {
        self.settle_timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn login_timeout(&self) -> Duration {
        self.login_timeout
    }

    pub fn logger(&self) -> Option<&Dispatch> {
        self.logger.as_ref()
    }

    /// URL of the interactive login page
    pub fn login_url(&self) -> String {
        format!("{}/login", self.host)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("interactive", &self.interactive)
            .field("settle_timeout", &self.settle_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("login_timeout", &self.login_timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

fn normalize_host(host: &str) -> Result<String> {
    let url = Url::parse(host).map_err(|e| Error::InvalidHost(format!("{}: {}", host, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::InvalidHost(format!(
            "{}: scheme must be http or https",
            host
        )));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(Error::InvalidHost(format!(
            "{}: must not contain a query or fragment",
            host
        )));
    }

    Ok(host.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ConnectionConfig::new("https://looker.example.com", "me", "secret").unwrap();

        assert_eq!(config.host(), "https://looker.example.com");
        assert!(!config.interactive());
        assert_eq!(config.settle_timeout(), Duration::from_secs(5));
        assert!(config.logger().is_none());
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        let config = ConnectionConfig::new("https://looker.example.com/", "me", "secret").unwrap();
        assert_eq!(config.login_url(), "https://looker.example.com/login");
    }

    #[test]
    fn test_rejects_relative_host() {
        let result = ConnectionConfig::new("looker.example.com", "me", "secret");
        assert!(matches!(result, Err(Error::InvalidHost(_))));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let result = ConnectionConfig::new("ftp://looker.example.com", "me", "secret");
        assert!(matches!(result, Err(Error::InvalidHost(_))));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ConnectionConfig::new("https://looker.example.com", "me", "hunter2").unwrap();
        let debug = format!("{:?}", config);

        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
