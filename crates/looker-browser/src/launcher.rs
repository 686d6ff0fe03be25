use crate::{ChromeFinder, ChromeSession, Error, Result};
use async_trait::async_trait;
use chromiumoxide::browser::BrowserConfig;
use looker_core::SessionLauncher;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Launches Chrome sessions for the report downloader
pub struct ChromeLauncher {
    finder: ChromeFinder,
    navigation_timeout: Duration,
    extra_args: Vec<String>,
}

impl ChromeLauncher {
    /// Create a launcher, using `chrome_path` instead of searching for Chrome when given
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self {
            finder: ChromeFinder::new(chrome_path),
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            extra_args: Vec::new(),
        }
    }

    /// Bound on network-idle and navigation waits
    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Pass an extra command-line switch to Chrome
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Build Chrome command-line arguments
    fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-popup-blocking".to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args
    }

    fn browser_config(&self, chrome: &Path, profile: &Path, headless: bool) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome)
            .user_data_dir(profile)
            .request_timeout(self.navigation_timeout)
            .args(self.build_args());

        if !headless {
            builder = builder.with_head();
        }

        builder.build().map_err(Error::Config)
    }
}

impl Default for ChromeLauncher {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    type Session = ChromeSession;

    async fn launch(&self, headless: bool) -> looker_core::Result<ChromeSession> {
        let chrome = self.finder.find()?;
        tracing::debug!("Using Chrome at: {}", chrome.display());

        let profile = tempfile::Builder::new()
            .prefix("looker-profile")
            .tempdir()
            .map_err(Error::Io)?;
        let config = self.browser_config(&chrome, profile.path(), headless)?;

        Ok(ChromeSession::launch(config, profile, self.navigation_timeout).await?)
    }
}
