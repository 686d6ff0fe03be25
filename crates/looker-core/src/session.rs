//! Browser capability used by the downloader.
//!
//! The downloader never talks to a browser engine directly. It launches a
//! session through a [`SessionLauncher`] and drives it through
//! [`BrowserSession`], which keeps the orchestration testable without Chrome.

use crate::Result;
use async_trait::async_trait;
use std::path::Path;

/// What happened after the login form was submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginNavigation {
    Navigated,
    /// No navigation was seen before the wait gave up
    NotObserved { reason: String },
}

/// What happened to the navigation that triggers a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadNavigation {
    NavigatedFully,
    /// The browser aborted the navigation once the download started streaming
    AbortedByDownload { reason: String },
}

/// One browser with one open page
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate and wait until the network has gone quiet
    async fn goto_and_settle(&self, url: &str) -> Result<()>;

    /// Type `text` into the first element matching `selector`
    async fn type_into(&self, selector: &str, text: &str) -> Result<()>;

    /// Click `selector` while waiting for the navigation it causes
    async fn click_and_wait(&self, selector: &str) -> Result<LoginNavigation>;

    /// Send all subsequent downloads of the page into `dir`
    async fn set_download_dir(&self, dir: &Path) -> Result<()>;

    /// Navigate to a URL whose response is a file download
    async fn trigger_download(&self, url: &str) -> DownloadNavigation;

    /// Shut down the browser and release its process
    async fn close(self) -> Result<()>;
}

/// Starts browser sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Session: BrowserSession;

    /// Launch a browser, visible when `headless` is false, with one blank page
    async fn launch(&self, headless: bool) -> Result<Self::Session>;
}
