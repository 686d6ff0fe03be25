use crate::navigation::first_navigation;
use crate::network_idle::{InFlightRequests, IDLE_WINDOW};
use crate::Result;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::EventFrameNavigated;
use chromiumoxide::Page;
use futures::{future, StreamExt};
use looker_core::{BrowserSession, DownloadNavigation, LoginNavigation};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// A launched Chrome with one page, driven over the DevTools protocol
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    navigation_timeout: Duration,
    // Removed when the session is dropped, after Chrome has exited
    _profile: TempDir,
}

impl ChromeSession {
    /// Launch Chrome and open a blank page
    pub async fn launch(
        config: BrowserConfig,
        profile: TempDir,
        navigation_timeout: Duration,
    ) -> Result<Self> {
        tracing::debug!("Launching Chrome with profile {}", profile.path().display());
        let (mut browser, mut handler) = Browser::launch(config).await?;

        // The handler must be polled for any command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        let page = match open_page(&browser).await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(e);
            }
        };

        tracing::debug!("Chrome launched, page ready");

        Ok(Self {
            browser,
            page,
            handler_task,
            navigation_timeout,
            _profile: profile,
        })
    }

    async fn navigate_until_idle(&self, url: &str) -> Result<()> {
        // Subscribe before navigating so no request of the page load is missed
        let mut sent = self.page.event_listener::<EventRequestWillBeSent>().await?;
        let mut finished = self.page.event_listener::<EventLoadingFinished>().await?;
        let mut failed = self.page.event_listener::<EventLoadingFailed>().await?;

        tracing::debug!("Navigating to {}", url);
        self.page.goto(url).await?;

        let mut in_flight = InFlightRequests::new();
        let deadline = tokio::time::sleep(self.navigation_timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                Some(event) = sent.next() => {
                    in_flight.started(
                        event.request_id.inner().to_string(),
                        event.request.url.clone(),
                    );
                }
                Some(event) = finished.next() => in_flight.finished(event.request_id.inner()),
                Some(event) = failed.next() => in_flight.finished(event.request_id.inner()),
                _ = tokio::time::sleep(IDLE_WINDOW), if in_flight.is_idle() => {
                    tracing::debug!("Network idle after loading {}", url);
                    break;
                }
                _ = &mut deadline => {
                    tracing::warn!(
                        "Network did not go idle within {:?} ({} requests pending, oldest: {}). Continuing",
                        self.navigation_timeout,
                        in_flight.count(),
                        in_flight.oldest().map(|req| req.url.as_str()).unwrap_or("-")
                    );
                    break;
                }
            }
        }

        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        let element = self.page.find_element(selector).await?;
        element.click().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn submit(&self, selector: &str) -> Result<LoginNavigation> {
        let element = self.page.find_element(selector).await?;

        // Subscribe before clicking so a fast redirect is still seen
        let frames = self.page.event_listener::<EventFrameNavigated>().await?;
        let main_frame =
            Box::pin(frames.filter(|event| future::ready(event.frame.parent_id.is_none())));

        element.click().await?;

        Ok(first_navigation(main_frame, self.navigation_timeout).await)
    }

    async fn allow_downloads(&self, dir: &Path) -> Result<()> {
        let mut params = SetDownloadBehaviorParams::new(SetDownloadBehaviorBehavior::Allow);
        params.download_path = Some(dir.to_string_lossy().into_owned());

        self.browser.execute(params).await?;
        tracing::debug!("Downloads redirected to {}", dir.display());
        Ok(())
    }

    async fn shutdown(mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if closed.is_ok() {
            if let Err(e) = self.browser.wait().await {
                tracing::debug!("Failed to wait for Chrome to exit: {}", e);
            }
        }
        self.handler_task.abort();

        closed?;
        tracing::debug!("Chrome closed");
        Ok(())
    }
}

async fn open_page(browser: &Browser) -> Result<Page> {
    let page = browser.new_page("about:blank").await?;
    // Network events drive the idle detection
    page.execute(EnableParams::default()).await?;
    Ok(page)
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn goto_and_settle(&self, url: &str) -> looker_core::Result<()> {
        Ok(self.navigate_until_idle(url).await?)
    }

    async fn type_into(&self, selector: &str, text: &str) -> looker_core::Result<()> {
        Ok(self.type_text(selector, text).await?)
    }

    async fn click_and_wait(&self, selector: &str) -> looker_core::Result<LoginNavigation> {
        Ok(self.submit(selector).await?)
    }

    async fn set_download_dir(&self, dir: &Path) -> looker_core::Result<()> {
        Ok(self.allow_downloads(dir).await?)
    }

    async fn trigger_download(&self, url: &str) -> DownloadNavigation {
        match tokio::time::timeout(self.navigation_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => DownloadNavigation::NavigatedFully,
            Ok(Err(e)) => DownloadNavigation::AbortedByDownload {
                reason: e.to_string(),
            },
            Err(_) => DownloadNavigation::AbortedByDownload {
                reason: format!("navigation still pending after {:?}", self.navigation_timeout),
            },
        }
    }

    async fn close(self) -> looker_core::Result<()> {
        Ok(self.shutdown().await?)
    }
}
