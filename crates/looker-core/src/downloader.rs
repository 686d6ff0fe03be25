use crate::archive::{CsvEntry, CsvSelection, ReportArchive};
use crate::config::ConnectionConfig;
use crate::download_dir::DownloadDir;
use crate::report::{download_url, Filter, ReportId, ReportRequest};
use crate::session::{BrowserSession, DownloadNavigation, LoginNavigation, SessionLauncher};
use crate::{Error, Result};
use futures::future::try_join_all;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::instrument::WithSubscriber;
use tracing::Dispatch;

const EMAIL_SELECTOR: &str = "input[name=email]";
const PASSWORD_SELECTOR: &str = "input[name=password]";
const SUBMIT_SELECTOR: &str = "input[type=submit]";

enum SessionState<S> {
    Unauthenticated,
    Authenticated(S),
    Closed,
}

/// Downloads dashboard exports from Looker through a logged-in browser
///
/// Usage is `authenticate` once, any number of downloads, then `close`. The
/// caller must run `close` on every exit path, including after a failed
/// download. Operations take `&mut self`, so one downloader runs one operation
/// at a time; use one downloader per concurrent session.
pub struct ReportDownloader<L: SessionLauncher> {
    config: ConnectionConfig,
    launcher: L,
    state: SessionState<L::Session>,
}

impl<L: SessionLauncher> ReportDownloader<L> {
    pub fn new(config: ConnectionConfig, launcher: L) -> Self {
        Self {
            config,
            launcher,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    /// Launch the browser and log in
    ///
    /// Success is not verified on the landing page. Bad credentials surface
    /// later as [`Error::DownloadFailed`].
    pub async fn authenticate(&mut self) -> Result<()> {
        let logger = self.config.logger().cloned();
        with_logger(logger, self.authenticate_inner()).await
    }

    async fn authenticate_inner(&mut self) -> Result<()> {
        match self.state {
            SessionState::Unauthenticated => {}
            SessionState::Authenticated(_) => return Err(Error::AlreadyAuthenticated),
            SessionState::Closed => return Err(Error::SessionClosed),
        }

        tracing::info!("Starting virtual browser...");
        let session = self.launcher.launch(!self.config.interactive()).await?;

        match login(&session, &self.config).await {
            Ok(()) => {
                self.state = SessionState::Authenticated(session);
                Ok(())
            }
            Err(e) => {
                if let Err(close_err) = session.close().await {
                    tracing::warn!("Failed to close browser after login error: {}", close_err);
                }
                Err(e)
            }
        }
    }

    /// Download a report and save its first CSV to `destination`
    pub async fn download_report(
        &mut self,
        report: &ReportId,
        filter: &Filter,
        destination: &Path,
    ) -> Result<()> {
        let logger = self.config.logger().cloned();
        with_logger(logger, async {
            let entries = self.fetch_csvs(report, filter, CsvSelection::First).await?;
            let Some(entry) = entries.into_iter().next() else {
                return Err(Error::NoCsvFiles {
                    report: report.clone(),
                });
            };

            if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(destination, &entry.contents).await?;

            tracing::info!("Successfully written to: {}", destination.display());
            Ok::<_, Error>(())
        })
        .await
    }

    /// Download a report and save every CSV it contains under `folder`
    ///
    /// Returns the written paths in archive order.
    pub async fn download_report_files(
        &mut self,
        report: &ReportId,
        filter: &Filter,
        folder: &Path,
    ) -> Result<Vec<PathBuf>> {
        let logger = self.config.logger().cloned();
        with_logger(logger, async {
            let entries = self.fetch_csvs(report, filter, CsvSelection::All).await?;

            tokio::fs::create_dir_all(folder).await?;
            let files = try_join_all(entries.into_iter().map(|entry| write_entry(folder, entry)))
                .await?;

            let shown = std::path::absolute(folder).unwrap_or_else(|_| folder.to_path_buf());
            tracing::info!("Successfully wrote {} files to: {}", files.len(), shown.display());
            Ok::<_, Error>(files)
        })
        .await
    }

    /// Download each request in order, stopping at the first failure
    pub async fn download_reports(&mut self, requests: &[ReportRequest]) -> Result<()> {
        for (index, request) in requests.iter().enumerate() {
            tracing::debug!(
                "Batch progress: report {} of {} ({})",
                index + 1,
                requests.len(),
                request.report
            );
            self.download_report(&request.report, &request.filter, &request.destination)
                .await?;
        }
        Ok(())
    }

    /// Close the browser; does nothing if no session is open
    pub async fn close(&mut self) -> Result<()> {
        let logger = self.config.logger().cloned();
        with_logger(logger, async {
            match std::mem::replace(&mut self.state, SessionState::Closed) {
                SessionState::Authenticated(session) => {
                    tracing::info!("Closing virtual browser...");
                    session.close().await
                }
                SessionState::Unauthenticated => {
                    self.state = SessionState::Unauthenticated;
                    Ok(())
                }
                SessionState::Closed => Ok(()),
            }
        })
        .await
    }

    fn session(&self) -> Result<&L::Session> {
        match &self.state {
            SessionState::Authenticated(session) => Ok(session),
            SessionState::Unauthenticated => Err(Error::Unauthenticated),
            SessionState::Closed => Err(Error::SessionClosed),
        }
    }

    /// Run one download in a fresh temporary directory and read its CSVs
    ///
    /// The directory is removed before returning, whatever the outcome.
    async fn fetch_csvs(
        &self,
        report: &ReportId,
        filter: &Filter,
        selection: CsvSelection,
    ) -> Result<Vec<CsvEntry>> {
        let session = self.session()?;
        let dir = DownloadDir::create()?;

        let result = self.capture(session, report, filter, selection, dir.path()).await;

        match (result, dir.release()) {
            (Ok(entries), Ok(())) => Ok(entries),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(release_err)) => {
                tracing::warn!("Failed to remove download directory: {}", release_err);
                Err(e)
            }
        }
    }

    async fn capture(
        &self,
        session: &L::Session,
        report: &ReportId,
        filter: &Filter,
        selection: CsvSelection,
        dir: &Path,
    ) -> Result<Vec<CsvEntry>> {
        session.set_download_dir(dir).await?;

        let url = download_url(self.config.host(), report, filter)?;
        tracing::info!("Downloading report {}...", report);

        match session.trigger_download(&url).await {
            DownloadNavigation::NavigatedFully => {
                tracing::debug!("Download navigation finished without abort");
            }
            DownloadNavigation::AbortedByDownload { reason } => {
                tracing::debug!("Expected network abort: {}", reason);
            }
        }

        let archive_path = ReportArchive::wait_for(
            dir,
            self.config.settle_timeout(),
            self.config.poll_interval(),
        )
        .await?
        .ok_or_else(|| {
            let err = Error::DownloadFailed {
                report: report.clone(),
            };
            tracing::error!("{}", err);
            err
        })?;

        tracing::info!("Unpacking ZIP archive...");
        let mut archive = ReportArchive::open(&archive_path)?;
        let entries = archive.read_csv_entries(selection)?;

        if entries.is_empty() {
            return Err(Error::NoCsvFiles {
                report: report.clone(),
            });
        }

        Ok(entries)
    }
}

async fn login<S: BrowserSession>(session: &S, config: &ConnectionConfig) -> Result<()> {
    tracing::info!("Logging in to Looker...");
    session.goto_and_settle(&config.login_url()).await?;

    session.type_into(EMAIL_SELECTOR, config.username()).await?;
    session.type_into(PASSWORD_SELECTOR, config.password()).await?;

    match session.click_and_wait(SUBMIT_SELECTOR).await? {
        LoginNavigation::Navigated => tracing::debug!("Login navigation completed"),
        LoginNavigation::NotObserved { reason } => tracing::warn!(
            "Expected navigation did not occur ({}). Assuming okay and moving on",
            reason
        ),
    }

    Ok(())
}

async fn write_entry(folder: &Path, entry: CsvEntry) -> Result<PathBuf> {
    let path = folder.join(&entry.relative_path);

    // Siblings may create the same parent concurrently
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    tracing::info!("Writing {} to {}", entry.name, path.display());
    tokio::fs::write(&path, &entry.contents).await?;
    Ok(path)
}

async fn with_logger<F: Future>(logger: Option<Dispatch>, fut: F) -> F::Output {
    match logger {
        Some(dispatch) => fut.with_subscriber(dispatch).await,
        None => fut.await,
    }
}
