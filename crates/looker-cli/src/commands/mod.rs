pub mod download;
pub mod download_csvs;
pub mod download_reports;

use crate::ConnectionArgs;
use anyhow::{Context, Result};
use looker_browser::ChromeLauncher;
use looker_core::ReportDownloader;
use tokio::runtime::Runtime;

/// Build the runtime and an unauthenticated downloader for a command
fn prepare(connection: &ConnectionArgs) -> Result<(Runtime, ReportDownloader<ChromeLauncher>)> {
    let config = connection
        .config()
        .context("Invalid connection settings")?;
    let launcher = connection.launcher(&config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    Ok((runtime, ReportDownloader::new(config, launcher)))
}

/// Combine a job's outcome with the result of closing the browser
///
/// The job's error wins; a close failure is only reported on its own when the
/// job succeeded.
fn finish<T>(
    outcome: looker_core::Result<T>,
    closed: looker_core::Result<()>,
) -> looker_core::Result<T> {
    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            tracing::warn!("Failed to close browser: {}", close_err);
            Err(e)
        }
    }
}
