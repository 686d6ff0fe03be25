use super::{finish, prepare};
use crate::ConnectionArgs;
use anyhow::{Context, Result};
use looker_core::{Filter, ReportId};
use std::path::Path;

pub fn execute(
    connection: &ConnectionArgs,
    report: &ReportId,
    filter: &Filter,
    destination: &Path,
) -> Result<()> {
    tracing::debug!("Downloading report {} to {}", report, destination.display());
    let (runtime, mut downloader) = prepare(connection)?;

    runtime
        .block_on(async {
            let outcome = async {
                downloader.authenticate().await?;
                downloader.download_report(report, filter, destination).await
            }
            .await;
            finish(outcome, downloader.close().await)
        })
        .with_context(|| format!("Failed to download report {}", report))?;

    println!(
        "Report {} downloaded successfully to {}",
        report,
        destination.display()
    );
    Ok(())
}
