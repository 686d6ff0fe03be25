use super::{finish, prepare};
use crate::ConnectionArgs;
use anyhow::{Context, Result};
use looker_core::{Filter, ReportId};
use std::path::Path;

pub fn execute(
    connection: &ConnectionArgs,
    report: &ReportId,
    filter: &Filter,
    folder: &Path,
) -> Result<()> {
    let (runtime, mut downloader) = prepare(connection)?;

    let files = runtime
        .block_on(async {
            let outcome = async {
                downloader.authenticate().await?;
                downloader.download_report_files(report, filter, folder).await
            }
            .await;
            finish(outcome, downloader.close().await)
        })
        .with_context(|| format!("Failed to download report {}", report))?;

    for file in &files {
        println!("  {}", file.display());
    }
    println!(
        "Report {} downloaded successfully to {} ({} files)",
        report,
        folder.display(),
        files.len()
    );
    Ok(())
}
