use super::{finish, prepare};
use crate::ConnectionArgs;
use anyhow::{Context, Result};
use looker_core::ReportRequest;
use std::path::Path;

pub fn execute(connection: &ConnectionArgs, input: &Path) -> Result<()> {
    // Parse the batch before launching a browser
    let requests = ReportRequest::load_batch(input)
        .with_context(|| format!("Failed to read report batch: {}", input.display()))?;

    if requests.is_empty() {
        println!("No reports listed in {}", input.display());
        return Ok(());
    }

    let (runtime, mut downloader) = prepare(connection)?;

    runtime
        .block_on(async {
            let outcome = async {
                downloader.authenticate().await?;
                downloader.download_reports(&requests).await
            }
            .await;
            finish(outcome, downloader.close().await)
        })
        .context("Failed to download reports")?;

    println!("Reports downloaded successfully!");
    Ok(())
}
