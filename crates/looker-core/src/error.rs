use crate::report::ReportId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not authenticated: call authenticate() before downloading reports")]
    Unauthenticated,

    #[error("Already authenticated: authenticate() must only be called once")]
    AlreadyAuthenticated,

    #[error("Session has been closed")]
    SessionClosed,

    #[error(
        "Failed to download report {report}, usually due to a bad report configuration or \
         authentication. Try again in interactive mode (--debug) to watch the browser."
    )]
    DownloadFailed { report: ReportId },

    #[error("No CSV files found in report {report}")]
    NoCsvFiles { report: ReportId },

    #[error("Archive entry escapes the destination folder: {0}")]
    UnsafeEntry(String),

    #[error("Invalid host URL: {0}")]
    InvalidHost(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Failed to read archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Invalid archive pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to parse report request: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
