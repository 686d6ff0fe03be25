pub mod archive;
pub mod config;
pub mod download_dir;
pub mod downloader;
pub mod error;
pub mod report;
pub mod session;

pub use config::ConnectionConfig;
pub use downloader::ReportDownloader;
pub use error::{Error, Result};
pub use report::{Filter, ReportId, ReportRequest};
pub use session::{BrowserSession, DownloadNavigation, LoginNavigation, SessionLauncher};
