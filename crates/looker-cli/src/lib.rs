use clap::Args;
use looker_browser::ChromeLauncher;
use looker_core::{ConnectionConfig, Filter};
use std::path::PathBuf;
use std::time::Duration;

pub mod commands;

/// Connection options shared by every download command
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// The Looker host, e.g. https://example.looker.com
    #[arg(long, env = "LOOKER_HOST")]
    pub host: String,

    /// The Looker username
    #[arg(long, env = "LOOKER_USERNAME")]
    pub username: String,

    /// The Looker password
    #[arg(long, env = "LOOKER_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Open the browser in headful mode to watch the login and download
    #[arg(long)]
    pub debug: bool,

    /// Path to the Chrome binary (searched for when omitted)
    #[arg(long, value_name = "PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Seconds to wait for the report archive to finish downloading
    #[arg(long, value_name = "SECONDS", default_value_t = 5)]
    pub settle_secs: u64,
}

impl ConnectionArgs {
    pub fn config(&self) -> looker_core::Result<ConnectionConfig> {
        Ok(
            ConnectionConfig::new(&self.host, &self.username, &self.password)?
                .with_interactive(self.debug)
                .with_settle_timeout(Duration::from_secs(self.settle_secs)),
        )
    }

    pub fn launcher(&self, config: &ConnectionConfig) -> ChromeLauncher {
        ChromeLauncher::new(self.chrome_path.clone())
            .with_navigation_timeout(config.login_timeout())
    }
}

/// Parse a `--filter` JSON object such as `{"Year":"Current Year"}`
pub fn parse_filter(value: &str) -> Result<Filter, String> {
    serde_json::from_str(value)
        .map_err(|e| format!("filter must be a JSON object of strings: {}", e))
}
