use anyhow::Result;
use clap::{Parser, Subcommand};
use looker_cli::{commands, parse_filter, ConnectionArgs};
use looker_core::{Filter, ReportId};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "looker-download")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "CLI for downloading reports from Looker",
    long_about = "looker-download logs in to Looker with a headless Chrome, downloads dashboard \
                  exports as ZIP archives and saves the CSV files they contain."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a report from Looker
    Download {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// The dashboard ID of the report to download
        #[arg(long)]
        report: ReportId,

        /// JSON object of dashboard filters, e.g. '{"Year":"Current Year"}'
        #[arg(long, default_value = "{}", value_parser = parse_filter)]
        filter: Filter,

        /// The file to save the report's CSV to
        #[arg(long, value_name = "FILE")]
        destination: PathBuf,
    },

    /// Download a report with multiple CSV files from Looker
    DownloadCsvs {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// The dashboard ID of the report to download
        #[arg(long)]
        report: ReportId,

        /// JSON object of dashboard filters, e.g. '{"Year":"Current Year"}'
        #[arg(long, default_value = "{}", value_parser = parse_filter)]
        filter: Filter,

        /// The folder to save the report's CSV files to
        #[arg(long, value_name = "DIR")]
        folder: PathBuf,
    },

    /// Download multiple reports from Looker
    DownloadReports {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// A JSON file listing the reports to download
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    match cli.command {
        Commands::Download {
            connection,
            report,
            filter,
            destination,
        } => commands::download::execute(&connection, &report, &filter, &destination),
        Commands::DownloadCsvs {
            connection,
            report,
            filter,
            folder,
        } => commands::download_csvs::execute(&connection, &report, &filter, &folder),
        Commands::DownloadReports { connection, input } => {
            commands::download_reports::execute(&connection, &input)
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("looker_download=debug,looker_cli=debug,looker_core=debug,looker_browser=debug")
    } else {
        EnvFilter::new("looker_download=info,looker_cli=info,looker_core=info,looker_browser=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
