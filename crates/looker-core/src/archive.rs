//! Reading downloaded report archives.
//!
//! A Looker dashboard download is a zip file holding one CSV per tile, possibly
//! nested in folders. Entries are always visited in central-directory order so
//! that "the first CSV" and the order of extracted files are deterministic.

use crate::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;
use zip::ZipArchive;

const CSV_SUFFIX: &str = ".csv";

/// Upper bound on the buffer reserved from an entry's declared size
const MAX_PREALLOC: usize = 1 << 20;

/// A CSV file read out of a report archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvEntry {
    /// Entry name as stored in the archive
    pub name: String,
    /// Entry path, guaranteed not to escape the extraction root
    pub relative_path: PathBuf,
    pub contents: Vec<u8>,
}

/// Which CSV entries to read from an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvSelection {
    First,
    All,
}

/// Read-only view of a downloaded report archive
pub struct ReportArchive {
    path: PathBuf,
    archive: ZipArchive<File>,
}

impl ReportArchive {
    /// Open a zip archive
    pub fn open(path: &Path) -> Result<Self> {
        tracing::debug!("Opening archive: {}", path.display());

        let file = File::open(path)?;
        let archive = ZipArchive::new(file)?;

        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }

    /// Find the first `*.zip` file directly inside `dir`
    pub fn find_in(dir: &Path) -> Result<Option<PathBuf>> {
        let pattern = format!(
            "{}/*.zip",
            glob::Pattern::escape(&dir.to_string_lossy())
        );

        let mut matches = glob::glob(&pattern)?.filter_map(|entry| entry.ok());
        Ok(matches.next())
    }

    /// Poll `dir` until a zip file appears or `timeout` elapses
    pub async fn wait_for(dir: &Path, timeout: Duration, poll: Duration) -> Result<Option<PathBuf>> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(path) = Self::find_in(dir)? {
                tracing::debug!("Found archive: {}", path.display());
                return Ok(Some(path));
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }

            tokio::time::sleep(poll.min(deadline - now)).await;
        }
    }

    /// Read CSV entries in archive order
    ///
    /// Directory entries are skipped. An entry whose path is absolute or walks
    /// out through `..` fails the whole read.
    pub fn read_csv_entries(&mut self, selection: CsvSelection) -> Result<Vec<CsvEntry>> {
        let mut entries = Vec::new();

        for index in 0..self.archive.len() {
            let mut file = self.archive.by_index(index)?;

            if file.is_dir() || !file.name().ends_with(CSV_SUFFIX) {
                continue;
            }

            let name = file.name().to_string();
            let relative_path = file
                .enclosed_name()
                .map(Path::to_path_buf)
                .ok_or_else(|| Error::UnsafeEntry(name.clone()))?;

            let mut contents = Vec::with_capacity(capacity_hint(file.size()));
            file.read_to_end(&mut contents)?;

            entries.push(CsvEntry {
                name,
                relative_path,
                contents,
            });

            if selection == CsvSelection::First {
                break;
            }
        }

        tracing::debug!(
            "Read {} CSV entries from {}",
            entries.len(),
            self.path.display()
        );

        Ok(entries)
    }
}

/// Declared sizes come from the archive itself and may be wrong
fn capacity_hint(declared: u64) -> usize {
    usize::try_from(declared).map_or(MAX_PREALLOC, |size| size.min(MAX_PREALLOC))
}
