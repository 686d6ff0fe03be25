use crate::Result;
use std::path::{Path, PathBuf};

const DIR_PREFIX: &str = "looker-download";

/// Temporary directory that receives one browser download
///
/// Call [`DownloadDir::release`] when the download is finished. If the value is
/// dropped without being released, the directory is removed on drop.
#[derive(Debug)]
pub struct DownloadDir {
    path: PathBuf,
    released: bool,
}

impl DownloadDir {
    /// Create a uniquely named directory under the system temp dir
    pub fn create() -> Result<Self> {
        let temp_dir = tempfile::Builder::new().prefix(DIR_PREFIX).tempdir()?;
        let path = temp_dir.keep();

        tracing::debug!("Created download directory: {}", path.display());

        Ok(Self {
            path,
            released: false,
        })
    }

    /// Get the directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory and everything in it
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        std::fs::remove_dir_all(&self.path)?;
        tracing::debug!("Removed download directory: {}", self.path.display());
        Ok(())
    }
}

impl Drop for DownloadDir {
    fn drop(&mut self) {
        if !self.released && self.path.exists() {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}
