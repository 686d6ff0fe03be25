use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable that may point at a Chrome binary
pub const CHROME_ENV: &str = "CHROME";

/// Executable names searched on `PATH`
const CHROME_NAMES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Locates the Chrome binary used for report downloads
pub struct ChromeFinder {
    custom_path: Option<PathBuf>,
}

impl ChromeFinder {
    /// Create a new ChromeFinder with optional custom path
    pub fn new(custom_path: Option<PathBuf>) -> Self {
        Self { custom_path }
    }

    /// Find Chrome: custom path, then `$CHROME`, then install locations, then `PATH`
    pub fn find(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.custom_path {
            return validate_chrome_path(path);
        }

        if let Some(path) = std::env::var_os(CHROME_ENV) {
            tracing::debug!("Using Chrome from ${}", CHROME_ENV);
            return validate_chrome_path(Path::new(&path));
        }

        let candidates = Self::default_paths();
        if let Some(path) = candidates
            .iter()
            .find_map(|path| validate_chrome_path(path).ok())
        {
            return Ok(path);
        }

        if let Some(path) = CHROME_NAMES.iter().find_map(|name| which::which(name).ok()) {
            return Ok(path);
        }

        Err(Error::Browser(format!(
            "Chrome not found. Checked: {}, and {} on PATH. Use --chrome-path to specify location.",
            candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            CHROME_NAMES.join(", ")
        )))
    }

    /// Platform-specific install locations
    fn default_paths() -> Vec<PathBuf> {
        #[allow(unused_mut)]
        let mut paths: Vec<PathBuf> = Vec::new();

        #[cfg(target_os = "macos")]
        {
            paths.push(PathBuf::from(
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            ));
            paths.push(PathBuf::from(
                "/Applications/Chromium.app/Contents/MacOS/Chromium",
            ));
            if let Some(home) = dirs::home_dir() {
                paths.push(home.join("Applications/Google Chrome.app/Contents/MacOS/Google Chrome"));
            }
        }

        #[cfg(target_os = "linux")]
        {
            paths.extend(
                [
                    "/usr/bin/google-chrome",
                    "/usr/bin/chromium",
                    "/usr/bin/chromium-browser",
                    "/snap/bin/chromium",
                ]
                .map(PathBuf::from),
            );
        }

        #[cfg(target_os = "windows")]
        {
            paths.push(PathBuf::from(
                r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            ));
            paths.push(PathBuf::from(
                r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            ));
            if let Some(local) = dirs::data_local_dir() {
                paths.push(local.join(r"Google\Chrome\Application\chrome.exe"));
            }
        }

        paths
    }
}

/// Check that a path exists and is executable
fn validate_chrome_path(path: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(Error::Browser(format!(
            "Chrome not found at: {}",
            path.display()
        )));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::metadata(path)?.permissions();
        if permissions.mode() & 0o111 == 0 {
            return Err(Error::Browser(format!(
                "Chrome binary not executable: {}",
                path.display()
            )));
        }
    }

    Ok(path.to_path_buf())
}
