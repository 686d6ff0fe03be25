mod cdp_session;
mod chrome_finder;
mod error;
mod launcher;
mod navigation;
pub mod network_idle;

pub use cdp_session::ChromeSession;
pub use chrome_finder::{ChromeFinder, CHROME_ENV};
pub use error::{Error, Result};
pub use launcher::ChromeLauncher;
