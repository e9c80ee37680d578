//! Native dialogs behind one call surface.
//!
//! Message boxes, progress bars and file pickers. On Windows every dialog is
//! drawn by the OS itself (`MessageBoxW`, the common item dialogs, a progress
//! window on its own UI thread). Everywhere else the call runs a
//! zenity-compatible helper executable and parses its answer.
//!
//! ```no_run
//! use zendialog::{FileFilter, Options};
//!
//! let opts = Options::new()
//!     .title("Open image")
//!     .file_filter(FileFilter::new("Images", ["*.png", "*.jpg"]));
//! match zendialog::select_file(&opts) {
//!     Ok(path) => println!("{}", path.display()),
//!     Err(zendialog::Error::Canceled) => {}
//!     Err(err) => return Err(err),
//! }
//! # Ok::<(), zendialog::Error>(())
//! ```
//!
//! Every call blocks until the user answers. Attach a [`CancelToken`] or a
//! timeout to [`Options`] to give up early from another thread.

mod cancel;
mod error;
mod file;
mod message;
mod options;
mod progress;

#[cfg(not(windows))]
mod config;
#[cfg(not(windows))]
pub mod helper;
#[cfg(not(windows))]
use helper as backend;

#[cfg(windows)]
mod types;
#[cfg(windows)]
mod utils;
#[cfg(windows)]
mod ui;
#[cfg(windows)]
use ui as backend;

pub use cancel::{CancelToken, WatchGuard};
pub use error::{Error, Result};
pub use file::{select_file, select_file_multiple, select_file_save, FileFilter};
pub use message::{error, info, message, question, warning, MessageKind};
pub use options::{DialogIcon, Options, WindowId};
pub use progress::{progress, ProgressDialog};

/// True when dialogs can be shown: always on Windows, elsewhere once a
/// helper executable has been found.
pub fn is_available() -> bool {
    backend::is_available()
}
