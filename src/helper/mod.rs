//! Dialogs rendered by an external zenity-compatible executable.

pub mod args;
pub mod process;
pub mod progress;

use std::path::PathBuf;

use crate::error::Result;
use crate::message::MessageKind;
use crate::options::Options;
use crate::progress::ProgressDialog;

use args::FileMode;
pub use process::{Helper, Output};
pub use progress::HelperProgress;

impl Helper {
    pub fn message(&self, kind: MessageKind, text: &str, opts: &Options) -> Result<()> {
        let output = self.run(&args::message(kind, text, opts), opts.cancel.as_ref())?;
        process::str_result(opts, output).map(|_| ())
    }

    pub fn select_file(&self, opts: &Options) -> Result<PathBuf> {
        let output = self.run(&args::file_selection(FileMode::Open, opts), opts.cancel.as_ref())?;
        process::str_result(opts, output).map(PathBuf::from)
    }

    pub fn select_file_multiple(&self, opts: &Options) -> Result<Vec<PathBuf>> {
        let output = self.run(&args::file_selection(FileMode::Multiple, opts), opts.cancel.as_ref())?;
        let paths = process::list_result(opts, output)?;
        Ok(paths.into_iter().map(PathBuf::from).collect())
    }

    pub fn select_file_save(&self, opts: &Options) -> Result<PathBuf> {
        let output = self.run(&args::file_selection(FileMode::Save, opts), opts.cancel.as_ref())?;
        process::str_result(opts, output).map(PathBuf::from)
    }

    pub fn progress(&self, opts: &Options) -> Result<HelperProgress> {
        HelperProgress::spawn(self, &args::progress(opts), opts)
    }
}

pub(crate) fn is_available() -> bool {
    crate::config::helper_path().is_some()
}

pub(crate) fn message(kind: MessageKind, text: &str, opts: &Options) -> Result<()> {
    Helper::locate()?.message(kind, text, opts)
}

pub(crate) fn select_file(opts: &Options) -> Result<PathBuf> {
    Helper::locate()?.select_file(opts)
}

pub(crate) fn select_file_multiple(opts: &Options) -> Result<Vec<PathBuf>> {
    Helper::locate()?.select_file_multiple(opts)
}

pub(crate) fn select_file_save(opts: &Options) -> Result<PathBuf> {
    Helper::locate()?.select_file_save(opts)
}

pub(crate) fn progress(opts: &Options) -> Result<Box<dyn ProgressDialog>> {
    Ok(Box::new(Helper::locate()?.progress(opts)?))
}
