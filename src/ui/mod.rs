//! Dialogs built directly on Win32: `MessageBoxW`, the common item dialogs
//! and a small progress window of our own.

mod file_dialog;
mod framework;
mod hook;
mod message_box;
mod progress;
mod wrappers;

use std::path::PathBuf;

use windows_sys::Win32::Foundation::HWND;

use crate::error::{Error, Result};
use crate::message::MessageKind;
use crate::options::Options;
use crate::progress::ProgressDialog;

use file_dialog::Mode;
pub use progress::NativeProgress;

/// Owner window for a dialog; null leaves it unowned.
fn owner_window(opts: &Options) -> HWND {
    opts.attach.map_or(std::ptr::null_mut(), |id| id.0 as HWND)
}

pub(crate) fn is_available() -> bool {
    true
}

pub(crate) fn message(kind: MessageKind, text: &str, opts: &Options) -> Result<()> {
    message_box::show(kind, text, opts)
}

pub(crate) fn select_file(opts: &Options) -> Result<PathBuf> {
    first(file_dialog::pick(Mode::Open, opts)?)
}

pub(crate) fn select_file_multiple(opts: &Options) -> Result<Vec<PathBuf>> {
    file_dialog::pick(Mode::Multiple, opts)
}

pub(crate) fn select_file_save(opts: &Options) -> Result<PathBuf> {
    first(file_dialog::pick(Mode::Save, opts)?)
}

pub(crate) fn progress(opts: &Options) -> Result<Box<dyn ProgressDialog>> {
    Ok(Box::new(NativeProgress::spawn(opts)?))
}

fn first(paths: Vec<PathBuf>) -> Result<PathBuf> {
    paths.into_iter().next().ok_or(Error::Canceled)
}
