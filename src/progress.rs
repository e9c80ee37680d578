use std::sync::{Condvar, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::options::Options;

/// Handle to a progress dialog running alongside the caller.
pub trait ProgressDialog: Send + Sync {
    /// Replaces the text above the bar.
    fn text(&self, text: &str) -> Result<()>;

    /// Moves the bar to `value` out of [`max_value`](Self::max_value).
    fn value(&self, value: i32) -> Result<()>;

    fn max_value(&self) -> i32;

    /// Fills the bar and lets the user acknowledge with OK.
    fn complete(&self) -> Result<()>;

    /// Dismisses the dialog. Returns the user's answer if they already gave one.
    fn close(&self) -> Result<()>;

    /// True once the dialog is gone.
    fn is_done(&self) -> bool;

    /// Blocks until the dialog is gone and returns how it ended.
    fn wait(&self) -> Result<()>;
}

/// Shows a progress dialog. `Options::max_value` sets the scale, a negative
/// maximum gives a pulsating bar.
pub fn progress(opts: &Options) -> Result<Box<dyn ProgressDialog>> {
    opts.check_cancel()?;
    tracing::debug!(max = opts.progress_max(), "showing progress dialog");
    crate::backend::progress(opts)
}

/// Bar position in percent, clamped to `0..=100`.
#[cfg_attr(windows, allow(dead_code))]
pub(crate) fn percent(value: i32, max: i32) -> f64 {
    if max <= 0 {
        return 0.0;
    }
    (100.0 * f64::from(value) / f64::from(max)).clamp(0.0, 100.0)
}

/// Write-once completion cell shared by the dialog owner and its handle.
#[derive(Debug, Default)]
pub(crate) struct Outcome {
    state: Mutex<Option<Result<()>>>,
    cond: Condvar,
}

impl Outcome {
    /// Records how the dialog ended. Later calls are ignored.
    pub fn finish(&self, result: Result<()>) {
        let mut state = self.lock();
        if state.is_none() {
            *state = Some(result);
            self.cond.notify_all();
        }
    }

    pub fn is_done(&self) -> bool {
        self.lock().is_some()
    }

    pub fn get(&self) -> Option<Result<()>> {
        self.lock().clone()
    }

    pub fn wait(&self) -> Result<()> {
        let mut state = self.lock();
        loop {
            if let Some(result) = state.as_ref() {
                return result.clone();
            }
            state = self.cond.wait(state).unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Error to report when an update arrives after the dialog ended.
    pub fn closed_error(&self) -> Error {
        match self.get() {
            Some(Err(err)) => err,
            _ => Error::DialogClosed,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Result<()>>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
