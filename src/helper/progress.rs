use std::io::Write;
use std::process::{Child, ChildStdin, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

use crate::cancel::CancelToken;
use crate::config;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::progress::{Outcome, ProgressDialog, percent};

use super::process::{self, Helper, Output};

/// Progress dialog fed line by line through the helper's stdin.
pub struct HelperProgress {
    stdin: Mutex<Option<ChildStdin>>,
    max: i32,
    outcome: Arc<Outcome>,
    close: CancelToken,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl HelperProgress {
    pub fn spawn(helper: &Helper, args: &[String], opts: &Options) -> Result<Self> {
        tracing::debug!(program = %helper.program().display(), ?args, "starting progress helper");
        let mut child = helper
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdin = child.stdin.take();
        let outcome = Arc::new(Outcome::default());
        let close = CancelToken::new();

        let monitor = {
            let outcome = Arc::clone(&outcome);
            let close = close.clone();
            let opts = opts.clone();
            std::thread::spawn(move || monitor(child, opts, close, &outcome))
        };

        Ok(Self {
            stdin: Mutex::new(stdin),
            max: opts.progress_max(),
            outcome,
            close,
            monitor: Mutex::new(Some(monitor)),
        })
    }

    fn send(&self, line: &str) -> Result<()> {
        if self.outcome.is_done() {
            return Err(self.outcome.closed_error());
        }
        let mut stdin = self.lock_stdin();
        let Some(pipe) = stdin.as_mut() else {
            return Err(Error::DialogClosed);
        };
        tracing::trace!(line, "progress update");
        let written = pipe.write_all(line.as_bytes()).and_then(|_| pipe.write_all(b"\n")).and_then(|_| pipe.flush());
        match written {
            Ok(()) => Ok(()),
            Err(err) => {
                *stdin = None;
                if self.outcome.is_done() {
                    Err(self.outcome.closed_error())
                } else {
                    Err(err.into())
                }
            }
        }
    }

    fn lock_stdin(&self) -> MutexGuard<'_, Option<ChildStdin>> {
        self.stdin.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn join_monitor(&self) {
        let handle = self.monitor.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

/// Owns the child until it exits, the caller closes the dialog, or the token fires.
fn monitor(mut child: Child, opts: Options, close: CancelToken, outcome: &Outcome) {
    let stdout = process::drain(child.stdout.take());
    let stderr = process::drain(child.stderr.take());

    let result = loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let output = Output {
                    code: status.code(),
                    stdout: process::collect(stdout),
                    stderr: process::collect(stderr),
                };
                break process::str_result(&opts, output).map(|_| ());
            }
            Ok(None) => {}
            Err(err) => break Err(err.into()),
        }
        let token_error = opts.cancel.as_ref().and_then(CancelToken::error);
        if token_error.is_some() || close.is_done() {
            process::terminate(&mut child);
            break match token_error {
                Some(err) => Err(err),
                None => Ok(()),
            };
        }
        close.wait_timeout(config::POLL_INTERVAL);
    };
    outcome.finish(result);
}

impl ProgressDialog for HelperProgress {
    fn text(&self, text: &str) -> Result<()> {
        let single_line = text.replace(['\r', '\n'], " ");
        self.send(&format!("#{single_line}"))
    }

    fn value(&self, value: i32) -> Result<()> {
        if self.max < 0 {
            return Ok(());
        }
        self.send(&percent(value, self.max).to_string())
    }

    fn max_value(&self) -> i32 {
        self.max
    }

    fn complete(&self) -> Result<()> {
        self.send("100")?;
        // EOF leaves the helper showing a finished bar with OK enabled.
        *self.lock_stdin() = None;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.close.cancel();
        *self.lock_stdin() = None;
        self.join_monitor();
        self.outcome.wait()
    }

    fn is_done(&self) -> bool {
        self.outcome.is_done()
    }

    fn wait(&self) -> Result<()> {
        self.outcome.wait()
    }
}

impl Drop for HelperProgress {
    fn drop(&mut self) {
        if !self.outcome.is_done() {
            self.close.cancel();
        }
        self.join_monitor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::args;
    use crate::helper::testing::script_helper;
    use std::fs;
    use std::time::{Duration, Instant};

    #[test]
    fn test_updates_reach_helper_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("stdin.log");
        let helper = script_helper(dir.path(), &format!("cat > '{}'\n", log.display()));
        let opts = Options::new().max_value(200);

        let dialog = HelperProgress::spawn(&helper, &args::progress(&opts), &opts).unwrap();
        assert_eq!(dialog.max_value(), 200);
        dialog.text("Copying\nfiles").unwrap();
        dialog.value(50).unwrap();
        dialog.complete().unwrap();
        dialog.wait().unwrap();

        assert_eq!(fs::read_to_string(&log).unwrap(), "#Copying files\n25\n100\n");
        assert!(matches!(dialog.value(10), Err(Error::DialogClosed)));
    }

    #[test]
    fn test_user_cancel_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let helper = script_helper(dir.path(), "exit 1\n");
        let opts = Options::new();

        let dialog = HelperProgress::spawn(&helper, &args::progress(&opts), &opts).unwrap();
        assert!(matches!(dialog.wait(), Err(Error::Canceled)));
        assert!(dialog.is_done());
        assert!(matches!(dialog.text("late"), Err(Error::Canceled)));
        assert!(matches!(dialog.close(), Err(Error::Canceled)));
    }

    #[test]
    fn test_extra_button_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let helper = script_helper(dir.path(), "echo Skip\nexit 1\n");
        let opts = Options::new().extra_button("Skip");

        let dialog = HelperProgress::spawn(&helper, &args::progress(&opts), &opts).unwrap();
        assert!(matches!(dialog.wait(), Err(Error::ExtraButton)));
    }

    #[test]
    fn test_close_dismisses_running_dialog() {
        let dir = tempfile::tempdir().unwrap();
        let helper = script_helper(dir.path(), "exec sleep 30\n");
        let opts = Options::new();

        let dialog = HelperProgress::spawn(&helper, &args::progress(&opts), &opts).unwrap();
        assert!(!dialog.is_done());
        dialog.close().unwrap();
        assert!(dialog.is_done());
    }

    #[test]
    fn test_deadline_kills_dialog() {
        let dir = tempfile::tempdir().unwrap();
        let helper = script_helper(dir.path(), "exec sleep 30\n");
        let opts = Options::new().timeout(Duration::from_millis(100));

        let dialog = HelperProgress::spawn(&helper, &args::progress(&opts), &opts).unwrap();
        assert!(dialog.wait().unwrap_err().is_timeout());
    }

    #[test]
    fn test_close_returns_while_grandchild_runs() {
        let dir = tempfile::tempdir().unwrap();
        let helper = script_helper(dir.path(), "sleep 30\n");
        let opts = Options::new();

        let dialog = HelperProgress::spawn(&helper, &args::progress(&opts), &opts).unwrap();
        let started = Instant::now();
        dialog.close().unwrap();
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_deadline_returns_while_grandchild_runs() {
        let dir = tempfile::tempdir().unwrap();
        let helper = script_helper(dir.path(), "sleep 30\n");
        let opts = Options::new().timeout(Duration::from_millis(100));

        let started = Instant::now();
        let dialog = HelperProgress::spawn(&helper, &args::progress(&opts), &opts).unwrap();
        assert!(dialog.wait().unwrap_err().is_timeout());
        drop(dialog);
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_pulsating_ignores_values() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("stdin.log");
        let helper = script_helper(dir.path(), &format!("cat > '{}'\n", log.display()));
        let opts = Options::new().pulsate();

        let dialog = HelperProgress::spawn(&helper, &args::progress(&opts), &opts).unwrap();
        dialog.value(30).unwrap();
        dialog.complete().unwrap();
        dialog.wait().unwrap();
        assert_eq!(fs::read_to_string(&log).unwrap(), "100\n");
    }
}
