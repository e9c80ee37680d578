use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

use crate::cancel::CancelToken;
use crate::config;
use crate::error::{Error, Result};
use crate::options::Options;

use super::args::SEPARATOR;

/// What the helper printed and how it exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// `None` when the helper was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// A zenity-compatible executable, optionally run through a launcher.
#[derive(Debug, Clone)]
pub struct Helper {
    program: PathBuf,
    prefix: Vec<OsString>,
}

impl Helper {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), prefix: Vec::new() }
    }

    /// Runs `program prefix... args...`, e.g. `sh script.sh`.
    pub fn with_prefix<I, S>(program: impl Into<PathBuf>, prefix: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self { program: program.into(), prefix: prefix.into_iter().map(Into::into).collect() }
    }

    /// The helper named by `ZENDIALOG_HELPER`, or the first of zenity, qarma
    /// and matedialog on `PATH`.
    pub fn locate() -> Result<Self> {
        config::helper_path().map(Helper::new).ok_or(Error::HelperNotFound)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// On Unix the helper leads its own process group so [`terminate`] can
    /// reach anything a wrapper script started.
    pub(crate) fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.prefix).args(args);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd
    }

    /// Runs the helper to completion, killing it if `cancel` fires first.
    pub fn run(&self, args: &[String], cancel: Option<&CancelToken>) -> Result<Output> {
        tracing::debug!(program = %self.program.display(), ?args, "running dialog helper");
        let mut child = self
            .command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        // A killed helper's drains are left detached: a descendant outside
        // the group may still hold the pipes open.
        let status = wait_child(&mut child, cancel)?;
        Ok(Output { code: status.code(), stdout: collect(stdout), stderr: collect(stderr) })
    }
}

/// Reads a pipe to the end on its own thread so the child never blocks on a full pipe.
pub(crate) fn drain<R>(pipe: Option<R>) -> Option<JoinHandle<String>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

pub(crate) fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

fn wait_child(child: &mut Child, cancel: Option<&CancelToken>) -> Result<ExitStatus> {
    let Some(token) = cancel else {
        return Ok(child.wait()?);
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if let Some(err) = token.error() {
            tracing::debug!(error = %err, "killing dialog helper");
            terminate(child);
            return Err(err);
        }
        token.wait_timeout(config::POLL_INTERVAL);
    }
}

#[cfg(unix)]
unsafe extern "C" {
    fn kill(pid: i32, sig: i32) -> i32;
}

#[cfg(unix)]
const SIGKILL: i32 = 9;

/// Kills the helper together with its process group and reaps it.
pub(crate) fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Ok(pid) = i32::try_from(child.id()) {
        if unsafe { kill(-pid, SIGKILL) } != 0 {
            tracing::debug!(pid, error = %std::io::Error::last_os_error(), "killpg failed");
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Single-value result: exit 0 is success, exit 1 is Cancel or the extra button.
pub fn str_result(opts: &Options, output: Output) -> Result<String> {
    let stdout = output.stdout.strip_suffix('\n').unwrap_or(&output.stdout);
    match output.code {
        Some(0) => Ok(stdout.to_string()),
        Some(1) => match &opts.extra_button {
            Some(extra) if extra == stdout => Err(Error::ExtraButton),
            _ => Err(Error::Canceled),
        },
        code => {
            let stderr = output.stderr.trim().to_string();
            tracing::warn!(?code, %stderr, "dialog helper failed");
            Err(Error::Helper { code, stderr })
        }
    }
}

/// Multi-value result split on [`SEPARATOR`].
pub fn list_result(opts: &Options, output: Output) -> Result<Vec<String>> {
    let joined = str_result(opts, output)?;
    if joined.is_empty() {
        return Ok(Vec::new());
    }
    Ok(joined.split(SEPARATOR).map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::testing::script_helper;
    use std::time::{Duration, Instant};

    fn output(code: Option<i32>, stdout: &str) -> Output {
        Output { code, stdout: stdout.into(), stderr: String::new() }
    }

    #[test]
    fn test_str_result_ok_trims_one_newline() {
        let result = str_result(&Options::new(), output(Some(0), "/tmp/a.txt\n"));
        assert_eq!(result.unwrap(), "/tmp/a.txt");
        let result = str_result(&Options::new(), output(Some(0), "line\n\n"));
        assert_eq!(result.unwrap(), "line\n");
    }

    #[test]
    fn test_str_result_cancel_and_extra() {
        let opts = Options::new().extra_button("Later");
        assert!(matches!(str_result(&opts, output(Some(1), "Later\n")), Err(Error::ExtraButton)));
        assert!(matches!(str_result(&opts, output(Some(1), "")), Err(Error::Canceled)));
        assert!(matches!(str_result(&Options::new(), output(Some(1), "Later\n")), Err(Error::Canceled)));
    }

    #[test]
    fn test_str_result_unexpected_status() {
        let out = Output { code: Some(255), stdout: String::new(), stderr: "no display\n".into() };
        match str_result(&Options::new(), out) {
            Err(Error::Helper { code, stderr }) => {
                assert_eq!(code, Some(255));
                assert_eq!(stderr, "no display");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(str_result(&Options::new(), output(None, "")), Err(Error::Helper { code: None, .. })));
    }

    #[test]
    fn test_list_result() {
        let out = output(Some(0), "/a\x1e/b c\x1e/d\n");
        assert_eq!(list_result(&Options::new(), out).unwrap(), ["/a", "/b c", "/d"]);
        assert!(list_result(&Options::new(), output(Some(0), "\n")).unwrap().is_empty());
    }

    #[test]
    fn test_run_passes_args_and_collects_output() {
        let dir = tempfile::tempdir().unwrap();
        let helper = script_helper(dir.path(), "printf '%s|' \"$@\"\necho oops >&2\nexit 3\n");
        let out = helper.run(&["--info".into(), "--text".into(), "a b".into()], None).unwrap();
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout, "--info|--text|a b|");
        assert_eq!(out.stderr, "oops\n");
    }

    #[test]
    fn test_run_kills_on_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let helper = script_helper(dir.path(), "exec sleep 30\n");
        let token = CancelToken::with_timeout(Duration::from_millis(100));
        let started = Instant::now();
        let err = helper.run(&[], Some(&token)).unwrap_err();
        assert!(err.is_timeout());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_run_kills_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let helper = script_helper(dir.path(), "exec sleep 30\n");
        let token = CancelToken::new();
        let canceler = token.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            canceler.cancel();
        });
        assert!(matches!(helper.run(&[], Some(&token)), Err(Error::ContextCanceled)));
        handle.join().unwrap();
    }

    #[test]
    fn test_run_deadline_does_not_wait_for_grandchild() {
        let dir = tempfile::tempdir().unwrap();
        let helper = script_helper(dir.path(), "sleep 30\n");
        let token = CancelToken::with_timeout(Duration::from_millis(100));
        let started = Instant::now();
        let err = helper.run(&[], Some(&token)).unwrap_err();
        assert!(err.is_timeout());
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_run_cancel_with_detached_grandchild() {
        // A job in a session of its own survives the group kill and keeps stdout open.
        let dir = tempfile::tempdir().unwrap();
        let body = "if command -v setsid >/dev/null; then setsid sleep 5 & else sleep 5 & fi\nwait\n";
        let helper = script_helper(dir.path(), body);
        let token = CancelToken::new();
        let canceler = token.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            canceler.cancel();
        });
        let started = Instant::now();
        assert!(matches!(helper.run(&[], Some(&token)), Err(Error::ContextCanceled)));
        assert!(started.elapsed() < Duration::from_secs(3));
        handle.join().unwrap();
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let helper = Helper::new("/nonexistent/zenity");
        assert!(matches!(helper.run(&[], None), Err(Error::Io(_))));
    }
}
