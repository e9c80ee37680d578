use std::io;
use std::sync::Arc;

/// Errors returned by every dialog operation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The user closed the dialog or pressed Cancel.
    #[error("dialog canceled")]
    Canceled,

    /// The user pressed the extra button.
    #[error("extra button pressed")]
    ExtraButton,

    /// The [`CancelToken`](crate::CancelToken) attached to the call was cancelled.
    #[error("context canceled")]
    ContextCanceled,

    /// The deadline of the [`CancelToken`](crate::CancelToken) passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("{operation} failed: {}", os_message(.code))]
    Os { operation: &'static str, code: i32 },

    #[error("{operation} failed: HRESULT 0x{:08X}", hresult_bits(.hresult))]
    Com { operation: &'static str, hresult: i32 },

    #[error("no dialog helper (zenity, qarma, matedialog) found on PATH")]
    HelperNotFound,

    #[error("dialog helper exited with {}: {stderr}", status_text(.code))]
    Helper { code: Option<i32>, stderr: String },

    /// A progress dialog was updated after it finished.
    #[error("dialog closed")]
    DialogClosed,

    #[error("i/o error: {0}")]
    Io(#[source] Arc<io::Error>),
}

pub type Result<T> = std::result::Result<T, Error>;

fn os_message(code: &i32) -> io::Error {
    io::Error::from_raw_os_error(*code)
}

fn hresult_bits(hresult: &i32) -> u32 {
    *hresult as u32
}

fn status_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_string(),
    }
}

impl Error {
    /// True when the call gave up because its deadline passed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::DeadlineExceeded)
    }

    /// True for both kinds of token cancellation.
    pub fn is_context_error(&self) -> bool {
        matches!(self, Error::ContextCanceled | Error::DeadlineExceeded)
    }

    /// Captures `GetLastError` for a failed Win32 call.
    #[cfg(windows)]
    pub(crate) fn last_os_error(operation: &'static str) -> Self {
        let code = io::Error::last_os_error().raw_os_error().unwrap_or(0);
        Error::Os { operation, code }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_classification() {
        assert!(Error::DeadlineExceeded.is_timeout());
        assert!(!Error::ContextCanceled.is_timeout());
        assert!(Error::ContextCanceled.is_context_error());
        assert!(!Error::Canceled.is_context_error());
    }

    #[test]
    fn test_helper_display() {
        let err = Error::Helper { code: Some(255), stderr: "boom".into() };
        assert_eq!(err.to_string(), "dialog helper exited with exit code 255: boom");

        let err = Error::Helper { code: None, stderr: String::new() };
        assert!(err.to_string().contains("a signal"));
    }

    #[test]
    fn test_com_display_is_hex() {
        let err = Error::Com { operation: "CoCreateInstance", hresult: 0x800704C7u32 as i32 };
        assert_eq!(err.to_string(), "CoCreateInstance failed: HRESULT 0x800704C7");
    }

    #[test]
    fn test_io_conversion() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("missing"));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "missing");
    }
}
