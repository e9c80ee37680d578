use std::path::PathBuf;
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::file::FileFilter;

/// Icon shown inside a dialog, or on its window frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogIcon {
    Error,
    Warning,
    Info,
    Question,
    Password,
    /// Explicitly suppress the icon a dialog kind would otherwise show.
    NoIcon,
    /// Image file on disk.
    Custom(PathBuf),
}

/// Native handle of a parent window: an X11 window id for the helper
/// backend, an `HWND` value on Windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub isize);

impl From<isize> for WindowId {
    fn from(raw: isize) -> Self {
        WindowId(raw)
    }
}

/// Per-call dialog configuration.
///
/// ```no_run
/// use zendialog::{DialogIcon, Options};
///
/// let opts = Options::new()
///     .title("Question")
///     .ok_label("Yes")
///     .cancel_label("No")
///     .icon(DialogIcon::Question);
/// zendialog::question("Are you sure you want to proceed?", &opts)?;
/// # Ok::<(), zendialog::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(windows, allow(dead_code))]
pub struct Options {
    pub(crate) title: Option<String>,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) ok_label: Option<String>,
    pub(crate) cancel_label: Option<String>,
    pub(crate) extra_button: Option<String>,
    pub(crate) default_cancel: bool,
    pub(crate) icon: Option<DialogIcon>,
    pub(crate) window_icon: Option<DialogIcon>,
    pub(crate) attach: Option<WindowId>,
    pub(crate) modal: bool,
    pub(crate) display: Option<String>,
    pub(crate) class: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) no_wrap: bool,
    pub(crate) ellipsize: bool,

    // Progress
    pub(crate) max_value: i32,
    pub(crate) no_cancel: bool,
    pub(crate) time_remaining: bool,

    // File selection
    pub(crate) directory: bool,
    pub(crate) confirm_overwrite: bool,
    pub(crate) show_hidden: bool,
    pub(crate) filename: Option<PathBuf>,
    pub(crate) filters: Vec<FileFilter>,

    pub(crate) cancel: Option<CancelToken>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn ok_label(mut self, label: impl Into<String>) -> Self {
        self.ok_label = Some(label.into());
        self
    }

    pub fn cancel_label(mut self, label: impl Into<String>) -> Self {
        self.cancel_label = Some(label.into());
        self
    }

    /// Adds a third button. Pressing it makes the call return
    /// [`Error::ExtraButton`](crate::Error::ExtraButton).
    pub fn extra_button(mut self, label: impl Into<String>) -> Self {
        self.extra_button = Some(label.into());
        self
    }

    /// Question dialogs focus Cancel instead of OK.
    pub fn default_cancel(mut self) -> Self {
        self.default_cancel = true;
        self
    }

    pub fn icon(mut self, icon: DialogIcon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn window_icon(mut self, icon: DialogIcon) -> Self {
        self.window_icon = Some(icon);
        self
    }

    pub fn attach(mut self, parent: impl Into<WindowId>) -> Self {
        self.attach = Some(parent.into());
        self
    }

    pub fn modal(mut self) -> Self {
        self.modal = true;
        self
    }

    pub fn display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn no_wrap(mut self) -> Self {
        self.no_wrap = true;
        self
    }

    pub fn ellipsize(mut self) -> Self {
        self.ellipsize = true;
        self
    }

    /// Maximum progress value. 0 means 100, a negative value a pulsating bar.
    pub fn max_value(mut self, max: i32) -> Self {
        self.max_value = max;
        self
    }

    pub fn pulsate(self) -> Self {
        self.max_value(-1)
    }

    pub fn no_cancel(mut self) -> Self {
        self.no_cancel = true;
        self
    }

    pub fn time_remaining(mut self) -> Self {
        self.time_remaining = true;
        self
    }

    pub fn directory(mut self) -> Self {
        self.directory = true;
        self
    }

    pub fn confirm_overwrite(mut self) -> Self {
        self.confirm_overwrite = true;
        self
    }

    pub fn show_hidden(mut self) -> Self {
        self.show_hidden = true;
        self
    }

    /// Initial selection. A path ending in a separator names only the folder.
    pub fn filename(mut self, path: impl Into<PathBuf>) -> Self {
        self.filename = Some(path.into());
        self
    }

    pub fn file_filter(mut self, filter: FileFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn file_filters(mut self, filters: impl IntoIterator<Item = FileFilter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Gives up after `timeout`; combines with an existing token.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let token = match self.cancel.take() {
            Some(token) => token.child_with_timeout(timeout),
            None => CancelToken::with_timeout(timeout),
        };
        self.cancel = Some(token);
        self
    }

    /// Fails fast when the attached token already fired.
    pub(crate) fn check_cancel(&self) -> crate::Result<()> {
        match &self.cancel {
            Some(token) => token.check(),
            None => Ok(()),
        }
    }

    /// Effective progress maximum.
    pub(crate) fn progress_max(&self) -> i32 {
        if self.max_value == 0 { 100 } else { self.max_value }
    }
}
