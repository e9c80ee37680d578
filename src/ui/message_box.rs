use windows_sys::Win32::UI::WindowsAndMessaging::MessageBoxW;

use crate::error::{Error, Result};
use crate::message::MessageKind;
use crate::message::native::{self, IDNO};
use crate::options::Options;
use crate::utils::{to_wstring, to_wstring_opt};

use super::framework::DpiScope;
use super::hook::DialogHook;
use super::owner_window;

pub fn show(kind: MessageKind, text: &str, opts: &Options) -> Result<()> {
    let _dpi = DpiScope::enter();
    let style = native::message_box_style(kind, opts);
    let text_w = to_wstring(text);
    let title_w = to_wstring_opt(opts.title.as_deref());
    let title_ptr = title_w.as_ref().map_or(std::ptr::null(), |t| t.as_ptr());

    // Yes/No boxes have Close disabled in their system menu.
    let close_button = (opts.extra_button.is_some() && kind != MessageKind::Question).then_some(IDNO);
    let hook = DialogHook::install(native::button_labels(opts), close_button, opts.cancel.as_ref())?;

    let code = unsafe { MessageBoxW(owner_window(opts), text_w.as_ptr(), title_ptr, style) };
    let failure = (code == 0).then(|| Error::last_os_error("MessageBoxW"));
    drop(hook);

    if let Some(token) = &opts.cancel {
        token.check()?;
    }
    match native::message_box_result(code) {
        Some(result) => result,
        None => Err(failure.unwrap_or(Error::Os { operation: "MessageBoxW", code: 0 })),
    }
}
