use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicIsize, Ordering};

use windows_sys::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows_sys::Win32::System::Threading::GetCurrentThreadId;
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, GetClassNameW, PostMessageW, SetDlgItemTextW, SetWindowsHookExW, UnhookWindowsHookEx,
    HCBT_ACTIVATE, HHOOK, SC_CLOSE, WH_CBT, WM_COMMAND, WM_SYSCOMMAND,
};

use crate::cancel::{CancelToken, WatchGuard};
use crate::error::{Error, Result};
use crate::types::DIALOG_CLASS;
use crate::utils::{from_wide_buf, to_wstring};

/// The first dialog window opened on this thread while the hook is installed.
#[derive(Debug, Default)]
struct DialogSlot {
    hwnd: AtomicIsize,
    close_requested: AtomicBool,
    /// Button pressed on close for dialogs whose system menu has Close disabled.
    close_button: Option<i32>,
}

impl DialogSlot {
    fn attach(&self, hwnd: HWND) -> bool {
        let attached = self
            .hwnd
            .compare_exchange(0, hwnd as isize, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if attached && self.close_requested.load(Ordering::SeqCst) {
            post_close(hwnd as isize, self.close_button);
        }
        attached
    }

    fn request_close(&self) {
        self.close_requested.store(true, Ordering::SeqCst);
        let hwnd = self.hwnd.load(Ordering::SeqCst);
        if hwnd != 0 {
            post_close(hwnd, self.close_button);
        }
    }
}

fn post_close(hwnd: isize, button: Option<i32>) {
    tracing::debug!(hwnd, ?button, "closing dialog");
    unsafe {
        PostMessageW(hwnd as HWND, WM_SYSCOMMAND, SC_CLOSE as usize, 0);
        if let Some(id) = button {
            PostMessageW(hwnd as HWND, WM_COMMAND, id as usize, 0);
        }
    }
}

struct HookState {
    hook: HHOOK,
    slot: Arc<DialogSlot>,
    labels: Vec<(i32, Vec<u16>)>,
}

thread_local! {
    static ACTIVE: RefCell<Option<HookState>> = const { RefCell::new(None) };
}

/// Watches the next system dialog created on the calling thread.
///
/// Button captions in `labels` are applied when the dialog activates, and the
/// dialog is sent `SC_CLOSE` (then a click on `close_button`) when `cancel`
/// fires. Unhooks on drop.
pub struct DialogHook {
    previous: Option<HookState>,
    watch: Option<WatchGuard>,
}

impl DialogHook {
    pub fn install(
        labels: Vec<(i32, String)>,
        close_button: Option<i32>,
        cancel: Option<&CancelToken>,
    ) -> Result<Self> {
        let hook = unsafe { SetWindowsHookExW(WH_CBT, Some(cbt_proc), std::ptr::null_mut(), GetCurrentThreadId()) };
        if hook.is_null() {
            return Err(Error::last_os_error("SetWindowsHookExW"));
        }

        let slot = Arc::new(DialogSlot { close_button, ..DialogSlot::default() });
        let state = HookState {
            hook,
            slot: Arc::clone(&slot),
            labels: labels.into_iter().map(|(id, text)| (id, to_wstring(&text))).collect(),
        };
        let previous = ACTIVE.with(|active| active.borrow_mut().replace(state));

        let watch = cancel.map(|token| token.watch(move || slot.request_close()));
        Ok(Self { previous, watch })
    }
}

impl Drop for DialogHook {
    fn drop(&mut self) {
        // Stop the watcher before the window handle goes stale.
        self.watch.take();
        let previous = self.previous.take();
        if let Some(state) = ACTIVE.with(|active| std::mem::replace(&mut *active.borrow_mut(), previous)) {
            unsafe { UnhookWindowsHookEx(state.hook) };
        }
    }
}

fn is_dialog_class(class: &str) -> bool {
    class == DIALOG_CLASS
}

unsafe extern "system" fn cbt_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code == HCBT_ACTIVATE as i32 {
        let hwnd = wparam as HWND;
        let mut buf = [0u16; 16];
        let len = unsafe { GetClassNameW(hwnd, buf.as_mut_ptr(), buf.len() as i32) };
        if len > 0 && is_dialog_class(&from_wide_buf(&buf, len as usize)) {
            let _ = ACTIVE.try_with(|active| {
                if let Ok(active) = active.try_borrow() {
                    if let Some(state) = active.as_ref() {
                        if state.slot.attach(hwnd) {
                            for (id, text) in &state.labels {
                                unsafe { SetDlgItemTextW(hwnd, *id, text.as_ptr()) };
                            }
                        }
                    }
                }
            });
        }
    }
    unsafe { CallNextHookEx(std::ptr::null_mut(), code, wparam, lparam) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialog_class_match() {
        assert!(is_dialog_class("#32770"));
        assert!(!is_dialog_class("Button"));
    }

    #[test]
    fn test_slot_attaches_once() {
        let slot = DialogSlot::default();
        assert!(slot.attach(0x10 as HWND));
        assert!(!slot.attach(0x20 as HWND));
        assert_eq!(slot.hwnd.load(Ordering::SeqCst), 0x10);
    }

    #[test]
    fn test_install_and_restore() {
        {
            let _hook = DialogHook::install(vec![(1, "Go".into())], None, None).unwrap();
            assert!(ACTIVE.with(|active| active.borrow().is_some()));
        }
        assert!(ACTIVE.with(|active| active.borrow().is_none()));
    }
}
