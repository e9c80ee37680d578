use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use windows_sys::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows_sys::Win32::Graphics::Gdi::{GetStockObject, DEFAULT_GUI_FONT};
use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
use windows_sys::Win32::UI::Controls::{InitCommonControlsEx, ICC_PROGRESS_CLASS, INITCOMMONCONTROLSEX};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DestroyWindow, GetWindowLongPtrW, PeekMessageW, PostMessageW, SendMessageW, SetWindowLongPtrW,
    GWL_STYLE, HMENU, MSG, PM_REMOVE, WM_APP, WM_CLOSE, WM_COMMAND, WM_DESTROY, WM_SETFONT,
};

use crate::cancel::{CancelToken, WatchGuard};
use crate::error::{Error, Result};
use crate::message::native::{IDCANCEL, IDNO, IDOK};
use crate::options::Options;
use crate::progress::{Outcome, ProgressDialog};
use crate::types::*;
use crate::utils::to_wstring;

use super::framework::{run_message_loop, WindowAlignment, WindowBuilder, WindowHandler};
use super::owner_window;
use super::wrappers::{Button, Label, ProgressBar};

const CLASS_NAME: &str = "ZenDialogProgress";

// lparam carries a Box<Vec<u16>> owned by the receiver.
const WM_PROGRESS_TEXT: u32 = WM_APP + 1;
const WM_PROGRESS_VALUE: u32 = WM_APP + 2;
const WM_PROGRESS_COMPLETE: u32 = WM_APP + 3;
// wparam is 1 when the caller's cancel token fired.
const WM_PROGRESS_CLOSE: u32 = WM_APP + 4;

const ID_EXTRA: i32 = IDNO;

const DEFAULT_WIDTH: i32 = 400;
const DEFAULT_HEIGHT: i32 = 150;
const MARGIN: i32 = 12;
const BUTTON_W: i32 = 88;
const BUTTON_H: i32 = 26;

/// State of the progress window, owned by its UI thread.
struct ProgressWindow {
    opts: Options,
    max: i32,
    label: Option<Label>,
    bar: Option<ProgressBar>,
    ok: Option<Button>,
    cancel: Option<Button>,
    completed: bool,
    result: Option<Result<()>>,
}

impl ProgressWindow {
    fn new(opts: Options) -> Self {
        let max = opts.progress_max();
        Self { opts, max, label: None, bar: None, ok: None, cancel: None, completed: false, result: None }
    }

    fn size(&self) -> (i32, i32) {
        let width = if self.opts.width > 0 { self.opts.width as i32 } else { DEFAULT_WIDTH };
        let height = if self.opts.height > 0 { self.opts.height as i32 } else { DEFAULT_HEIGHT };
        (width, height)
    }

    fn finish(&mut self, hwnd: HWND, result: Result<()>) {
        if self.result.is_none() {
            self.result = Some(result);
        }
        unsafe { DestroyWindow(hwnd) };
    }

    fn complete(&mut self) {
        self.completed = true;
        if let Some(bar) = self.bar {
            if self.max < 0 {
                bar.set_marquee(false);
                unsafe {
                    let style = GetWindowLongPtrW(bar.hwnd(), GWL_STYLE);
                    SetWindowLongPtrW(bar.hwnd(), GWL_STYLE, style & !(PBS_MARQUEE as isize));
                }
                bar.set_range(0, 1);
                bar.set_pos(1);
            } else {
                bar.set_pos(self.max);
            }
        }
        if let Some(cancel) = self.cancel {
            cancel.set_enabled(false);
        }
        if let Some(ok) = self.ok {
            ok.set_enabled(true);
            ok.focus();
        }
    }
}

/// Frees text updates that were queued for `hwnd` (or for the thread, when
/// null) but will never be dispatched. Returns how many were dropped.
fn free_pending_text(hwnd: HWND) -> usize {
    let mut freed = 0;
    unsafe {
        let mut msg: MSG = std::mem::zeroed();
        while PeekMessageW(&mut msg, hwnd, WM_PROGRESS_TEXT, WM_PROGRESS_TEXT, PM_REMOVE) != 0 {
            drop(Box::from_raw(msg.lParam as *mut Vec<u16>));
            freed += 1;
        }
    }
    freed
}

unsafe fn create_child(parent: HWND, class: &str, text: &str, style: u32, id: i32, rect: (i32, i32, i32, i32)) -> HWND {
    let class_w = to_wstring(class);
    let text_w = to_wstring(text);
    let (x, y, w, h) = rect;
    unsafe {
        let hwnd = CreateWindowExW(
            0,
            class_w.as_ptr(),
            text_w.as_ptr(),
            WS_CHILD | WS_VISIBLE | style,
            x, y, w, h,
            parent,
            id as isize as HMENU,
            GetModuleHandleW(std::ptr::null()),
            std::ptr::null(),
        );
        let font = GetStockObject(DEFAULT_GUI_FONT);
        SendMessageW(hwnd, WM_SETFONT, font as usize, 1);
        hwnd
    }
}

impl WindowHandler for ProgressWindow {
    fn on_create(&mut self, hwnd: HWND) -> LRESULT {
        let (width, height) = self.size();
        // Client area is slightly smaller than the frame.
        let inner_w = width - 2 * MARGIN - 16;
        let bottom = height - 40 - MARGIN - BUTTON_H;

        let label_style = if self.opts.no_wrap { SS_LEFTNOWORDWRAP } else { SS_LEFT }
            | if self.opts.ellipsize { SS_ENDELLIPSIS } else { 0 };
        let bar_style = PBS_SMOOTH | if self.max < 0 { PBS_MARQUEE } else { 0 };

        unsafe {
            self.label = Some(Label::new(create_child(hwnd, "STATIC", "", label_style, -1, (MARGIN, MARGIN, inner_w, 36))));
            let bar = ProgressBar::new(create_child(hwnd, "msctls_progress32", "", bar_style, -1, (MARGIN, MARGIN + 42, inner_w, 18)));
            if self.max < 0 {
                bar.set_marquee(true);
            } else {
                bar.set_range(0, self.max);
            }
            self.bar = Some(bar);

            let mut buttons: Vec<(i32, String)> = Vec::new();
            if let Some(extra) = &self.opts.extra_button {
                buttons.push((ID_EXTRA, extra.clone()));
            }
            buttons.push((IDOK, self.opts.ok_label.clone().unwrap_or_else(|| "OK".into())));
            if !self.opts.no_cancel {
                buttons.push((IDCANCEL, self.opts.cancel_label.clone().unwrap_or_else(|| "Cancel".into())));
            }

            let mut x = MARGIN + inner_w - BUTTON_W;
            for (id, text) in buttons.iter().rev() {
                let style = WS_TABSTOP | if *id == IDOK { BS_DEFPUSHBUTTON | WS_DISABLED } else { BS_PUSHBUTTON };
                let button = Button::new(create_child(hwnd, "BUTTON", text, style, *id, (x, bottom, BUTTON_W, BUTTON_H)));
                match *id {
                    IDOK => self.ok = Some(button),
                    IDCANCEL => self.cancel = Some(button),
                    _ => {}
                }
                x -= BUTTON_W + 8;
            }
        }
        0
    }

    fn on_message(&mut self, hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> Option<LRESULT> {
        match msg {
            WM_PROGRESS_TEXT => {
                let text = unsafe { Box::from_raw(lparam as *mut Vec<u16>) };
                if let Some(label) = self.label {
                    label.set_text_w(&text);
                }
                Some(0)
            }
            WM_PROGRESS_VALUE => {
                if let Some(bar) = self.bar {
                    bar.set_pos(wparam as i32);
                }
                Some(0)
            }
            WM_PROGRESS_COMPLETE => {
                self.complete();
                Some(0)
            }
            WM_PROGRESS_CLOSE => {
                let result = match self.opts.cancel.as_ref().and_then(CancelToken::error) {
                    Some(err) if wparam == 1 => Err(err),
                    _ => Ok(()),
                };
                self.finish(hwnd, result);
                Some(0)
            }
            WM_COMMAND => {
                match (wparam & 0xFFFF) as i32 {
                    IDOK if self.completed => self.finish(hwnd, Ok(())),
                    ID_EXTRA => self.finish(hwnd, Err(Error::ExtraButton)),
                    // Escape arrives as IDCANCEL even without a Cancel button.
                    IDCANCEL if self.cancel.is_some() => self.finish(hwnd, Err(Error::Canceled)),
                    _ => {}
                }
                Some(0)
            }
            WM_CLOSE => {
                self.finish(hwnd, Err(Error::Canceled));
                Some(0)
            }
            WM_DESTROY => {
                free_pending_text(hwnd);
                None
            }
            _ => None,
        }
    }
}

/// Progress window running its own message loop on a dedicated thread.
pub struct NativeProgress {
    hwnd: isize,
    max: i32,
    outcome: Arc<Outcome>,
    thread: Mutex<Option<JoinHandle<()>>>,
    watch: Mutex<Option<WatchGuard>>,
}

impl NativeProgress {
    pub fn spawn(opts: &Options) -> Result<Self> {
        let outcome = Arc::new(Outcome::default());
        let (tx, rx) = mpsc::channel::<Result<isize>>();

        let thread = {
            let outcome = Arc::clone(&outcome);
            let opts = opts.clone();
            let owner = owner_window(&opts) as isize;
            std::thread::spawn(move || {
                let icc = INITCOMMONCONTROLSEX {
                    dwSize: std::mem::size_of::<INITCOMMONCONTROLSEX>() as u32,
                    dwICC: ICC_PROGRESS_CLASS,
                };
                unsafe { InitCommonControlsEx(&icc) };

                let title = opts.title.clone().unwrap_or_default();
                let mut window = ProgressWindow::new(opts);
                let (width, height) = window.size();
                let align = if owner != 0 { WindowAlignment::CenterOnParent } else { WindowAlignment::CenterOnScreen };
                let built = unsafe {
                    WindowBuilder::new(&mut window, CLASS_NAME, &title)
                        .size(width, height)
                        .align(align)
                        .build(owner as HWND)
                };
                let hwnd = match built {
                    Ok(hwnd) => hwnd,
                    Err(err) => {
                        outcome.finish(Err(err.clone()));
                        let _ = tx.send(Err(err));
                        return;
                    }
                };
                let _ = tx.send(Ok(hwnd as isize));

                let looped = unsafe { run_message_loop(hwnd) };
                let dropped = free_pending_text(std::ptr::null_mut());
                if dropped > 0 {
                    tracing::trace!(dropped, "discarded late progress text");
                }
                let result = match (window.result.take(), looped) {
                    (Some(result), _) => result,
                    (None, Err(err)) => Err(err),
                    (None, Ok(())) => Ok(()),
                };
                tracing::debug!(?result, "progress window closed");
                outcome.finish(result);
            })
        };

        let hwnd = match rx.recv() {
            Ok(Ok(hwnd)) => hwnd,
            Ok(Err(err)) => {
                let _ = thread.join();
                return Err(err);
            }
            Err(_) => {
                let _ = thread.join();
                return Err(Error::DialogClosed);
            }
        };

        let watch = opts.cancel.as_ref().map(|token| {
            token.watch(move || unsafe {
                PostMessageW(hwnd as HWND, WM_PROGRESS_CLOSE, 1, 0);
            })
        });

        Ok(Self {
            hwnd,
            max: opts.progress_max(),
            outcome,
            thread: Mutex::new(Some(thread)),
            watch: Mutex::new(watch),
        })
    }

    fn post(&self, msg: u32, wparam: WPARAM, lparam: LPARAM) -> Result<()> {
        if self.outcome.is_done() {
            return Err(self.outcome.closed_error());
        }
        if unsafe { PostMessageW(self.hwnd as HWND, msg, wparam, lparam) } == 0 {
            let err = Error::last_os_error("PostMessageW");
            return Err(if self.outcome.is_done() { self.outcome.closed_error() } else { err });
        }
        Ok(())
    }

    fn join(&self) {
        self.watch.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).take();
        let handle = self.thread.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

impl ProgressDialog for NativeProgress {
    fn text(&self, text: &str) -> Result<()> {
        let raw = Box::into_raw(Box::new(to_wstring(text)));
        let posted = self.post(WM_PROGRESS_TEXT, 0, raw as LPARAM);
        if posted.is_err() {
            drop(unsafe { Box::from_raw(raw) });
        }
        posted
    }

    fn value(&self, value: i32) -> Result<()> {
        if self.max < 0 {
            return Ok(());
        }
        self.post(WM_PROGRESS_VALUE, value.clamp(0, self.max) as usize, 0)
    }

    fn max_value(&self) -> i32 {
        self.max
    }

    fn complete(&self) -> Result<()> {
        self.post(WM_PROGRESS_COMPLETE, 0, 0)
    }

    fn close(&self) -> Result<()> {
        if !self.outcome.is_done() {
            unsafe { PostMessageW(self.hwnd as HWND, WM_PROGRESS_CLOSE, 0, 0) };
        }
        self.join();
        self.outcome.wait()
    }

    fn is_done(&self) -> bool {
        self.outcome.is_done()
    }

    fn wait(&self) -> Result<()> {
        self.outcome.wait()
    }
}

impl Drop for NativeProgress {
    fn drop(&mut self) {
        if !self.outcome.is_done() {
            unsafe { PostMessageW(self.hwnd as HWND, WM_PROGRESS_CLOSE, 0, 0) };
        }
        self.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use windows_sys::Win32::UI::WindowsAndMessaging::PM_NOREMOVE;

    #[test]
    fn test_update_then_close() {
        let dialog = NativeProgress::spawn(&Options::new().title("Copying").max_value(10)).unwrap();
        assert_eq!(dialog.max_value(), 10);
        dialog.text("Copying files").unwrap();
        dialog.value(5).unwrap();
        dialog.complete().unwrap();
        dialog.close().unwrap();
        assert!(dialog.is_done());
        assert!(matches!(dialog.value(6), Err(Error::DialogClosed)));
    }

    #[test]
    fn test_queued_text_is_freed() {
        unsafe {
            // Creates the thread's message queue.
            let mut msg: MSG = std::mem::zeroed();
            PeekMessageW(&mut msg, std::ptr::null_mut(), 0, 0, PM_NOREMOVE);
            for text in ["one", "two"] {
                let raw = Box::into_raw(Box::new(to_wstring(text)));
                assert_ne!(PostMessageW(std::ptr::null_mut(), WM_PROGRESS_TEXT, 0, raw as LPARAM), 0);
            }
            assert_eq!(free_pending_text(std::ptr::null_mut()), 2);
            assert_eq!(PeekMessageW(&mut msg, std::ptr::null_mut(), WM_PROGRESS_TEXT, WM_PROGRESS_TEXT, PM_NOREMOVE), 0);
        }
    }

    #[test]
    fn test_text_racing_close() {
        let dialog = NativeProgress::spawn(&Options::new()).unwrap();
        for i in 0..50 {
            let _ = dialog.text(&format!("step {i}"));
        }
        dialog.close().unwrap();
        assert!(matches!(dialog.text("late"), Err(Error::DialogClosed)));
    }

    #[test]
    fn test_token_closes_window() {
        let token = CancelToken::new();
        let dialog = NativeProgress::spawn(&Options::new().pulsate().cancel_token(token.clone())).unwrap();
        token.cancel();
        assert!(matches!(dialog.wait(), Err(Error::ContextCanceled)));
    }

    #[test]
    fn test_deadline_closes_window() {
        let opts = Options::new().timeout(Duration::from_millis(100));
        let dialog = NativeProgress::spawn(&opts).unwrap();
        assert!(dialog.wait().unwrap_err().is_timeout());
    }
}
