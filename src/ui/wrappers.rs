use windows_sys::Win32::Foundation::HWND;
use windows_sys::Win32::UI::WindowsAndMessaging::{SendMessageW, SetWindowTextW};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{EnableWindow, SetFocus};
use windows_sys::Win32::UI::Controls::{PBM_SETMARQUEE, PBM_SETPOS, PBM_SETRANGE32};

/// Safe wrapper for push buttons.
#[derive(Clone, Copy)]
pub struct Button { hwnd: HWND }
impl Button {
    pub fn new(hwnd: HWND) -> Self { Self { hwnd } }

    pub fn set_enabled(&self, enabled: bool) {
        unsafe { EnableWindow(self.hwnd, if enabled { 1 } else { 0 }); }
    }

    pub fn focus(&self) {
        unsafe { SetFocus(self.hwnd); }
    }
}

/// Safe wrapper for Static/Label controls
#[derive(Clone, Copy)]
pub struct Label { hwnd: HWND }
impl Label {
    pub fn new(hwnd: HWND) -> Self { Self { hwnd } }

    /// `text` must be null-terminated.
    pub fn set_text_w(&self, text: &[u16]) {
        unsafe { SetWindowTextW(self.hwnd, text.as_ptr()); }
    }
}

/// Safe wrapper for ProgressBar controls
#[derive(Clone, Copy)]
pub struct ProgressBar { hwnd: HWND }
impl ProgressBar {
    pub fn new(hwnd: HWND) -> Self { Self { hwnd } }

    pub fn hwnd(&self) -> HWND { self.hwnd }

    pub fn set_range(&self, min: i32, max: i32) {
        unsafe { SendMessageW(self.hwnd, PBM_SETRANGE32, min as usize, max as isize); }
    }

    pub fn set_pos(&self, pos: i32) {
        unsafe { SendMessageW(self.hwnd, PBM_SETPOS, pos as usize, 0); }
    }

    /// Starts or stops the marquee animation of a `PBS_MARQUEE` bar.
    pub fn set_marquee(&self, on: bool) {
        unsafe { SendMessageW(self.hwnd, PBM_SETMARQUEE, on as usize, 30); }
    }
}
