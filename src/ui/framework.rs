#![allow(unsafe_op_in_unsafe_fn)]
use std::ffi::c_void;
use windows_sys::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM, RECT};
use windows_sys::Win32::System::LibraryLoader::{GetModuleHandleW, GetProcAddress};
use windows_sys::Win32::Graphics::Gdi::{HBRUSH, COLOR_BTNFACE};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, GetWindowLongPtrW, LoadCursorW, RegisterClassW, SetWindowLongPtrW,
    CS_HREDRAW, CS_VREDRAW, GWLP_USERDATA, IDC_ARROW, WM_CREATE, WM_NCCREATE, WNDCLASSW,
    CREATESTRUCTW, GetWindowRect, GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN,
    WM_CLOSE, WM_DESTROY, DestroyWindow, PostQuitMessage,
    MSG, GetMessageW, TranslateMessage, DispatchMessageW, IsDialogMessageW,
};

use crate::error::{Error, Result};
use crate::types::*;
use crate::utils::to_wstring;

/// Defines how the window should be positioned.
pub enum WindowAlignment {
    CenterOnParent,
    CenterOnScreen,
}

/// Trait to encapsulate window logic.
/// Implement this for the state struct that drives the window.
pub trait WindowHandler: Sized {
    /// Called when the window receives WM_CREATE.
    /// Return 0 to continue creation, -1 to abort.
    fn on_create(&mut self, _hwnd: HWND) -> LRESULT {
        0
    }

    /// Main message handler.
    /// Return Some(result) if you handled the message, None for default behavior.
    fn on_message(&mut self, hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> Option<LRESULT>;
}

/// Builder for creating windows.
pub struct WindowBuilder<'a, T: WindowHandler> {
    state: &'a mut T,
    class_name: String,
    title: String,
    style: u32,
    ex_style: u32,
    width: i32,
    height: i32,
    alignment: WindowAlignment,
}

impl<'a, T: WindowHandler> WindowBuilder<'a, T> {
    pub fn new(state: &'a mut T, class_name: &str, title: &str) -> Self {
        Self {
            state,
            class_name: class_name.to_string(),
            title: title.to_string(),
            style: WS_POPUP | WS_CAPTION | WS_SYSMENU | WS_VISIBLE,
            ex_style: WS_EX_DLGMODALFRAME,
            width: 400,
            height: 160,
            alignment: WindowAlignment::CenterOnScreen,
        }
    }

    pub fn size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn align(mut self, alignment: WindowAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Builds and creates the window.
    ///
    /// # Safety
    /// `state` must outlive the window; it is reached through `GWLP_USERDATA`.
    pub unsafe fn build(self, parent: HWND) -> Result<HWND> {
        let (x, y) = match self.alignment {
            WindowAlignment::CenterOnParent if !parent.is_null() => {
                let mut rect: RECT = std::mem::zeroed();
                GetWindowRect(parent, &mut rect);
                let p_width = rect.right - rect.left;
                let p_height = rect.bottom - rect.top;
                (rect.left + (p_width - self.width) / 2, rect.top + (p_height - self.height) / 2)
            }
            _ => {
                let screen_w = GetSystemMetrics(SM_CXSCREEN);
                let screen_h = GetSystemMetrics(SM_CYSCREEN);
                ((screen_w - self.width) / 2, (screen_h - self.height) / 2)
            }
        };

        let background = (COLOR_BTNFACE as usize + 1) as HBRUSH;

        create_window::<T>(
            self.state,
            &self.class_name,
            &self.title,
            self.style,
            self.ex_style,
            x, y, self.width, self.height,
            parent,
            background,
        )
    }
}

#[allow(clippy::too_many_arguments)]
unsafe fn create_window<T: WindowHandler>(
    state: &mut T,
    class_name: &str,
    title: &str,
    style: u32,
    ex_style: u32,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    parent: HWND,
    background: HBRUSH,
) -> Result<HWND> {
    let instance = GetModuleHandleW(std::ptr::null());
    let class_name_w = to_wstring(class_name);
    let title_w = to_wstring(title);

    let wc = WNDCLASSW {
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wnd_proc::<T>),
        hInstance: instance,
        hCursor: LoadCursorW(std::ptr::null_mut(), IDC_ARROW),
        hIcon: std::ptr::null_mut(),
        lpszClassName: class_name_w.as_ptr(),
        hbrBackground: background,
        cbClsExtra: 0,
        cbWndExtra: 0,
        lpszMenuName: std::ptr::null(),
    };

    // Registration fails harmlessly when the class already exists.
    RegisterClassW(&wc);

    let hwnd = CreateWindowExW(
        ex_style,
        class_name_w.as_ptr(),
        title_w.as_ptr(),
        style,
        x, y, width, height,
        parent,
        std::ptr::null_mut(),
        instance,
        state as *mut T as *mut c_void,
    );

    if hwnd.is_null() {
        Err(Error::last_os_error("CreateWindowExW"))
    } else {
        Ok(hwnd)
    }
}

/// Generic Static Window Procedure.
unsafe extern "system" fn wnd_proc<T: WindowHandler>(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_NCCREATE {
        let createstruct = &*(lparam as *const CREATESTRUCTW);
        let state_ptr = createstruct.lpCreateParams as *mut T;
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, state_ptr as isize);
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }

    let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut T;

    if !ptr.is_null() {
        let state = &mut *ptr;
        if msg == WM_CREATE {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| state.on_create(hwnd)));
            return match result {
                Ok(-1) => -1,
                Ok(_) => 0,
                Err(_) => {
                    tracing::error!("panic in on_create");
                    -1
                }
            };
        }

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            state.on_message(hwnd, msg, wparam, lparam)
        }));
        match result {
            Ok(Some(r)) => return r,
            Ok(None) => {
                if msg == WM_CLOSE {
                    DestroyWindow(hwnd);
                    return 0;
                }
                if msg == WM_DESTROY {
                    // Ends the window's message loop.
                    SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                    PostQuitMessage(0);
                    return 0;
                }
            }
            Err(_) => {
                tracing::error!(msg, "panic in on_message");
            }
        }
    }

    DefWindowProcW(hwnd, msg, wparam, lparam)
}

/// Runs the standard Windows message loop until WM_QUIT.
pub unsafe fn run_message_loop(hwnd: HWND) -> Result<()> {
    let mut msg: MSG = std::mem::zeroed();
    loop {
        match GetMessageW(&mut msg, std::ptr::null_mut(), 0, 0) {
            -1 => return Err(Error::last_os_error("GetMessageW")),
            0 => return Ok(()),
            _ => {
                if IsDialogMessageW(hwnd, &msg) == 0 {
                    TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }
        }
    }
}

/// Per-monitor DPI awareness for the current thread, restored on drop.
/// A no-op before Windows 10 1607, where the API is missing.
pub struct DpiScope {
    previous: Option<isize>,
}

type SetThreadDpiAwarenessContextFn = unsafe extern "system" fn(isize) -> isize;

fn set_thread_dpi_awareness() -> Option<SetThreadDpiAwarenessContextFn> {
    unsafe {
        let user32 = GetModuleHandleW(to_wstring("user32.dll").as_ptr());
        if user32.is_null() {
            return None;
        }
        let proc = GetProcAddress(user32, c"SetThreadDpiAwarenessContext".as_ptr().cast())?;
        Some(std::mem::transmute::<unsafe extern "system" fn() -> isize, SetThreadDpiAwarenessContextFn>(proc))
    }
}

impl DpiScope {
    pub fn enter() -> Self {
        let previous = set_thread_dpi_awareness()
            .map(|set| unsafe { set(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) })
            .filter(|&prev| prev != 0);
        Self { previous }
    }
}

impl Drop for DpiScope {
    fn drop(&mut self) {
        if let (Some(previous), Some(set)) = (self.previous, set_thread_dpi_awareness()) {
            unsafe { set(previous) };
        }
    }
}

/// COM apartment for the current thread; balanced with CoUninitialize on drop.
pub struct ComScope {
    initialized: bool,
}

impl ComScope {
    pub fn enter() -> Result<Self> {
        let hr = unsafe { CoInitializeEx(std::ptr::null_mut(), COINIT_APARTMENTTHREADED | COINIT_DISABLE_OLE1DDE) };
        match hr {
            S_OK | S_FALSE => Ok(Self { initialized: true }),
            // The caller already runs an MTA; the dialogs work there too.
            RPC_E_CHANGED_MODE => Ok(Self { initialized: false }),
            hr => Err(Error::Com { operation: "CoInitializeEx", hresult: hr }),
        }
    }
}

impl Drop for ComScope {
    fn drop(&mut self) {
        if self.initialized {
            unsafe { CoUninitialize() };
        }
    }
}
