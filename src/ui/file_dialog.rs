use std::ffi::c_void;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::file::split_dir_and_name;
use crate::message::native::IDCANCEL;
use crate::options::Options;
use crate::types::*;
use crate::utils::{from_wide_ptr, path_to_wstring, to_wstring};

use super::framework::{ComScope, DpiScope};
use super::hook::DialogHook;
use super::owner_window;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Open,
    Multiple,
    Save,
}

/// Owned COM interface pointer, released on drop.
struct ComPtr(*mut c_void);

impl ComPtr {
    fn as_raw(&self) -> *mut c_void {
        self.0
    }

    /// # Safety
    /// `V` must be the vtable layout of the interface this pointer holds.
    unsafe fn vtbl<V>(&self) -> &V {
        unsafe { &**(self.0 as *mut *const V) }
    }
}

impl Drop for ComPtr {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe { (self.vtbl::<IUnknownVtbl>().release)(self.0) };
        }
    }
}

fn check(hr: HRESULT, operation: &'static str) -> Result<()> {
    if hr < 0 {
        Err(Error::Com { operation, hresult: hr })
    } else {
        Ok(())
    }
}

/// FILEOPENDIALOGOPTIONS for `mode`, starting from the dialog's defaults.
fn dialog_options(mode: Mode, opts: &Options, current: u32) -> u32 {
    let mut flags = (current & !FOS_OVERWRITEPROMPT) | FOS_FORCEFILESYSTEM | FOS_NOCHANGEDIR | FOS_PATHMUSTEXIST;
    match mode {
        Mode::Open => flags |= FOS_FILEMUSTEXIST,
        Mode::Multiple => flags |= FOS_FILEMUSTEXIST | FOS_ALLOWMULTISELECT,
        Mode::Save if opts.confirm_overwrite => flags |= FOS_OVERWRITEPROMPT,
        Mode::Save => {}
    }
    if opts.directory && mode != Mode::Save {
        flags = (flags & !FOS_FILEMUSTEXIST) | FOS_PICKFOLDERS;
    }
    if opts.show_hidden {
        flags |= FOS_FORCESHOWHIDDEN;
    }
    flags
}

/// Shows the common item dialog and returns the chosen paths.
pub fn pick(mode: Mode, opts: &Options) -> Result<Vec<PathBuf>> {
    let _com = ComScope::enter()?;
    let _dpi = DpiScope::enter();
    unsafe { run_dialog_internal(mode, opts) }
}

unsafe fn run_dialog_internal(mode: Mode, opts: &Options) -> Result<Vec<PathBuf>> { unsafe {
    let (clsid, iid) = match mode {
        Mode::Save => (&CLSID_FileSaveDialog, &IID_IFileSaveDialog),
        Mode::Open | Mode::Multiple => (&CLSID_FileOpenDialog, &IID_IFileOpenDialog),
    };
    let mut p_dialog: *mut c_void = std::ptr::null_mut();
    check(
        CoCreateInstance(clsid, std::ptr::null_mut(), CLSCTX_INPROC_SERVER, iid, &mut p_dialog),
        "CoCreateInstance",
    )?;
    let dialog = ComPtr(p_dialog);
    let vtbl = dialog.vtbl::<IFileDialogVtbl>();

    let mut current = 0;
    check((vtbl.get_options)(p_dialog, &mut current), "IFileDialog::GetOptions")?;
    check((vtbl.set_options)(p_dialog, dialog_options(mode, opts, current)), "IFileDialog::SetOptions")?;

    if let Some(title) = &opts.title {
        let title = to_wstring(title);
        check((vtbl.set_title)(p_dialog, title.as_ptr()), "IFileDialog::SetTitle")?;
    }
    if let Some(label) = &opts.ok_label {
        let label = to_wstring(label);
        check((vtbl.set_ok_button_label)(p_dialog, label.as_ptr()), "IFileDialog::SetOkButtonLabel")?;
    }

    if !opts.directory && !opts.filters.is_empty() {
        let wide: Vec<(Vec<u16>, Vec<u16>)> = opts
            .filters
            .iter()
            .map(|filter| {
                let (name, spec) = filter.native_spec();
                (to_wstring(&name), to_wstring(&spec))
            })
            .collect();
        let specs: Vec<COMDLG_FILTERSPEC> = wide
            .iter()
            .map(|(name, spec)| COMDLG_FILTERSPEC { pszName: name.as_ptr(), pszSpec: spec.as_ptr() })
            .collect();
        check((vtbl.set_file_types)(p_dialog, specs.len() as u32, specs.as_ptr()), "IFileDialog::SetFileTypes")?;
    }

    if let Some(path) = &opts.filename {
        let (dir, name) = split_dir_and_name(path);
        if let Some(folder) = dir.as_deref().and_then(shell_item) {
            (vtbl.set_folder)(p_dialog, folder.as_raw());
        }
        if let Some(name) = name {
            let name = to_wstring(&name);
            check((vtbl.set_file_name)(p_dialog, name.as_ptr()), "IFileDialog::SetFileName")?;
        }
    }

    let labels = opts.cancel_label.iter().map(|label| (IDCANCEL, label.clone())).collect();
    let hook = DialogHook::install(labels, None, opts.cancel.as_ref())?;
    let hr = (vtbl.show)(p_dialog, owner_window(opts));
    drop(hook);

    if let Some(token) = &opts.cancel {
        token.check()?;
    }
    if hr == HRESULT_CANCELLED {
        return Err(Error::Canceled);
    }
    check(hr, "IFileDialog::Show")?;

    if mode == Mode::Multiple {
        let open_vtbl = dialog.vtbl::<IFileOpenDialogVtbl>();
        let mut p_results: *mut c_void = std::ptr::null_mut();
        check((open_vtbl.get_results)(p_dialog, &mut p_results), "IFileOpenDialog::GetResults")?;
        let results = ComPtr(p_results);
        let results_vtbl = results.vtbl::<IShellItemArrayVtbl>();

        let mut count = 0;
        check((results_vtbl.get_count)(p_results, &mut count), "IShellItemArray::GetCount")?;
        let mut paths = Vec::with_capacity(count as usize);
        for i in 0..count {
            let mut p_item: *mut c_void = std::ptr::null_mut();
            check((results_vtbl.get_item_at)(p_results, i, &mut p_item), "IShellItemArray::GetItemAt")?;
            paths.push(get_path_from_item(&ComPtr(p_item))?);
        }
        Ok(paths)
    } else {
        let mut p_item: *mut c_void = std::ptr::null_mut();
        check((vtbl.get_result)(p_dialog, &mut p_item), "IFileDialog::GetResult")?;
        Ok(vec![get_path_from_item(&ComPtr(p_item))?])
    }
}}

/// Extracts the filesystem path of an IShellItem and frees the COM string.
unsafe fn get_path_from_item(item: &ComPtr) -> Result<PathBuf> { unsafe {
    let vtbl = item.vtbl::<IShellItemVtbl>();
    let mut name_ptr: PCWSTR = std::ptr::null();
    check((vtbl.get_display_name)(item.as_raw(), SIGDN_FILESYSPATH, &mut name_ptr), "IShellItem::GetDisplayName")?;
    let name = from_wide_ptr(name_ptr);
    CoTaskMemFree(name_ptr as *mut c_void);
    name.map(PathBuf::from).ok_or(Error::Com { operation: "IShellItem::GetDisplayName", hresult: HRESULT_INVALID_DATA })
}}

fn shell_item(dir: &Path) -> Option<ComPtr> {
    let absolute = std::path::absolute(dir).ok()?;
    let wide = path_to_wstring(&absolute);
    let mut p_item: *mut c_void = std::ptr::null_mut();
    let hr = unsafe { SHCreateItemFromParsingName(wide.as_ptr(), std::ptr::null_mut(), &IID_IShellItem, &mut p_item) };
    if hr < 0 {
        tracing::debug!(dir = %absolute.display(), hresult = hr, "initial folder not usable");
        return None;
    }
    Some(ComPtr(p_item))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_flags() {
        let flags = dialog_options(Mode::Open, &Options::new(), 0);
        assert_ne!(flags & FOS_FORCEFILESYSTEM, 0);
        assert_ne!(flags & FOS_FILEMUSTEXIST, 0);
        assert_eq!(flags & (FOS_ALLOWMULTISELECT | FOS_PICKFOLDERS), 0);
    }

    #[test]
    fn test_directory_and_multiple() {
        let opts = Options::new().directory().show_hidden();
        let flags = dialog_options(Mode::Multiple, &opts, 0);
        assert_ne!(flags & FOS_PICKFOLDERS, 0);
        assert_ne!(flags & FOS_ALLOWMULTISELECT, 0);
        assert_ne!(flags & FOS_FORCESHOWHIDDEN, 0);
        assert_eq!(flags & FOS_FILEMUSTEXIST, 0);
    }

    #[test]
    fn test_save_overwrite_prompt_follows_option() {
        let flags = dialog_options(Mode::Save, &Options::new(), FOS_OVERWRITEPROMPT);
        assert_eq!(flags & FOS_OVERWRITEPROMPT, 0);
        let flags = dialog_options(Mode::Save, &Options::new().confirm_overwrite().directory(), 0);
        assert_ne!(flags & FOS_OVERWRITEPROMPT, 0);
        assert_eq!(flags & FOS_PICKFOLDERS, 0);
    }
}
