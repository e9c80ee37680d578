/* --- src/utils.rs --- */
use std::ffi::OsString;
use std::os::windows::ffi::{OsStrExt, OsStringExt};
use std::path::Path;

/// Convert a Rust string to a null-terminated UTF-16 vector.
pub fn to_wstring(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(std::iter::once(0)).collect()
}

/// [`to_wstring`] for optional captions.
pub fn to_wstring_opt(value: Option<&str>) -> Option<Vec<u16>> {
    value.map(to_wstring)
}

/// Reads a null-terminated UTF-16 string owned by someone else.
/// Unpaired surrogates survive, as they may in NTFS names.
///
/// # Safety
/// `ptr` must be null or point to a null-terminated UTF-16 buffer.
pub unsafe fn from_wide_ptr(ptr: *const u16) -> Option<OsString> {
    if ptr.is_null() {
        return None;
    }
    let len = (0..).take_while(|&i| unsafe { *ptr.offset(i) } != 0).count();
    let slice = unsafe { std::slice::from_raw_parts(ptr, len) };
    Some(OsString::from_wide(slice))
}

/// Decodes the first `len` units of a buffer filled by a `...W` API.
pub fn from_wide_buf(buf: &[u16], len: usize) -> String {
    String::from_utf16_lossy(&buf[..len.min(buf.len())])
}

/// Convert a path to a null-terminated UTF-16 vector with backslash separators.
pub fn path_to_wstring(path: &Path) -> Vec<u16> {
    path.as_os_str()
        .encode_wide()
        .map(|unit| if unit == u16::from(b'/') { u16::from(b'\\') } else { unit })
        .chain(std::iter::once(0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_wstring_terminates() {
        assert_eq!(to_wstring("Hi"), vec![72, 105, 0]);
        assert_eq!(to_wstring(""), vec![0]);
        assert!(to_wstring_opt(None).is_none());
    }

    #[test]
    fn test_round_trip_through_pointer() {
        let wide = to_wstring("Öffnen");
        let back = unsafe { from_wide_ptr(wide.as_ptr()) };
        assert_eq!(back, Some(OsString::from("Öffnen")));
        assert!(unsafe { from_wide_ptr(std::ptr::null()) }.is_none());
    }

    #[test]
    fn test_from_wide_buf_clamps() {
        let buf = to_wstring("#32770");
        assert_eq!(from_wide_buf(&buf, 6), "#32770");
        assert_eq!(from_wide_buf(&buf, 99), "#32770\0");
    }

    #[test]
    fn test_path_separators() {
        let wide = path_to_wstring(Path::new("C:/Users/me"));
        assert_eq!(String::from_utf16_lossy(&wide), "C:\\Users\\me\0");
    }

    #[test]
    fn test_unpaired_surrogate_round_trips() {
        let raw = [0x43, 0x3A, 0x2F, 0xD800, 0x41, 0];
        let name = unsafe { from_wide_ptr(raw.as_ptr()) }.unwrap();
        assert!(name.to_str().is_none());
        let wide = path_to_wstring(Path::new(&name));
        assert_eq!(wide, [0x43, 0x3A, 0x5C, 0xD800, 0x41, 0]);
    }
}
