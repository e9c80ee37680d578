use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variable naming the helper program to run.
pub const HELPER_ENV: &str = "ZENDIALOG_HELPER";

/// Helper programs tried in order when `ZENDIALOG_HELPER` is unset.
pub const HELPER_CANDIDATES: [&str; 3] = ["zenity", "qarma", "matedialog"];

/// How often a blocked call re-checks its child process.
pub const POLL_INTERVAL: Duration = Duration::from_millis(25);

static HELPER_PATH: OnceLock<Option<PathBuf>> = OnceLock::new();

/// The resolved helper executable, looked up once per process.
pub fn helper_path() -> Option<&'static Path> {
    HELPER_PATH
        .get_or_init(|| {
            let configured = env::var_os(HELPER_ENV);
            let path_var = env::var_os("PATH");
            let found = resolve_helper(configured.as_deref(), path_var.as_deref());
            match &found {
                Some(path) => tracing::debug!(helper = %path.display(), "dialog helper resolved"),
                None => tracing::debug!("no dialog helper found"),
            }
            found
        })
        .as_deref()
}

/// Resolves the helper from an override value and a `PATH` value.
pub fn resolve_helper(configured: Option<&std::ffi::OsStr>, path_var: Option<&std::ffi::OsStr>) -> Option<PathBuf> {
    if let Some(configured) = configured.filter(|value| !value.is_empty()) {
        let configured = Path::new(configured);
        if configured.components().count() > 1 {
            return configured.is_file().then(|| configured.to_path_buf());
        }
        return find_in_path(configured, path_var);
    }
    HELPER_CANDIDATES
        .iter()
        .find_map(|name| find_in_path(Path::new(name), path_var))
}

fn find_in_path(name: &Path, path_var: Option<&std::ffi::OsStr>) -> Option<PathBuf> {
    let path_var = path_var?;
    env::split_paths(path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn make_tool(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn test_candidates_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let qarma = make_tool(dir.path(), "qarma", 0o755);
        make_tool(dir.path(), "matedialog", 0o755);

        let path_var = OsString::from(dir.path());
        assert_eq!(resolve_helper(None, Some(path_var.as_os_str())), Some(qarma));
    }

    #[test]
    fn test_skips_non_executable() {
        let dir = tempfile::tempdir().unwrap();
        make_tool(dir.path(), "zenity", 0o644);
        let path_var = OsString::from(dir.path());
        assert_eq!(resolve_helper(None, Some(path_var.as_os_str())), None);
    }

    #[test]
    fn test_override_by_name_and_path() {
        let dir = tempfile::tempdir().unwrap();
        make_tool(dir.path(), "zenity", 0o755);
        let custom = make_tool(dir.path(), "my-dialogs", 0o755);
        let path_var = OsString::from(dir.path());

        let by_name = OsString::from("my-dialogs");
        assert_eq!(resolve_helper(Some(by_name.as_os_str()), Some(path_var.as_os_str())), Some(custom.clone()));

        let by_path = custom.clone().into_os_string();
        assert_eq!(resolve_helper(Some(by_path.as_os_str()), None), Some(custom));

        let missing = dir.path().join("nope").into_os_string();
        assert_eq!(resolve_helper(Some(missing.as_os_str()), Some(path_var.as_os_str())), None);
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let zenity = make_tool(dir.path(), "zenity", 0o755);
        let path_var = OsString::from(dir.path());
        assert_eq!(resolve_helper(Some(OsString::new().as_os_str()), Some(path_var.as_os_str())), Some(zenity));
    }
}
