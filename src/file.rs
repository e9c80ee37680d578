use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::options::Options;

/// A named group of glob patterns shown in file pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub name: String,
    pub patterns: Vec<String>,
    /// Match the patterns case-insensitively on backends that are case sensitive.
    pub case_fold: bool,
}

impl FileFilter {
    pub fn new<I, S>(name: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            case_fold: false,
        }
    }

    pub fn case_fold(mut self) -> Self {
        self.case_fold = true;
        self
    }

    /// Patterns with letters expanded to `[xX]` classes when `case_fold` is set.
    pub fn effective_patterns(&self) -> Vec<String> {
        if self.case_fold {
            self.patterns.iter().map(|p| fold_pattern(p)).collect()
        } else {
            self.patterns.clone()
        }
    }

    /// `"name | p1 p2"` form understood by the helper's `--file-filter`.
    #[cfg_attr(windows, allow(dead_code))]
    pub(crate) fn helper_spec(&self) -> String {
        let patterns = self.effective_patterns().join(" ");
        if self.name.is_empty() {
            patterns
        } else {
            format!("{} | {}", self.name, patterns)
        }
    }

    /// `(display name, "p1;p2")` pair used by the native picker.
    #[cfg_attr(not(windows), allow(dead_code))]
    pub(crate) fn native_spec(&self) -> (String, String) {
        let spec = self.patterns.join(";");
        let name = if self.name.is_empty() { spec.clone() } else { self.name.clone() };
        (name, spec)
    }
}

/// Rewrites letters outside bracket expressions as `[lL]` classes.
fn fold_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 4);
    let mut in_class = false;
    let mut escaped = false;
    for ch in pattern.chars() {
        if escaped {
            out.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => {
                escaped = true;
                out.push(ch);
            }
            '[' if !in_class => {
                in_class = true;
                out.push(ch);
            }
            ']' if in_class => {
                in_class = false;
                out.push(ch);
            }
            c if !in_class && c.is_alphabetic() && c.to_lowercase().ne(c.to_uppercase()) => {
                out.push('[');
                out.extend(c.to_lowercase());
                out.extend(c.to_uppercase());
                out.push(']');
            }
            c => out.push(c),
        }
    }
    out
}

/// Splits the `filename` option into an initial folder and a file name.
/// A trailing separator means the whole path is the folder.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn split_dir_and_name(path: &Path) -> (Option<PathBuf>, Option<String>) {
    let raw = path.to_string_lossy();
    if raw.is_empty() {
        return (None, None);
    }
    if raw.ends_with('/') || raw.ends_with(std::path::MAIN_SEPARATOR) {
        return (Some(path.to_path_buf()), None);
    }
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf);
    let name = path.file_name().map(|name| name.to_string_lossy().into_owned());
    (dir, name)
}

/// Shows a picker for one existing file (or directory with `Options::directory`).
pub fn select_file(opts: &Options) -> Result<PathBuf> {
    opts.check_cancel()?;
    tracing::debug!(directory = opts.directory, "showing file picker");
    crate::backend::select_file(opts)
}

/// Shows a picker that accepts several files or directories.
pub fn select_file_multiple(opts: &Options) -> Result<Vec<PathBuf>> {
    opts.check_cancel()?;
    tracing::debug!(directory = opts.directory, "showing multi-select file picker");
    crate::backend::select_file_multiple(opts)
}

/// Shows a save picker; the returned path need not exist.
pub fn select_file_save(opts: &Options) -> Result<PathBuf> {
    opts.check_cancel()?;
    tracing::debug!(confirm_overwrite = opts.confirm_overwrite, "showing save picker");
    crate::backend::select_file_save(opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_pattern() {
        assert_eq!(fold_pattern("*.png"), "*.[pP][nN][gG]");
        assert_eq!(fold_pattern("img_[0-9].jpg"), "[iI][mM][gG]_[0-9].[jJ][pP][gG]");
        assert_eq!(fold_pattern("\\*a"), "\\*[aA]");
    }

    #[test]
    fn test_helper_spec() {
        let filter = FileFilter::new("Images", ["*.png", "*.gif"]);
        assert_eq!(filter.helper_spec(), "Images | *.png *.gif");

        let unnamed = FileFilter::new("", ["*.txt"]).case_fold();
        assert_eq!(unnamed.helper_spec(), "*.[tT][xX][tT]");
    }

    #[test]
    fn test_native_spec() {
        let filter = FileFilter::new("Images", ["*.png", "*.gif"]);
        assert_eq!(filter.native_spec(), ("Images".to_string(), "*.png;*.gif".to_string()));

        let unnamed = FileFilter::new("", ["*.txt"]);
        assert_eq!(unnamed.native_spec(), ("*.txt".to_string(), "*.txt".to_string()));
    }

    #[test]
    fn test_split_dir_and_name() {
        assert_eq!(split_dir_and_name(Path::new("")), (None, None));
        assert_eq!(split_dir_and_name(Path::new("/tmp/")), (Some(PathBuf::from("/tmp/")), None));
        assert_eq!(
            split_dir_and_name(Path::new("/tmp/report.txt")),
            (Some(PathBuf::from("/tmp")), Some("report.txt".to_string()))
        );
        assert_eq!(split_dir_and_name(Path::new("report.txt")), (None, Some("report.txt".to_string())));
    }
}
