//! Command lines for the zenity-compatible helper.

use crate::message::MessageKind;
use crate::options::{DialogIcon, Options};

/// Separates entries of a multiple selection on the helper's stdout.
pub const SEPARATOR: &str = "\x1e";

/// Window title, parent and X11 placement hints.
fn push_general(args: &mut Vec<String>, opts: &Options) {
    if let Some(title) = &opts.title {
        args.push("--title".into());
        args.push(title.clone());
    }
    if let Some(parent) = opts.attach {
        args.push("--attach".into());
        args.push(parent.0.to_string());
    }
    if opts.modal {
        args.push("--modal".into());
    }
    if let Some(display) = &opts.display {
        args.push("--display".into());
        args.push(display.clone());
    }
    if let Some(class) = &opts.class {
        args.push("--class".into());
        args.push(class.clone());
    }
    if let Some(name) = &opts.name {
        args.push("--name".into());
        args.push(name.clone());
    }
}

fn push_buttons(args: &mut Vec<String>, opts: &Options) {
    if let Some(label) = &opts.ok_label {
        args.push("--ok-label".into());
        args.push(label.clone());
    }
    if let Some(label) = &opts.cancel_label {
        args.push("--cancel-label".into());
        args.push(label.clone());
    }
    if let Some(label) = &opts.extra_button {
        args.push("--extra-button".into());
        args.push(label.clone());
    }
}

fn push_size(args: &mut Vec<String>, opts: &Options) {
    if opts.width > 0 {
        args.push("--width".into());
        args.push(opts.width.to_string());
    }
    if opts.height > 0 {
        args.push("--height".into());
        args.push(opts.height.to_string());
    }
}

fn push_icon(args: &mut Vec<String>, opts: &Options) {
    match &opts.icon {
        Some(DialogIcon::Error) => args.push("--icon-name=dialog-error".into()),
        Some(DialogIcon::Warning) => args.push("--icon-name=dialog-warning".into()),
        Some(DialogIcon::Info) => args.push("--icon-name=dialog-information".into()),
        Some(DialogIcon::Question) => args.push("--icon-name=dialog-question".into()),
        Some(DialogIcon::Password) => args.push("--icon-name=dialog-password".into()),
        Some(DialogIcon::NoIcon) => args.push("--icon-name=".into()),
        // The helper can only load image files as the frame icon.
        Some(DialogIcon::Custom(path)) if opts.window_icon.is_none() => {
            args.push("--window-icon".into());
            args.push(path.to_string_lossy().into_owned());
        }
        Some(DialogIcon::Custom(_)) | None => {}
    }
}

fn push_window_icon(args: &mut Vec<String>, opts: &Options) {
    let value = match &opts.window_icon {
        Some(DialogIcon::Error) => "error".to_string(),
        Some(DialogIcon::Warning) => "warning".to_string(),
        Some(DialogIcon::Info) => "info".to_string(),
        Some(DialogIcon::Question) | Some(DialogIcon::Password) => "question".to_string(),
        Some(DialogIcon::Custom(path)) => path.to_string_lossy().into_owned(),
        Some(DialogIcon::NoIcon) | None => return,
    };
    args.push("--window-icon".into());
    args.push(value);
}

pub fn message(kind: MessageKind, text: &str, opts: &Options) -> Vec<String> {
    let mut args = vec![kind.helper_flag().to_string(), "--text".into(), text.to_string(), "--no-markup".into()];
    push_general(&mut args, opts);
    push_buttons(&mut args, opts);
    push_size(&mut args, opts);
    push_icon(&mut args, opts);
    push_window_icon(&mut args, opts);
    if opts.no_wrap {
        args.push("--no-wrap".into());
    }
    if opts.ellipsize {
        args.push("--ellipsize".into());
    }
    if kind == MessageKind::Question && opts.default_cancel {
        args.push("--default-cancel".into());
    }
    args
}

pub fn progress(opts: &Options) -> Vec<String> {
    let mut args = vec!["--progress".to_string()];
    push_general(&mut args, opts);
    push_buttons(&mut args, opts);
    push_size(&mut args, opts);
    push_window_icon(&mut args, opts);
    if opts.progress_max() < 0 {
        args.push("--pulsate".into());
    }
    if opts.no_cancel {
        args.push("--no-cancel".into());
    }
    if opts.time_remaining {
        args.push("--time-remaining".into());
    }
    args
}

/// Which file selection the helper should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Open,
    Multiple,
    Save,
}

pub fn file_selection(mode: FileMode, opts: &Options) -> Vec<String> {
    let mut args = vec!["--file-selection".to_string()];
    push_general(&mut args, opts);
    push_window_icon(&mut args, opts);
    match mode {
        FileMode::Open => {}
        FileMode::Multiple => {
            args.push("--multiple".into());
            args.push("--separator".into());
            args.push(SEPARATOR.into());
        }
        FileMode::Save => {
            args.push("--save".into());
            if opts.confirm_overwrite {
                args.push("--confirm-overwrite".into());
            }
        }
    }
    // Save dialogs always pick a file, as on Windows.
    if opts.directory && mode != FileMode::Save {
        args.push("--directory".into());
    }
    if let Some(filename) = &opts.filename {
        args.push("--filename".into());
        args.push(filename.to_string_lossy().into_owned());
    }
    for filter in &opts.filters {
        args.push("--file-filter".into());
        args.push(filter.helper_spec());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileFilter;

    #[test]
    fn test_plain_message() {
        let args = message(MessageKind::Error, "An error has occurred.", &Options::new());
        assert_eq!(args, ["--error", "--text", "An error has occurred.", "--no-markup"]);
    }

    #[test]
    fn test_message_with_everything() {
        let opts = Options::new()
            .title("Question")
            .attach(77isize)
            .modal()
            .ok_label("Yes")
            .cancel_label("Cancel")
            .extra_button("No")
            .width(320)
            .icon(DialogIcon::Warning)
            .no_wrap()
            .default_cancel();
        let args = message(MessageKind::Question, "Proceed?", &opts);
        assert_eq!(
            args,
            [
                "--question", "--text", "Proceed?", "--no-markup",
                "--title", "Question", "--attach", "77", "--modal",
                "--ok-label", "Yes", "--cancel-label", "Cancel", "--extra-button", "No",
                "--width", "320",
                "--icon-name=dialog-warning",
                "--no-wrap", "--default-cancel",
            ]
        );
    }

    #[test]
    fn test_default_cancel_ignored_outside_questions() {
        let args = message(MessageKind::Info, "x", &Options::new().default_cancel());
        assert!(!args.iter().any(|a| a == "--default-cancel"));
    }

    #[test]
    fn test_custom_icon_becomes_window_icon() {
        let opts = Options::new().icon(DialogIcon::Custom("/tmp/icon.png".into()));
        let args = message(MessageKind::Info, "x", &opts);
        assert_eq!(&args[4..], ["--window-icon", "/tmp/icon.png"]);

        let args = message(MessageKind::Info, "x", &Options::new().icon(DialogIcon::NoIcon));
        assert_eq!(args.last().map(String::as_str), Some("--icon-name="));
    }

    #[test]
    fn test_progress_flags() {
        let args = progress(&Options::new());
        assert_eq!(args, ["--progress"]);

        let opts = Options::new().pulsate().no_cancel().time_remaining().window_icon(DialogIcon::Info);
        let args = progress(&opts);
        assert_eq!(
            args,
            ["--progress", "--window-icon", "info", "--pulsate", "--no-cancel", "--time-remaining"]
        );
    }

    #[test]
    fn test_file_selection_modes() {
        assert_eq!(file_selection(FileMode::Open, &Options::new()), ["--file-selection"]);
        assert_eq!(
            file_selection(FileMode::Multiple, &Options::new().directory()),
            ["--file-selection", "--multiple", "--separator", SEPARATOR, "--directory"]
        );
        assert_eq!(
            file_selection(FileMode::Save, &Options::new().confirm_overwrite().filename("/tmp/a.txt")),
            ["--file-selection", "--save", "--confirm-overwrite", "--filename", "/tmp/a.txt"]
        );
    }

    #[test]
    fn test_save_ignores_directory() {
        assert_eq!(file_selection(FileMode::Save, &Options::new().directory()), ["--file-selection", "--save"]);
        assert_eq!(file_selection(FileMode::Open, &Options::new().directory()), ["--file-selection", "--directory"]);
    }

    #[test]
    fn test_file_filters() {
        let opts = Options::new()
            .file_filter(FileFilter::new("Go files", ["*.go"]))
            .file_filter(FileFilter::new("Image files", ["*.png", "*.gif"]).case_fold());
        let args = file_selection(FileMode::Open, &opts);
        assert_eq!(
            args,
            [
                "--file-selection",
                "--file-filter", "Go files | *.go",
                "--file-filter", "Image files | *.[pP][nN][gG] *.[gG][iI][fF]",
            ]
        );
    }
}
