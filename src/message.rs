use crate::error::{Error, Result};
use crate::options::{DialogIcon, Options};

/// Which of the four message dialogs to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Info,
    Warning,
    Question,
}

impl MessageKind {
    /// Helper flag selecting this dialog kind.
    #[cfg_attr(windows, allow(dead_code))]
    pub(crate) fn helper_flag(self) -> &'static str {
        match self {
            MessageKind::Error => "--error",
            MessageKind::Info => "--info",
            MessageKind::Warning => "--warning",
            MessageKind::Question => "--question",
        }
    }
}

/// Shows an error message with an OK button.
pub fn error(text: &str, opts: &Options) -> Result<()> {
    message(MessageKind::Error, text, opts)
}

/// Shows an informational message with an OK button.
pub fn info(text: &str, opts: &Options) -> Result<()> {
    message(MessageKind::Info, text, opts)
}

/// Shows a warning message with an OK button.
pub fn warning(text: &str, opts: &Options) -> Result<()> {
    message(MessageKind::Warning, text, opts)
}

/// Asks a question. `Ok` means OK/Yes, [`Error::Canceled`] means Cancel/No.
pub fn question(text: &str, opts: &Options) -> Result<()> {
    message(MessageKind::Question, text, opts)
}

pub fn message(kind: MessageKind, text: &str, opts: &Options) -> Result<()> {
    opts.check_cancel()?;
    tracing::debug!(?kind, "showing message dialog");
    let result = crate::backend::message(kind, text, opts);
    if let Err(err) = &result {
        if !matches!(err, Error::Canceled | Error::ExtraButton) && !err.is_context_error() {
            tracing::warn!(?kind, error = %err, "message dialog failed");
        }
    }
    result
}

// MessageBoxW style bits and return codes.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) mod native {
    use super::*;

    pub const MB_OK: u32 = 0x0000_0000;
    pub const MB_OKCANCEL: u32 = 0x0000_0001;
    pub const MB_YESNOCANCEL: u32 = 0x0000_0003;
    pub const MB_YESNO: u32 = 0x0000_0004;
    pub const MB_ICONERROR: u32 = 0x0000_0010;
    pub const MB_ICONQUESTION: u32 = 0x0000_0020;
    pub const MB_ICONWARNING: u32 = 0x0000_0030;
    pub const MB_ICONINFORMATION: u32 = 0x0000_0040;
    pub const MB_DEFBUTTON2: u32 = 0x0000_0100;
    pub const MB_DEFBUTTON3: u32 = 0x0000_0200;
    pub const MB_SETFOREGROUND: u32 = 0x0001_0000;

    pub const IDOK: i32 = 1;
    pub const IDCANCEL: i32 = 2;
    pub const IDYES: i32 = 6;
    pub const IDNO: i32 = 7;

    /// `uType` for `MessageBoxW`.
    pub fn message_box_style(kind: MessageKind, opts: &Options) -> u32 {
        let extra = opts.extra_button.is_some();
        let mut flags = match (kind, extra) {
            (MessageKind::Question, true) => MB_YESNOCANCEL,
            (MessageKind::Question, false) => MB_OKCANCEL,
            (_, true) => MB_YESNO,
            (_, false) => MB_OK,
        };

        flags |= match &opts.icon {
            Some(DialogIcon::Error) => MB_ICONERROR,
            Some(DialogIcon::Question) => MB_ICONQUESTION,
            Some(DialogIcon::Warning) => MB_ICONWARNING,
            Some(DialogIcon::Info) => MB_ICONINFORMATION,
            Some(DialogIcon::NoIcon) => 0,
            // MessageBoxW can't load arbitrary images; fall back to the kind's icon.
            Some(DialogIcon::Password) | Some(DialogIcon::Custom(_)) | None => match kind {
                MessageKind::Error => MB_ICONERROR,
                MessageKind::Question => MB_ICONQUESTION,
                MessageKind::Warning => MB_ICONWARNING,
                MessageKind::Info => MB_ICONINFORMATION,
            },
        };

        if kind == MessageKind::Question && opts.default_cancel {
            flags |= if extra { MB_DEFBUTTON3 } else { MB_DEFBUTTON2 };
        }
        flags | MB_SETFOREGROUND
    }

    /// Maps the `MessageBoxW` return code; 0 signals an OS failure.
    pub fn message_box_result(code: i32) -> Option<Result<()>> {
        match code {
            IDOK | IDYES => Some(Ok(())),
            IDCANCEL => Some(Err(Error::Canceled)),
            IDNO => Some(Err(Error::ExtraButton)),
            _ => None,
        }
    }

    /// Button id -> caption replacements applied once the box is visible.
    pub fn button_labels(opts: &Options) -> Vec<(i32, String)> {
        let mut labels = Vec::new();
        if let Some(ok) = &opts.ok_label {
            let id = if opts.extra_button.is_some() { IDYES } else { IDOK };
            labels.push((id, ok.clone()));
        }
        if let Some(cancel) = &opts.cancel_label {
            labels.push((IDCANCEL, cancel.clone()));
        }
        if let Some(extra) = &opts.extra_button {
            labels.push((IDNO, extra.clone()));
        }
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::native::*;
    use super::*;

    #[test]
    fn test_default_buttons_per_kind() {
        let opts = Options::new();
        assert_eq!(message_box_style(MessageKind::Info, &opts) & 0xF, MB_OK);
        assert_eq!(message_box_style(MessageKind::Question, &opts) & 0xF, MB_OKCANCEL);

        let extra = Options::new().extra_button("Later");
        assert_eq!(message_box_style(MessageKind::Warning, &extra) & 0xF, MB_YESNO);
        assert_eq!(message_box_style(MessageKind::Question, &extra) & 0xF, MB_YESNOCANCEL);
    }

    #[test]
    fn test_icon_selection() {
        let icon_bits = |kind, opts: &Options| message_box_style(kind, opts) & 0xF0;

        assert_eq!(icon_bits(MessageKind::Error, &Options::new()), MB_ICONERROR);
        assert_eq!(icon_bits(MessageKind::Info, &Options::new()), MB_ICONINFORMATION);
        assert_eq!(
            icon_bits(MessageKind::Info, &Options::new().icon(DialogIcon::Warning)),
            MB_ICONWARNING
        );
        assert_eq!(icon_bits(MessageKind::Error, &Options::new().icon(DialogIcon::NoIcon)), 0);
    }

    #[test]
    fn test_default_cancel_only_for_questions() {
        let opts = Options::new().default_cancel();
        assert_ne!(message_box_style(MessageKind::Question, &opts) & MB_DEFBUTTON2, 0);
        assert_eq!(message_box_style(MessageKind::Info, &opts) & 0xF00, 0);

        let extra = opts.extra_button("No");
        assert_eq!(message_box_style(MessageKind::Question, &extra) & 0xF00, MB_DEFBUTTON3);
    }

    #[test]
    fn test_result_mapping() {
        assert!(matches!(message_box_result(IDOK), Some(Ok(()))));
        assert!(matches!(message_box_result(IDYES), Some(Ok(()))));
        assert!(matches!(message_box_result(IDCANCEL), Some(Err(Error::Canceled))));
        assert!(matches!(message_box_result(IDNO), Some(Err(Error::ExtraButton))));
        assert!(message_box_result(0).is_none());
    }

    #[test]
    fn test_button_labels() {
        let opts = Options::new().ok_label("Go").cancel_label("Stop");
        assert_eq!(button_labels(&opts), vec![(IDOK, "Go".into()), (IDCANCEL, "Stop".into())]);

        let opts = Options::new().ok_label("Yes").extra_button("No");
        assert_eq!(button_labels(&opts), vec![(IDYES, "Yes".into()), (IDNO, "No".into())]);
    }

    #[test]
    fn test_canceled_token_short_circuits() {
        let token = crate::CancelToken::new();
        token.cancel();
        let opts = Options::new().cancel_token(token);
        assert!(matches!(error("text", &opts), Err(Error::ContextCanceled)));
        assert!(matches!(question("text", &opts), Err(Error::ContextCanceled)));
    }
}
