use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// 建議的提示自動關閉時間。 / Suggested delay before a page dismisses a toast.
///
/// The store owns no timer; callers schedule [`UiStore::hide_toast`] themselves.
pub const TOAST_DISMISS_AFTER: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl ToastKind {
    /// 提示種類名稱。 / Lowercase kind name.
    pub fn as_str(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
            ToastKind::Info => "info",
        }
    }
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown toast kind '{0}'")]
pub struct UnknownToastKind(pub String);

impl FromStr for ToastKind {
    type Err = UnknownToastKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "success" => Ok(ToastKind::Success),
            "error" => Ok(ToastKind::Error),
            "warning" => Ok(ToastKind::Warning),
            "info" => Ok(ToastKind::Info),
            other => Err(UnknownToastKind(other.to_string())),
        }
    }
}

/// 暫時介面狀態。 / Ephemeral interaction flags. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub modal_open: bool,
    pub modal_content: Option<String>,
    pub menu_open: bool,
    pub toast_open: bool,
    pub toast_message: Option<String>,
    pub toast_kind: ToastKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    OpenModal(Option<String>),
    CloseModal,
    ToggleMenu,
    CloseMenu,
    ShowToast { message: String, kind: ToastKind },
    HideToast,
    ResetAll,
}

impl UiState {
    /// 狀態轉移。 / Pure transition: returns the state that follows `action`.
    pub fn reduce(self, action: UiAction) -> UiState {
        match action {
            UiAction::OpenModal(content) => UiState {
                modal_open: true,
                modal_content: content,
                ..self
            },
            UiAction::CloseModal => UiState {
                modal_open: false,
                modal_content: None,
                ..self
            },
            UiAction::ToggleMenu => UiState {
                menu_open: !self.menu_open,
                ..self
            },
            UiAction::CloseMenu => UiState {
                menu_open: false,
                ..self
            },
            UiAction::ShowToast { message, kind } => UiState {
                toast_open: true,
                toast_message: Some(message),
                toast_kind: kind,
                ..self
            },
            UiAction::HideToast => UiState {
                toast_open: false,
                toast_message: None,
                ..self
            },
            UiAction::ResetAll => UiState::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct UiStore {
    state: UiState,
}

impl UiStore {
    /// 建立介面狀態。 / Store with everything closed.
    pub fn new() -> Self {
        Self::default()
    }

    /// 目前狀態。 / Current flags.
    pub fn state(&self) -> &UiState {
        &self.state
    }

    /// 派送動作。 / Applies `action` through the reducer.
    pub fn dispatch(&mut self, action: UiAction) {
        tracing::trace!(?action, "ui transition");
        let previous = std::mem::take(&mut self.state);
        self.state = previous.reduce(action);
    }

    /// 開啟對話框。 / Opens the modal with optional content.
    pub fn open_modal(&mut self, content: Option<String>) {
        self.dispatch(UiAction::OpenModal(content));
    }

    /// 關閉對話框。 / Closes the modal and drops its content.
    pub fn close_modal(&mut self) {
        self.dispatch(UiAction::CloseModal);
    }

    /// 切換選單。 / Flips the menu open state.
    pub fn toggle_menu(&mut self) {
        self.dispatch(UiAction::ToggleMenu);
    }

    /// 關閉選單。 / Closes the menu.
    pub fn close_menu(&mut self) {
        self.dispatch(UiAction::CloseMenu);
    }

    /// 顯示提示。 / Shows a toast; the kind defaults to info.
    pub fn show_toast(&mut self, message: impl Into<String>, kind: Option<ToastKind>) {
        self.dispatch(UiAction::ShowToast {
            message: message.into(),
            kind: kind.unwrap_or_default(),
        });
    }

    /// 隱藏提示。 / Hides the toast and clears its message.
    pub fn hide_toast(&mut self) {
        self.dispatch(UiAction::HideToast);
    }

    /// 重設全部。 / Returns every flag to its default.
    pub fn reset_all(&mut self) {
        self.dispatch(UiAction::ResetAll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modal_carries_optional_content() {
        let mut store = UiStore::new();
        store.open_modal(Some("Welcome".into()));
        assert!(store.state().modal_open);
        assert_eq!(store.state().modal_content.as_deref(), Some("Welcome"));

        store.close_modal();
        assert!(!store.state().modal_open);
        assert_eq!(store.state().modal_content, None);

        store.open_modal(None);
        assert!(store.state().modal_open);
        assert_eq!(store.state().modal_content, None);
    }

    #[test]
    fn toast_defaults_to_info() {
        let mut store = UiStore::new();
        store.show_toast("Saved", None);
        assert!(store.state().toast_open);
        assert_eq!(store.state().toast_kind, ToastKind::Info);

        store.show_toast("Broken", Some(ToastKind::Error));
        assert_eq!(store.state().toast_message.as_deref(), Some("Broken"));
        assert_eq!(store.state().toast_kind, ToastKind::Error);

        store.hide_toast();
        assert!(!store.state().toast_open);
        assert_eq!(store.state().toast_message, None);
    }

    #[test]
    fn toggle_menu_flips_and_close_is_idempotent() {
        let mut store = UiStore::new();
        store.toggle_menu();
        assert!(store.state().menu_open);
        store.toggle_menu();
        assert!(!store.state().menu_open);
        store.close_menu();
        store.close_menu();
        assert!(!store.state().menu_open);
    }

    #[test]
    fn reset_all_matches_fresh_store() {
        let mut store = UiStore::new();
        store.open_modal(Some("x".into()));
        store.toggle_menu();
        store.show_toast("y", Some(ToastKind::Warning));
        store.reset_all();
        assert_eq!(store.state(), UiStore::new().state());
    }

    #[test]
    fn toast_kind_round_trips_through_text() {
        for kind in [
            ToastKind::Success,
            ToastKind::Error,
            ToastKind::Warning,
            ToastKind::Info,
        ] {
            assert_eq!(kind.to_string().parse::<ToastKind>(), Ok(kind));
        }
        assert!("fatal".parse::<ToastKind>().is_err());
    }
}
