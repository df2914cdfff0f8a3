pub mod app;
pub mod hydration;
pub mod language;
pub mod storage;
pub mod theme;
pub mod ui;

pub use app::{AppContext, StoreEvent, SubscriptionId};
pub use hydration::{Hydrate, Hydration, HydrationCoordinator};
pub use language::{
    DirectorySource, Language, LanguageOption, LanguageStore, LoadOutcome, LoadTicket,
    TranslationError, TranslationNode, TranslationSource, TranslationTree, UnknownLanguage,
};
pub use storage::{
    FileStorage, MemoryStorage, PersistentSlice, StorageBackend, StorageError,
    LANGUAGE_STORAGE_KEY, THEME_STORAGE_KEY,
};
pub use theme::{
    font_stylesheet_url, FontHead, FontOption, FontSource, ThemeOverrides, ThemeRecord,
    ThemeStore, DEFAULT_THEME_NAME, FONT_CATALOG,
};
pub use ui::{ToastKind, UiAction, UiState, UiStore, UnknownToastKind, TOAST_DISMISS_AFTER};
