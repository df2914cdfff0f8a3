use std::fmt;
use std::sync::Arc;

use crate::hydration::{Hydrate, HydrationCoordinator};
use crate::language::LanguageStore;
use crate::storage::StorageBackend;
use crate::theme::ThemeStore;
use crate::ui::{UiAction, UiStore};

/// 狀態變更種類。 / Which slice of application state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Theme,
    Language,
    Ui,
    Hydrated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(StoreEvent)>;

/// 應用程式狀態容器，取代全域單例。 / Application state passed down explicitly instead of global singletons.
///
/// Every mutation goes through `&mut self`, so updates to one store never
/// interleave. Observers run synchronously after each mutation.
pub struct AppContext {
    theme: ThemeStore,
    language: LanguageStore,
    ui: UiStore,
    hydration: HydrationCoordinator,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("theme", &self.theme)
            .field("language", &self.language)
            .field("ui", &self.ui)
            .field("hydration", &self.hydration)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl AppContext {
    /// 以儲存後端建立。 / Builds the three stores over one storage backend.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::from_stores(
            ThemeStore::new(Arc::clone(&backend)),
            LanguageStore::new(backend),
            UiStore::new(),
        )
    }

    /// 以既有狀態建立。 / Wraps stores that were built elsewhere.
    pub fn from_stores(theme: ThemeStore, language: LanguageStore, ui: UiStore) -> Self {
        Self {
            theme,
            language,
            ui,
            hydration: HydrationCoordinator::new(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// 主題狀態。 / Theme store.
    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    /// 語言狀態。 / Language store.
    pub fn language(&self) -> &LanguageStore {
        &self.language
    }

    /// 介面狀態。 / Transient UI store.
    pub fn ui(&self) -> &UiStore {
        &self.ui
    }

    /// 是否已水合。 / Whether hydration has run.
    pub fn is_hydrated(&self) -> bool {
        self.hydration.is_done()
    }

    /// 執行水合。 / Runs client hydration for the persisted stores; only the first call has an effect.
    pub fn hydrate(&mut self) -> bool {
        let performed = self
            .hydration
            .hydrate(&mut [&mut self.theme as &mut dyn Hydrate, &mut self.language]);
        if performed {
            self.notify(StoreEvent::Hydrated);
        }
        performed
    }

    /// 更新主題。 / Mutates the theme store and notifies observers.
    pub fn update_theme<R>(&mut self, op: impl FnOnce(&mut ThemeStore) -> R) -> R {
        let result = op(&mut self.theme);
        self.notify(StoreEvent::Theme);
        result
    }

    /// 更新語言。 / Mutates the language store and notifies observers.
    pub fn update_language<R>(&mut self, op: impl FnOnce(&mut LanguageStore) -> R) -> R {
        let result = op(&mut self.language);
        self.notify(StoreEvent::Language);
        result
    }

    /// 派送介面動作。 / Applies a UI action and notifies observers.
    pub fn dispatch_ui(&mut self, action: UiAction) {
        self.ui.dispatch(action);
        self.notify(StoreEvent::Ui);
    }

    /// 訂閱變更。 / Registers an observer of every store change.
    pub fn subscribe(&mut self, listener: impl FnMut(StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// 取消訂閱。 / Removes an observer; `false` when the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn observers_see_each_mutation_in_order() {
        let mut app = AppContext::new(Arc::new(MemoryStorage::new()));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = app.subscribe(move |event| sink.borrow_mut().push(event));

        assert!(app.hydrate());
        app.update_theme(|theme| theme.select_theme("dark"));
        app.dispatch_ui(UiAction::ToggleMenu);
        assert!(!app.hydrate());

        assert!(app.unsubscribe(id));
        app.update_language(|language| language.select_language_code("ja"));

        assert_eq!(
            *seen.borrow(),
            vec![StoreEvent::Hydrated, StoreEvent::Theme, StoreEvent::Ui]
        );
        assert!(!app.unsubscribe(id));
    }

    #[test]
    fn hydrate_flips_both_persisted_stores() {
        let mut app = AppContext::new(Arc::new(MemoryStorage::new()));
        assert!(!app.theme().state().is_loaded());
        assert!(!app.language().state().is_loaded());
        app.hydrate();
        assert!(app.is_hydrated());
        assert!(app.theme().state().is_loaded());
        assert!(app.language().state().is_loaded());
    }
}
