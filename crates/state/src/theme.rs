use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::hydration::{Hydrate, Hydration};
use crate::storage::{PersistentSlice, StorageBackend, THEME_STORAGE_KEY};

pub const DEFAULT_THEME_NAME: &str = "light";

const FONT_STYLESHEET_BASE: &str = "https://fonts.googleapis.com/css2";

static DEFAULT_THEMES: Lazy<BTreeMap<String, ThemeRecord>> = Lazy::new(|| {
    let mut themes = BTreeMap::new();
    for record in [ThemeRecord::builtin_light(), ThemeRecord::builtin_dark()] {
        themes.insert(record.name.clone(), record);
    }
    themes
});

/// 可循環切換的字型清單。 / Fonts walked by [`ThemeStore::cycle_font`], in order.
pub const FONT_CATALOG: &[FontOption] = &[
    FontOption {
        name: "Inter",
        class_name: "font-inter",
        source: FontSource::Bundled,
    },
    FontOption {
        name: "Space Grotesk",
        class_name: "font-space-grotesk",
        source: FontSource::External,
    },
    FontOption {
        name: "Playfair Display",
        class_name: "font-playfair-display",
        source: FontSource::External,
    },
    FontOption {
        name: "JetBrains Mono",
        class_name: "font-jetbrains-mono",
        source: FontSource::External,
    },
];

/// 主題範本。 / A named theme template: one typeface and five color tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeRecord {
    pub name: String,
    pub typeface: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typeface_class: Option<String>,
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub foreground: String,
}

impl ThemeRecord {
    /// 內建淺色主題。 / The built-in `light` record.
    pub fn builtin_light() -> Self {
        Self {
            name: "light".into(),
            typeface: "Inter".into(),
            typeface_class: Some("font-inter".into()),
            primary: "#000000".into(),
            secondary: "#D3D3D3".into(),
            accent: "#0066cc".into(),
            background: "#ffffff".into(),
            foreground: "#000000".into(),
        }
    }

    /// 內建深色主題。 / The built-in `dark` record.
    pub fn builtin_dark() -> Self {
        Self {
            name: "dark".into(),
            typeface: "Inter".into(),
            typeface_class: Some("font-inter".into()),
            primary: "#ffffff".into(),
            secondary: "#cccccc".into(),
            accent: "#4d9eff".into(),
            background: "#1a1a1a".into(),
            foreground: "#ffffff".into(),
        }
    }

    /// CSS 變數。 / CSS custom properties written to the document root when the theme applies.
    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        vec![
            ("--color-primary", self.primary.clone()),
            ("--color-secondary", self.secondary.clone()),
            ("--color-accent", self.accent.clone()),
            ("--color-background", self.background.clone()),
            ("--color-foreground", self.foreground.clone()),
            ("--font-family", self.typeface.clone()),
        ]
    }
}

/// 主題覆寫。 / Partial update merged field-by-field into the current theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeOverrides {
    pub name: Option<String>,
    pub typeface: Option<String>,
    pub typeface_class: Option<String>,
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub accent: Option<String>,
    pub background: Option<String>,
    pub foreground: Option<String>,
}

impl ThemeOverrides {
    /// 是否無覆寫。 / Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply_to(self, record: &mut ThemeRecord) {
        let ThemeOverrides {
            name,
            typeface,
            typeface_class,
            primary,
            secondary,
            accent,
            background,
            foreground,
        } = self;
        if let Some(value) = name {
            record.name = value;
        }
        if let Some(value) = typeface {
            record.typeface = value;
        }
        if let Some(value) = typeface_class {
            record.typeface_class = Some(value);
        }
        if let Some(value) = primary {
            record.primary = value;
        }
        if let Some(value) = secondary {
            record.secondary = value;
        }
        if let Some(value) = accent {
            record.accent = value;
        }
        if let Some(value) = background {
            record.background = value;
        }
        if let Some(value) = foreground {
            record.foreground = value;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSource {
    /// Shipped with the page; nothing to fetch.
    Bundled,
    /// Hosted externally; needs a stylesheet link on first use.
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontOption {
    pub name: &'static str,
    pub class_name: &'static str,
    pub source: FontSource,
}

/// 字型樣式表網址。 / Builds the stylesheet request for an externally hosted family.
///
/// Spaces become `+`; no other character is escaped.
pub fn font_stylesheet_url(family: &str) -> String {
    format!(
        "{FONT_STYLESHEET_BASE}?family={}&display=swap",
        family.replace(' ', "+")
    )
}

/// 文件 head 中已注入的字型樣式表。 / Stylesheet links injected into the document head.
#[derive(Debug, Clone, Default)]
pub struct FontHead {
    families: BTreeSet<String>,
    links: Vec<String>,
}

impl FontHead {
    /// 注入樣式表。 / Registers `family`, returning the new link or `None` when already present.
    pub fn request(&mut self, family: &str) -> Option<&str> {
        if !self.families.insert(family.to_string()) {
            return None;
        }
        self.links.push(font_stylesheet_url(family));
        self.links.last().map(String::as_str)
    }

    /// 已注入連結。 / Injected links, in request order.
    pub fn links(&self) -> &[String] {
        &self.links
    }

    /// 是否已注入。 / Whether `family` already has a link.
    pub fn contains(&self, family: &str) -> bool {
        self.families.contains(family)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedTheme {
    current: ThemeRecord,
}

#[derive(Debug)]
pub struct ThemeStore {
    current: Hydration<ThemeRecord>,
    registry: BTreeMap<String, ThemeRecord>,
    fonts: &'static [FontOption],
    head: FontHead,
    /// Changes made before hydration, replayed onto the stored record.
    pending: Vec<PendingChange>,
    slice: PersistentSlice<PersistedTheme>,
}

#[derive(Debug, Clone)]
enum PendingChange {
    Select(ThemeRecord),
    Merge(ThemeOverrides),
}

impl PendingChange {
    fn apply_to(self, record: &mut ThemeRecord) {
        match self {
            PendingChange::Select(selected) => *record = selected,
            PendingChange::Merge(overrides) => overrides.apply_to(record),
        }
    }
}

impl ThemeStore {
    /// 建立主題狀態。 / Creates a store over the built-in `light`/`dark` registry.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_registry(backend, DEFAULT_THEMES.clone(), DEFAULT_THEME_NAME)
    }

    /// 以自訂註冊表建立。 / Creates a store with a custom registry; the initial theme is `default_name`
    /// or, when missing, the first registered record.
    pub fn with_registry(
        backend: Arc<dyn StorageBackend>,
        registry: BTreeMap<String, ThemeRecord>,
        default_name: &str,
    ) -> Self {
        let initial = registry
            .get(default_name)
            .or_else(|| registry.values().next())
            .cloned()
            .unwrap_or_else(ThemeRecord::builtin_light);
        Self {
            current: Hydration::Uninitialized(initial),
            registry,
            fonts: FONT_CATALOG,
            head: FontHead::default(),
            pending: Vec::new(),
            slice: PersistentSlice::new(THEME_STORAGE_KEY, backend),
        }
    }

    /// 目前主題。 / Current theme record.
    pub fn current(&self) -> &ThemeRecord {
        self.current.value()
    }

    /// 水合狀態。 / Current record with its lifecycle state.
    pub fn state(&self) -> &Hydration<ThemeRecord> {
        &self.current
    }

    /// 主題註冊表。 / Registered themes keyed by name.
    pub fn registry(&self) -> &BTreeMap<String, ThemeRecord> {
        &self.registry
    }

    /// 主題名稱。 / Registered theme names, sorted.
    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    /// 字型目錄。 / The font catalog.
    pub fn fonts(&self) -> &'static [FontOption] {
        self.fonts
    }

    /// 字型樣式表。 / Stylesheets injected so far.
    pub fn font_head(&self) -> &FontHead {
        &self.head
    }

    /// 註冊主題。 / Adds or replaces a registry entry. The current theme is not touched.
    pub fn register_theme(&mut self, record: ThemeRecord) {
        self.registry.insert(record.name.clone(), record);
    }

    /// 切換至已註冊的主題；未知名稱時忽略。 / Switches to a registered theme; unknown names are ignored.
    pub fn select_theme(&mut self, name: &str) -> bool {
        let Some(record) = self.registry.get(name) else {
            tracing::debug!(theme = name, "ignoring unknown theme");
            return false;
        };
        let record = record.clone();
        self.commit(PendingChange::Select(record));
        true
    }

    /// 將部分欄位合併至目前主題。 / Shallow-merges the given fields into the current theme.
    pub fn merge_theme_overrides(&mut self, overrides: ThemeOverrides) {
        if overrides.is_empty() {
            return;
        }
        self.commit(PendingChange::Merge(overrides));
    }

    /// Applies a change; before hydration it is queued instead of written.
    fn commit(&mut self, change: PendingChange) {
        change.clone().apply_to(self.current.value_mut());
        if self.current.is_loaded() {
            self.persist();
        } else {
            self.pending.push(change);
        }
    }

    /// 選擇字型。 / Sets the typeface by class name. No-op before hydration or for unknown classes.
    pub fn select_font(&mut self, class_name: &str) -> bool {
        if !self.current.is_loaded() {
            return false;
        }
        match self.fonts.iter().find(|font| font.class_name == class_name) {
            Some(font) => {
                self.apply_font(*font);
                true
            }
            None => false,
        }
    }

    /// 切換下一個字型。 / Advances to the next catalog font. No-op before hydration.
    pub fn cycle_font(&mut self) -> Option<FontOption> {
        if !self.current.is_loaded() || self.fonts.is_empty() {
            return None;
        }
        let current_class = self.current().typeface_class.as_deref();
        let next = self
            .fonts
            .iter()
            .position(|font| Some(font.class_name) == current_class)
            .map(|index| (index + 1) % self.fonts.len())
            .unwrap_or(0);
        let font = self.fonts[next];
        self.apply_font(font);
        Some(font)
    }

    fn apply_font(&mut self, font: FontOption) {
        let record = self.current.value_mut();
        record.typeface = font.name.to_string();
        record.typeface_class = Some(font.class_name.to_string());
        self.request_stylesheet(font);
        self.persist();
    }

    fn request_stylesheet(&mut self, font: FontOption) {
        if font.source != FontSource::External {
            return;
        }
        if let Some(link) = self.head.request(font.name) {
            tracing::debug!(font = font.name, link, "injecting font stylesheet");
        }
    }

    /// Re-injects the stylesheet of a restored external typeface.
    fn restore_font_stylesheet(&mut self) {
        let Some(class_name) = self.current().typeface_class.as_deref() else {
            return;
        };
        let Some(font) = self
            .fonts
            .iter()
            .find(|font| font.class_name == class_name)
            .copied()
        else {
            return;
        };
        self.request_stylesheet(font);
    }

    fn persist(&self) {
        self.slice.save(&PersistedTheme {
            current: self.current().clone(),
        });
    }
}

impl Hydrate for ThemeStore {
    fn hydrate(&mut self) {
        let stored = self.slice.load().map(|persisted| persisted.current);
        let current = std::mem::replace(
            &mut self.current,
            Hydration::Uninitialized(ThemeRecord::builtin_light()),
        );
        self.current = current.hydrate_with(stored);
        let pending = std::mem::take(&mut self.pending);
        if !pending.is_empty() {
            let record = self.current.value_mut();
            for change in pending {
                change.apply_to(record);
            }
            self.persist();
        }
        self.restore_font_stylesheet();
    }

    fn is_hydrated(&self) -> bool {
        self.current.is_loaded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn hydrated_store() -> ThemeStore {
        let mut store = ThemeStore::new(Arc::new(MemoryStorage::new()));
        store.hydrate();
        store
    }

    #[test]
    fn changes_before_hydration_are_queued_not_written() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = ThemeStore::new(storage.clone());
        assert!(store.select_theme("dark"));
        store.merge_theme_overrides(ThemeOverrides {
            accent: Some("#ff0000".into()),
            ..ThemeOverrides::default()
        });
        assert_eq!(store.current().accent, "#ff0000");
        assert!(storage.snapshot().is_empty());

        store.hydrate();
        assert_eq!(store.current().name, "dark");
        assert_eq!(store.current().accent, "#ff0000");
        assert!(storage.snapshot().contains_key(THEME_STORAGE_KEY));
    }

    #[test]
    fn unknown_theme_leaves_current_unchanged() {
        let mut store = hydrated_store();
        let before = store.current().clone();
        assert!(!store.select_theme("nonexistent"));
        assert_eq!(store.current(), &before);
    }

    #[test]
    fn overrides_touch_only_given_fields() {
        let mut store = hydrated_store();
        store.merge_theme_overrides(ThemeOverrides {
            accent: Some("hotpink".into()),
            ..ThemeOverrides::default()
        });
        assert_eq!(store.current().accent, "hotpink");
        assert_eq!(store.current().background, "#ffffff");
        assert_eq!(store.registry()["light"].accent, "#0066cc");
    }

    #[test]
    fn font_changes_wait_for_hydration() {
        let mut store = ThemeStore::new(Arc::new(MemoryStorage::new()));
        assert_eq!(store.cycle_font(), None);
        assert!(!store.select_font("font-space-grotesk"));
        assert_eq!(store.current().typeface, "Inter");

        store.hydrate();
        assert!(store.select_font("font-space-grotesk"));
        assert_eq!(store.current().typeface, "Space Grotesk");
    }

    #[test]
    fn cycle_font_wraps_around_catalog() {
        let mut store = hydrated_store();
        let visited: Vec<_> = (0..FONT_CATALOG.len())
            .filter_map(|_| store.cycle_font())
            .map(|font| font.name)
            .collect();
        assert_eq!(
            visited,
            vec!["Space Grotesk", "Playfair Display", "JetBrains Mono", "Inter"]
        );
        assert_eq!(store.current().typeface_class.as_deref(), Some("font-inter"));
    }

    #[test]
    fn external_fonts_are_injected_once() {
        let mut store = hydrated_store();
        assert!(store.select_font("font-playfair-display"));
        assert!(store.select_font("font-inter"));
        assert!(store.select_font("font-playfair-display"));
        assert_eq!(
            store.font_head().links(),
            &["https://fonts.googleapis.com/css2?family=Playfair+Display&display=swap".to_string()]
        );
    }

    #[test]
    fn css_variables_follow_current_theme() {
        let mut store = hydrated_store();
        store.select_theme("dark");
        let vars = store.current().css_variables();
        assert!(vars.contains(&("--color-background", "#1a1a1a".to_string())));
        assert!(vars.contains(&("--font-family", "Inter".to_string())));
    }
}
