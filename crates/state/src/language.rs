use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hydration::{Hydrate, Hydration};
use crate::storage::{PersistentSlice, StorageBackend, LANGUAGE_STORAGE_KEY};

const EN_STRINGS: &[(&str, &str)] = &[
    ("home", "Home"),
    ("about", "About"),
    ("services", "Services"),
    ("contact", "Contact"),
    ("loading", "Loading..."),
    ("error", "Error"),
    ("success", "Success"),
    ("close", "Close"),
    ("submit", "Submit"),
    ("cancel", "Cancel"),
    ("hero.title", "Welcome"),
    ("hero.subtitle", "Build something amazing"),
    ("hero.cta", "Get Started"),
];

const JA_STRINGS: &[(&str, &str)] = &[
    ("home", "ホーム"),
    ("about", "私たちについて"),
    ("services", "サービス"),
    ("contact", "お問い合わせ"),
    ("loading", "読み込み中..."),
    ("error", "エラー"),
    ("success", "成功"),
    ("close", "閉じる"),
    ("submit", "送信"),
    ("cancel", "キャンセル"),
    ("hero.title", "ようこそ"),
    ("hero.subtitle", "素晴らしいものを作りましょう"),
    ("hero.cta", "始める"),
];

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ja,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Ja];

    /// 語系代碼。 / Two-letter language code.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ja => "ja",
        }
    }

    /// 選項資訊。 / Picker metadata for the language.
    pub fn option(self) -> LanguageOption {
        match self {
            Language::En => LanguageOption {
                code: Language::En,
                name: "English",
                native_name: "English",
                flag: "🇺🇸",
            },
            Language::Ja => LanguageOption {
                code: Language::Ja,
                name: "Japanese",
                native_name: "日本語",
                flag: "🇯🇵",
            },
        }
    }

    fn builtin_strings(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Language::En => EN_STRINGS,
            Language::Ja => JA_STRINGS,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language code '{0}'")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|language| language.code().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownLanguage(value.to_string()))
    }
}

/// 語系選項。 / Display metadata for a language picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageOption {
    pub code: Language,
    pub name: &'static str,
    pub native_name: &'static str,
    pub flag: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslationNode {
    Text(String),
    Branch(TranslationTree),
}

/// 巢狀翻譯樹。 / Nested string-keyed translation table for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationTree(BTreeMap<String, TranslationNode>);

impl TranslationTree {
    /// 空白樹。 / Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// 由扁平鍵建立。 / Builds a tree from dotted `path = text` pairs.
    pub fn from_flat<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tree = Self::new();
        for (path, text) in entries {
            tree.insert(path, text);
        }
        tree
    }

    /// 插入字串。 / Inserts `text` at the dotted `path`, replacing any leaf in the way.
    pub fn insert(&mut self, path: &str, text: impl Into<String>) {
        let mut segments = path.split('.').peekable();
        let mut node = &mut self.0;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                node.insert(segment.to_string(), TranslationNode::Text(text.into()));
                return;
            }
            let entry = node
                .entry(segment.to_string())
                .or_insert_with(|| TranslationNode::Branch(TranslationTree::new()));
            if let TranslationNode::Text(_) = *entry {
                *entry = TranslationNode::Branch(TranslationTree::new());
            }
            node = match entry {
                TranslationNode::Branch(branch) => &mut branch.0,
                TranslationNode::Text(_) => return,
            };
        }
    }

    /// 查詢字串。 / Walks `path` one segment at a time; only non-empty text leaves resolve.
    pub fn lookup(&self, path: &str) -> Option<&str> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.0.get(first)?;
        for segment in segments {
            node = match node {
                TranslationNode::Branch(branch) => branch.0.get(segment)?,
                TranslationNode::Text(_) => return None,
            };
        }
        match node {
            TranslationNode::Text(text) if !text.is_empty() => Some(text.as_str()),
            _ => None,
        }
    }

    /// 深度合併。 / Deep-merges `other` into `self`; entries from `other` win on conflict.
    pub fn merge(&mut self, other: TranslationTree) {
        for (key, incoming) in other.0 {
            match incoming {
                TranslationNode::Branch(branch) => {
                    if let Some(TranslationNode::Branch(existing)) = self.0.get_mut(&key) {
                        existing.merge(branch);
                    } else {
                        self.0.insert(key, TranslationNode::Branch(branch));
                    }
                }
                text => {
                    self.0.insert(key, text);
                }
            }
        }
    }

    /// 列出所有鍵。 / Dotted paths of every text leaf, sorted.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        collect_leaf_paths(&self.0, "", &mut paths);
        paths
    }

    /// 是否為空。 / Whether the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn collect_leaf_paths(
    node: &BTreeMap<String, TranslationNode>,
    prefix: &str,
    out: &mut Vec<String>,
) {
    for (key, child) in node {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match child {
            TranslationNode::Text(_) => out.push(path),
            TranslationNode::Branch(branch) => collect_leaf_paths(&branch.0, &path, out),
        }
    }
}

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("failed to read translations {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse translations {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("translations for '{0}' are unavailable")]
    Unavailable(Language),
}

/// 翻譯來源。 / Remote provider of translation trees, keyed by language.
pub trait TranslationSource {
    fn fetch(&self, language: Language) -> Result<TranslationTree, TranslationError>;
}

/// 從目錄提供 `<code>.json` 翻譯檔。 / Serves `<dir>/<code>.json` translation trees.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// 建立目錄來源。 / Serves files from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 翻譯檔路徑。 / File holding the tree for `language`.
    pub fn path_for(&self, language: Language) -> PathBuf {
        self.root.join(format!("{}.json", language.code()))
    }

    /// 來源目錄。 / Directory the files are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TranslationSource for DirectorySource {
    fn fetch(&self, language: Language) -> Result<TranslationTree, TranslationError> {
        let path = self.path_for(language);
        let contents = fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => TranslationError::Unavailable(language),
            _ => TranslationError::Read {
                path: path.clone(),
                source,
            },
        })?;
        serde_json::from_str(&contents).map_err(|source| TranslationError::Parse { path, source })
    }
}

/// 載入憑證。 / Handle for an in-flight translation load.
#[must_use = "pass the ticket to LanguageStore::finish_load"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    language: Language,
    generation: u64,
}

impl LoadTicket {
    /// 載入語系。 / Language being loaded.
    pub fn language(&self) -> Language {
        self.language
    }

    /// 載入世代。 / Sequence number of this load for its language.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load for the same language was issued; the result was dropped.
    Stale,
    /// The fetch failed; the existing table was kept.
    Failed,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedLanguage {
    current: Language,
}

#[derive(Debug)]
pub struct LanguageStore {
    current: Hydration<Language>,
    translations: BTreeMap<Language, TranslationTree>,
    generations: BTreeMap<Language, u64>,
    /// Selection made before hydration, replayed once storage has been read.
    pending: Option<Language>,
    slice: PersistentSlice<PersistedLanguage>,
}

impl LanguageStore {
    /// 建立語言狀態。 / Creates a store seeded with the built-in English and Japanese tables.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        let translations = Language::ALL
            .into_iter()
            .map(|language| {
                let strings = language.builtin_strings().iter().copied();
                (language, TranslationTree::from_flat(strings))
            })
            .collect();
        Self {
            current: Hydration::Uninitialized(Language::default()),
            translations,
            generations: BTreeMap::new(),
            pending: None,
            slice: PersistentSlice::new(LANGUAGE_STORAGE_KEY, backend),
        }
    }

    /// 目前語系。 / Current language.
    pub fn current(&self) -> Language {
        *self.current.value()
    }

    /// 水合狀態。 / Current language with its lifecycle state.
    pub fn state(&self) -> &Hydration<Language> {
        &self.current
    }

    /// 可用語系。 / Picker entries for every supported language.
    pub fn languages(&self) -> Vec<LanguageOption> {
        Language::ALL.into_iter().map(Language::option).collect()
    }

    /// 翻譯表。 / Translation tree for `language`.
    pub fn table(&self, language: Language) -> Option<&TranslationTree> {
        self.translations.get(&language)
    }

    /// 切換語系並保存代碼。 / Switches language and persists the code.
    ///
    /// Before hydration the choice is held back and written only after the
    /// stored preference has been read.
    pub fn select_language(&mut self, language: Language) {
        *self.current.value_mut() = language;
        if self.current.is_loaded() {
            self.persist();
        } else {
            self.pending = Some(language);
        }
    }

    fn persist(&self) {
        self.slice.save(&PersistedLanguage {
            current: self.current(),
        });
    }

    /// 以代碼切換語系。 / Like [`select_language`](Self::select_language) for a raw code; unknown codes are ignored.
    pub fn select_language_code(&mut self, code: &str) -> bool {
        match code.parse::<Language>() {
            Ok(language) => {
                self.select_language(language);
                true
            }
            Err(err) => {
                tracing::debug!(error = %err, "ignoring language switch");
                false
            }
        }
    }

    /// 翻譯字串。 / Resolves `path` in the current language.
    ///
    /// Before hydration this always returns the fallback, or `path` itself when
    /// no fallback is given, so server output and the first client frame agree.
    /// An empty fallback counts as no fallback.
    pub fn translate<'a>(&'a self, path: &'a str, fallback: Option<&'a str>) -> Cow<'a, str> {
        let fallback = fallback.filter(|text| !text.is_empty());
        let or_fallback = || Cow::Borrowed(fallback.unwrap_or(path));
        let Some(language) = self.current.confirmed() else {
            return or_fallback();
        };
        self.translations
            .get(language)
            .and_then(|tree| tree.lookup(path))
            .map(Cow::Borrowed)
            .unwrap_or_else(or_fallback)
    }

    /// 開始載入。 / Starts a load for `language`, superseding any earlier ticket for it.
    pub fn begin_load(&mut self, language: Language) -> LoadTicket {
        let generation = self.generations.entry(language).or_insert(0);
        *generation += 1;
        LoadTicket {
            language,
            generation: *generation,
        }
    }

    /// 完成載入。 / Applies the result of a load if its ticket is still the newest one.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<TranslationTree, TranslationError>,
    ) -> LoadOutcome {
        let latest = self.generations.get(&ticket.language).copied().unwrap_or(0);
        if ticket.generation != latest {
            tracing::debug!(
                language = %ticket.language,
                generation = ticket.generation,
                latest,
                "discarding superseded translation load"
            );
            return LoadOutcome::Stale;
        }
        match result {
            Ok(tree) => {
                self.translations
                    .entry(ticket.language)
                    .or_default()
                    .merge(tree);
                LoadOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(
                    language = %ticket.language,
                    error = %err,
                    "failed to load translations"
                );
                LoadOutcome::Failed
            }
        }
    }

    /// 載入遠端翻譯。 / Fetches and applies a translation tree in one step.
    pub fn load_remote_translations(
        &mut self,
        language: Language,
        source: &dyn TranslationSource,
    ) -> LoadOutcome {
        let ticket = self.begin_load(language);
        let result = source.fetch(language);
        self.finish_load(ticket, result)
    }

    /// 缺漏鍵。 / Leaf paths present in English but absent from `language`.
    pub fn missing_keys(&self, language: Language) -> Vec<String> {
        let Some(reference) = self.translations.get(&Language::En) else {
            return Vec::new();
        };
        let target = self.translations.get(&language);
        reference
            .leaf_paths()
            .into_iter()
            .filter(|path| target.and_then(|tree| tree.lookup(path)).is_none())
            .collect()
    }
}

impl Hydrate for LanguageStore {
    fn hydrate(&mut self) {
        let stored = self.slice.load().map(|persisted| persisted.current);
        let current = std::mem::replace(
            &mut self.current,
            Hydration::Uninitialized(Language::default()),
        );
        self.current = current.hydrate_with(stored);
        if let Some(language) = self.pending.take() {
            *self.current.value_mut() = language;
            self.persist();
        }
    }

    fn is_hydrated(&self) -> bool {
        self.current.is_loaded()
    }
}
