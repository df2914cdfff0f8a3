use std::fs;
use std::sync::Arc;

use snapdeck_state::{
    DirectorySource, Hydrate, Language, LanguageStore, LoadOutcome, MemoryStorage,
    TranslationError, TranslationSource,
};
use tempfile::tempdir;

fn hydrated() -> LanguageStore {
    let mut store = LanguageStore::new(Arc::new(MemoryStorage::new()));
    store.hydrate();
    store
}

#[test]
fn directory_source_serves_nested_json() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("ja.json"),
        r#"{ "hero": { "title": "いらっしゃいませ" }, "pricing": "料金" }"#,
    )
    .expect("write ja");

    let source = DirectorySource::new(dir.path());
    let mut store = hydrated();
    assert_eq!(
        store.load_remote_translations(Language::Ja, &source),
        LoadOutcome::Applied
    );

    store.select_language(Language::Ja);
    assert_eq!(store.translate("hero.title", None), "いらっしゃいませ");
    assert_eq!(store.translate("hero.cta", None), "始める");
    assert_eq!(store.translate("pricing", None), "料金");
}

#[test]
fn missing_file_reports_unavailable() {
    let dir = tempdir().expect("tempdir");
    let source = DirectorySource::new(dir.path());
    assert!(matches!(
        source.fetch(Language::En),
        Err(TranslationError::Unavailable(Language::En))
    ));

    let mut store = hydrated();
    assert_eq!(
        store.load_remote_translations(Language::En, &source),
        LoadOutcome::Failed
    );
    assert_eq!(store.translate("home", None), "Home");
}

#[test]
fn invalid_json_is_logged_not_raised() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("en.json"), "[1, 2, 3]").expect("write en");
    let source = DirectorySource::new(dir.path());
    assert!(matches!(
        source.fetch(Language::En),
        Err(TranslationError::Parse { .. })
    ));

    let mut store = hydrated();
    assert_eq!(
        store.load_remote_translations(Language::En, &source),
        LoadOutcome::Failed
    );
    assert_eq!(store.translate("hero.title", Some("x")), "Welcome");
}

#[test]
fn out_of_order_completion_keeps_newest_result() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("en.json"), r#"{ "home": "Newest" }"#).expect("write en");
    let source = DirectorySource::new(dir.path());

    let mut store = hydrated();
    let older = store.begin_load(Language::En);
    let newer = store.begin_load(Language::En);
    assert!(newer.generation() > older.generation());

    let newer_result = source.fetch(Language::En);
    assert_eq!(store.finish_load(newer, newer_result), LoadOutcome::Applied);
    let older_result = source.fetch(Language::En);
    assert_eq!(store.finish_load(older, older_result), LoadOutcome::Stale);
    assert_eq!(store.translate("home", None), "Newest");
}
