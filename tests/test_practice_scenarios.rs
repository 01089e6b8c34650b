use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use verse_drill::app::{App, AppError, AppScreen, Intent};
use verse_drill::catalog::{Catalog, Language, NodePath, UNGROUPED, Verse, VerseId};
use verse_drill::config::Config;
use verse_drill::engine::{Level, ViewMode};
use verse_drill::session::GameError;
use verse_drill::store::json_store::{load_export, save_export};
use verse_drill::store::schema::ExportData;
use verse_drill::store::{JsonStore, KeyValueStore, MemoryStore, ProgressKind};

fn verse(category: &str, subcategory: &str, number: u32) -> Verse {
    Verse {
        category: category.to_string(),
        subcategory: subcategory.to_string(),
        subsubcategory: None,
        number,
        book: "시편".to_string(),
        chapter: 23,
        verse1: number,
        verse2: None,
        versename: None,
        korean_text: format!("여호와는 나의 목자시니 {number}"),
        english_text: format!("The LORD is my shepherd {number}"),
    }
}

/// Ten verses, five in each of two categories.
fn two_category_catalog() -> Catalog {
    let mut verses = Vec::new();
    for number in 1..=5 {
        verses.push(verse("A", if number <= 3 { "A1" } else { "A2" }, number));
    }
    for number in 1..=5 {
        verses.push(verse("B", "B1", number));
    }
    Catalog::new(verses).unwrap()
}

fn make_app(catalog: Catalog, store: Box<dyn KeyValueStore>) -> App {
    App::new(catalog, store, Config::default(), SmallRng::seed_from_u64(42))
}

#[test]
fn random_practice_stays_inside_scope() {
    let mut app = make_app(two_category_catalog(), Box::new(MemoryStore::new()));
    app.dispatch(Intent::ToggleScopeCategory("A".to_string()))
        .unwrap();
    assert_eq!(app.random_pool().len(), 5);

    let mut seen = BTreeSet::new();
    for _ in 0..1000 {
        app.dispatch(Intent::StartRandomGame).unwrap();
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.verse().category, "A");
        seen.insert(session.verse().id());
        app.dispatch(Intent::ExitGame).unwrap();
    }
    assert_eq!(seen.len(), 5, "every in-scope verse is eventually drawn");
}

#[test]
fn empty_scope_reports_and_stays_idle() {
    let catalog = Catalog::new(vec![
        Verse {
            subsubcategory: Some("X".to_string()),
            ..verse("A", "A1", 1)
        },
        Verse {
            subsubcategory: Some("W".to_string()),
            ..verse("A", "A1", 2)
        },
        verse("B", "B1", 1),
    ])
    .unwrap();
    let mut app = make_app(catalog, Box::new(MemoryStore::new()));

    app.dispatch(Intent::ToggleScopeSubsubcategory(
        "A".to_string(),
        "A1".to_string(),
        "X".to_string(),
    ))
    .unwrap();
    app.dispatch(Intent::ToggleScopeCategory("B".to_string()))
        .unwrap();

    let err = app.dispatch(Intent::StartRandomGame).unwrap_err();
    assert_eq!(err, AppError::Game(GameError::EmptyPool));
    assert_eq!(err.to_string(), "no verses match the current scope");
    assert!(app.session.is_none());
    assert_eq!(app.screen, AppScreen::Browse);
}

#[test]
fn verses_beside_subsubcategories_are_browsable_and_scoped() {
    let catalog = Catalog::new(vec![
        Verse {
            subsubcategory: Some("X".to_string()),
            ..verse("A", "S1", 1)
        },
        verse("A", "S1", 2),
    ])
    .unwrap();
    let mut app = make_app(catalog, Box::new(MemoryStore::new()));

    app.dispatch(Intent::SelectCategory("A".to_string())).unwrap();
    app.dispatch(Intent::SelectSubcategory("S1".to_string()))
        .unwrap();
    assert_eq!(app.listing(), ["X", UNGROUPED]);
    app.dispatch(Intent::SelectSubsubcategory(UNGROUPED.to_string()))
        .unwrap();
    let listed: Vec<VerseId> = app.visible_verses().iter().map(|v| v.id()).collect();
    assert_eq!(listed, [VerseId::from("A/S1/2")]);

    app.dispatch(Intent::ToggleScopeSubsubcategory(
        "A".to_string(),
        "S1".to_string(),
        "X".to_string(),
    ))
    .unwrap();
    let pool: Vec<VerseId> = app.random_pool().iter().map(|v| v.id()).collect();
    assert_eq!(pool, [VerseId::from("A/S1/X/1")]);
    for _ in 0..50 {
        app.dispatch(Intent::StartRandomGame).unwrap();
        assert_eq!(app.session.as_ref().unwrap().verse().number, 1);
        app.dispatch(Intent::ExitGame).unwrap();
    }
}

#[test]
fn korean_recitation_end_to_end() {
    let catalog = Catalog::new(vec![Verse {
        korean_text: "나는 주님을 사랑합니다".to_string(),
        english_text: "I love the Lord".to_string(),
        ..verse("C", "S1", 1)
    }])
    .unwrap();
    let mut app = make_app(catalog, Box::new(MemoryStore::new()));
    assert_eq!(app.language, Language::Korean);

    let id = VerseId::from("C/S1/1");
    app.dispatch(Intent::StartGame(id.clone())).unwrap();
    app.dispatch(Intent::Check("나는 주님을 사랑합니다".to_string()))
        .unwrap();

    let session = app.session.as_ref().unwrap();
    assert_eq!(session.accuracy(), Some(100));
    assert!(session.is_completed());
    assert_eq!(session.check_count(), 1);
    assert!(!app.is_completed(&id), "checking never touches saved progress");

    app.dispatch(Intent::NextRandomVerse).unwrap();
    let session = app.session.as_ref().unwrap();
    assert_eq!(session.accuracy(), None);
    assert_eq!(session.check_count(), 0);
}

#[test]
fn peek_reveal_expires_on_tick() {
    let mut app = make_app(two_category_catalog(), Box::new(MemoryStore::new()));
    app.start_game(&VerseId::from("B/B1/2")).unwrap();

    let start = Instant::now();
    app.peek(start).unwrap();
    app.peek(start + Duration::from_millis(1000)).unwrap();
    let session = app.session.as_ref().unwrap();
    assert_eq!(session.peek_count(), 2);
    assert!(session.is_revealed(start + Duration::from_millis(2000)));

    app.tick(start + Duration::from_millis(2600));
    let session = app.session.as_ref().unwrap();
    assert!(!session.is_revealed(start + Duration::from_millis(2600)));
}

#[test]
fn navigation_round_trip() {
    let mut app = make_app(two_category_catalog(), Box::new(MemoryStore::new()));
    let before = app.listing().to_vec();

    app.dispatch(Intent::SelectCategory("A".to_string())).unwrap();
    assert_eq!(app.navigator.level(), Level::Subcategories);
    assert_eq!(app.listing(), ["A1", "A2"]);

    app.dispatch(Intent::SelectSubcategory("A2".to_string()))
        .unwrap();
    assert_eq!(app.navigator.level(), Level::Verses);
    let numbers: Vec<u32> = app.visible_verses().iter().map(|v| v.number).collect();
    assert_eq!(numbers, [4, 5]);

    app.dispatch(Intent::GoBack).unwrap();
    app.dispatch(Intent::GoBack).unwrap();
    assert_eq!(app.navigator.level(), Level::Categories);
    assert_eq!(app.navigator.path(), &NodePath::root());
    assert_eq!(app.listing(), before.as_slice());
}

#[test]
fn favorites_survive_reload_from_disk() {
    let dir = TempDir::new().unwrap();
    let id = VerseId::from("A/A2/4");

    {
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut app = make_app(two_category_catalog(), Box::new(store));
        app.dispatch(Intent::ToggleFavorite(id.clone())).unwrap();
        app.dispatch(Intent::ToggleCompleted(VerseId::from("B/B1/1")))
            .unwrap();
    }

    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let mut app = make_app(two_category_catalog(), Box::new(store));
    assert!(app.is_favorite(&id));
    assert!(app.is_completed(&VerseId::from("B/B1/1")));

    app.dispatch(Intent::SetViewMode(ViewMode::Favorites))
        .unwrap();
    let listed: Vec<VerseId> = app.visible_verses().iter().map(|v| v.id()).collect();
    assert_eq!(listed, [id.clone()]);

    app.dispatch(Intent::ToggleFavorite(id.clone())).unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let app = make_app(two_category_catalog(), Box::new(store));
    assert!(!app.is_favorite(&id));
}

#[test]
fn legacy_progress_is_migrated_on_load() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    store.set("favorites", r#"["A2-5", "gone-1"]"#).unwrap();

    let app = make_app(two_category_catalog(), Box::new(store));
    assert!(app.is_favorite(&VerseId::from("A/A2/5")));

    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    assert_eq!(
        store.get("favorites").unwrap().as_deref(),
        Some(r#"["A/A2/5","gone-1"]"#)
    );
}

#[test]
fn export_then_import_into_fresh_store() {
    let dir = TempDir::new().unwrap();
    let export_path = dir.path().join("progress.json");

    let mut app = make_app(two_category_catalog(), Box::new(MemoryStore::new()));
    app.toggle_completed(&VerseId::from("A/A1/1"));
    app.toggle_favorite(&VerseId::from("B/B1/3"));
    save_export(&export_path, &app.progress.export()).unwrap();

    let data: ExportData = load_export(&export_path).unwrap();
    let catalog = two_category_catalog();
    let mut fresh = make_app(two_category_catalog(), Box::new(MemoryStore::new()));
    assert_eq!(fresh.progress.import(data, &catalog), 0);
    assert!(fresh.progress.contains(ProgressKind::Completed, &VerseId::from("A/A1/1")));
    assert!(fresh.progress.contains(ProgressKind::Favorites, &VerseId::from("B/B1/3")));
}

#[test]
fn bundled_dataset_is_browsable() {
    let catalog = Catalog::load_embedded().unwrap();
    assert!(!catalog.is_empty());
    let mut app = make_app(catalog, Box::new(MemoryStore::new()));

    // Walk down the first branch until verses are listed.
    while app.navigator.level() != Level::Verses {
        app.activate_selected().unwrap();
    }
    assert!(!app.visible_verses().is_empty());
    app.activate_selected().unwrap();
    assert_eq!(app.screen, AppScreen::Game);
}
