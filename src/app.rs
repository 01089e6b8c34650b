use std::time::Instant;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::catalog::{Catalog, Language, NodePath, Verse, VerseId};
use crate::config::Config;
use crate::engine::{Level, NavigationError, Navigator, Selection, ViewMode};
use crate::session::{GameError, GameSession};
use crate::store::{KeyValueStore, ProgressKind, ProgressTracker};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Browse,
    Scope,
    Game,
}

/// A user action, as produced by the front end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    SelectCategory(String),
    SelectSubcategory(String),
    SelectSubsubcategory(String),
    GoBack,
    GoHome,
    ToggleFavorite(VerseId),
    ToggleCompleted(VerseId),
    ToggleLanguage,
    SetViewMode(ViewMode),
    ToggleScopeCategory(String),
    ToggleScopeSubcategory(String, String),
    ToggleScopeSubsubcategory(String, String, String),
    StartGame(VerseId),
    StartRandomGame,
    Peek,
    Check(String),
    ExitGame,
    NextRandomVerse,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Game(#[from] GameError),
}

pub struct App {
    pub screen: AppScreen,
    pub catalog: Catalog,
    pub navigator: Navigator,
    pub selection: Selection,
    pub progress: ProgressTracker,
    pub session: Option<GameSession>,
    pub language: Language,
    pub config: Config,
    pub status: Option<String>,
    pub should_quit: bool,
    pub browse_selected: usize,
    pub scope_selected: usize,
    rng: SmallRng,
}

impl App {
    pub fn new(
        catalog: Catalog,
        store: Box<dyn KeyValueStore>,
        config: Config,
        rng: SmallRng,
    ) -> Self {
        let progress = ProgressTracker::load(store, &catalog);
        Self {
            screen: AppScreen::Browse,
            navigator: Navigator::new(),
            selection: Selection::new(),
            progress,
            session: None,
            language: config.language,
            config,
            status: None,
            should_quit: false,
            browse_selected: 0,
            scope_selected: 0,
            catalog,
            rng,
        }
    }

    pub fn dispatch(&mut self, intent: Intent) -> Result<(), AppError> {
        tracing::debug!("dispatch {intent:?}");
        match intent {
            Intent::SelectCategory(c) => self.select_category(&c)?,
            Intent::SelectSubcategory(s) => self.select_subcategory(&s)?,
            Intent::SelectSubsubcategory(ss) => self.select_subsubcategory(&ss)?,
            Intent::GoBack => self.go_back(),
            Intent::GoHome => self.go_home(),
            Intent::ToggleFavorite(id) => {
                self.toggle_favorite(&id);
            }
            Intent::ToggleCompleted(id) => {
                self.toggle_completed(&id);
            }
            Intent::ToggleLanguage => self.toggle_language(),
            Intent::SetViewMode(mode) => self.set_view_mode(mode),
            Intent::ToggleScopeCategory(c) => {
                self.toggle_scope_category(&c);
            }
            Intent::ToggleScopeSubcategory(c, s) => {
                self.toggle_scope_subcategory(&c, &s);
            }
            Intent::ToggleScopeSubsubcategory(c, s, ss) => {
                self.toggle_scope_subsubcategory(&c, &s, &ss);
            }
            Intent::StartGame(id) => self.start_game(&id)?,
            Intent::StartRandomGame => self.start_random_game()?,
            Intent::Peek => self.peek(Instant::now())?,
            Intent::Check(input) => {
                self.check(&input)?;
            }
            Intent::ExitGame => self.exit_game(),
            Intent::NextRandomVerse => self.next_random_verse()?,
        }
        Ok(())
    }

    // --- Navigation ---

    pub fn select_category(&mut self, category: &str) -> Result<(), AppError> {
        self.navigator
            .select_category(self.catalog.hierarchy(), category)?;
        self.browse_selected = 0;
        Ok(())
    }

    pub fn select_subcategory(&mut self, subcategory: &str) -> Result<(), AppError> {
        self.navigator
            .select_subcategory(self.catalog.hierarchy(), subcategory)?;
        self.browse_selected = 0;
        Ok(())
    }

    pub fn select_subsubcategory(&mut self, subsubcategory: &str) -> Result<(), AppError> {
        self.navigator
            .select_subsubcategory(self.catalog.hierarchy(), subsubcategory)?;
        self.browse_selected = 0;
        Ok(())
    }

    pub fn go_back(&mut self) {
        self.navigator.go_back();
        self.browse_selected = 0;
    }

    pub fn go_home(&mut self) {
        self.navigator.go_home();
        if self.session.is_some() {
            self.exit_game();
        }
        self.screen = AppScreen::Browse;
        self.browse_selected = 0;
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.navigator.set_view_mode(mode);
        self.browse_selected = 0;
    }

    pub fn toggle_language(&mut self) {
        self.language = self.language.toggled();
        self.config.language = self.language;
    }

    /// Labels listed on the current browse screen.
    pub fn listing(&self) -> &[String] {
        self.navigator.listing(self.catalog.hierarchy())
    }

    /// Verses shown on the verse list for the current view.
    pub fn visible_verses(&self) -> Vec<&Verse> {
        match self.navigator.view_mode() {
            ViewMode::Favorites => self
                .catalog
                .filter(|v| self.progress.contains(ProgressKind::Favorites, &v.id())),
            ViewMode::Completed => self
                .catalog
                .filter(|v| self.progress.contains(ProgressKind::Completed, &v.id())),
            ViewMode::Normal if self.navigator.level() == Level::Verses => {
                self.catalog.under(self.navigator.path())
            }
            ViewMode::Normal => Vec::new(),
        }
    }

    // --- Progress ---

    pub fn toggle_favorite(&mut self, id: &VerseId) -> bool {
        let present = self.progress.toggle(ProgressKind::Favorites, id);
        self.clamp_browse_cursor();
        present
    }

    pub fn toggle_completed(&mut self, id: &VerseId) -> bool {
        let present = self.progress.toggle(ProgressKind::Completed, id);
        self.clamp_browse_cursor();
        present
    }

    /// Keep the cursor on a row after the favorites/completed list shrinks.
    fn clamp_browse_cursor(&mut self) {
        let len = self.browse_len();
        self.browse_selected = self.browse_selected.min(len.saturating_sub(1));
    }

    pub fn is_favorite(&self, id: &VerseId) -> bool {
        self.progress.contains(ProgressKind::Favorites, id)
    }

    pub fn is_completed(&self, id: &VerseId) -> bool {
        self.progress.contains(ProgressKind::Completed, id)
    }

    // --- Training scope ---

    pub fn toggle_scope(&mut self, path: &NodePath) -> bool {
        self.selection.toggle(self.catalog.hierarchy(), path)
    }

    pub fn toggle_scope_category(&mut self, category: &str) -> bool {
        self.selection
            .toggle_category(self.catalog.hierarchy(), category)
    }

    pub fn toggle_scope_subcategory(&mut self, category: &str, subcategory: &str) -> bool {
        self.selection
            .toggle_subcategory(self.catalog.hierarchy(), category, subcategory)
    }

    pub fn toggle_scope_subsubcategory(
        &mut self,
        category: &str,
        subcategory: &str,
        subsubcategory: &str,
    ) -> bool {
        self.selection.toggle_subsubcategory(
            self.catalog.hierarchy(),
            category,
            subcategory,
            subsubcategory,
        )
    }

    /// Drop every scope selection; random practice then draws from all verses.
    pub fn clear_scope(&mut self) {
        self.selection.clear();
    }

    pub fn scope_summary(&self) -> String {
        self.selection.summary().render(self.language)
    }

    /// Verses random practice may draw from.
    pub fn random_pool(&self) -> Vec<&Verse> {
        scoped_pool(&self.catalog, &self.selection)
    }

    // --- Practice ---

    pub fn start_game(&mut self, id: &VerseId) -> Result<(), AppError> {
        let verse = self
            .catalog
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::UnknownVerse(id.clone()))?;
        self.begin(verse);
        Ok(())
    }

    pub fn start_random_game(&mut self) -> Result<(), AppError> {
        let verse = self.pick_random()?;
        self.begin(verse);
        Ok(())
    }

    /// Replace the current round with a fresh random verse from the same scope.
    /// On an empty pool the current round is left untouched.
    pub fn next_random_verse(&mut self) -> Result<(), AppError> {
        let verse = self.pick_random()?;
        self.exit_game();
        self.begin(verse);
        Ok(())
    }

    fn pick_random(&mut self) -> Result<Verse, GameError> {
        let pool = scoped_pool(&self.catalog, &self.selection);
        pool.choose(&mut self.rng)
            .map(|v| (*v).clone())
            .ok_or(GameError::EmptyPool)
    }

    fn begin(&mut self, verse: Verse) {
        tracing::debug!("starting practice on {}", verse.id());
        self.session = Some(GameSession::new(verse, self.config.peek_window()));
        self.screen = AppScreen::Game;
        self.status = None;
    }

    fn session_mut(&mut self) -> Result<&mut GameSession, GameError> {
        self.session.as_mut().ok_or(GameError::NoActiveSession)
    }

    pub fn peek(&mut self, now: Instant) -> Result<(), AppError> {
        self.session_mut()?.peek(now);
        Ok(())
    }

    /// Store `input` as the attempt and score it.
    pub fn check(&mut self, input: &str) -> Result<u8, AppError> {
        let language = self.language;
        let session = self.session_mut()?;
        session.set_input(input);
        Ok(session.check(language))
    }

    /// Score whatever has been typed so far.
    pub fn check_typed(&mut self) -> Result<u8, AppError> {
        let language = self.language;
        Ok(self.session_mut()?.check(language))
    }

    pub fn exit_game(&mut self) {
        self.session = None;
        self.screen = AppScreen::Browse;
    }

    /// Toggle the practised verse in the memorized set.
    pub fn mark_current_completed(&mut self) -> Result<bool, AppError> {
        let id = self
            .session
            .as_ref()
            .map(|s| s.verse().id())
            .ok_or(GameError::NoActiveSession)?;
        Ok(self.toggle_completed(&id))
    }

    /// Drop an elapsed peek reveal.
    pub fn tick(&mut self, now: Instant) {
        if let Some(ref mut session) = self.session {
            session.expire_reveal(now);
        }
    }

    /// Record the outcome of a front-end action in the status line.
    pub fn report<T>(&mut self, result: Result<T, AppError>) {
        if let Err(e) = result {
            tracing::warn!("{e}");
            self.status = Some(e.to_string());
        }
    }

    // --- Browse cursor ---

    pub fn browse_len(&self) -> usize {
        if self.navigator.level() == Level::Verses {
            self.visible_verses().len()
        } else {
            self.listing().len()
        }
    }

    pub fn browse_next(&mut self) {
        let len = self.browse_len();
        if len > 0 {
            self.browse_selected = (self.browse_selected + 1) % len;
        }
    }

    pub fn browse_prev(&mut self) {
        let len = self.browse_len();
        if len > 0 {
            self.browse_selected = if self.browse_selected == 0 {
                len - 1
            } else {
                self.browse_selected - 1
            };
        }
    }

    /// Verse under the cursor on the verse list.
    pub fn selected_verse(&self) -> Option<VerseId> {
        if self.navigator.level() != Level::Verses {
            return None;
        }
        self.visible_verses()
            .get(self.browse_selected)
            .map(|v| v.id())
    }

    /// Enter on the browse screen: descend, or practise the highlighted verse.
    pub fn activate_selected(&mut self) -> Result<(), AppError> {
        if let Some(id) = self.selected_verse() {
            return self.start_game(&id);
        }
        let Some(label) = self.listing().get(self.browse_selected).cloned() else {
            return Ok(());
        };
        self.navigator.select(self.catalog.hierarchy(), &label)?;
        self.browse_selected = 0;
        Ok(())
    }

    // --- Scope screen ---

    pub fn go_to_scope(&mut self) {
        self.scope_selected = 0;
        self.screen = AppScreen::Scope;
    }

    pub fn leave_scope(&mut self) {
        self.screen = if self.session.is_some() {
            AppScreen::Game
        } else {
            AppScreen::Browse
        };
    }

    /// Hierarchy rows shown on the scope screen.
    pub fn scope_rows(&self) -> Vec<NodePath> {
        self.catalog.hierarchy().walk()
    }

    pub fn scope_next(&mut self) {
        let len = self.scope_rows().len();
        if len > 0 {
            self.scope_selected = (self.scope_selected + 1) % len;
        }
    }

    pub fn scope_prev(&mut self) {
        let len = self.scope_rows().len();
        if len > 0 {
            self.scope_selected = if self.scope_selected == 0 {
                len - 1
            } else {
                self.scope_selected - 1
            };
        }
    }

    pub fn toggle_selected_scope_row(&mut self) {
        if let Some(path) = self.scope_rows().get(self.scope_selected).cloned() {
            self.toggle_scope(&path);
        }
    }
}

fn scoped_pool<'a>(catalog: &'a Catalog, selection: &Selection) -> Vec<&'a Verse> {
    catalog.filter(|v| selection.matches(catalog.hierarchy(), v))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::store::MemoryStore;

    fn verse(category: &str, sub: &str, subsub: Option<&str>, number: u32) -> Verse {
        Verse {
            category: category.to_string(),
            subcategory: sub.to_string(),
            subsubcategory: subsub.map(str::to_string),
            number,
            book: "b".to_string(),
            chapter: 1,
            verse1: number,
            verse2: None,
            versename: None,
            korean_text: format!("말씀 {number}"),
            english_text: format!("word {number}"),
        }
    }

    fn make_app() -> (MemoryStore, App) {
        let catalog = Catalog::new(vec![
            verse("A", "S1", Some("X"), 2),
            verse("A", "S1", Some("X"), 1),
            verse("A", "S2", Some("Y"), 3),
            verse("B", "S3", None, 1),
            verse("A", "S1", Some("W"), 1),
        ])
        .unwrap();
        let store = MemoryStore::new();
        let app = App::new(
            catalog,
            Box::new(store.clone()),
            Config::default(),
            SmallRng::seed_from_u64(7),
        );
        (store, app)
    }

    #[test]
    fn verse_list_is_sorted_by_number() {
        let (_store, mut app) = make_app();
        app.select_category("A").unwrap();
        app.select_subcategory("S1").unwrap();
        app.select_subsubcategory("X").unwrap();
        let numbers: Vec<u32> = app.visible_verses().iter().map(|v| v.number).collect();
        assert_eq!(numbers, [1, 2]);
    }

    #[test]
    fn favorites_view_lists_favorites_from_any_level() {
        let (_store, mut app) = make_app();
        app.toggle_favorite(&VerseId::from("B/S3/1"));
        app.set_view_mode(ViewMode::Favorites);
        assert_eq!(app.navigator.level(), Level::Verses);
        let ids: Vec<VerseId> = app.visible_verses().iter().map(|v| v.id()).collect();
        assert_eq!(ids, [VerseId::from("B/S3/1")]);

        app.go_back();
        assert_eq!(app.navigator.view_mode(), ViewMode::Normal);
        assert_eq!(app.navigator.level(), Level::Categories);
    }

    #[test]
    fn cursor_follows_shrinking_favorites_list() {
        let (_store, mut app) = make_app();
        app.toggle_favorite(&VerseId::from("A/S1/X/1"));
        app.toggle_favorite(&VerseId::from("B/S3/1"));
        app.set_view_mode(ViewMode::Favorites);
        app.browse_next();
        assert_eq!(app.selected_verse(), Some(VerseId::from("B/S3/1")));

        app.toggle_favorite(&VerseId::from("B/S3/1"));
        assert_eq!(app.browse_selected, 0);
        assert_eq!(app.selected_verse(), Some(VerseId::from("A/S1/X/1")));

        app.toggle_favorite(&VerseId::from("A/S1/X/1"));
        assert_eq!(app.browse_selected, 0);
        assert_eq!(app.selected_verse(), None);
    }

    #[test]
    fn clearing_scope_reopens_the_whole_catalog() {
        let (_store, mut app) = make_app();
        app.toggle_scope_category("B");
        assert_eq!(app.random_pool().len(), 1);

        app.clear_scope();
        assert_eq!(app.random_pool().len(), app.catalog.len());
    }

    #[test]
    fn dispatch_routes_intents() {
        let (_store, mut app) = make_app();
        app.dispatch(Intent::SelectCategory("A".to_string())).unwrap();
        assert_eq!(app.navigator.level(), Level::Subcategories);
        let err = app
            .dispatch(Intent::SelectSubsubcategory("X".to_string()))
            .unwrap_err();
        assert!(matches!(err, AppError::Navigation(_)));

        app.dispatch(Intent::ToggleLanguage).unwrap();
        assert_eq!(app.language, Language::English);

        app.dispatch(Intent::ToggleScopeSubcategory("A".to_string(), "S1".to_string()))
            .unwrap();
        assert!(app.selection.is_selected(&NodePath::from_labels(["A", "S1", "X"])));
    }

    #[test]
    fn home_ends_an_active_game() {
        let (_store, mut app) = make_app();
        app.select_category("A").unwrap();
        app.start_game(&VerseId::from("A/S1/X/1")).unwrap();
        assert_eq!(app.screen, AppScreen::Game);
        app.go_home();
        assert!(app.session.is_none());
        assert_eq!(app.screen, AppScreen::Browse);
        assert_eq!(app.navigator.level(), Level::Categories);
    }

    #[test]
    fn unknown_verse_cannot_start() {
        let (_store, mut app) = make_app();
        let err = app.start_game(&VerseId::from("nope")).unwrap_err();
        assert_eq!(err, AppError::Game(GameError::UnknownVerse(VerseId::from("nope"))));
        assert!(app.session.is_none());
    }

    #[test]
    fn session_actions_need_a_session() {
        let (_store, mut app) = make_app();
        assert_eq!(
            app.check("x").unwrap_err(),
            AppError::Game(GameError::NoActiveSession)
        );
        assert!(app.peek(Instant::now()).is_err());
        assert!(app.mark_current_completed().is_err());
    }

    #[test]
    fn check_uses_active_language() {
        let (_store, mut app) = make_app();
        app.start_game(&VerseId::from("B/S3/1")).unwrap();
        assert_eq!(app.check("word 1").unwrap(), 50);
        app.toggle_language();
        assert_eq!(app.check("word 1").unwrap(), 100);
        let session = app.session.as_ref().unwrap();
        assert!(session.is_completed());
        assert_eq!(session.check_count(), 2);
        assert!(!app.is_completed(&VerseId::from("B/S3/1")));
    }

    #[test]
    fn mark_completed_persists() {
        let (store, mut app) = make_app();
        app.start_game(&VerseId::from("B/S3/1")).unwrap();
        assert!(app.mark_current_completed().unwrap());
        assert_eq!(
            store.get("completedVerses").unwrap().as_deref(),
            Some("[\"B/S3/1\"]")
        );
    }

    #[test]
    fn empty_pool_is_reported_and_keeps_session() {
        let (_store, mut app) = make_app();
        app.start_game(&VerseId::from("B/S3/1")).unwrap();
        app.session.as_mut().unwrap().set_input("word");

        // Category B on one tier, A/S1/X on another: nothing satisfies both.
        app.toggle_scope_subsubcategory("A", "S1", "X");
        app.toggle_scope_category("B");
        assert!(app.random_pool().is_empty());

        assert_eq!(
            app.next_random_verse().unwrap_err(),
            AppError::Game(GameError::EmptyPool)
        );
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.verse().id(), VerseId::from("B/S3/1"));
        assert_eq!(session.input(), "word");

        app.exit_game();
        assert!(app.start_random_game().is_err());
        assert!(app.session.is_none());
        assert_eq!(app.screen, AppScreen::Browse);
    }

    #[test]
    fn random_game_draws_from_scope() {
        let (_store, mut app) = make_app();
        app.toggle_scope_category("B");
        for _ in 0..20 {
            app.next_random_verse().unwrap();
            assert_eq!(
                app.session.as_ref().unwrap().verse().id(),
                VerseId::from("B/S3/1")
            );
        }
    }

    #[test]
    fn activate_descends_then_starts_game() {
        let (_store, mut app) = make_app();
        app.browse_next();
        app.activate_selected().unwrap();
        assert_eq!(app.navigator.path(), &NodePath::from_labels(["B"]));
        app.activate_selected().unwrap();
        assert_eq!(app.navigator.level(), Level::Verses);
        app.activate_selected().unwrap();
        assert_eq!(app.screen, AppScreen::Game);
        assert_eq!(
            app.session.as_ref().unwrap().verse().id(),
            VerseId::from("B/S3/1")
        );
    }

    #[test]
    fn scope_rows_toggle_from_cursor() {
        let (_store, mut app) = make_app();
        app.go_to_scope();
        app.toggle_selected_scope_row();
        assert!(app.selection.is_selected(&NodePath::from_labels(["A"])));
        assert_eq!(app.scope_summary(), "1개 카테고리, 2개 서브카테고리, 3개 세부 카테고리 선택됨");
        app.leave_scope();
        assert_eq!(app.screen, AppScreen::Browse);
    }

    #[test]
    fn report_sets_status_line() {
        let (_store, mut app) = make_app();
        let result = app.select_subcategory("S1");
        app.report(result);
        assert!(app.status.as_deref().unwrap().contains("categories"));
    }
}
