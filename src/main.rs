use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing_subscriber::EnvFilter;

use verse_drill::app::{App, AppScreen};
use verse_drill::catalog::{Catalog, Language, NodePath, VerseId};
use verse_drill::config::Config;
use verse_drill::engine::{Level, ViewMode, scoring};
use verse_drill::event::{AppEvent, EventHandler};
use verse_drill::store::json_store::{load_export, save_export};
use verse_drill::store::{JsonStore, ProgressKind, ProgressTracker};
use verse_drill::ui::components::accuracy_bar::AccuracyBar;
use verse_drill::ui::components::browse_list::{BrowseItem, BrowseList};
use verse_drill::ui::components::progress_sidebar::ProgressSidebar;
use verse_drill::ui::components::scope_tree::ScopeTree;
use verse_drill::ui::components::verse_area::VerseArea;
use verse_drill::ui::layout::AppLayout;
use verse_drill::ui::theme::Theme;

#[derive(Parser)]
#[command(name = "verse-drill", version, about = "Terminal Bible verse memorization trainer")]
struct Cli {
    /// Show and score the English text
    #[arg(long, global = true)]
    english: bool,

    /// Verse dataset to use instead of the bundled one
    #[arg(long, global = true, value_name = "FILE")]
    verses: Option<PathBuf>,

    /// Directory holding saved progress
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the groups or verses under a category path
    List {
        #[arg(num_args = 0..=3, value_name = "LABEL")]
        path: Vec<String>,
    },

    /// Score a recitation against a verse
    Check { verse_id: String, text: String },

    /// Write favorites and memorized verses to a file
    Export { file: PathBuf },

    /// Replace saved progress with the contents of an export file
    Import { file: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let saved_config = Config::load().context("loading config")?;
    let mut config = saved_config.clone();
    if cli.english {
        config.language = Language::English;
    }
    if let Some(path) = cli.verses {
        config.verses_path = Some(path);
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }

    init_logging(&config.data_dir)?;

    let catalog = Catalog::load(config.verses_path.as_deref())?;
    tracing::info!("catalog ready with {} verses", catalog.len());
    let store = JsonStore::with_base_dir(config.data_dir.clone())?;

    match cli.command {
        Some(Commands::List { path }) => list(&catalog, &path, config.language),
        Some(Commands::Check { verse_id, text }) => check(&catalog, &verse_id, &text, config.language),
        Some(Commands::Export { file }) => {
            let tracker = ProgressTracker::load(Box::new(store), &catalog);
            let data = tracker.export();
            save_export(&file, &data)?;
            println!(
                "Exported {} memorized and {} favorite verses to {}",
                data.completed.len(),
                data.favorites.len(),
                file.display()
            );
            Ok(())
        }
        Some(Commands::Import { file }) => {
            let data = load_export(&file)?;
            let mut tracker = ProgressTracker::load(Box::new(store), &catalog);
            let dropped = tracker.import(data, &catalog);
            println!(
                "Imported {} memorized and {} favorite verses ({dropped} unknown ids skipped)",
                tracker.ids(ProgressKind::Completed).len(),
                tracker.ids(ProgressKind::Favorites).len(),
            );
            Ok(())
        }
        None => run_tui(catalog, store, config, saved_config),
    }
}

/// The terminal owns stdout, so logs go to `<data_dir>/verse-drill.log`.
fn init_logging(data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir).with_context(|| format!("creating {}", data_dir.display()))?;
    let log_path = data_dir.join("verse-drill.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening {}", log_path.display()))?;

    let filter = EnvFilter::try_from_env("VERSE_DRILL_LOG")
        .unwrap_or_else(|_| EnvFilter::new("verse_drill=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn list(catalog: &Catalog, labels: &[String], language: Language) -> Result<()> {
    let path = NodePath::from_labels(labels);
    let hierarchy = catalog.hierarchy();
    if !path.is_root() && !hierarchy.contains(&path) {
        bail!("no group named {path}");
    }

    if path.is_root() || !hierarchy.is_leaf(&path) {
        for label in hierarchy.children(&path) {
            println!("{label}");
        }
        return Ok(());
    }

    for verse in catalog.under(&path) {
        let (index, total) = catalog.position_in_group(verse);
        let name = verse.versename.as_deref().unwrap_or_default();
        println!("{index}/{total}  {}  {name}", verse.reference());
        println!("    {}", verse.id());
        println!("    {}", verse.text(language));
    }
    Ok(())
}

fn check(catalog: &Catalog, verse_id: &str, text: &str, language: Language) -> Result<()> {
    let id = VerseId::from(verse_id);
    let verse = catalog
        .get(&id)
        .or_else(|| catalog.resolve_legacy_id(verse_id).and_then(|id| catalog.get(&id)))
        .with_context(|| format!("unknown verse {verse_id}"))?;

    let marks = scoring::word_marks(verse.text(language), text);
    let accuracy = scoring::score_verse(verse, text, language);
    println!("{}  {accuracy}%", verse.reference());
    for (word, ok) in verse.text(language).split(' ').zip(marks) {
        println!("  {} {word}", if ok { "+" } else { "-" });
    }
    Ok(())
}

fn run_tui(catalog: Catalog, store: JsonStore, config: Config, mut saved: Config) -> Result<()> {
    let theme = Theme::load(&config.theme).unwrap_or_default();
    let mut app = App::new(catalog, Box::new(store), config, SmallRng::from_entropy());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events, &theme);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if saved.language != app.language {
        saved.language = app.language;
        if let Err(e) = saved.save() {
            tracing::warn!("failed to save config: {e:#}");
        }
    }

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    theme: &Theme,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app, theme))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Paste(text) => {
                if let Some(ref mut session) = app.session {
                    for ch in text.chars().filter(|c| !c.is_control()) {
                        session.push_char(ch);
                    }
                }
            }
            AppEvent::Tick => app.tick(Instant::now()),
            AppEvent::Redraw => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    app.status = None;
    match app.screen {
        AppScreen::Browse => handle_browse_key(app, key),
        AppScreen::Scope => handle_scope_key(app, key),
        AppScreen::Game => handle_game_key(app, key),
    }
}

fn handle_browse_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => {
            if app.navigator.level() == Level::Categories
                && app.navigator.view_mode() == ViewMode::Normal
            {
                app.should_quit = key.code == KeyCode::Esc;
            } else {
                app.go_back();
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.browse_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.browse_next(),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
            let result = app.activate_selected();
            app.report(result);
        }
        KeyCode::Home | KeyCode::Char('H') => app.go_home(),
        KeyCode::Char('f') => {
            if let Some(id) = app.selected_verse() {
                app.toggle_favorite(&id);
            }
        }
        KeyCode::Char('m') => {
            if let Some(id) = app.selected_verse() {
                app.toggle_completed(&id);
            }
        }
        KeyCode::Char('F') => app.set_view_mode(ViewMode::Favorites),
        KeyCode::Char('M') => app.set_view_mode(ViewMode::Completed),
        KeyCode::Char('e') => app.toggle_language(),
        KeyCode::Char('s') => app.go_to_scope(),
        KeyCode::Char('r') => {
            let result = app.start_random_game();
            app.report(result);
        }
        _ => {}
    }
}

fn handle_scope_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.leave_scope(),
        KeyCode::Up | KeyCode::Char('k') => app.scope_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.scope_next(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected_scope_row(),
        KeyCode::Char('x') => app.clear_scope(),
        KeyCode::Char('e') => app.toggle_language(),
        KeyCode::Char('r') => {
            let result = app.next_random_verse();
            app.report(result);
        }
        _ => {}
    }
}

fn handle_game_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('n') => {
                let result = app.next_random_verse();
                app.report(result);
            }
            KeyCode::Char('d') => {
                let result = app.mark_current_completed();
                app.report(result);
            }
            KeyCode::Char('f') => {
                if let Some(id) = app.session.as_ref().map(|s| s.verse().id()) {
                    app.toggle_favorite(&id);
                }
            }
            KeyCode::Char('e') => app.toggle_language(),
            KeyCode::Char('s') => app.go_to_scope(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.exit_game(),
        KeyCode::Tab => {
            let result = app.peek(Instant::now());
            app.report(result);
        }
        KeyCode::Enter => {
            let result = app.check_typed();
            app.report(result);
        }
        KeyCode::Backspace => {
            if let Some(ref mut session) = app.session {
                session.pop_char();
            }
        }
        KeyCode::Char(ch) => {
            if let Some(ref mut session) = app.session {
                session.push_char(ch);
            }
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App, theme: &Theme) {
    let area = frame.area();
    let colors = &theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let app_layout = AppLayout::new(area);

    let header_text = match app.screen {
        AppScreen::Browse => format!(" verse-drill | {}", app.navigator.title(app.language)),
        AppScreen::Scope => format!(" verse-drill | {}", scope_title(app.language)),
        AppScreen::Game => {
            let title = app
                .session
                .as_ref()
                .map(|s| s.verse().breadcrumb())
                .unwrap_or_default();
            format!(" verse-drill | {title}")
        }
    };
    let header = Paragraph::new(Line::from(Span::styled(
        header_text,
        Style::default()
            .fg(colors.header_fg())
            .bg(colors.header_bg())
            .add_modifier(Modifier::BOLD),
    )))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, app_layout.header);

    match app.screen {
        AppScreen::Browse => render_browse(frame, app, theme, app_layout.main),
        AppScreen::Scope => render_scope(frame, app, theme, app_layout.main),
        AppScreen::Game => render_game(frame, app, theme, app_layout.main),
    }

    if let Some(sidebar_area) = app_layout.sidebar {
        frame.render_widget(ProgressSidebar::new(app, theme), sidebar_area);
    }

    let mut footer_lines = Vec::new();
    footer_lines.push(match app.status {
        Some(ref status) => Line::from(Span::styled(
            format!(" {status}"),
            Style::default().fg(colors.error()),
        )),
        None => Line::from(""),
    });
    footer_lines.push(Line::from(Span::styled(
        key_hints(app.screen, app.language),
        Style::default().fg(colors.text_pending()),
    )));
    frame.render_widget(Paragraph::new(footer_lines), app_layout.footer);
}

fn scope_title(language: Language) -> &'static str {
    match language {
        Language::Korean => "학습 범위",
        Language::English => "Training scope",
    }
}

fn key_hints(screen: AppScreen, language: Language) -> &'static str {
    match (screen, language) {
        (AppScreen::Browse, Language::Korean) => {
            " [Enter] 선택  [Esc] 뒤로  [f] 즐겨찾기  [m] 암송완료  [F/M] 목록  [s] 범위  [r] 랜덤  [e] 언어  [q] 종료"
        }
        (AppScreen::Browse, Language::English) => {
            " [Enter] Open  [Esc] Back  [f] Favorite  [m] Memorized  [F/M] Lists  [s] Scope  [r] Random  [e] Language  [q] Quit"
        }
        (AppScreen::Scope, Language::Korean) => {
            " [Space] 선택/해제  [x] 초기화(전체)  [r] 랜덤 시작  [Esc] 닫기"
        }
        (AppScreen::Scope, Language::English) => {
            " [Space] Toggle  [x] Clear (all verses)  [r] Start random  [Esc] Close"
        }
        (AppScreen::Game, Language::Korean) => {
            " [Enter] 확인  [Tab] 힌트  [^N] 다음  [^D] 암송완료  [^F] 즐겨찾기  [^S] 범위  [Esc] 나가기"
        }
        (AppScreen::Game, Language::English) => {
            " [Enter] Check  [Tab] Peek  [^N] Next  [^D] Memorized  [^F] Favorite  [^S] Scope  [Esc] Exit"
        }
    }
}

fn render_browse(frame: &mut ratatui::Frame, app: &App, theme: &Theme, area: ratatui::layout::Rect) {
    let items: Vec<BrowseItem> = if app.navigator.level() == Level::Verses {
        app.visible_verses()
            .into_iter()
            .map(|verse| {
                let id = verse.id();
                let (index, total) = app.catalog.position_in_group(verse);
                let name = verse.versename.as_deref().unwrap_or_default();
                BrowseItem {
                    label: format!("{index}/{total} {}", verse.reference()),
                    detail: name.to_string(),
                    favorite: app.is_favorite(&id),
                    completed: app.is_completed(&id),
                }
            })
            .collect()
    } else {
        app.listing().iter().map(|l| BrowseItem::group(l)).collect()
    };

    let empty_message = match app.language {
        Language::Korean => "표시할 구절이 없습니다",
        Language::English => "Nothing to show",
    };
    let list = BrowseList {
        title: app.navigator.title(app.language),
        items,
        selected: app.browse_selected,
        empty_message,
        theme,
    };
    frame.render_widget(&list, area);
}

fn render_scope(frame: &mut ratatui::Frame, app: &App, theme: &Theme, area: ratatui::layout::Rect) {
    let rows = app.scope_rows();
    let title = format!("{}: {}", scope_title(app.language), app.scope_summary());
    let tree = ScopeTree::new(&rows, &app.selection, app.scope_selected, title, theme);
    frame.render_widget(tree, area);
}

fn render_game(frame: &mut ratatui::Frame, app: &App, theme: &Theme, area: ratatui::layout::Rect) {
    let Some(ref session) = app.session else {
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(3)])
        .split(area);

    let verse_area = VerseArea::new(session, &app.catalog, app.language, Instant::now(), theme);
    frame.render_widget(verse_area, layout[0]);

    let label = match app.language {
        Language::Korean => "정확도",
        Language::English => "Accuracy",
    };
    frame.render_widget(AccuracyBar::new(label, session.accuracy(), theme), layout[1]);
}
