use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing::{info, warn};

use quizdr::app::{App, AppScreen};
use quizdr::config::Config;
use quizdr::logging;
use quizdr::quiz::model::QuestionKind;
use quizdr::store::json_store::JsonStore;
use quizdr::store::{KeyValueStore, MemoryStore};
use quizdr::ui;
use quizdr::ui::components::menu::{Menu, MenuItem};
use quizdr::ui::components::progress_bar::ProgressBar;
use quizdr::ui::components::question_view::QuestionView;
use quizdr::ui::components::result_popup::ResultPopup;
use quizdr::ui::components::summary::Summary;
use quizdr::ui::components::vocabulary_list::VocabularyList;
use quizdr::ui::layout::{AppLayout, pack_hint_lines};

#[derive(Parser)]
#[command(name = "quizdr", version, about = "Terminal safety quiz trainer with minigames")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Directory with extra quiz JSON files")]
    quiz_dir: Option<PathBuf>,

    #[arg(long, help = "Forget completed quizzes and exit")]
    reset_progress: bool,

    #[arg(long, help = "Write logs to this file instead of the data directory")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Ignoring unreadable config {}: {e}", Config::config_path().display());
        Config::default()
    });
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(dir) = cli.quiz_dir {
        config.quiz_dir = dir.to_string_lossy().to_string();
    }

    let log_path = cli.log_file.unwrap_or_else(logging::default_log_path);
    if let Err(e) = logging::init(&log_path, &config.log_level) {
        eprintln!("Logging disabled: {e}");
    }

    let store: Box<dyn KeyValueStore> = match JsonStore::new() {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, "data directory unavailable, progress will not be saved");
            Box::new(MemoryStore::new())
        }
    };

    let mut app = App::new(config, store);

    if cli.reset_progress {
        app.session.reset_progress()?;
        println!("Progress reset.");
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }
    info!("exiting");

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        // Blocks until the next terminal event; resizes simply redraw.
        if let Event::Key(key) = event::read()? {
            handle_key(app, key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Only process Press events, terminals with enhancement report releases too
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::MainMenu => handle_menu_key(app, key),
        AppScreen::QuizSelect => handle_quiz_select_key(app, key),
        AppScreen::Question => handle_question_key(app, key),
        AppScreen::Result => handle_result_key(app, key),
        AppScreen::Summary | AppScreen::Finale => handle_summary_key(app, key),
        AppScreen::Vocabulary => handle_vocabulary_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('1') => app.go_to_quiz_select(),
        KeyCode::Char('2') => app.go_to_vocabulary(),
        KeyCode::Char('r') => app.reset_progress(),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => app.activate_menu_item(),
        _ => {}
    }
}

fn handle_quiz_select_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Up | KeyCode::Char('k') => app.quiz_select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.quiz_select_next(),
        KeyCode::Enter => app.start_selected_quiz(),
        KeyCode::Char(ch @ '1'..='9') => {
            let index = ch as usize - '1' as usize;
            app.start_quiz(index);
        }
        _ => {}
    }
}

fn handle_question_key(app: &mut App, key: KeyEvent) {
    let is_board = matches!(
        app.session.current_question().map(|q| &q.kind),
        Some(QuestionKind::DragAndDrop { .. } | QuestionKind::HiddenObject)
    );

    match key.code {
        KeyCode::Esc => app.go_to_menu(),
        KeyCode::Char('h') => app.toggle_hint(),
        KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => app.move_cursor(false),
        KeyCode::Down | KeyCode::Right | KeyCode::Char('j') => app.move_cursor(true),
        KeyCode::Char(' ') if is_board => app.toggle_at_cursor(),
        KeyCode::Char('s') if is_board => app.submit_board(),
        KeyCode::Enter => app.confirm(),
        KeyCode::Char(ch @ '1'..='9') => {
            let index = ch as usize - '1' as usize;
            app.choose(index);
        }
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => app.advance(),
        KeyCode::Esc => app.go_to_menu(),
        _ => {}
    }
}

fn handle_summary_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Esc => app.advance(),
        _ => {}
    }
}

fn handle_vocabulary_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_vocabulary(false),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_vocabulary(true),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);
    render_header(frame, app, layout.header);

    match app.screen {
        AppScreen::MainMenu => render_menu(frame, app, &layout),
        AppScreen::QuizSelect => render_quiz_select(frame, app, &layout),
        AppScreen::Question => render_question(frame, app, &layout),
        AppScreen::Result => {
            render_question(frame, app, &layout);
            render_result(frame, app, &layout);
        }
        AppScreen::Summary | AppScreen::Finale => render_summary(frame, app, &layout),
        AppScreen::Vocabulary => render_vocabulary(frame, app, &layout),
    }

    if let Some(status) = &app.status {
        let line = Paragraph::new(Line::from(Span::styled(
            format!(" {status}"),
            Style::default().fg(colors.warning()),
        )));
        frame.render_widget(line, layout.status);
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let progress = app.session.progress();
    let info = format!(
        " | {}/{} quizzes completed",
        progress.completed_count(),
        progress.threshold()
    );
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " quizdr ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default()
                .fg(colors.text_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout, hints: &[&str]) {
    let colors = &app.theme.colors;
    let lines = pack_hint_lines(hints, layout.footer.width as usize);
    // Only one footer row; the first packed line wins
    if let Some(first) = lines.into_iter().next() {
        let footer = Paragraph::new(Line::from(Span::styled(
            first,
            Style::default().fg(colors.text_pending()),
        )));
        frame.render_widget(footer, layout.footer);
    }
}

fn render_menu(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let menu_area = ui::layout::centered_rect(50, 80, layout.main);
    frame.render_widget(&app.menu, menu_area);
    render_footer(
        frame,
        app,
        layout,
        &["[1] Quizzes", "[2] Vocabulary", "[r] Reset progress", "[q] Quit"],
    );
}

fn render_quiz_select(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let progress = app.session.progress();
    let items = app
        .library
        .quizzes
        .iter()
        .enumerate()
        .map(|(i, quiz)| {
            let mark = if progress.is_completed(&quiz.name) {
                "completed"
            } else {
                "not completed"
            };
            let key = if i < 9 { (i + 1).to_string() } else { "-".to_string() };
            MenuItem::new(
                &key,
                &quiz.name,
                &format!("{} questions, {mark}", quiz.questions.len()),
            )
        })
        .collect();

    let area = ui::layout::centered_rect(60, 90, layout.main);
    let columns = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)])
        .split(area);

    let menu = Menu::new("Quizzes", "Pick a quiz to play", items, app.theme)
        .selected(app.quiz_selected);
    frame.render_widget(&menu, columns[0]);

    let bar = ProgressBar::new(
        "Until the grand finale",
        progress.completed_count(),
        progress.threshold(),
        app.theme,
    );
    frame.render_widget(bar, columns[1]);

    render_footer(
        frame,
        app,
        layout,
        &["[1-9] Start", "[Up/Down] Select", "[Enter] Start", "[Esc] Back"],
    );
}

fn render_question(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let (Some(state), Some(question)) = (app.session.state(), app.session.current_question())
    else {
        return;
    };

    let view = QuestionView::new(&state.quiz.name, question, app.theme)
        .position(state.question_index, state.total(), state.score)
        .cursor(app.cursor)
        .hint_visible(app.hint_visible)
        .drag_board(app.session.drag_board())
        .hidden_object(
            app.session.hidden_board(),
            &app.marker_order,
            &app.config.hidden_object_scene,
        )
        .map_scene(&app.config.map_scene);
    frame.render_widget(view, layout.main);

    let hints: &[&str] = match &question.kind {
        QuestionKind::Standard { .. } => &["[1-9] Answer", "[Up/Down] Select", "[Enter] Answer"],
        QuestionKind::DragAndDrop { .. } => &["[Arrows] Select", "[Space] Move item", "[s] Submit"],
        QuestionKind::MapSelection => &["[1-4] Choose", "[Up/Down] Select", "[Enter] Choose"],
        QuestionKind::HiddenObject => &["[1-6] Mark", "[Space] Mark", "[s] Submit"],
    };
    let mut hints = hints.to_vec();
    if question.hint.is_some() {
        hints.push("[h] Hint");
    }
    hints.push("[Esc] Menu");
    render_footer(frame, app, layout, &hints);
}

fn render_result(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    if let Some(verdict) = app.session.last_verdict() {
        let popup = ui::layout::centered_rect(60, 50, layout.main);
        frame.render_widget(ResultPopup::new(verdict, app.theme), popup);
    }
}

fn render_summary(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let (score, total) = app.final_score();
    let progress = app.session.progress();
    let area = ui::layout::centered_rect(60, 70, layout.main);
    let summary = Summary::new(&app.last_quiz_name, score, total, app.theme)
        .progress(progress.completed_count(), progress.threshold())
        .finale(app.screen == AppScreen::Finale);
    frame.render_widget(summary, area);
    render_footer(frame, app, layout, &["[Enter] Menu"]);
}

fn render_vocabulary(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let list = VocabularyList::new(&app.vocabulary, app.vocab_scroll, app.theme);
    frame.render_widget(list, layout.main);
    render_footer(frame, app, layout, &["[Up/Down] Scroll", "[Esc] Back"]);
}
