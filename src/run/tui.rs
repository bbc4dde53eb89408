use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use crate::advice::AdviceService;
use crate::db::Database;
use crate::state::Action;
use crate::ui::app::{App, FormField, InputMode, Screen};
use crate::ui::commands;
use crate::ui::screens::table_rows;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

/// How long the loop waits for a key before checking on the advice worker.
const TICK: Duration = Duration::from_millis(100);

pub(crate) fn as_tui(db: &mut Database, service: Arc<dyn AdviceService>) -> Result<()> {
    let mut app = App::new(db.load_state(), service);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = ?e, "TUI exited with an error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // tab + status + command bars
            let content_height = f.area().height.saturating_sub(3);
            app.visible_rows = table_rows(app.screen, content_height);
            crate::ui::render::render(f, app);
        })?;

        app.poll_advice();

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, db)?,
                InputMode::Command => handle_command_input(key, app, db)?,
                InputMode::Form => handle_form_input(key, app, db),
                InputMode::Confirm => handle_confirm_input(key, app, db),
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    let len = app.state.expenses.len();
    let page = app.visible_rows.max(1);
    let has_list = app.screen != Screen::Settings;

    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..page / 2 {
                scroll_down(&mut app.expense_index, &mut app.expense_scroll, len, page);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..page / 2 {
                scroll_up(&mut app.expense_index, &mut app.expense_scroll);
            }
        }
        KeyCode::Char('j') | KeyCode::Down if has_list => {
            scroll_down(&mut app.expense_index, &mut app.expense_scroll, len, page);
        }
        KeyCode::Char('k') | KeyCode::Up if has_list => {
            scroll_up(&mut app.expense_index, &mut app.expense_scroll);
        }
        KeyCode::Char('g') if has_list => {
            scroll_to_top(&mut app.expense_index, &mut app.expense_scroll);
        }
        KeyCode::Char('G') if has_list => {
            scroll_to_bottom(&mut app.expense_index, &mut app.expense_scroll, len, page);
        }
        KeyCode::Char('1') => switch_screen(app, Screen::Home),
        KeyCode::Char('2') => switch_screen(app, Screen::Stats),
        KeyCode::Char('3') => switch_screen(app, Screen::Settings),
        KeyCode::Tab => cycle_screen(app, 1),
        KeyCode::BackTab => cycle_screen(app, -1),
        KeyCode::Char('n') => app.open_form(),
        KeyCode::Char('D') if has_list => commands::handle_command("delete", app, db)?,
        KeyCode::Char('R') if app.screen == Screen::Settings => {
            app.request(Action::ResetAll, db);
        }
        KeyCode::Char('a') => app.start_advice(),
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Esc => app.status_message.clear(),
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_form_input(key: event::KeyEvent, app: &mut App, db: &mut Database) {
    let on_category = app.form_field == FormField::Category;
    match key.code {
        KeyCode::Esc => {
            app.close_form();
            app.set_status("Cancelled");
        }
        KeyCode::Enter => app.submit_form(db),
        KeyCode::Tab | KeyCode::Down => app.form_field = app.form_field.next(),
        KeyCode::BackTab | KeyCode::Up => app.form_field = app.form_field.prev(),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right if on_category => {
            app.cycle_form_category(1);
        }
        KeyCode::Char('-') | KeyCode::Left if on_category => app.cycle_form_category(-1),
        KeyCode::Backspace => {
            if let Some(buf) = app.form_buffer() {
                buf.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(buf) = app.form_buffer() {
                buf.push(c);
            }
        }
        _ => {}
    }
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, db: &mut Database) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.resolve_pending(true, db),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.resolve_pending(false, db),
        _ => {}
    }
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, screen: Screen) {
    app.screen = screen;
}

fn cycle_screen(app: &mut App, delta: i32) {
    let screens = Screen::all();
    let len = screens.len() as i32;
    let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0) as i32;
    switch_screen(app, screens[(idx + delta).rem_euclid(len) as usize]);
}
