mod app;
mod highlighter;
mod ui;

use crate::lookup::LookupService;
use anyhow::Result;
use app::App;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::time::Instant;

/// Run the interactive picker. Returns the word the user settled on, if any.
pub fn run(
    service: Arc<LookupService>,
    initial_query: Option<String>,
    use_daemon: bool,
) -> Result<Option<String>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    terminal.clear()?;

    let mut app = App::new(service, use_daemon);

    if let Some(query) = initial_query {
        app.set_query(&query);
    }

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map(|()| app.chosen.take())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.tick(Instant::now());

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(app.poll_timeout(Instant::now()))? {
            // Only handle key press events, not release or repeat
            if let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                handle_key(app, key);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c'))
        | (KeyModifiers::CONTROL, KeyCode::Char('q')) => {
            app.chosen = None;
            app.should_quit = true;
        }
        (KeyModifiers::CONTROL, KeyCode::Char('j'))
        | (KeyModifiers::CONTROL, KeyCode::Char('n')) => app.select_next(),
        (KeyModifiers::CONTROL, KeyCode::Char('k'))
        | (KeyModifiers::CONTROL, KeyCode::Char('p')) => app.select_prev(),
        (KeyModifiers::CONTROL, KeyCode::Char('w')) => app.delete_word(),
        (KeyModifiers::CONTROL, KeyCode::Char('h')) => app.pop_char(),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => app.coordinator.clear(),
        (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => match code {
            KeyCode::Esc => app.escape(),
            KeyCode::Enter => app.submit(),
            KeyCode::Tab => app.accept(),
            KeyCode::Down => app.select_next(),
            KeyCode::Up | KeyCode::BackTab => app.select_prev(),
            KeyCode::Backspace => app.pop_char(),
            KeyCode::Char(c) => app.push_char(c),
            _ => {}
        },
        _ => {}
    }
}
