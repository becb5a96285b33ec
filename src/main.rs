mod booths;
mod boundary;
mod config;
mod data;
mod drill;
mod error;
mod markers;
mod matching;
mod registry;
mod sentiment;
mod state;
mod ui;
mod viewport;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;

use crate::data::BoundaryStore;
use crate::error::MapError;
use crate::registry::GeographicRegistry;
use crate::state::AppState;

fn main() -> Result<(), MapError> {
    pretty_env_logger::init();

    let registry = GeographicRegistry::bundled()?;
    let store = BoundaryStore::bundled()?;
    let mut state = AppState::new(&registry, &store)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut state);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
) -> Result<(), MapError> {
    loop {
        terminal.draw(|f| ui::draw(f, state))?;
        state.tick();

        if event::poll(std::time::Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(KeyEvent {
                    code,
                    kind: KeyEventKind::Press,
                    ..
                }) => {
                    if state.handle_key(code) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => state.handle_mouse(mouse),
                _ => {}
            }
        }
    }
}
