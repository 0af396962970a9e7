pub mod app;
pub mod input;
pub mod result_view;
pub mod sections_panel;
pub mod settings;

pub use app::App;
pub use input::InputWidget;
pub use result_view::ResultView;
pub use sections_panel::SectionsPanel;
pub use settings::{SettingsAction, SettingsWidget};

use crate::event::Event;
use anyhow::Result;
use crossterm::{
    event::{self as term_event, Event as TermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Run the terminal UI until the user quits.
pub async fn run(app: &mut App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let run_result = event_loop(&mut terminal, app);

    // Restore the terminal even when the loop errored.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if term_event::poll(TICK_INTERVAL)? {
            match term_event::read()? {
                TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_event(Event::Key(key))?;
                }
                TermEvent::Resize(width, height) => {
                    app.handle_event(Event::Resize(width, height))?;
                }
                _ => {}
            }
        }
        // Tick every pass so outcomes are drained even under key spam.
        app.handle_event(Event::Tick)?;

        if app.should_quit() {
            return Ok(());
        }
    }
}
