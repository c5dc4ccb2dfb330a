pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, Theme, ThemeColors};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

/// Run the interactive weight editor until the user quits.
///
/// Every weight change triggers a full scoring pass before the next draw.
pub async fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();
    let mut events = EventHandler::new(250);

    if app.verbose {
        crate::buffered_eprintln!(
            "TUI started with {} categories from {}",
            app.matrix.rows.len(),
            app.matrix.source.display()
        );
    }

    let result: anyhow::Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(e.into());
        }

        handle_event(&mut app, events.next().await);

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    ratatui::restore();

    if app.verbose {
        eprintln!("Final weights:");
        for (row, weight) in app.matrix.rows.iter().zip(app.weights.current()) {
            eprintln!("  {}: {}", row.name, weight);
        }
    }

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

/// Dispatch one event. A closed event stream ends the session.
fn handle_event(app: &mut App, event: Option<Event>) {
    match event {
        Some(Event::Key(key)) => handle_key_event(app, key),
        Some(Event::Tick) => app.update_flash(),
        None => app.should_quit = true,
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => {
            match key.code {
                // Quit
                KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.should_quit = true
                }

                // Navigation
                KeyCode::Char('j') | KeyCode::Down => app.next_row(),
                KeyCode::Char('k') | KeyCode::Up => app.previous_row(),

                // Weight adjustment
                KeyCode::Char('l') | KeyCode::Right => app.increase_selected(1),
                KeyCode::Char('h') | KeyCode::Left => app.decrease_selected(1),
                KeyCode::Char('L') => app.increase_selected(app::COARSE_STEP),
                KeyCode::Char('H') => app.decrease_selected(app::COARSE_STEP),
                KeyCode::Char('0') => app.set_selected_min(),
                KeyCode::Char('m') => app.set_selected_max(),

                // Reset
                KeyCode::Char('r') => app.reset_selected(),
                KeyCode::Char('R') => app.reset_all(),

                // Reasoning panel
                KeyCode::Char('n') => app.toggle_reasoning(),

                // Help
                KeyCode::Char('?') => app.show_help(),

                _ => {}
            }
        }
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}
