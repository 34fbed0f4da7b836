//! Terminal dashboard.
//!
//! A [`Monitor`] runs in the background. The UI loop redraws on every input
//! poll and picks up new snapshots from the monitor's watch channel.

pub mod app;
pub mod input;
pub mod ui;

pub use app::App;

use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;

use airwatch_core::{Monitor, MonitorHandle, Snapshot};
use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tokio::sync::watch;
use tracing::info;

use crate::commands::http_source;
use crate::config::Config;
use crate::format::FormatOptions;
use input::Action;

/// Set up the terminal for TUI rendering.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state.
pub fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Run the dashboard until the user quits.
pub async fn run(config: &Config, opts: &FormatOptions) -> Result<()> {
    let source = Arc::new(http_source(config)?);
    let url = source.url().to_string();
    let handle = Monitor::spawn(source, config.monitor_config())?;
    info!("Dashboard started for {}", url);

    let mut updates = handle.subscribe();
    let initial = updates.borrow_and_update().clone();
    let mut app = App::new(initial, url, opts.thresholds, opts.latest_count);

    let mut terminal = setup_terminal()?;
    let result = run_event_loop(&mut terminal, &mut app, &handle, &mut updates).await;
    restore_terminal()?;

    handle.shutdown().await;
    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    handle: &MonitorHandle,
    updates: &mut watch::Receiver<Snapshot>,
) -> Result<()> {
    while !app.should_quit() {
        app.clean_expired_status();

        match updates.has_changed() {
            Ok(true) => app.update(updates.borrow_and_update().clone()),
            Ok(false) => {}
            // Monitor stopped
            Err(_) => break,
        }

        terminal.draw(|f| ui::draw(f, app))?;

        // crossterm polling blocks, keep it off the runtime threads
        let key = tokio::task::block_in_place(|| -> io::Result<Option<Event>> {
            if event::poll(Duration::from_millis(100))? {
                event::read().map(Some)
            } else {
                Ok(None)
            }
        })?;

        if let Some(Event::Key(key)) = key
            && key.kind == KeyEventKind::Press
        {
            apply_action(app, handle, input::handle_key(key, app.show_help)).await;
        }
    }
    Ok(())
}

async fn apply_action(app: &mut App, handle: &MonitorHandle, action: Action) {
    match action {
        Action::Quit => app.quit(),
        Action::ToggleHelp => app.show_help = !app.show_help,
        Action::Refresh => {
            handle.refresh();
            app.set_status("Refreshing...");
        }
        Action::TogglePause => {
            let paused = !app.snapshot.paused;
            if handle.set_paused(paused).await.is_err() {
                app.quit();
                return;
            }
            app.set_status(if paused { "Chart paused" } else { "Chart resumed" });
        }
        Action::None => {}
    }
}
