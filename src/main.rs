mod app;
mod ui;

use anyhow::Result;
use app::App;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use world_map::batch;
use world_map::config::{self, CANVAS_HEIGHT, CANVAS_WIDTH};
use world_map::data::{self, RelationTable};
use world_map::logging;
use world_map::map::{BrailleRenderer, CountryIndex};
use world_map::service::MapService;
use world_map::session::InMemorySessionStore;

fn main() -> Result<()> {
    let batch_mode = std::env::args().skip(1).any(|arg| arg == "--batch");

    let log_path = config::log_file();
    if let Err(e) = logging::init(&log_path) {
        eprintln!("logging disabled: {e:#}");
    }

    let index = Arc::new(load_index());
    let relations = Arc::new(load_relations());
    let renderer = BrailleRenderer::new(
        Arc::clone(&index),
        config::frame_cache_size(),
        config::render_timeout(),
    );
    let service = MapService::new(index, relations, renderer);

    if batch_mode {
        return run_batch(service);
    }

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, service);

    // Disable mouse capture and restore terminal
    let _ = execute!(io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Country outlines, or an empty index when they cannot be loaded
fn load_index() -> CountryIndex {
    let path = config::countries_path();
    match data::load_country_index(&path) {
        Ok(index) => {
            info!(path = %path.display(), countries = index.len(), "loaded country geometry");
            index
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "continuing without country geometry");
            CountryIndex::empty()
        }
    }
}

fn load_relations() -> RelationTable {
    if let Some(path) = config::relations_override() {
        match RelationTable::from_file(&path) {
            Ok(table) => {
                info!(path = %path.display(), countries = table.len(), "loaded relation table");
                return table;
            }
            Err(e) => warn!(
                path = %path.display(),
                error = %format!("{e:#}"),
                "falling back to built-in relations"
            ),
        }
    }
    match RelationTable::builtin() {
        Ok(table) => {
            info!(countries = table.len(), "using built-in relation table");
            table
        }
        Err(e) => {
            warn!(error = %format!("{e:#}"), "built-in relation table unreadable");
            RelationTable::empty()
        }
    }
}

/// Answer JSON requests from stdin, rendering at the logical canvas size
fn run_batch(service: MapService<BrailleRenderer>) -> Result<()> {
    service
        .renderer()
        .set_target((CANVAS_WIDTH / 2.0) as usize, (CANVAS_HEIGHT / 4.0) as usize);
    let sessions = InMemorySessionStore::new();
    let summary = batch::run_batch(&service, &sessions, io::stdin().lock(), io::stdout().lock())?;
    info!(
        requests = summary.requests,
        failures = summary.failures,
        sessions = sessions.len(),
        "batch complete"
    );
    Ok(())
}

/// Handle mouse events for identify and drag-to-zoom
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for the coordinate readout
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.drag_to(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.release(mouse.column, mouse.row),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, service: MapService<BrailleRenderer>) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(service, size.width, size.height);

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                            KeyCode::Char('r') | KeyCode::Char('0') => app.reset(),
                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width, height);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
