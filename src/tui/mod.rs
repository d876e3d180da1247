mod app;
mod theme;
mod view;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::{cursor, execute, terminal};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::cli::build_client;
use crate::config::AppConfig;
use crate::search::{ChannelSink, SearchInputController, SearchTiming};
use app::SearchApp;

const SPINNER_TICK: Duration = Duration::from_millis(150);

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, terminal::LeaveAlternateScreen, cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}

pub async fn run(cfg: &AppConfig) -> Result<()> {
    let client = Arc::new(build_client(cfg)?);
    let (results_tx, results_rx) = mpsc::unbounded_channel();
    let controller = SearchInputController::new(
        client,
        ChannelSink(results_tx),
        SearchTiming::from(&cfg.search),
    );
    let mut app = SearchApp::new(controller, results_rx);

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
    let _guard = TerminalGuard;
    let mut term = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    info!(base_url = %cfg.base_url, "interactive search started");

    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(SPINNER_TICK);
    while !app.should_quit() {
        term.draw(|f| app.view(f))?;
        tokio::select! {
            maybe = events.next() => match maybe {
                Some(Ok(Event::Key(k))) if k.kind == KeyEventKind::Press => app.handle_key(k),
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!(err = %e, "terminal event stream failed");
                    break;
                }
                None => break,
            },
            Some(ev) = app.controller.next_event() => app.on_search_event(ev),
            _ = tick.tick() => app.on_tick(),
        }
    }

    app.controller.shutdown();
    info!("interactive search closed");
    Ok(())
}
