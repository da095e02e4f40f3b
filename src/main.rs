use candash::app::{App, MAX_UPDATES_PER_FRAME};
use candash::cli::Cli;
use candash::startup::{init_logging, DashConfig};
use candash::stream::{StreamUpdate, Subscriber};
use candash::terminal::{setup_panic_hook, TerminalManager};
use candash::ui;

use clap::Parser;
use color_eyre::Result;
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use ratatui::{backend::Backend, Terminal};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Event loop tick; also drives the record age display
const TICK: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    let cli = Cli::parse();

    color_eyre::install()?;

    let config = DashConfig::from_cli(&cli);
    let log_path = init_logging(&config)?;

    // Setup panic hook to ensure terminal cleanup on panic
    setup_panic_hook();

    let runtime = tokio::runtime::Runtime::new()?;
    let mut app = App::new(&config);

    let result = runtime.block_on(run_dashboard(&config, &mut app));

    if let Err(e) = &result {
        error!("Dashboard exited with error: {}", e);
        eprintln!("Log file: {}", log_path.display());
    } else {
        info!(
            "Dashboard exited after {} records ({} malformed)",
            app.records_received, app.malformed_count
        );
    }
    result
}

/// Start the subscriber, take over the terminal, and run until quit.
async fn run_dashboard(config: &DashConfig, app: &mut App) -> Result<()> {
    let subscriber = Subscriber::spawn(config.subscriber_config(), app.message_tx.clone())?;

    let mut manager = TerminalManager::new()?;
    let result = run_app(manager.terminal(), app).await;

    // Stop the subscriber before the terminal goes away
    subscriber.shutdown();
    manager.restore()?;
    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let mut event_stream = EventStream::new();

    // Take the message receiver from the app (we need ownership for select!)
    let mut message_rx: Option<mpsc::UnboundedReceiver<StreamUpdate>> = app.message_rx.take();

    loop {
        if app.should_quit {
            return Ok(());
        }

        if app.needs_redraw {
            terminal.draw(|f| ui::render(f, &mut *app))?;
            app.needs_redraw = false;
        }

        let timeout = tokio::time::sleep(TICK);

        tokio::select! {
            _ = timeout => {
                app.tick();
            }

            event_result = event_stream.next() => {
                match event_result {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.handle_key(key);
                    }
                    Some(Ok(Event::Resize(_, _))) => app.mark_dirty(),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(()),
                }
            }

            Some(update) = async {
                match message_rx.as_mut() {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending().await,
                }
            } => {
                app.handle_update(update);
                // Apply a bounded batch of whatever else is queued before the next draw
                if let Some(rx) = message_rx.as_mut() {
                    app.drain_updates(rx, MAX_UPDATES_PER_FRAME - 1);
                }
            }
        }
    }
}
