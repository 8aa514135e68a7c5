//! Terminal front-end for the bodega retail API.

mod app;
mod display;
mod forms;
mod pages;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bodega_client::{ApiClient, ClientConfig, CredentialStore, SessionStore};

use crate::app::{App, AppMsg, Ctx};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Route tracing into the in-app log pane (F12)
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));
    tracing_subscriber::registry()
        .with(tui_logger::tracing_subscriber_layer())
        .with(env_filter)
        .init();
    tui_logger::init_logger(log::LevelFilter::Info).ok();
    tui_logger::set_default_level(log::LevelFilter::Info);

    let config = ClientConfig::from_env();
    tracing::info!(base_url = %config.base_url, "Starting admin console");

    let storage = Arc::new(CredentialStore::open(&config.credential_path)?);
    let api = ApiClient::new(&config, storage.clone())?;
    let session = SessionStore::new(storage.clone());

    let (tx, rx) = mpsc::unbounded_channel();
    let ctx = Ctx {
        api,
        storage,
        tx,
    };
    let mut app = App::new(session, ctx);
    app.start();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    mut rx: mpsc::UnboundedReceiver<AppMsg>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    app.on_key(key);
                }
            }
        }

        // Drain whatever the background tasks finished since last frame
        while let Ok(msg) = rx.try_recv() {
            app.on_msg(msg);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
