use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use routerwatch::data::duration::parse_interval;
use routerwatch::{events, export_snapshot, ui, ApiClient, App, Backend, Settings, Theme};

/// Redraw cadence; also how often polled results are pulled into the app.
const TICK_RATE: Duration = Duration::from_millis(100);

/// Environment variable holding the log filter.
const LOG_ENV: &str = "ROUTERWATCH_LOG";

#[derive(Parser, Debug)]
#[command(name = "routerwatch")]
#[command(about = "Terminal dashboard for live router health, traffic and sessions")]
struct Args {
    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend API base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Application key sent with every request
    #[arg(long)]
    app_key: Option<String>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Health poll interval (e.g., "5s", "500ms")
    #[arg(long, value_parser = parse_interval)]
    health_interval: Option<Duration>,

    /// Session list poll interval
    #[arg(long, value_parser = parse_interval)]
    sessions_interval: Option<Duration>,

    /// Traffic poll interval
    #[arg(long, value_parser = parse_interval)]
    traffic_interval: Option<Duration>,

    /// Router to select on startup
    #[arg(short, long)]
    router: Option<u64>,

    /// Export current state to JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(key) = &self.app_key {
            settings.app_key = Some(key.clone());
        }
        if let Some(path) = &self.log_file {
            settings.log_file = Some(path.clone());
        }
        if let Some(interval) = self.health_interval {
            settings.polling.health = interval;
        }
        if let Some(interval) = self.sessions_interval {
            settings.polling.sessions = interval;
        }
        if let Some(interval) = self.traffic_interval {
            settings.polling.traffic = interval;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);

    if let Some(path) = &settings.log_file {
        init_logging(path)?;
    }

    let mut client = ApiClient::builder()
        .endpoint(&settings.endpoint)
        .timeout(settings.request_timeout);
    if let Some(key) = &settings.app_key {
        client = client.app_key(key);
    }
    let client = client.build().context("Failed to create API client")?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    // Handle export mode (non-interactive)
    if let Some(export_path) = &args.export {
        rt.block_on(export_snapshot(&client, args.router, export_path))?;
        println!("Exported router state to: {}", export_path.display());
        return Ok(());
    }

    info!(endpoint = %settings.endpoint, "Starting routerwatch");
    rt.block_on(run_tui(Arc::new(client), &settings, args.router))
}

fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run the TUI against the given backend
async fn run_tui(backend: Arc<dyn Backend>, settings: &Settings, router: Option<u64>) -> Result<()> {
    // Detect before raw mode; the query reads the terminal's reply itself
    let theme = Theme::auto_detect();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(backend, settings, theme);
    app.start(router);

    let result = run_app(&mut terminal, &mut app).await;
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut event_stream = EventStream::new();
    let mut tick = tokio::time::interval(TICK_RATE);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    while app.running {
        app.tick();
        terminal.draw(|frame| ui::render(frame, app))?;

        tokio::select! {
            _ = tick.tick() => {}
            event = event_stream.next() => match event {
                Some(Ok(Event::Key(key))) => events::handle_key_event(app, key),
                Some(Ok(Event::Mouse(mouse))) => events::handle_mouse_event(app, mouse),
                // Resize and focus events redraw on the next iteration
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => app.quit(),
            },
        }
    }

    Ok(())
}
