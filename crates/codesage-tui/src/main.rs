//! CodeSage TUI - a terminal client for the CodeSage review service.
//!
//! Paste or type code, pick a language and get an AI review streamed into
//! the terminal. Reviews are kept in a short local history.

mod app;
mod editor;
mod ui;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use codesage_core::api::ApiClient;
use codesage_core::auth::CredentialStore;
use codesage_core::config::Config;
use codesage_core::models::LoginRequest;
use codesage_core::storage::LocalStorage;
use codesage_core::store::Stores;
use codesage_core::{export, format};

use app::{App, AppState, EMAIL_ENV, PASSWORD_ENV};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file prefix inside the log directory
const LOG_FILE_PREFIX: &str = "codesage.log";

/// Initialize the tracing subscriber for logging.
///
/// The terminal belongs to the UI, so logs go to a daily file under the
/// cache directory. Use RUST_LOG to control the level (e.g., RUST_LOG=debug).
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = config.data_dir().ok()?.join("logs");
    std::fs::create_dir_all(&log_dir).ok()?;
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    let _log_guard = init_tracing(&config);
    if let Some(e) = config_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 2 && args[1] == "--format" {
        return format_file(Path::new(&args[2]));
    }
    if args.len() > 2 && args[1] == "--export-html" {
        return export_html(&config, Path::new(&args[2]));
    }
    if args.len() > 1 && args[1] == "--login" {
        return login(config).await;
    }

    info!("CodeSage TUI starting");

    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new(config)?;
    app.refresh_history_if_stale();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("CodeSage TUI shutting down");
    Ok(())
}

/// Print the review HTML for a markdown file to stdout
fn format_file(path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    println!("{}", format::to_html(&text));
    Ok(())
}

/// Write the persisted review and history as a standalone HTML page
fn export_html(config: &Config, path: &Path) -> Result<()> {
    let storage = LocalStorage::new(config.data_dir()?)?;
    let api = ApiClient::new(config.api_url())?;
    let mut stores = Stores::new(Arc::new(api), storage);
    stores.review.restore();

    let page = export::review_page(stores.review.reviewed_result(), stores.review.history());
    std::fs::write(path, page)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!(
        "Exported review and {} history entries to {}",
        stores.review.history().len(),
        path.display()
    );
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{}", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Sign in from the terminal and persist the session for the next launch
async fn login(mut config: Config) -> Result<()> {
    let email = match std::env::var(EMAIL_ENV) {
        Ok(email) => email,
        Err(_) => match config.last_email.clone() {
            Some(last) => {
                let typed = prompt(&format!("Email [{}]: ", last))?;
                if typed.is_empty() { last } else { typed }
            }
            None => prompt("Email: ")?,
        },
    };

    let stored = config.remember_credentials
        && CredentialStore::has_credentials(&email);
    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) => password,
        Err(_) if stored => CredentialStore::get_password(&email)?,
        Err(_) => rpassword::prompt_password("Password: ")?,
    };

    let storage = LocalStorage::new(config.data_dir()?)?;
    let api = ApiClient::new(config.api_url())?;
    let mut stores = Stores::new(Arc::new(api), storage);

    stores
        .session
        .login(LoginRequest {
            email: email.clone(),
            password: password.clone(),
        })
        .await?;

    if config.remember_credentials && !stored {
        if let Err(e) = CredentialStore::store(&email, &password) {
            warn!(error = %e, "Failed to store credentials");
        }
    }
    config.last_email = Some(email);
    config.save()?;

    let name = stores
        .session
        .user()
        .map(|u| u.display_name().to_string())
        .unwrap_or_default();
    eprintln!("Logged in as {}", name);
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Redirect before drawing so a protected view never flashes
        app.apply_guard();

        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
