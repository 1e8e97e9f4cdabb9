mod app;
mod config;
mod ledger;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use ledger::store::Store;
use ledger::{is_close_eligible, AccountCategory};

#[derive(Parser, Debug)]
#[command(name = "motocho")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "A terminal-friendly chart of accounts manager")]
struct Args {
    /// Ledger file to use instead of the default location
    #[arg(short, long)]
    ledger: Option<PathBuf>,

    /// Output a ledger summary as JSON (for scripts and status bars)
    #[arg(short, long)]
    status: bool,

    /// Close an account by number without starting the TUI
    #[arg(short, long, value_name = "ACCOUNT_NUMBER")]
    close: Option<String>,

    /// Closure reason (required with --close)
    #[arg(long)]
    reason: Option<String>,

    /// Create a starter chart of accounts if the ledger file is missing
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Resolve the ledger location once: flag > config > default data path
    let app_config = config::AppConfig::load().unwrap_or_default();
    let ledger_path = args
        .ledger
        .clone()
        .or_else(|| app_config.ledger_file.clone())
        .unwrap_or_else(Store::default_path);

    // Handle CLI-only commands
    if args.seed {
        return seed_ledger(Store::new(ledger_path)).await;
    }

    if args.status {
        return print_status(Store::new(ledger_path)).await;
    }

    if let Some(number) = args.close {
        return close_account(
            Store::new(ledger_path),
            &number,
            args.reason.as_deref(),
            app_config.notifications,
        )
        .await;
    }

    // Run TUI
    run_tui(args.ledger).await
}

async fn seed_ledger(store: Store) -> Result<()> {
    if store.seed().await? {
        println!("Created starter chart of accounts at {}", store.path().display());
    } else {
        println!("Ledger already exists at {}, left untouched", store.path().display());
    }
    Ok(())
}

async fn print_status(store: Store) -> Result<()> {
    let accounts = store.load().await?;

    let mut categories = serde_json::Map::new();
    for category in AccountCategory::ALL {
        let count = accounts
            .iter()
            .filter(|a| a.account_category == category)
            .count();
        categories.insert(category.as_str().to_string(), count.into());
    }

    let closeable = accounts.iter().filter(|a| is_close_eligible(a)).count();
    let closed = accounts.iter().filter(|a| a.is_closed).count();

    let output = serde_json::json!({
        "ledger": store.path().display().to_string(),
        "total": accounts.len(),
        "closeable": closeable,
        "closed": closed,
        "categories": categories,
    });

    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

async fn close_account(
    store: Store,
    number: &str,
    reason: Option<&str>,
    notifications: bool,
) -> Result<()> {
    let account = store.close_account(number, reason.unwrap_or("")).await?;
    println!(
        "Closed account {} - {}",
        account.account_number, account.account_name
    );
    if notifications {
        // Notification failure shouldn't fail a close that already happened
        let _ = notify(
            "motocho",
            &format!("Closed account {} - {}", account.account_number, account.account_name),
        );
    }
    Ok(())
}

async fn run_tui(ledger_override: Option<PathBuf>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let app = App::new(ledger_override).await;

    let result = match app {
        Ok(mut app) => run_app(&mut terminal, &mut app).await,
        Err(e) => Err(e),
    };

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
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            // Handle key and catch any errors to prevent crashes
                            if let Err(e) = app.handle_key(key).await {
                                app.status_message = Some(format!("Error: {}", e));
                            }
                        }
                    }
                }
            }
        }

        // Periodic refresh
        let _ = app.tick().await;
    }
}

fn notify(summary: &str, body: &str) -> Result<()> {
    notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .icon("accessories-calculator")
        .show()?;
    Ok(())
}
