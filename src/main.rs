//! ChromaFind CLI
//!
//! Launches the interactive contact-search TUI against a ChromaDB backend.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use console::style;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;

use chromafind::tui::app::App;
use chromafind::{Config, SearchClient, DEFAULT_BACKEND_URL};

/// ChromaFind - terminal contact search over a ChromaDB backend
#[derive(Parser)]
#[command(name = "chromafind")]
#[command(author = "ChromaFind Contributors")]
#[command(version)]
#[command(about = "Search contact notes through a ChromaDB backend", long_about = None)]
struct Cli {
    /// Base URL of the search backend
    #[arg(long, env = "CHROMAFIND_BACKEND", default_value = DEFAULT_BACKEND_URL)]
    backend: String,

    /// Write logs to this file (logging is disabled when omitted)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let config = Config {
        backend_url: cli.backend,
        log_file: cli.log_file,
    };

    if let Err(e) = run(config) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run(config: Config) -> chromafind::Result<()> {
    init_logging(&config)?;
    config.validate()?;

    tracing::info!(backend = %config.normalized_backend_url(), "chromafind starting up");

    let client = SearchClient::new(&config)?;
    let mut app = App::new(client);

    let mut terminal = setup_terminal()?;
    let result = app.run(&mut terminal);

    // restore the terminal even when the event loop errored
    let restored = restore_terminal(&mut terminal);
    result.and(restored)
}

/// File-backed tracing setup; the terminal itself belongs to the TUI
fn init_logging(config: &Config) -> chromafind::Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };

    let file = std::fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn setup_terminal() -> chromafind::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> chromafind::Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
