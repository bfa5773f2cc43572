//! Driftwall Entry Point
//!
//! Launches the drifting message wall in the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Against a wall server on localhost:3000
//! driftwall
//!
//! # Another server, faster polling
//! driftwall --host wall.local --port 8080 --poll-ms 1000
//!
//! # Offline with demo entries
//! driftwall --demo
//!
//! # Logs go to a file; the screen belongs to the wall
//! RUST_LOG=debug driftwall --log-file /tmp/driftwall.log
//! ```

use std::fs::File;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use driftwall_core::{HttpBackend, MemoryBackend, WallBackend, WallConfig};
use driftwall_tui::App;

/// Driftwall - a wall of drifting messages
#[derive(Parser, Debug)]
#[command(name = "driftwall")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Wall server host
    #[arg(long, env = "DRIFTWALL_HOST")]
    host: Option<String>,

    /// Wall server port
    #[arg(short = 'p', long, env = "DRIFTWALL_PORT")]
    port: Option<u16>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "DRIFTWALL_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Poll interval in milliseconds
    #[arg(long, env = "DRIFTWALL_POLL_MS")]
    poll_ms: Option<u64>,

    /// Run against an in-process wall seeded with demo entries
    #[arg(long)]
    demo: bool,

    /// Write logs to this file
    #[arg(long, env = "DRIFTWALL_LOG_FILE", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Level for driftwall's own crates when RUST_LOG is unset
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

/// Filter directives scoping `level` to driftwall's own crates
fn default_directives(level: &str) -> String {
    format!("driftwall_tui={level},driftwall_core={level}")
}

/// Send logs to a file, or nowhere
fn init_logging(args: &Args) -> Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(&args.log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

/// Defaults, then file or environment, then flags
fn load_config(args: &Args) -> Result<WallConfig> {
    let mut config = match &args.config {
        Some(path) => WallConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => WallConfig::from_env(),
    };

    if let Some(host) = &args.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(poll_ms) = args.poll_ms {
        config.sync.poll_interval_ms = poll_ms;
    }

    config.validate()?;
    Ok(config)
}

fn build_backend(args: &Args, config: &WallConfig) -> Result<Arc<dyn WallBackend>> {
    if args.demo {
        let backend = MemoryBackend::new(config.reveal.clone());
        backend.seed_demo();
        return Ok(Arc::new(backend));
    }
    let backend = HttpBackend::new(&config.server).context("Failed to build HTTP client")?;
    Ok(Arc::new(backend))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: driftwall requires a terminal (TTY)");
        eprintln!();
        eprintln!("Run it interactively, or over SSH with -t.");
        std::process::exit(1);
    }

    let config = load_config(&args)?;
    let backend = build_backend(&args, &config)?;
    tracing::info!(backend = backend.name(), url = %config.server.base_url(), "Starting driftwall");

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend_term = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_term)?;
    terminal.clear()?;

    let size = terminal.size()?;
    let mut app = App::new(config, backend, (size.width, size.height));
    app.check_backend().await;
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}
