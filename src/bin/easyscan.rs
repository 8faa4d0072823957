//! EasyScan CLI
//!
//! Command-line shell over the scan client and the local history.
//!
//! Usage:
//!   cargo run --features cli --bin easyscan -- new "Warehouse A"
//!   cargo run --features cli --bin easyscan -- report <key> <value>
//!   some-decoder | cargo run --features cli --bin easyscan -- scan <key> --name "Warehouse A"
//!   cargo run --features cli --bin easyscan -- history
//!
//! Configuration comes from `EASYSCAN_*` environment variables (or `.env`);
//! flags override them.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;

use easyscan::config::parse_endpoint;
use easyscan::history::{FileBackend, PreferenceBackend, HISTORY_KEY};
use easyscan::network::should_retry;
use easyscan::{
    ClientConfig, FlowError, HistoryStore, NetworkError, NetworkResult, ScanClient, ScanFlow,
    ScanSession, ScanState,
};

/// Scan-session client
#[derive(Parser, Debug)]
#[command(name = "easyscan")]
#[command(about = "Create scan tasks, report scanned values and browse past sessions")]
struct Args {
    /// Base URL of the scan endpoint (overrides EASYSCAN_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// History file (overrides EASYSCAN_HISTORY_PATH)
    #[arg(long, global = true)]
    history_path: Option<PathBuf>,

    /// Per-request timeout in milliseconds (overrides EASYSCAN_TIMEOUT_MS)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a scan task and record it in the history
    New { name: String },

    /// Report a single scanned value
    Report {
        key: String,
        value: String,
        #[arg(long)]
        name: Option<String>,
    },

    /// Report every line read from stdin as a scanned value
    Scan {
        key: String,
        #[arg(long, default_value = "")]
        name: String,
    },

    /// List past scan tasks
    History,

    /// Remove all past scan tasks
    ClearHistory,

    /// Print share links for a scan task
    Share {
        key: String,
        #[arg(long, default_value = "")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;

    match args.command {
        Command::New { name } => cmd_new(&config, &name).await,
        Command::Report { key, value, name } => {
            cmd_report(&config, &key, &value, name.as_deref()).await
        }
        Command::Scan { key, name } => cmd_scan(&config, ScanSession::new(key, name)).await,
        Command::History => cmd_history(&config).await,
        Command::ClearHistory => cmd_clear_history(&config).await,
        Command::Share { key, name } => cmd_share(&config, &key, &name),
    }
}

fn resolve_config(args: &Args) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(raw) = &args.endpoint {
        config.endpoint = Some(parse_endpoint(raw)?);
    }
    if let Some(path) = &args.history_path {
        config.history_path = path.clone();
    }
    if let Some(ms) = args.timeout_ms {
        config.request_timeout = Duration::from_millis(ms);
    }
    Ok(config)
}

async fn open_flow(config: &ClientConfig) -> Result<ScanFlow> {
    let client = ScanClient::from_config(config)?;
    let history = open_history(config).await?;
    Ok(ScanFlow::new(client, Arc::new(history)))
}

async fn open_history(config: &ClientConfig) -> Result<HistoryStore> {
    HistoryStore::open_file(&config.history_path)
        .await
        .with_context(|| format!("Failed to open history at {}", config.history_path.display()))
}

async fn cmd_new(config: &ClientConfig, name: &str) -> Result<()> {
    let flow = open_flow(config).await?;
    match flow.start_session(name).await {
        Ok(session) => {
            println!("{} {}", "Created".green().bold(), session.name);
            println!("  key:  {}", session.key.cyan());
            println!("  view: {}", flow.share_links(&session).view);
            Ok(())
        }
        Err(FlowError::Network(err)) => {
            print_network_error("Failed to create scan task", &err);
            std::process::exit(1);
        }
        Err(other) => Err(other.into()),
    }
}

async fn cmd_report(
    config: &ClientConfig,
    key: &str,
    value: &str,
    name: Option<&str>,
) -> Result<()> {
    let client = ScanClient::from_config(config)?;
    match client.report_scan(name, key, value).await {
        NetworkResult::Success(true) => println!("{} {}", "Accepted".green().bold(), value),
        NetworkResult::Success(false) => println!("{} {}", "Rejected".yellow().bold(), value),
        NetworkResult::Error(err) => {
            print_network_error("Failed to upload scanned value", &err);
            std::process::exit(1);
        }
        NetworkResult::Loading => {}
    }
    Ok(())
}

async fn cmd_scan(config: &ClientConfig, session: ScanSession) -> Result<()> {
    let flow = open_flow(config).await?;
    let reporter = flow.reporter(session);
    let mut watcher = reporter.subscribe();

    let printer = tokio::spawn(async move {
        while watcher.changed().await.is_ok() {
            let state = watcher.borrow_and_update().clone();
            print_scan_state(&state);
        }
    });

    let lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines())
        .filter_map(|line| async move { line.ok().map(|l| l.trim().to_string()) });
    let started = reporter.run(lines).await;

    // Let the printer see the final state before stopping it.
    tokio::task::yield_now().await;
    printer.abort();

    let state = reporter.state();
    println!(
        "{} {} reported, {} accepted",
        "Done:".bold(),
        started,
        state.accepted.len()
    );
    Ok(())
}

async fn cmd_history(config: &ClientConfig) -> Result<()> {
    let history = open_history(config).await?;
    let entries = history.snapshot();
    if entries.is_empty() {
        println!("{}", "No scan history".dimmed());
        return Ok(());
    }
    for entry in entries {
        println!("{}  {}", entry.key.cyan(), entry.name);
    }
    Ok(())
}

async fn cmd_clear_history(config: &ClientConfig) -> Result<()> {
    // Straight to the backend: an unreadable file must not block clearing.
    FileBackend::new(&config.history_path)
        .remove(HISTORY_KEY)
        .await
        .with_context(|| format!("Failed to clear history at {}", config.history_path.display()))?;
    println!("{}", "History cleared".green());
    Ok(())
}

fn cmd_share(config: &ClientConfig, key: &str, name: &str) -> Result<()> {
    let client = ScanClient::from_config(config)?;
    let links = client.share_links(key);
    println!("{}", links.share_text(name));
    Ok(())
}

fn print_scan_state(state: &ScanState) {
    let Some(value) = &state.current else {
        return;
    };
    match &state.outcome {
        Some(NetworkResult::Loading) => println!("{} {}", "Uploading".dimmed(), value),
        Some(NetworkResult::Success(true)) => println!("{} {}", "Accepted".green(), value),
        Some(NetworkResult::Success(false)) => println!("{} {}", "Rejected".yellow(), value),
        Some(NetworkResult::Error(err)) => print_network_error("Upload failed", err),
        None => {}
    }
}

fn print_network_error(context: &str, err: &NetworkError) {
    eprintln!("{} {}: {}", "Error".red().bold(), context, err);
    if should_retry(err.kind()) {
        eprintln!("  {}", "This looks temporary, run the command again to retry".dimmed());
    }
}
