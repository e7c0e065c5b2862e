// src/main.rs
// =============================================================================
// This is the entry point of urusai, the traffic generator.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging at the requested level
// 3. Load and validate the configuration
// 4. Wire Ctrl-C / SIGTERM and the optional --timeout to one CancellationToken
// 5. Run the crawl until that token is cancelled or the config timeout elapses
// 6. Exit with proper code (0 = stopped normally, 2 = setup error)
// =============================================================================

mod cli;
mod config;
mod crawl;
mod links;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::Config;
use crawl::Crawler;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            // Logging may not be set up yet, so print directly
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log);

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => {
            tracing::info!("using default config");
            Config::load_default()?
        }
    };

    // A positive --timeout wins over the configured seconds
    let run_timeout = cli.timeout.filter(|t| !t.is_zero());
    if let Some(timeout) = run_timeout {
        config.timeout = timeout.as_secs();
    }

    config.validate()?;

    let token = CancellationToken::new();
    spawn_shutdown_listener(token.clone());
    if let Some(timeout) = run_timeout {
        spawn_deadline(token.clone(), timeout);
    }

    let mut crawler = match cli.seed {
        Some(seed) => Crawler::with_seed(config, seed)?,
        None => Crawler::new(config)?,
    };

    tracing::info!("starting urusai traffic generator");
    crawler.crawl(&token).await;

    Ok(())
}

// Installs the global tracing subscriber
//
// RUST_LOG, when set, takes precedence over --log.
fn init_logging(level: cli::LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// Cancels `token` on Ctrl-C or (on unix) SIGTERM
fn spawn_shutdown_listener(token: CancellationToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("shutdown signal received, stopping crawl");
        token.cancel();
    });
}

// Cancels `token` once `timeout` has passed
fn spawn_deadline(token: CancellationToken, timeout: std::time::Duration) {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(timeout) => {
                tracing::info!("run timeout of {:?} reached", timeout);
                token.cancel();
            }
        }
    });
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!("cannot listen for SIGTERM: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
