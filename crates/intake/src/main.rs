//! # Intake - Agni verification intake
//!
//! Receives raw attempt payloads from the tracker, rejects replayed attempt
//! tokens, and appends accepted submissions to the behavior log.
//!
//! ## Architecture
//! ```text
//! Tracker → Intake (/api/submit) → behavior log (JSON lines)
//!              ↓                        ↓
//!        Nonce store              `intake export` → dataset CSV
//!      (memory / Redis)
//! ```
//!
//! `intake generate-bots` seeds the log with labelled synthetic bot rows.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod bots;
mod config;
mod dataset;
mod routes;
mod state;
mod store;

use config::AppConfig;
use state::AppState;

/// Agni Intake - verification intake service
#[derive(Parser, Debug)]
#[command(name = "intake")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/intake.toml")]
    config: String,

    /// Redis URL for the nonce store (overrides config)
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// Behavior log path (overrides config)
    #[arg(long, env = "BEHAVIOR_LOG")]
    log_path: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (default)
    Serve,

    /// Convert the behavior log into a feature CSV
    Export {
        /// Output CSV path
        out: PathBuf,

        /// Behavior log to read (defaults to the configured log)
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Append labelled synthetic bot submissions to the behavior log
    GenerateBots {
        /// Number of submissions to generate
        #[arg(long, default_value_t = 30)]
        count: usize,

        /// Behavior log to append to (defaults to the configured log)
        #[arg(long)]
        log: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    if let Ok(path) = dotenvy::dotenv() {
        info!(path = %path.display(), "Loaded environment file");
    }

    // Load configuration
    let config = AppConfig::load(&args.config, &args)?;

    match args.command {
        Some(Command::Export { ref out, ref log }) => {
            let log = log.clone().unwrap_or_else(|| PathBuf::from(&config.log_path));
            let summary = dataset::export_csv(&log, out)?;
            println!(
                "Exported {} rows ({} labelled, {} skipped) to {}",
                summary.rows,
                summary.labelled,
                summary.skipped,
                out.display()
            );
            Ok(())
        }
        Some(Command::GenerateBots { count, ref log }) => {
            let log = log.clone().unwrap_or_else(|| PathBuf::from(&config.log_path));
            let written = bots::append_bots(&store::BehaviorLog::new(log.clone()), count).await?;
            println!("Appended {written} bot submissions to {}", log.display());
            Ok(())
        }
        Some(Command::Serve) | None => serve(config).await,
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    info!(
        "🔥 Starting Agni Intake v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize application state
    let state = AppState::new(config.clone()).await?;
    info!(
        nonce_store = state.nonces.backend(),
        log_path = %config.log_path,
        "✅ Intake state ready"
    );

    // Build router
    let app = routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("🚀 Intake listening on {}", config.listen_addr);

    // Handle graceful shutdown
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("🛑 Shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    info!("👋 Intake shutdown complete");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }

    Ok(())
}
