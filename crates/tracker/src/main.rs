//! # Tracker CLI
//!
//! Drives a verification attempt from the terminal: replay recorded input,
//! simulate a bot, or compute features offline.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use agni_common::{FeatureRecord, IntakePayload};
use tracker::config::{ConfigOverrides, TrackerConfig};
use tracker::{
    Clock, ConsolePresenter, Controller, HttpVerifier, ManualClock, ReplayScript, Session,
    SystemClock,
};

/// Agni Tracker - behavioral human/bot verification client
#[derive(Parser, Debug)]
#[command(name = "tracker")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/tracker.toml")]
    config: String,

    /// Verification intake URL (overrides config)
    #[arg(long, env = "AGNI_INTAKE_URL")]
    intake_url: Option<String>,

    /// Classifier URL (overrides config)
    #[arg(long, env = "AGNI_PREDICT_URL")]
    predict_url: Option<String>,

    /// Per-request timeout in seconds (overrides config)
    #[arg(long, env = "AGNI_REQUEST_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw a prompt and attempt token
    Prompt,

    /// Replay a recorded input script into a fresh attempt and submit it
    Replay {
        /// JSON script of timed key/pointer events
        script: PathBuf,

        /// Use virtual time instead of waiting out the recorded gaps
        #[arg(long)]
        instant: bool,
    },

    /// Fill an attempt with simulated bot input and submit it
    SimulateBot {
        /// Print the payload and features instead of submitting
        #[arg(long)]
        dry_run: bool,
    },

    /// Compute the feature record for a recorded intake payload
    Features {
        /// JSON file holding one intake payload
        payload: PathBuf,
    },
}

type ConsoleController<C> =
    Controller<HttpVerifier, HttpVerifier, ConsolePresenter<std::io::Stdout>, C>;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    init_logging(&args.log_level, args.json_logs)?;

    if let Ok(path) = dotenvy::dotenv() {
        info!(path = %path.display(), "Loaded environment file");
    }

    let overrides = ConfigOverrides {
        intake_url: args.intake_url.clone(),
        predict_url: args.predict_url.clone(),
        request_timeout_secs: args.timeout_secs,
    };
    let config = TrackerConfig::load(&args.config, &overrides)?;

    match args.command {
        Command::Prompt => {
            let session = Session::with_clock(SystemClock, config.prompts.clone());
            println!("{}", session.prompt());
            println!("token: {}", session.token());
            Ok(ExitCode::SUCCESS)
        }
        Command::Replay { script, instant } => {
            let script = ReplayScript::load(&script)?;
            replay(&config, &script, instant).await
        }
        Command::SimulateBot { dry_run } => simulate(&config, dry_run).await,
        Command::Features { payload } => {
            let raw = std::fs::read_to_string(&payload)
                .with_context(|| format!("Failed to read {}", payload.display()))?;
            let payload: IntakePayload =
                serde_json::from_str(&raw).context("Failed to parse intake payload")?;
            let record = FeatureRecord::from_payload(&payload);
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn replay(config: &TrackerConfig, script: &ReplayScript, instant: bool) -> Result<ExitCode> {
    let verifier = HttpVerifier::from_config(config)?;

    if instant {
        let clock = ManualClock::new();
        let session = Session::with_clock(clock.clone(), config.prompts.clone());
        let mut ctl = Controller::new(
            session,
            verifier.clone(),
            verifier,
            ConsolePresenter::stdout(),
        );
        announce(ctl.session());

        let sub = ctl.session().subscribe();
        let delivered = script.play_instant(ctl.session_mut(), &sub, &clock);
        info!(delivered, "Replayed input on virtual time");

        Ok(finish(&mut ctl).await)
    } else {
        let session = Session::with_clock(SystemClock, config.prompts.clone());
        let mut ctl = Controller::new(
            session,
            verifier.clone(),
            verifier,
            ConsolePresenter::stdout(),
        );
        announce(ctl.session());

        let sub = ctl.session().subscribe();
        let delivered = script.play_realtime(ctl.session_mut(), &sub).await;
        info!(delivered, "Replayed input in real time");

        Ok(finish(&mut ctl).await)
    }
}

async fn simulate(config: &TrackerConfig, dry_run: bool) -> Result<ExitCode> {
    let verifier = HttpVerifier::from_config(config)?;
    let session = Session::with_clock(SystemClock, config.prompts.clone());
    let mut ctl = Controller::new(
        session,
        verifier.clone(),
        verifier,
        ConsolePresenter::stdout(),
    );
    announce(ctl.session());
    ctl.simulate_bot();

    if dry_run {
        let snapshot = ctl.session().snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot.intake_payload())?);
        println!("{}", serde_json::to_string_pretty(&snapshot.features())?);
        return Ok(ExitCode::SUCCESS);
    }

    Ok(finish(&mut ctl).await)
}

fn announce<C: Clock>(session: &Session<C>) {
    println!("{}", session.prompt());
    info!(token = %session.token(), "Attempt started");
}

/// Submit and map the outcome to a process exit code
async fn finish<C: Clock>(ctl: &mut ConsoleController<C>) -> ExitCode {
    match ctl.submit().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            info!(error = %err, retryable = err.is_retryable(), "Attempt not verified");
            ExitCode::FAILURE
        }
    }
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}
