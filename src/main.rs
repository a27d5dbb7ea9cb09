//! Application entry point for the `airq` command-line tool.
//!
//! This binary orchestrates the startup sequence for the air quality record
//! keeper, including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing (to stderr)
//! - Opening the flat-file record store and seeding sample data when empty
//! - Dispatching the parsed command through the `commands` gateway (EMBP pattern)
//!
//! # Environment Variables
//! - `AIRQ_DATA_DIR` (optional) – data directory (default: `data`)
//! - `AIRQ_ADMIN_USERNAME` / `AIRQ_ADMIN_PASSWORD` (optional) – admin account
//! - `AIRQ_SEED_SAMPLE_DATA` (optional) – seed sample data on first use (default: true)
//! - `AIRQ_LOG_LEVEL` (optional) – log verbosity (default: `warn`)
//! - `AIRQ_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! This module follows the Explicit Module Boundary Pattern (EMBP) by
//! delegating configuration parsing to `config`, persistence to `store`, and
//! command handling to `commands`.
use std::{env, io};

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

mod cli;
mod commands;
mod config;
mod engine;
mod import;
mod models;
mod sample;
mod store;
mod table;
mod util;

pub use config::Config;

// ---

fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let args = cli::Cli::parse();

    let mut cfg = config::load_from_env()?;
    if let Some(data_dir) = args.data_dir {
        cfg.data_dir = data_dir;
    }
    cfg.log_config();

    let store = store::RecordStore::open(&cfg.data_dir)?;
    if cfg.seed_sample_data && !matches!(args.command, cli::Command::Seed) {
        sample::ensure_sample_data(&store)?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::run(args.command, &cfg, &store, &mut out)
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Output to stderr, so stdout carries only command output
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY on stderr
/// - Span event emission mode controlled by the `AIRQ_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by `RUST_LOG`, falling back to `AIRQ_LOG_LEVEL`
///
/// This should be called once at startup before any logging macros are
/// invoked. It installs the subscriber globally for the lifetime of the
/// process.
fn init_tracing() {
    // ---
    let span_events = match env::var("AIRQ_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => io::stderr().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to AIRQ_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("AIRQ_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "warn",
        };
        EnvFilter::new(level)
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
