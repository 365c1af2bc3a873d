//! NUSim request replayer
//!
//! Runs a script of controller API requests against an in-memory simulator
//! and prints every response as JSON.
//!
//! Usage:
//!   nusim script.json
//!   nusim --config nusim.json --schemas schemas.json script.json
//!
//! State lives only for the duration of one run.

use std::path::PathBuf;
use anyhow::Result;
use clap::Parser;
use nusim_cli::{build_router, load_config, load_registry, load_script, replay};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "nusim")]
#[command(about = "Replay controller API requests against an in-memory simulator")]
struct Args {
    /// Request script: a JSON array of {method, path, headers, body}
    script: PathBuf,

    /// Engine config file (JSON); defaults apply to missing keys
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Schema table (JSON); the built-in table is used when omitted
    #[arg(short, long)]
    schemas: Option<PathBuf>,

    /// Stop at the first request that is not answered with 2xx
    #[arg(long)]
    stop_on_error: bool,

    /// Print one compact JSON line per exchange
    #[arg(long)]
    compact: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = load_config(args.config.as_deref())?;
    let registry = load_registry(args.schemas.as_deref())?;
    let requests = load_script(&args.script)?;
    info!(
        types = registry.len(),
        requests = requests.len(),
        "NUSim starting"
    );

    let router = build_router(registry, config)?;
    let exchanges = replay(&router, requests, args.stop_on_error);
    let failures = exchanges.iter().filter(|e| !e.response.is_success()).count();

    for exchange in &exchanges {
        let line = if args.compact {
            serde_json::to_string(exchange)?
        } else {
            serde_json::to_string_pretty(exchange)?
        };
        println!("{line}");
    }
    info!(replayed = exchanges.len(), failures, "Replay finished");
    Ok(())
}
