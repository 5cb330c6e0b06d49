//! Wavefront headless runner.
//!
//! Feeds a JSON scenario through the core engine and prints the results, in
//! place of the network transport.

#![allow(clippy::print_stdout)]

mod scenario;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;

/// Run a Wavefront scenario file
#[derive(Parser, Debug)]
#[command(name = "wavefront")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file (JSON)
    #[arg(required = true)]
    scenario: PathBuf,

    /// Game variant to run
    #[arg(short, long, value_enum, default_value = "turn")]
    mode: Mode,

    /// Skip the per-turn board printout
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Grid turns.
    Turn,
    /// Continuous ticks.
    Realtime,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let text = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("reading {}", args.scenario.display()))?;
    let scenario = Scenario::parse(&text)
        .with_context(|| format!("parsing {}", args.scenario.display()))?;

    let snapshot = match args.mode {
        Mode::Turn => {
            let state = scenario.run_turns(|turn, state| {
                if !args.quiet {
                    println!("turn {turn}\n{state}");
                }
            })?;
            state.to_json()?
        }
        Mode::Realtime => scenario.run_ticks()?.to_json()?,
    };

    println!("{snapshot}");
    Ok(())
}
