#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives an Orepit mining session.
//!
//! This binary is the session driver the engine treats as its presentation
//! collaborator: it owns the fixed tick source and the stdin action source,
//! feeds both into the single-threaded command dispatcher, and persists the
//! snapshot after mutations.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use orepit_world::World;

use crate::config::SessionManifest;
use crate::session::Session;

mod config;
mod session;
mod snapshot;

/// Command-line options accepted by the Orepit session driver.
#[derive(Debug, Parser)]
#[command(name = "orepit", about = "Tick-driven idle mining simulation")]
struct Args {
    /// Path of the JSON snapshot read at boot and written after mutations.
    #[arg(long, default_value = "orepit_save.json")]
    save: PathBuf,

    /// Optional TOML session manifest with tick cadence and autosave flags.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Discard any existing snapshot and start a fresh session.
    #[arg(long)]
    reset: bool,

    /// Advance the provided number of ticks without sleeping, then exit.
    #[arg(long)]
    ticks: Option<u64>,
}

/// Entry point for the Orepit command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let manifest = SessionManifest::load(args.config.as_deref())?;
    let world = if args.reset {
        World::new()
    } else {
        snapshot::load(&args.save)
    };

    let session = Session::new(world, manifest, args.save);
    match args.ticks {
        Some(ticks) => session.run_headless(ticks),
        None => session.run_interactive(),
    }
}
