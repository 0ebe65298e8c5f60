//! Command-line surface: `plan`, `benchmark`, `check`. Argument
//! defaults mirror the planner's own magic constants (lookahead 10,
//! deadlock timer 15, seed 42) per the config-from-flags-with-hardcoded-
//! default idiom the teacher's `Config::from_env` uses for its own knobs.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "evac-cli", about = "Evacuation planning on 2D grid maps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum Algorithm {
    #[default]
    Lcmae,
    Flow,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an evacuation plan for a map and a scenario.
    Plan {
        map: PathBuf,
        scenario: PathBuf,
        #[arg(long, value_enum, default_value_t = Algorithm::Lcmae)]
        algorithm: Algorithm,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 10)]
        lookahead: u32,
        #[arg(long, default_value_t = 15)]
        deadlock_timer: u32,
        /// Only consulted with `--algorithm flow`.
        #[arg(long)]
        postprocess: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Plan every map/scenario pair named in a benchfile, optionally in
    /// parallel, and print one summary line per instance.
    Benchmark {
        benchfile: PathBuf,
        #[arg(long, value_enum, default_value_t = Algorithm::Lcmae)]
        algorithm: Algorithm,
        #[arg(long)]
        jobs: Option<usize>,
    },
    /// Validate a solution file against its map and scenario.
    Check { map: PathBuf, scenario: PathBuf, solution: PathBuf },
}
