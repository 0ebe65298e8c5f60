//! Entry point for the `plan`/`benchmark`/`check` CLI. Logging and
//! argument parsing are the only ambient concerns a binary crate needs;
//! everything else lives in `evac-core`/`evac-planner`.

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use evac_cli::cli::{Algorithm, Cli, Command};
use evac_cli::{bench, check, solution};
use evac_core::{Grid, Scenario, TileMap};
use evac_planner::{plan_flow, plan_lcmae, FlowConfig, LcmaeConfig, PlanError};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "evac_cli=info".into()))
        .init();
}

fn load_grid_and_scenario(map_path: &std::path::Path, scenario_path: &std::path::Path) -> Result<(Grid, Scenario)> {
    let map_text = fs::read_to_string(map_path).with_context(|| format!("reading {}", map_path.display()))?;
    let scen_text = fs::read_to_string(scenario_path).with_context(|| format!("reading {}", scenario_path.display()))?;
    let map = TileMap::parse(&map_text).with_context(|| format!("parsing map {}", map_path.display()))?;
    let scenario = Scenario::parse(&scen_text).with_context(|| format!("parsing scenario {}", scenario_path.display()))?;
    let grid = Grid::build(&map, &scenario.danger);
    Ok((grid, scenario))
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Command::Plan { map, scenario, algorithm, seed, lookahead, deadlock_timer, postprocess, output } => {
            let (grid, scenario) = load_grid_and_scenario(&map, &scenario)?;
            let result = match algorithm {
                Algorithm::Lcmae => {
                    plan_lcmae(&grid, &scenario, &LcmaeConfig { seed, lookahead, deadlock_timer })
                }
                Algorithm::Flow => plan_flow(&grid, &scenario, &FlowConfig { postprocess }),
            };
            let paths = match result {
                Ok(paths) => paths,
                Err(PlanError::NoFrontier) => {
                    eprintln!("No passage to safety exists!");
                    return Ok(ExitCode::from(2));
                }
                Err(e) => return Err(e.into()),
            };
            let rendered = solution::format_paths(&paths);
            match output {
                Some(path) => fs::write(&path, rendered + "\n").with_context(|| format!("writing {}", path.display()))?,
                None => println!("{rendered}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Benchmark { benchfile, algorithm, jobs } => {
            let text = fs::read_to_string(&benchfile).with_context(|| format!("reading {}", benchfile.display()))?;
            let cases = bench::parse_benchfile(&text)?;
            bench::run_benchmark(&cases, algorithm, jobs)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { map, scenario, solution: solution_path } => {
            let (grid, scenario) = load_grid_and_scenario(&map, &scenario)?;
            let solution_text = fs::read_to_string(&solution_path)
                .with_context(|| format!("reading {}", solution_path.display()))?;
            let paths = solution::parse_solution(&solution_text).context("parsing solution file")?;
            let report = check::check(&grid, &scenario, &paths);
            for err in &report.errors {
                println!("ERROR: {err}");
            }
            for agent in &report.endangered_at_end {
                println!("WARNING: agent {agent} ends in a dangerous cell");
            }
            if report.is_valid() {
                println!("OK: {} agent(s), no violations", paths.len());
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
