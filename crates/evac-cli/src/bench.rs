//! `benchmark` command: runs every map/scenario pair named in a
//! benchfile and prints one summary line per instance. Parallelized
//! across OS threads with `rayon`, the same crate `khx02-vrp` reaches
//! for to parallelize independent solver runs.
//!
//! Benchfile format, one line per map:
//! ```text
//! path/to.map: path/to/a.scen path/to/b.scen
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;

use evac_core::{Grid, Scenario, TileMap};
use evac_planner::{plan_flow, plan_lcmae, FlowConfig, LcmaeConfig};

use crate::cli::Algorithm;

pub struct BenchCase {
    pub map: PathBuf,
    pub scenario: PathBuf,
}

pub fn parse_benchfile(input: &str) -> Result<Vec<BenchCase>> {
    let mut cases = Vec::new();
    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (map, scens) = line
            .split_once(':')
            .ok_or_else(|| anyhow!("benchfile line missing ':' separator: {line}"))?;
        let map = PathBuf::from(map.trim());
        for scen in scens.split_whitespace() {
            cases.push(BenchCase { map: map.clone(), scenario: PathBuf::from(scen) });
        }
    }
    Ok(cases)
}

fn bench_name(map: &Path, scenario: &Path) -> String {
    let stem = |p: &Path| p.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    format!("{}-{}", stem(map), stem(scenario))
}

fn run_one(case: &BenchCase, algorithm: Algorithm) -> Result<(String, u32, f64)> {
    let map_text = std::fs::read_to_string(&case.map).with_context(|| format!("reading {}", case.map.display()))?;
    let scen_text =
        std::fs::read_to_string(&case.scenario).with_context(|| format!("reading {}", case.scenario.display()))?;
    let map = TileMap::parse(&map_text).with_context(|| format!("parsing {}", case.map.display()))?;
    let scenario = Scenario::parse(&scen_text).with_context(|| format!("parsing {}", case.scenario.display()))?;
    let grid = Grid::build(&map, &scenario.danger);

    let start = Instant::now();
    let paths = match algorithm {
        Algorithm::Lcmae => plan_lcmae(&grid, &scenario, &LcmaeConfig::default())?,
        Algorithm::Flow => plan_flow(&grid, &scenario, &FlowConfig::default())?,
    };
    let elapsed = start.elapsed().as_secs_f64();
    let makespan = paths.first().map(|p| p.len() as u32).unwrap_or(0).saturating_sub(1);
    Ok((bench_name(&case.map, &case.scenario), makespan, elapsed))
}

/// Runs every case in `cases`, `jobs` at a time (`None` = rayon's
/// default, one thread per core), and prints `name makespan=.. time=..s`
/// per instance as it completes.
pub fn run_benchmark(cases: &[BenchCase], algorithm: Algorithm, jobs: Option<usize>) -> Result<()> {
    let run = || -> Vec<Result<(String, u32, f64)>> { cases.par_iter().map(|c| run_one(c, algorithm)).collect() };

    let results = if let Some(jobs) = jobs {
        rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?.install(run)
    } else {
        run()
    };

    let mut failures = 0;
    for result in results {
        match result {
            Ok((name, makespan, secs)) => println!("{name} makespan={makespan} time={secs:.3}s"),
            Err(e) => {
                eprintln!("benchmark case failed: {e:#}");
                failures += 1;
            }
        }
    }
    if failures > 0 {
        return Err(anyhow!("{failures} benchmark case(s) failed"));
    }
    Ok(())
}
