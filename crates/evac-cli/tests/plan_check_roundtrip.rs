//! End-to-end coverage of the library half of the CLI: parse a map and
//! scenario, plan, render to the solution format, parse it back, and
//! check it — the same round trip `main.rs`'s `plan`/`check` subcommands
//! perform, without spawning the compiled binary.

use evac_cli::{check, solution};
use evac_core::{Grid, Scenario, TileMap};
use evac_planner::{plan_lcmae, LcmaeConfig};

const MAP: &str = "type octile\nheight 1\nwidth 2\nmap\n..\n";

#[test]
fn planned_solution_round_trips_and_passes_check() {
    let map = TileMap::parse(MAP).unwrap();
    let scenario = Scenario::parse("0\n0s1\n").unwrap();
    let grid = Grid::build(&map, &scenario.danger);

    let paths = plan_lcmae(&grid, &scenario, &LcmaeConfig::default()).unwrap();
    let rendered = solution::format_paths(&paths);
    assert_eq!(rendered, "00 01");

    let parsed = solution::parse_solution(&rendered).unwrap();
    assert_eq!(parsed, paths);

    let report = check::check(&grid, &scenario, &parsed);
    assert!(report.is_valid(), "errors: {:?}", report.errors);
    assert!(report.endangered_at_end.is_empty());
}

#[test]
fn check_flags_a_vertex_collision_in_a_hand_written_solution() {
    let map = TileMap::parse("type octile\nheight 1\nwidth 4\nmap\n....\n").unwrap();
    let scenario = Scenario::parse("0\n0r 2r\n").unwrap();
    let grid = Grid::build(&map, &scenario.danger);

    let rendered = "00 01\n02 01\n";
    let paths = solution::parse_solution(rendered).unwrap();
    let report = check::check(&grid, &scenario, &paths);

    assert!(!report.is_valid());
    assert!(report
        .errors
        .iter()
        .any(|e| matches!(e, check::CheckError::VertexCollision { .. })));
}
