//! Acceptance tests for the LC-MAE driver: safety, determinism, and
//! structural invariants across concrete end-to-end scenarios. Every scenario
//! below places evacuating agents' origins inside the dangerous set
//! itself — an agent standing on a merely-nearby safe cell is already
//! "safe" by `Grid::is_safe` and is never handed to an evacuation
//! strategy at all (the Surfing/Evacuating split).

use evac_core::{Cell, Grid, Scenario, TileMap};
use evac_planner::{plan_lcmae, LcmaeConfig, PlanError};

const FOUR_BY_FOUR: &str = "type octile\nheight 4\nwidth 4\nmap\n....\n....\n....\n....\n";

fn assert_no_vertex_collisions(paths: &[Vec<Cell>]) {
    let len = paths.first().map(Vec::len).unwrap_or(0);
    for t in 0..len {
        for a in 0..paths.len() {
            for b in (a + 1)..paths.len() {
                assert_ne!(paths[a][t], paths[b][t], "agents {a} and {b} collide at t={t}");
            }
        }
    }
}

fn assert_adjacent_or_stationary(grid: &Grid, path: &[Cell]) {
    for t in 1..path.len() {
        let (from, to) = (path[t - 1], path[t]);
        if from != to {
            assert!(grid.neighbors(from).contains(&to), "move {from}->{to} at t={t} is not 4-adjacent");
        }
    }
}

fn assert_equal_lengths(paths: &[Vec<Cell>]) {
    let len = paths[0].len();
    for (i, p) in paths.iter().enumerate() {
        assert_eq!(p.len(), len, "agent {i} path length differs");
    }
}

/// Scenario: a RETARGETING agent boxed inside a 2x2 danger block must
/// take exactly two steps to clear it (every direct neighbor of the
/// origin is itself dangerous, so the first tick cannot yet reach
/// safety — see module docs).
#[test]
fn tiny_evacuation() {
    let map = TileMap::parse(FOUR_BY_FOUR).unwrap();
    let scn = Scenario::parse("0 1 4 5\n0r\n").unwrap();
    let grid = Grid::build(&map, &scn.danger);
    let paths = plan_lcmae(&grid, &scn, &LcmaeConfig::default()).unwrap();

    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0][0], 0);
    assert_eq!(paths[0].len(), 3, "path: {:?}", paths[0]);
    assert!(grid.frontier().contains(paths[0].last().unwrap()));
    assert_adjacent_or_stationary(&grid, &paths[0]);
}

/// Scenario: two RETARGETING agents start on adjacent dangerous cells in
/// a single-row corridor and must each reach safety in one step, in
/// opposite directions, without ever colliding.
#[test]
fn two_agent_corridor() {
    let map = TileMap::parse("type octile\nheight 4\nwidth 4\nmap\n@@@@\n....\n@@@@\n@@@@\n").unwrap();
    let scn = Scenario::parse("5 6\n5r 6r\n").unwrap();
    let grid = Grid::build(&map, &scn.danger);
    let paths = plan_lcmae(&grid, &scn, &LcmaeConfig::default()).unwrap();

    assert_equal_lengths(&paths);
    assert_no_vertex_collisions(&paths);
    assert_eq!(paths[0], vec![5, 4]);
    assert_eq!(paths[1], vec![6, 7]);
    for path in &paths {
        assert!(grid.is_safe(*path.last().unwrap()));
    }
}

/// Scenario: a STATIC agent's declared goal is its only safe neighbor,
/// so the fixed-target path and the natural escape route coincide.
#[test]
fn static_fixed_target() {
    let map = TileMap::parse("type octile\nheight 1\nwidth 2\nmap\n..\n").unwrap();
    let scn = Scenario::parse("0\n0s1\n").unwrap();
    let grid = Grid::build(&map, &scn.danger);
    let paths = plan_lcmae(&grid, &scn, &LcmaeConfig::default()).unwrap();

    assert_eq!(paths[0], vec![0, 1]);
}

/// Scenario: a PANICKED agent ignores danger entirely, so only the
/// structural invariants (not an eventual safety guarantee) can be
/// asserted of it.
#[test]
fn panicked_walk_obeys_structural_invariants() {
    let map = TileMap::parse(FOUR_BY_FOUR).unwrap();
    let scn = Scenario::parse("0 1 2 3 4 5 6 7\n0p\n").unwrap();
    let grid = Grid::build(&map, &scn.danger);
    let paths = plan_lcmae(&grid, &scn, &LcmaeConfig::default()).unwrap();

    assert_eq!(paths[0][0], 0);
    assert_adjacent_or_stationary(&grid, &paths[0]);
}

/// Scenario: no frontier at all — the whole grid is dangerous, so there
/// is nowhere for a retargeting agent to escape to.
#[test]
fn no_frontier_is_fatal() {
    let map = TileMap::parse(FOUR_BY_FOUR).unwrap();
    let all_cells: Vec<String> = (0..16).map(|c: u32| c.to_string()).collect();
    let scn = Scenario::parse(&format!("{}\n0r\n", all_cells.join(" "))).unwrap();
    let grid = Grid::build(&map, &scn.danger);
    assert_eq!(plan_lcmae(&grid, &scn, &LcmaeConfig::default()), Err(PlanError::NoFrontier));
}

/// Scenario: a PANICKED agent sealed inside a single dangerous cell with
/// no neighbors at all shares a scenario with a RETARGETING agent that has
/// a perfectly ordinary, reachable escape route elsewhere on the map. The
/// sealed agent can never reach safety, but that must not abort the plan
/// for the agent that can — only RETARGETING/ClosestFrontier agents are
/// subject to the upfront reachability check.
#[test]
fn sealed_off_panicked_agent_does_not_abort_reachable_agents() {
    let map = TileMap::parse("type octile\nheight 1\nwidth 6\nmap\n@.@..@\n").unwrap();
    let scn = Scenario::parse("1 3\n1p 3r\n").unwrap();
    let grid = Grid::build(&map, &scn.danger);
    assert!(grid.neighbors(1).is_empty(), "cell 1 must be walled off from the rest of the grid");

    let paths = plan_lcmae(&grid, &scn, &LcmaeConfig::default()).unwrap();

    assert_eq!(paths.len(), 2);
    assert!(paths[0].iter().all(|&c| c == 1), "sealed panicked agent can only wait in place");
    assert!(grid.is_safe(*paths[1].last().unwrap()));
}

/// Determinism: the same map, scenario and config produce
/// bit-identical paths across repeated runs.
#[test]
fn deterministic_across_runs() {
    let map = TileMap::parse("type octile\nheight 4\nwidth 4\nmap\n@@@@\n....\n@@@@\n@@@@\n").unwrap();
    let scn = Scenario::parse("5 6\n5r 6r\n").unwrap();
    let grid = Grid::build(&map, &scn.danger);
    let config = LcmaeConfig::default();
    let run1 = plan_lcmae(&grid, &scn, &config).unwrap();
    let run2 = plan_lcmae(&grid, &scn, &config).unwrap();
    assert_eq!(run1, run2);
}

/// A scene mixing all four agent kinds, each boxed against the
/// danger zone with a single direct escape route, so the three
/// goal-directed kinds are guaranteed to finish safe while the panicked
/// agent is checked only for the structural invariants.
#[test]
fn mixed_agent_scene_respects_all_invariants() {
    let map = TileMap::parse(FOUR_BY_FOUR).unwrap();
    let scn = Scenario::parse("0 1 2 3\n0r 1f 2s6 3p\n").unwrap();
    let grid = Grid::build(&map, &scn.danger);
    let paths = plan_lcmae(&grid, &scn, &LcmaeConfig::default()).unwrap();

    assert_equal_lengths(&paths);
    assert_no_vertex_collisions(&paths);
    for (i, path) in paths.iter().enumerate() {
        assert_eq!(path[0], scn.agents[i].origin);
        assert_adjacent_or_stationary(&grid, path);
    }
    // Retargeting, closest-frontier and static agents all escape and stay safe.
    for path in &paths[..3] {
        assert!(grid.is_safe(*path.last().unwrap()));
    }
}

/// Boundary: an agent that starts on a cell that is merely adjacent to
/// danger is already safe by `Grid::is_safe`, so it is never handed to
/// an evacuation strategy and never moves.
#[test]
fn agent_already_safe_never_moves() {
    let map = TileMap::parse(FOUR_BY_FOUR).unwrap();
    let scn = Scenario::parse("0 1 2 3\n4r\n").unwrap();
    let grid = Grid::build(&map, &scn.danger);
    assert!(grid.frontier().contains(&4));
    let paths = plan_lcmae(&grid, &scn, &LcmaeConfig::default()).unwrap();
    assert_eq!(paths[0], vec![4]);
}

/// Boundary: an empty danger set means every agent starts safe, so the
/// driver never runs a single tick.
#[test]
fn empty_danger_set_yields_a_length_one_path() {
    let map = TileMap::parse(FOUR_BY_FOUR).unwrap();
    let scn = Scenario::parse("\n0r\n").unwrap();
    let grid = Grid::build(&map, &scn.danger);
    let paths = plan_lcmae(&grid, &scn, &LcmaeConfig::default()).unwrap();
    assert_eq!(paths[0], vec![0]);
}
