//! Tests for the map and scenario file formats.

use evac_core::{AgentKind, Grid, Scenario, TileMap};
use pretty_assertions::assert_eq;

const FOUR_BY_FOUR: &str = "type octile\nheight 4\nwidth 4\nmap\n....\n....\n....\n....\n";

#[test]
fn tiny_evacuation_scenario_builds_expected_frontier() {
    let map = TileMap::parse(FOUR_BY_FOUR).unwrap();
    let scn = Scenario::parse("0 1 2 3\n12r\n").unwrap();
    let grid = Grid::build(&map, &scn.danger);

    assert_eq!(scn.agents.len(), 1);
    assert_eq!(scn.agents[0].kind, AgentKind::Retargeting);
    assert_eq!(scn.agents[0].origin, 12);

    for c in 4..8 {
        assert!(grid.frontier().contains(&c));
    }
    assert!(!grid.is_safe(0));
    assert!(grid.is_safe(12));
}

#[test]
fn static_agent_descriptor_carries_a_goal() {
    let scn = Scenario::parse("\n0s15\n").unwrap();
    assert_eq!(scn.agents[0].kind, AgentKind::Static);
    assert_eq!(scn.agents[0].goal, Some(15));
}

#[test]
fn mixed_agent_descriptors_parse_in_order() {
    let scn = Scenario::parse("4\n5r 6f 9s15 3p\n").unwrap();
    let kinds: Vec<AgentKind> = scn.agents.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![AgentKind::Retargeting, AgentKind::ClosestFrontier, AgentKind::Static, AgentKind::Panicked]
    );
}

#[test]
fn no_frontier_when_entire_grid_is_danger() {
    let map = TileMap::parse(FOUR_BY_FOUR).unwrap();
    let all_cells: Vec<u32> = (0..16).collect();
    let grid = Grid::build(&map, &all_cells);
    assert!(grid.frontier().is_empty());
}
