//! Closest-frontier finder: multi-source A* seeded from every
//! frontier cell at once, searching toward the agent. The first element
//! of the reconstructed path is the nearest frontier cell; its length is
//! the distance to it.

use evac_core::{Cell, Grid};

use crate::astar;
use crate::error::PlanError;

/// Returns `(nearest_frontier_cell, path_length)`, or `Err(NoFrontier)` if
/// no frontier cell can reach the agent at all.
pub fn closest_frontier(grid: &Grid, agent_pos: Cell) -> Result<(Cell, usize), PlanError> {
    let seeds: Vec<(Cell, u32)> = grid.frontier().iter().map(|&c| (c, 0)).collect();
    if seeds.is_empty() {
        return Err(PlanError::NoFrontier);
    }
    match astar::search(grid, seeds, agent_pos) {
        Ok(path) => Ok((path[0], path.len())),
        Err(_) => Err(PlanError::NoFrontier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evac_core::TileMap;

    #[test]
    fn finds_nearest_of_several_frontier_cells() {
        let map = TileMap::parse("type octile\nheight 1\nwidth 7\nmap\n.......\n").unwrap();
        // Danger at both ends; frontier is cells 1 and 5. Agent at 3 is
        // equidistant, so either frontier cell is an acceptable answer.
        let grid = Grid::build(&map, &[0, 6]);
        let (goal, len) = closest_frontier(&grid, 3).unwrap();
        assert!(goal == 1 || goal == 5);
        assert_eq!(len, 3);
    }

    #[test]
    fn no_frontier_when_nothing_is_dangerous() {
        let map = TileMap::parse("type octile\nheight 1\nwidth 4\nmap\n....\n").unwrap();
        let grid = Grid::build(&map, &[]);
        assert_eq!(closest_frontier(&grid, 0), Err(PlanError::NoFrontier));
    }
}
