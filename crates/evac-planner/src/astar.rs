//! Plain A* over the grid graph, generalized to accept a preseeded
//! open set so the same search core drives both single-source pathing and
//! the multi-source closest-frontier search.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use evac_core::{Cell, Grid};

use crate::error::PlanError;

#[derive(Clone, Copy, PartialEq, Eq)]
struct Entry {
    f: u32,
    g: u32,
    cell: Cell,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap on `f`; ties favor the deeper node so the
        // search commits to a direction instead of oscillating.
        other.f.cmp(&self.f).then_with(|| self.g.cmp(&other.g))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source A* from `start` to `goal`, Manhattan-distance heuristic.
pub fn astar(grid: &Grid, start: Cell, goal: Cell) -> Result<Vec<Cell>, PlanError> {
    search(grid, vec![(start, 0)], goal)
}

/// Multi-source A*, one seed per `(cell, g_cost)` pair. Used by the
/// closest-frontier finder to search from every frontier cell at once.
pub fn search(grid: &Grid, seeds: Vec<(Cell, u32)>, goal: Cell) -> Result<Vec<Cell>, PlanError> {
    let mut open = BinaryHeap::new();
    let mut g_costs: HashMap<Cell, u32> = HashMap::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();

    for (cell, g) in seeds {
        let improves = g < *g_costs.get(&cell).unwrap_or(&u32::MAX);
        if improves {
            g_costs.insert(cell, g);
            open.push(Entry { f: g + grid.manhattan_distance(cell, goal), g, cell });
        }
    }

    while let Some(Entry { g, cell, .. }) = open.pop() {
        if g_costs.get(&cell).copied() != Some(g) {
            continue; // stale heap entry, a cheaper path to `cell` was found later
        }
        if cell == goal {
            return Ok(reconstruct(&came_from, cell));
        }
        for &next in grid.neighbors(cell) {
            let tentative = g + 1;
            if tentative < *g_costs.get(&next).unwrap_or(&u32::MAX) {
                g_costs.insert(next, tentative);
                came_from.insert(next, cell);
                open.push(Entry { f: tentative + grid.manhattan_distance(next, goal), g: tentative, cell: next });
            }
        }
    }

    Err(PlanError::Unreachable)
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, goal: Cell) -> Vec<Cell> {
    let mut path = vec![goal];
    let mut cur = goal;
    while let Some(&prev) = came_from.get(&cur) {
        path.push(prev);
        cur = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use evac_core::TileMap;

    fn open_4x4() -> Grid {
        let map = TileMap::parse("type octile\nheight 4\nwidth 4\nmap\n....\n....\n....\n....\n").unwrap();
        Grid::build(&map, &[])
    }

    #[test]
    fn straight_line_path_has_manhattan_length() {
        let grid = open_4x4();
        let path = astar(&grid, 0, 3).unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.first(), Some(&0));
        assert_eq!(path.last(), Some(&3));
    }

    #[test]
    fn unreachable_goal_behind_a_wall() {
        let map = TileMap::parse("type octile\nheight 1\nwidth 3\nmap\n.@.\n").unwrap();
        let grid = Grid::build(&map, &[]);
        assert_eq!(astar(&grid, 0, 2), Err(PlanError::Unreachable));
    }

    #[test]
    fn multi_source_search_finds_the_nearer_seed() {
        let grid = open_4x4();
        // Seed cells 0 and 15 (opposite corners); searching for cell 5
        // should be reached through whichever seed is closer.
        let path = search(&grid, vec![(0, 0), (15, 0)], 5).unwrap();
        assert_eq!(path.last(), Some(&5));
        assert!(path.first() == Some(&0) || path.first() == Some(&15));
    }
}
