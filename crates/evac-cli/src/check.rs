//! `check` command: validates a solution file against its
//! map and scenario — length uniformity, vertex collisions, start
//! consistency, and 4-adjacency of consecutive cells. Grounded on the
//! teacher's `validate_path_cardinal`/vertex-collision shape, re-hosted
//! over grid cell ids instead of `(x, y)` coordinates.

use evac_core::{Cell, Grid, Scenario};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    UnequalLengths { agent: usize, expected: usize, got: usize },
    NonAdjacentMove { agent: usize, t: usize, from: Cell, to: Cell },
    VertexCollision { a: usize, b: usize, t: usize, pos: Cell },
    WrongStart { agent: usize, expected: Cell, got: Cell },
}

impl std::fmt::Display for CheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckError::UnequalLengths { agent, expected, got } => {
                write!(f, "agent {agent}: path length {got} does not match the first agent's {expected}")
            }
            CheckError::NonAdjacentMove { agent, t, from, to } => {
                write!(f, "agent {agent} at t={t}: move from {from} to {to} is not a 4-adjacency step")
            }
            CheckError::VertexCollision { a, b, t, pos } => {
                write!(f, "agents {a} and {b} collide at cell {pos} at t={t}")
            }
            CheckError::WrongStart { agent, expected, got } => {
                write!(f, "agent {agent}: path starts at {got}, scenario origin is {expected}")
            }
        }
    }
}

pub struct CheckReport {
    pub errors: Vec<CheckError>,
    /// Agents whose final cell is still dangerous. Not an error:
    /// a deadlocked or panicked agent may legitimately end in danger.
    pub endangered_at_end: Vec<usize>,
}

impl CheckReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn check(grid: &Grid, scenario: &Scenario, paths: &[Vec<Cell>]) -> CheckReport {
    let mut errors = Vec::new();

    let expected_len = paths.first().map(Vec::len).unwrap_or(0);
    for (agent, path) in paths.iter().enumerate() {
        if path.len() != expected_len {
            errors.push(CheckError::UnequalLengths { agent, expected: expected_len, got: path.len() });
        }
    }

    for (agent, path) in paths.iter().enumerate() {
        if let (Some(&origin), Some(spec)) = (path.first(), scenario.agents.get(agent)) {
            if origin != spec.origin {
                errors.push(CheckError::WrongStart { agent, expected: spec.origin, got: origin });
            }
        }
    }

    for (agent, path) in paths.iter().enumerate() {
        for t in 1..path.len() {
            let (from, to) = (path[t - 1], path[t]);
            if from != to && !grid.neighbors(from).contains(&to) {
                errors.push(CheckError::NonAdjacentMove { agent, t, from, to });
            }
        }
    }

    let max_t = paths.iter().map(Vec::len).max().unwrap_or(0);
    for t in 0..max_t {
        let mut occupied: std::collections::HashMap<Cell, usize> = std::collections::HashMap::new();
        for (agent, path) in paths.iter().enumerate() {
            let Some(&pos) = path.get(t) else { continue };
            if let Some(&other) = occupied.get(&pos) {
                errors.push(CheckError::VertexCollision { a: other, b: agent, t, pos });
            } else {
                occupied.insert(pos, agent);
            }
        }
    }

    let endangered_at_end = paths
        .iter()
        .enumerate()
        .filter_map(|(agent, path)| path.last().filter(|&&c| !grid.is_safe(c)).map(|_| agent))
        .collect();

    CheckReport { errors, endangered_at_end }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evac_core::TileMap;

    fn grid() -> Grid {
        let map = TileMap::parse("type octile\nheight 1\nwidth 4\nmap\n....\n").unwrap();
        Grid::build(&map, &[0])
    }

    #[test]
    fn valid_plan_has_no_errors() {
        let grid = grid();
        let scn = Scenario::parse("0\n0r\n").unwrap();
        let paths = vec![vec![0, 1]];
        let report = check(&grid, &scn, &paths);
        assert!(report.is_valid());
        assert!(report.endangered_at_end.is_empty());
    }

    #[test]
    fn detects_non_adjacent_move() {
        let grid = grid();
        let scn = Scenario::parse("0\n0r\n").unwrap();
        let paths = vec![vec![0, 2]];
        let report = check(&grid, &scn, &paths);
        assert!(!report.is_valid());
        assert!(matches!(report.errors[0], CheckError::NonAdjacentMove { .. }));
    }

    #[test]
    fn detects_vertex_collision() {
        let grid = grid();
        let scn = Scenario::parse("0\n0r 2r\n").unwrap();
        let paths = vec![vec![0, 1], vec![2, 1]];
        let report = check(&grid, &scn, &paths);
        assert!(report.errors.iter().any(|e| matches!(e, CheckError::VertexCollision { .. })));
    }

    #[test]
    fn detects_wrong_start() {
        let grid = grid();
        let scn = Scenario::parse("0\n0r\n").unwrap();
        let paths = vec![vec![1, 1]];
        let report = check(&grid, &scn, &paths);
        assert!(matches!(report.errors[0], CheckError::WrongStart { .. }));
    }

    #[test]
    fn endangered_final_cell_is_reported_not_errored() {
        let grid = grid();
        let scn = Scenario::parse("0\n0r\n").unwrap();
        let paths = vec![vec![0, 0]];
        let report = check(&grid, &scn, &paths);
        assert!(report.is_valid());
        assert_eq!(report.endangered_at_end, vec![0]);
    }
}
