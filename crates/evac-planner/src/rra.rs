//! Reverse Resumable A*: an amortized true-distance oracle rooted at
//! an agent's destination. `distance(query)` resumes a single outward
//! search from the root across calls instead of restarting one per query,
//! which is what makes it cheap to call once per WHCA* node expansion.
//!
//! The root is fixed at construction time and queries move; since the
//! root never changes but the query does, there is no fixed target to
//! bias the open-set ordering with on the push side of an expansion, so
//! the open set is ordered purely on `g` (equivalent to Dijkstra, which
//! on this unit-weight grid is equivalent to BFS). That keeps every
//! closed node's `g` exact regardless of which cell gets queried next,
//! rather than chasing a heuristic computed against a stale target.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::collections::HashMap;

use evac_core::{Cell, Grid};

use crate::error::PlanError;

#[derive(Clone, Copy, PartialEq, Eq)]
struct Entry {
    g: u32,
    cell: Cell,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.g.cmp(&self.g)
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct Rra<'a> {
    grid: &'a Grid,
    open: BinaryHeap<Entry>,
    g_costs: HashMap<Cell, u32>,
    closed: HashSet<Cell>,
}

impl<'a> Rra<'a> {
    /// Roots the search at `destination`. Nothing is expanded yet; the
    /// first call to `distance` drives the search outward.
    pub fn new(grid: &'a Grid, destination: Cell) -> Self {
        let mut g_costs = HashMap::new();
        g_costs.insert(destination, 0);
        let mut open = BinaryHeap::new();
        open.push(Entry { g: 0, cell: destination });
        Self { grid, open, g_costs, closed: HashSet::new() }
    }

    /// True graph distance from the root to `query`. Resumes the search
    /// from wherever it left off on a prior call.
    pub fn distance(&mut self, query: Cell) -> Result<u32, PlanError> {
        if self.closed.contains(&query) {
            return Ok(self.g_costs[&query]);
        }
        while let Some(Entry { g, cell }) = self.open.pop() {
            if self.closed.contains(&cell) {
                continue;
            }
            if self.g_costs.get(&cell).copied() != Some(g) {
                continue; // stale entry superseded by a cheaper path
            }
            self.closed.insert(cell);
            let found = cell == query;
            for &next in self.grid.neighbors(cell) {
                let tentative = g + 1;
                if tentative < *self.g_costs.get(&next).unwrap_or(&u32::MAX) {
                    self.g_costs.insert(next, tentative);
                    self.open.push(Entry { g: tentative, cell: next });
                }
            }
            if found {
                return Ok(g);
            }
        }
        Err(PlanError::Unreachable)
    }
}
