//! Windowed Hierarchical Cooperative A*: space-time A* bounded to a
//! lookahead window, using the reservation table to prune moves another
//! agent already holds and an RRA* oracle for the heuristic.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use evac_core::{ReservationTable, SpaceTimeNode};

use crate::error::PlanError;
use crate::rra::Rra;

#[derive(Clone, Copy, PartialEq, Eq)]
struct Entry {
    f: u32,
    g: u32,
    node: SpaceTimeNode,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.cmp(&self.f).then_with(|| self.g.cmp(&other.g))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Candidate next-step space-time nodes from `n`, with step cost.
///
/// A move to neighbor `q` is offered only when both `(q, t+1)` and
/// `(q, t+2)` are reservable by `agent` at `priority` (the "double
/// reservation" look-two-steps-ahead check that blocks head-on swaps).
/// A wait in place is always offered: at cost 1 when both twin slots are
/// free, or at cost 2 when they are not but `n` is the agent's actual
/// current cell (an agent may always reclaim the ground it stands on,
/// just at a penalty that lets genuinely free moves win ties).
fn neighbors(
    grid: &evac_core::Grid,
    table: &ReservationTable,
    agent: usize,
    priority: u8,
    start_pos: evac_core::Cell,
    n: SpaceTimeNode,
) -> Vec<(SpaceTimeNode, u32)> {
    let mut out = Vec::new();
    for &q in grid.neighbors(n.pos) {
        let step = SpaceTimeNode::new(q, n.t + 1);
        let hold = step.incremented_t();
        if table.reservable_by(step, agent, priority) && table.reservable_by(hold, agent, priority) {
            out.push((step, 1));
        }
    }
    let wait = SpaceTimeNode::new(n.pos, n.t + 1);
    let wait_hold = wait.incremented_t();
    if table.reservable_by(wait, agent, priority) && table.reservable_by(wait_hold, agent, priority) {
        out.push((wait, 1));
    } else if n.pos == start_pos {
        out.push((wait, 2));
    }
    out
}

/// Searches forward from `start` for `depth` ticks, stopping at the first
/// node popped whose tick is `start.t + depth`. `rra` supplies the
/// admissible remaining-distance heuristic, queried per expansion.
pub fn whca(
    grid: &evac_core::Grid,
    table: &ReservationTable,
    agent: usize,
    priority: u8,
    rra: &mut Rra,
    start: SpaceTimeNode,
    depth: u32,
) -> Result<Vec<SpaceTimeNode>, PlanError> {
    let exit_t = start.t + depth;
    let mut open = BinaryHeap::new();
    let mut g_costs: HashMap<SpaceTimeNode, u32> = HashMap::new();
    let mut came_from: HashMap<SpaceTimeNode, SpaceTimeNode> = HashMap::new();

    g_costs.insert(start, 0);
    open.push(Entry { f: rra.distance(start.pos)?, g: 0, node: start });

    while let Some(Entry { g, node, .. }) = open.pop() {
        if g_costs.get(&node).copied() != Some(g) {
            continue;
        }
        if node.t == exit_t {
            return Ok(reconstruct(&came_from, node));
        }
        for (next, cost) in neighbors(grid, table, agent, priority, start.pos, node) {
            let tentative = g + cost;
            if tentative < *g_costs.get(&next).unwrap_or(&u32::MAX) {
                g_costs.insert(next, tentative);
                came_from.insert(next, node);
                let h = rra.distance(next.pos)?;
                open.push(Entry { f: tentative + h, g: tentative, node: next });
            }
        }
    }

    Err(PlanError::WhcaExhausted)
}

fn reconstruct(
    came_from: &HashMap<SpaceTimeNode, SpaceTimeNode>,
    goal: SpaceTimeNode,
) -> Vec<SpaceTimeNode> {
    let mut path = vec![goal];
    let mut cur = goal;
    while let Some(&prev) = came_from.get(&cur) {
        path.push(prev);
        cur = prev;
    }
    path.reverse();
    path
}
