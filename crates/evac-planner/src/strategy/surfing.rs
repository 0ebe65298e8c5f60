//! Surfing: the strategy for agents that are currently safe. It
//! does not aim for any particular cell; it explores until a node at the
//! lookahead horizon is popped, favoring paths that yield ground to
//! evacuating agents (tracked via `backpressure`) without drifting back
//! toward danger or oscillating (the `lookback_set` cost penalty).

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use evac_core::{Cell, Grid, Reservation, ReservationTable, SpaceTimeNode, PRIORITY_HARD, PRIORITY_SOFT};

use crate::error::PlanError;

use super::{cancel_path, check_reservations, reserve_path};

pub struct Surfing {
    lookback: u32,
    lookback_set: HashSet<Cell>,
}

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

impl Surfing {
    pub fn new(lookahead: u32) -> Self {
        Self { lookback: lookahead / 2, lookback_set: HashSet::new() }
    }

    fn backpressure(&self, table: &ReservationTable, taken_path: &[SpaceTimeNode], agent_t: u32) -> u32 {
        let window = self.lookback as usize + 1;
        let start = taken_path.len().saturating_sub(window);
        taken_path[start..]
            .iter()
            .filter(|stn| table.get(SpaceTimeNode::new(stn.pos, agent_t)).is_some())
            .count() as u32
    }

    fn neighbors(
        &self,
        grid: &Grid,
        table: &ReservationTable,
        agent: usize,
        current_pos: Cell,
        n: SpaceTimeNode,
        bp_factor: u32,
    ) -> Vec<(SpaceTimeNode, u32)> {
        let mut out = Vec::new();
        for &q in grid.neighbors(n.pos) {
            if !grid.is_safe(q) {
                continue;
            }
            let step = SpaceTimeNode::new(q, n.t + 1);
            let hold = step.incremented_t();
            if table.reservable_by(step, agent, PRIORITY_SOFT) && table.reservable_by(hold, agent, PRIORITY_SOFT) {
                let cost = if self.lookback_set.contains(&q) { 3 } else { 2 };
                out.push((step, cost));
            }
        }
        let wait = SpaceTimeNode::new(n.pos, n.t + 1);
        let wait_hold = wait.incremented_t();
        if table.reservable_by(wait, agent, PRIORITY_SOFT) && table.reservable_by(wait_hold, agent, PRIORITY_SOFT) {
            out.push((wait, bp_factor));
        } else if n.pos == current_pos {
            out.push((wait, 4 * bp_factor));
        }
        out
    }

    fn pathfind(
        &self,
        grid: &Grid,
        table: &ReservationTable,
        agent: usize,
        taken_path: &[SpaceTimeNode],
        lookahead: u32,
    ) -> Result<Vec<SpaceTimeNode>, PlanError> {
        let start = *taken_path.last().expect("agent always has a current position");
        let exit_t = start.t + lookahead;
        let previously_reserved = self.backpressure(table, taken_path, start.t);

        let mut open = BinaryHeap::new();
        let mut g_costs: HashMap<SpaceTimeNode, u32> = HashMap::new();
        let mut came_from: HashMap<SpaceTimeNode, SpaceTimeNode> = HashMap::new();
        g_costs.insert(start, 0);
        open.push(Entry { f: lookahead, g: 0, node: start });

        while let Some(Entry { g, node, .. }) = open.pop() {
            if g_costs.get(&node).copied() != Some(g) {
                continue;
            }
            if node.t == exit_t {
                let mut path = vec![node];
                let mut cur = node;
                while let Some(&prev) = came_from.get(&cur) {
                    path.push(prev);
                    cur = prev;
                }
                path.reverse();
                return Ok(path);
            }
            // Backpressure decays with depth: it's gradually cheaper to
            // stay put the further into the future we look.
            let elapsed = node.t - start.t;
            let bp_factor = previously_reserved.saturating_sub(elapsed).max(1);
            for (next, cost) in self.neighbors(grid, table, agent, start.pos, node, bp_factor) {
                let tentative = g + cost;
                if tentative < *g_costs.get(&next).unwrap_or(&u32::MAX) {
                    g_costs.insert(next, tentative);
                    came_from.insert(next, node);
                    let h = exit_t.saturating_sub(next.t);
                    open.push(Entry { f: tentative + h, g: tentative, node: next });
                }
            }
        }

        Err(PlanError::WhcaExhausted)
    }

    pub fn replan(
        &mut self,
        grid: &Grid,
        table: &mut ReservationTable,
        agent: usize,
        taken_path: &[SpaceTimeNode],
        next_path: &mut VecDeque<SpaceTimeNode>,
        lookahead: u32,
    ) -> Result<(), PlanError> {
        cancel_path(table, agent, next_path);
        let path = self.pathfind(grid, table, agent, taken_path, lookahead)?;
        next_path.clear();
        next_path.extend(path.into_iter().skip(1));
        let bp = self.backpressure(table, taken_path, taken_path.last().unwrap().t);
        tracing::debug!(agent, bp, next_len = next_path.len(), "surfing replanned");
        let mut priorities = vec![PRIORITY_HARD; self.lookback as usize];
        priorities.extend(std::iter::repeat(PRIORITY_SOFT).take(self.lookback as usize));
        reserve_path(table, agent, next_path, &priorities);
        Ok(())
    }

    pub fn step(
        &mut self,
        grid: &Grid,
        table: &mut ReservationTable,
        agent: usize,
        taken_path: &[SpaceTimeNode],
        next_path: &mut VecDeque<SpaceTimeNode>,
        lookahead: u32,
    ) -> Result<SpaceTimeNode, PlanError> {
        if next_path.len() as u32 == self.lookback || !check_reservations(table, agent, next_path) {
            self.replan(grid, table, agent, taken_path, next_path, lookahead)?;
        }
        // Keep the near horizon hard-claimed as it slides forward each tick,
        // rather than letting it decay to the soft priority it was planned at.
        if let Some(&upgrade) = next_path.get(self.lookback as usize) {
            table.reserve(upgrade, Reservation::new(agent, PRIORITY_HARD));
        }
        let next = next_path.pop_front().expect("replan always leaves at least one STN to take");
        self.lookback_set.insert(next.pos);
        Ok(next)
    }
}
