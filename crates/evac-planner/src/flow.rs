//! Time-expanded max-flow planner: a centralized alternative to
//! LC-MAE for scenarios where every agent is RETARGETING. Builds a
//! time-expanded graph, binary-searches the minimal feasible makespan,
//! reconstructs one path per agent from the flow, and optionally runs a
//! deterministic deadlock-breaking post-processor.

use std::collections::VecDeque;

use evac_core::{Cell, Grid, Reservation, ReservationTable, Scenario, SpaceTimeNode};

use crate::error::PlanError;

const MAX_HORIZON: u32 = 10_000;

/// A capacity-scaled max-flow network with edge-pair residuals, built
/// fresh for each candidate horizon tried during the binary search.
struct MaxFlow {
    graph: Vec<Vec<usize>>,
    to: Vec<usize>,
    cap: Vec<i64>,
    orig_cap: Vec<i64>,
}

impl MaxFlow {
    fn new(n: usize) -> Self {
        Self { graph: vec![Vec::new(); n], to: Vec::new(), cap: Vec::new(), orig_cap: Vec::new() }
    }

    fn add_edge(&mut self, u: usize, v: usize, c: i64) {
        let e = self.to.len();
        self.to.push(v);
        self.cap.push(c);
        self.orig_cap.push(c);
        self.graph[u].push(e);
        self.to.push(u);
        self.cap.push(0);
        self.orig_cap.push(0);
        self.graph[v].push(e + 1);
    }

    /// Edmonds-Karp: repeatedly augment along a shortest (by edge count)
    /// path with spare capacity, until none remains.
    fn max_flow(&mut self, s: usize, t: usize) -> i64 {
        let mut total = 0i64;
        loop {
            let mut prev_edge = vec![usize::MAX; self.graph.len()];
            let mut visited = vec![false; self.graph.len()];
            let mut queue = VecDeque::new();
            queue.push_back(s);
            visited[s] = true;
            while let Some(u) = queue.pop_front() {
                if u == t {
                    break;
                }
                for &e in &self.graph[u] {
                    let v = self.to[e];
                    if !visited[v] && self.cap[e] > 0 {
                        visited[v] = true;
                        prev_edge[v] = e;
                        queue.push_back(v);
                    }
                }
            }
            if !visited[t] {
                return total;
            }
            let mut bottleneck = i64::MAX;
            let mut v = t;
            while v != s {
                let e = prev_edge[v];
                bottleneck = bottleneck.min(self.cap[e]);
                v = self.to[e ^ 1];
            }
            let mut v = t;
            while v != s {
                let e = prev_edge[v];
                self.cap[e] -= bottleneck;
                self.cap[e ^ 1] += bottleneck;
                v = self.to[e ^ 1];
            }
            total += bottleneck;
        }
    }

    /// The single outgoing edge out of `node` that carries flow, if any
    /// (excludes residual back-edges, which always have `orig_cap == 0`).
    fn flow_successor(&self, node: usize) -> Option<usize> {
        self.graph[node]
            .iter()
            .find(|&&e| self.orig_cap[e] > 0 && self.cap[e] < self.orig_cap[e])
            .map(|&e| self.to[e])
    }
}

const SOURCE: usize = 0;
const SINK: usize = 1;

fn in_node(num_cells: usize, t: u32, cell: Cell) -> usize {
    2 + (t as usize * num_cells + cell as usize) * 2
}

fn out_node(num_cells: usize, t: u32, cell: Cell) -> usize {
    in_node(num_cells, t, cell) + 1
}

/// Builds the time-expanded network for horizon `horizon`, runs max
/// flow, and reconstructs one path per agent origin if the flow saturates
/// every agent. Returns `(flow_value, paths)`; `paths` is only meaningful
/// when `flow_value == origins.len()`.
fn max_flow_at(grid: &Grid, origins: &[Cell], horizon: u32) -> (usize, Vec<Vec<Cell>>) {
    let num_cells = (grid.rows() * grid.cols()) as usize;
    let total_nodes = 2 + horizon as usize * num_cells * 2;
    let mut net = MaxFlow::new(total_nodes);

    for t in 0..horizon {
        for c in 0..num_cells as Cell {
            if !grid.walkable(c) {
                continue;
            }
            net.add_edge(in_node(num_cells, t, c), out_node(num_cells, t, c), 1);
        }
        if t + 1 < horizon {
            for c in 0..num_cells as Cell {
                if !grid.walkable(c) {
                    continue;
                }
                net.add_edge(out_node(num_cells, t, c), in_node(num_cells, t + 1, c), 1);
                for &q in grid.neighbors(c) {
                    net.add_edge(out_node(num_cells, t, c), in_node(num_cells, t + 1, q), 1);
                }
            }
        } else {
            for c in 0..num_cells as Cell {
                if grid.is_safe(c) {
                    net.add_edge(out_node(num_cells, t, c), SINK, 1);
                }
            }
        }
    }
    for &origin in origins {
        net.add_edge(SOURCE, in_node(num_cells, 0, origin), 1);
    }

    let flow_value = net.max_flow(SOURCE, SINK) as usize;
    if flow_value != origins.len() {
        return (flow_value, Vec::new());
    }

    let mut paths = Vec::with_capacity(origins.len());
    for &origin in origins {
        let mut path = Vec::with_capacity(horizon as usize);
        let mut node = in_node(num_cells, 0, origin);
        loop {
            let next = net.flow_successor(node).expect("every node on a saturated path has a successor");
            if next == SINK {
                break;
            }
            // `next` is an in-node exactly when `node` was an out-node;
            // either way its parity tells us which cell it names.
            let idx = (next - 2) / 2;
            let cell = (idx % num_cells) as Cell;
            if next % 2 == 1 {
                // out-node: this is a tick's resting cell.
                path.push(cell);
            }
            node = next;
        }
        paths.push(path);
    }
    (flow_value, paths)
}

/// Binary searches the minimal feasible makespan and returns the
/// reconstructed paths at that makespan.
fn minimal_feasible_plan(grid: &Grid, origins: &[Cell]) -> Result<(u32, Vec<Vec<Cell>>), PlanError> {
    let n = origins.len() as u32;
    let mut highest_wrong = 0u32;
    let mut best_t = n.max(1);
    let mut best_paths;

    loop {
        let (flow_value, paths) = max_flow_at(grid, origins, best_t);
        if flow_value == origins.len() {
            best_paths = paths;
            break;
        }
        highest_wrong = best_t;
        best_t *= 2;
        if best_t > MAX_HORIZON {
            return Err(PlanError::FlowInfeasible);
        }
    }

    loop {
        if best_t <= highest_wrong + 1 {
            break;
        }
        let t = highest_wrong + (best_t - highest_wrong) / 2;
        let (flow_value, paths) = max_flow_at(grid, origins, t);
        if flow_value == origins.len() {
            best_t = t;
            best_paths = paths;
        } else {
            highest_wrong = t;
        }
    }

    Ok((best_t, best_paths))
}

fn extend(path: &[Cell], t: u32) -> Vec<Cell> {
    let mut out = path.to_vec();
    if let Some(&last) = path.last() {
        while out.len() < t as usize {
            out.push(last);
        }
    }
    out
}

struct FlowAgentState {
    path: Vec<Cell>,
    queue: VecDeque<Cell>,
}

fn stay(agents: &mut [FlowAgentState], id: usize, table: &mut ReservationTable) {
    let pos = *agents[id].path.last().expect("flow agent always starts with at least its origin");
    let t = agents[id].path.len() as u32;
    agents[id].path.push(pos);
    let rn = SpaceTimeNode::new(pos, t);
    table.reserve(rn, Reservation::new(id, 0));
    table.reserve(rn.incremented_t(), Reservation::new(id, 0));
}

fn step_agent(agents: &mut [FlowAgentState], id: usize, table: &mut ReservationTable) {
    if agents[id].queue.is_empty() {
        stay(agents, id, table);
        return;
    }
    let next_cell = agents[id].queue[0];
    let t = agents[id].path.len() as u32;
    let rn = SpaceTimeNode::new(next_cell, t);
    if table.reservable_by(rn, id, 0) {
        agents[id].path.push(agents[id].queue.pop_front().unwrap());
        table.reserve(rn, Reservation::new(id, 1));
        table.reserve(rn.incremented_t(), Reservation::new(id, 0));
    } else {
        let owner = table.get(rn).expect("reservable_by returned false so a reservation exists").agent;
        handle_block(agents, id, owner, rn, table);
    }
}

/// Resolves a blocked move: a genuine head-on swap
/// attempt trades remaining queues and waits; a block by an agent that
/// has finished and is permanently parked there hands off the rest of
/// this agent's route to it and takes over its resting cell; anything
/// else is a plain wait, giving the blocker a chance to move on.
fn handle_block(agents: &mut [FlowAgentState], id: usize, owner: usize, rn: SpaceTimeNode, table: &mut ReservationTable) {
    let self_last = *agents[id].path.last().unwrap();
    let owner_last = *agents[owner].path.last().unwrap();
    let owner_next = agents[owner].queue.front().copied();
    let self_next = agents[id].queue.front().copied();

    let deadlocked = owner_next == Some(self_last) && self_next == Some(owner_last);
    if deadlocked {
        std::mem::swap(&mut agents[id].queue, &mut agents[owner].queue);
        stay(agents, id, table);
        return;
    }

    let owner_done = agents[owner].queue.is_empty();
    if !owner_done || rn.pos != owner_last {
        stay(agents, id, table);
        return;
    }

    agents[id].queue.pop_front();
    let remaining = std::mem::take(&mut agents[id].queue);
    agents[owner].queue = remaining;
    agents[id].queue = VecDeque::from(vec![owner_last]);
    stay(agents, id, table);
}

fn dedup_consecutive(path: &[Cell]) -> Vec<Cell> {
    let mut out: Vec<Cell> = Vec::with_capacity(path.len());
    for &c in path {
        if out.last() != Some(&c) {
            out.push(c);
        }
    }
    out
}

fn postprocess_once(paths: &[Vec<Cell>]) -> Vec<Vec<Cell>> {
    let mut agents: Vec<FlowAgentState> = paths
        .iter()
        .map(|p| FlowAgentState { path: vec![p[0]], queue: p[1..].iter().copied().collect() })
        .collect();
    let mut table = ReservationTable::new();

    let guard = paths.iter().map(Vec::len).sum::<usize>() * 4 + 64;
    let mut rounds = 0;
    while agents.iter().any(|a| !a.queue.is_empty()) && rounds < guard {
        for id in 0..agents.len() {
            step_agent(&mut agents, id, &mut table);
        }
        rounds += 1;
    }
    agents.into_iter().map(|a| a.path).collect()
}

/// Runs the post-processor to a fixed point: each
/// round collapses consecutive repeats before re-running, stopping as
/// soon as a round reproduces the previous one exactly.
pub fn postprocess(paths: Vec<Vec<Cell>>) -> Vec<Vec<Cell>> {
    let mut unblocked = postprocess_once(&paths);
    for _ in 0..64 {
        let deduped: Vec<Vec<Cell>> = unblocked.iter().map(|p| dedup_consecutive(p)).collect();
        let new_paths = postprocess_once(&deduped);
        let fixed_point = new_paths == unblocked;
        unblocked = new_paths;
        if fixed_point {
            break;
        }
    }
    unblocked
}

pub struct FlowConfig {
    pub postprocess: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self { postprocess: false }
    }
}

/// Centralized planner for all-RETARGETING scenarios. Callers
/// are responsible for only invoking this when every agent is of that
/// type; it does not check.
pub fn plan_flow(grid: &Grid, scenario: &Scenario, config: &FlowConfig) -> Result<Vec<Vec<Cell>>, PlanError> {
    let origins: Vec<Cell> = scenario.agents.iter().map(|a| a.origin).collect();
    let (makespan, paths) = minimal_feasible_plan(grid, &origins)?;
    let padded: Vec<Vec<Cell>> = paths.iter().map(|p| extend(p, makespan)).collect();
    if config.postprocess {
        Ok(postprocess(padded))
    } else {
        Ok(padded)
    }
}
