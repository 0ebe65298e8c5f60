//! Shared state and control flow for the four evacuating strategies
//! What varies between retargeting, closest-frontier,
//! fixed-target and panicked is only how a goal is chosen (`find_goal`)
//! and how the window is searched (`pathfind`); both are small matches
//! on `EvacKind` rather than four duplicated structs.

use std::collections::VecDeque;

use evac_core::{Cell, Grid, ReservationTable, SpaceTimeNode, PRIORITY_HARD};
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::astar;
use crate::closest_frontier::closest_frontier;
use crate::error::PlanError;
use crate::rra::Rra;
use crate::whca;

use super::{cancel_path, check_reservations, reserve_path, EvacKind};

pub struct Evacuating<'a> {
    goal: Cell,
    distance_to_goal: u32,
    distance_with_goal: u32,
    rra: Option<Rra<'a>>,
}

impl<'a> Evacuating<'a> {
    pub fn new(kind: EvacKind, grid: &'a Grid, origin: Cell) -> Result<Self, PlanError> {
        let mut evac = Evacuating { goal: origin, distance_to_goal: 0, distance_with_goal: 0, rra: None };
        evac.retarget(kind, grid, origin)?;
        Ok(evac)
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    fn find_goal(kind: EvacKind, grid: &Grid, origin: Cell) -> Result<(Cell, u32), PlanError> {
        match kind {
            EvacKind::Frontier | EvacKind::Retarget => {
                closest_frontier(grid, origin).map(|(cell, len)| (cell, len as u32))
            }
            EvacKind::Fixed(target) => {
                let path = astar::astar(grid, origin, target)?;
                Ok((target, path.len() as u32))
            }
            EvacKind::Panic => Ok((origin, 0)),
        }
    }

    /// Recomputes `(goal, distance_to_goal)` and, for goal-directed
    /// kinds, re-roots the RRA* oracle at the new goal.
    fn retarget(&mut self, kind: EvacKind, grid: &'a Grid, origin: Cell) -> Result<(), PlanError> {
        let (goal, distance_to_goal) = Self::find_goal(kind, grid, origin)?;
        self.goal = goal;
        self.distance_to_goal = distance_to_goal;
        self.rra = match kind {
            EvacKind::Panic => None,
            _ => Some(Rra::new(grid, goal)),
        };
        Ok(())
    }

    /// Retargeting-variant-only stall check: if progress toward
    /// the current goal has stalled for twice the expected travel time,
    /// pick a new goal and reset the stall counter.
    pub fn retarget_if_stalled(
        &mut self,
        kind: EvacKind,
        grid: &'a Grid,
        table: &mut ReservationTable,
        agent: usize,
        taken_path: &[SpaceTimeNode],
        next_path: &mut VecDeque<SpaceTimeNode>,
        lookahead: u32,
        rng: &mut dyn RngCore,
    ) -> Result<(), PlanError> {
        if self.distance_with_goal >= 2 * self.distance_to_goal.max(1) {
            tracing::debug!(agent, old_goal = self.goal, "waiting too long for goal, retargeting");
            let origin = taken_path.last().unwrap().pos;
            self.retarget(kind, grid, origin)?;
            self.distance_with_goal = 0;
            self.replan(kind, grid, table, agent, taken_path, next_path, lookahead, rng)?;
        }
        Ok(())
    }

    fn pathfind(
        &mut self,
        kind: EvacKind,
        grid: &Grid,
        table: &ReservationTable,
        agent: usize,
        start: SpaceTimeNode,
        lookahead: u32,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<SpaceTimeNode>, PlanError> {
        match kind {
            EvacKind::Panic => Ok(panic_walk(grid, table, agent, start, lookahead, rng)),
            _ => {
                let rra = self.rra.as_mut().expect("goal-directed evacuation always carries an RRA* oracle");
                whca::whca(grid, table, agent, PRIORITY_HARD, rra, start, lookahead)
            }
        }
    }

    pub fn replan(
        &mut self,
        kind: EvacKind,
        grid: &Grid,
        table: &mut ReservationTable,
        agent: usize,
        taken_path: &[SpaceTimeNode],
        next_path: &mut VecDeque<SpaceTimeNode>,
        lookahead: u32,
        rng: &mut dyn RngCore,
    ) -> Result<(), PlanError> {
        cancel_path(table, agent, next_path);
        let start = *taken_path.last().unwrap();
        let path = self.pathfind(kind, grid, table, agent, start, lookahead, rng)?;
        next_path.clear();
        next_path.extend(path.into_iter().skip(1));
        tracing::debug!(agent, goal = self.goal, next_len = next_path.len(), "evacuating replanned");
        reserve_path(table, agent, next_path, &[PRIORITY_HARD]);
        Ok(())
    }

    pub fn step(
        &mut self,
        kind: EvacKind,
        grid: &Grid,
        table: &mut ReservationTable,
        agent: usize,
        taken_path: &[SpaceTimeNode],
        next_path: &mut VecDeque<SpaceTimeNode>,
        lookahead: u32,
        rng: &mut dyn RngCore,
    ) -> Result<SpaceTimeNode, PlanError> {
        if next_path.len() as u32 == lookahead / 2 || !check_reservations(table, agent, next_path) {
            self.replan(kind, grid, table, agent, taken_path, next_path, lookahead, rng)?;
        }
        self.distance_with_goal += 1;
        Ok(next_path.pop_front().expect("replan always leaves at least one STN to take"))
    }
}

/// Random-walk window for the panicked strategy: no destination,
/// no heuristic. A candidate move is offered when both twin slots are
/// reservable-by-self at hard priority; the wait action is always a
/// candidate under the same rule, or as a last-resort penalized claim on
/// the agent's own current cell when nothing else is free.
fn panic_walk(
    grid: &Grid,
    table: &ReservationTable,
    agent: usize,
    start: SpaceTimeNode,
    lookahead: u32,
    rng: &mut dyn RngCore,
) -> Vec<SpaceTimeNode> {
    let mut path = vec![start];
    let exit_t = start.t + lookahead;
    while path.last().unwrap().t < exit_t {
        let cur = *path.last().unwrap();
        let mut candidates: Vec<SpaceTimeNode> = Vec::new();
        for &q in grid.neighbors(cur.pos) {
            let step = SpaceTimeNode::new(q, cur.t + 1);
            let hold = step.incremented_t();
            if table.reservable_by(step, agent, PRIORITY_HARD) && table.reservable_by(hold, agent, PRIORITY_HARD) {
                candidates.push(step);
            }
        }
        let wait = SpaceTimeNode::new(cur.pos, cur.t + 1);
        let wait_hold = wait.incremented_t();
        if table.reservable_by(wait, agent, PRIORITY_HARD) && table.reservable_by(wait_hold, agent, PRIORITY_HARD) {
            candidates.push(wait);
        }
        let next = if candidates.is_empty() {
            wait
        } else {
            *candidates.choose(rng).expect("non-empty")
        };
        path.push(next);
    }
    path
}
