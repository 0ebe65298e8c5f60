//! Agent loop: owns one agent's history and active strategy, and
//! drives the Surfing ↔ Evacuating state machine on safety transitions
//! The driver calls `step` once per agent per tick.

use std::collections::VecDeque;

use evac_core::{AgentKind, AgentSpec, Cell, Grid, ReservationTable, SpaceTimeNode, PRIORITY_HARD};
use rand::RngCore;

use crate::error::PlanError;
use crate::strategy::{EvacKind, Strategy};

pub struct Agent<'a> {
    pub id: usize,
    pub taken_path: Vec<SpaceTimeNode>,
    pub next_path: VecDeque<SpaceTimeNode>,
    pub lookahead: u32,
    evac_kind: EvacKind,
    strategy: Option<Strategy<'a>>,
}

impl<'a> Agent<'a> {
    pub fn new(id: usize, spec: &AgentSpec, lookahead: u32) -> Self {
        let evac_kind = match spec.kind {
            AgentKind::Retargeting => EvacKind::Retarget,
            AgentKind::ClosestFrontier => EvacKind::Frontier,
            AgentKind::Static => EvacKind::Fixed(spec.goal.expect("static agents always carry a goal")),
            AgentKind::Panicked => EvacKind::Panic,
        };
        Agent {
            id,
            taken_path: vec![SpaceTimeNode::new(spec.origin, 0)],
            next_path: VecDeque::new(),
            lookahead,
            evac_kind,
            strategy: None,
        }
    }

    pub fn pos(&self) -> Cell {
        self.taken_path.last().expect("taken_path always has at least the origin").pos
    }

    pub fn evac_kind(&self) -> EvacKind {
        self.evac_kind
    }

    /// Seeds priority-2 reservations over `STN(origin, 0..lookahead-1)`
    /// and mirrors them into `next_path`, so the agent's first `replan()`
    /// has a plan to cancel.
    pub fn seed_reservations(&mut self, table: &mut ReservationTable) {
        let origin = self.pos();
        for t in 0..self.lookahead {
            let stn = SpaceTimeNode::new(origin, t);
            table.reserve(stn, evac_core::Reservation::new(self.id, PRIORITY_HARD));
            self.next_path.push_back(stn);
        }
    }

    pub fn is_safe(&self, grid: &Grid) -> bool {
        grid.is_safe(self.pos())
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.as_ref().map_or("", Strategy::name)
    }

    /// Advances the agent by one tick: switches strategy on a safety
    /// transition if needed, then takes one step and appends it to
    /// `taken_path`.
    pub fn step(&mut self, grid: &'a Grid, table: &mut ReservationTable, rng: &mut dyn RngCore) -> Result<(), PlanError> {
        let safe = self.is_safe(grid);
        let needs_new = match &self.strategy {
            None => true,
            Some(Strategy::Surfing(_)) => !safe,
            Some(_) => safe,
        };
        if needs_new {
            tracing::debug!(agent = self.id, safe, pos = self.pos(), "switching strategy");
            let fresh = if safe {
                Strategy::new_surfing(grid, table, self.id, &self.taken_path, &mut self.next_path, self.lookahead)?
            } else {
                Strategy::new_evacuating(
                    self.evac_kind,
                    grid,
                    table,
                    self.id,
                    &self.taken_path,
                    &mut self.next_path,
                    self.lookahead,
                    rng,
                )?
            };
            self.strategy = Some(fresh);
        }
        let strategy = self.strategy.as_mut().expect("just assigned above if it was absent");
        let next = strategy.step(grid, table, self.id, &self.taken_path, &mut self.next_path, self.lookahead, rng)?;
        self.taken_path.push(next);
        Ok(())
    }
}
