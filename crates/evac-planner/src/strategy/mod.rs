//! Agent strategies: per-agent behavior as a sum type rather than an
//! inheritance hierarchy. The four "evacuating" variants (retargeting,
//! closest-frontier, fixed-target, panicked) share one state struct and
//! replan/step core; what differs between them is how a goal is chosen
//! and how the window is searched, so those two seams are the only
//! places that branch on the variant.

mod evacuating;
mod surfing;

use std::collections::VecDeque;

use evac_core::{Cell, Grid, ReservationTable, SpaceTimeNode};
use rand::RngCore;

use crate::error::PlanError;

pub use evacuating::Evacuating;
pub use surfing::Surfing;

pub enum Strategy<'a> {
    Surfing(Surfing),
    EvacRetarget(Evacuating<'a>),
    EvacFrontier(Evacuating<'a>),
    EvacFixed(Evacuating<'a>),
    EvacPanic(Evacuating<'a>),
}

impl<'a> Strategy<'a> {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Surfing(_) => "s",
            _ => "e",
        }
    }

    /// Build a fresh strategy of the given kind for an agent currently
    /// unsafe at `origin`. The constructor retargets and replans, exactly
    /// as a freshly-instantiated strategy does in the agent loop's state
    /// machine.
    pub fn new_evacuating(
        kind: EvacKind,
        grid: &'a Grid,
        table: &mut ReservationTable,
        agent: usize,
        taken_path: &[SpaceTimeNode],
        next_path: &mut VecDeque<SpaceTimeNode>,
        lookahead: u32,
        rng: &mut dyn RngCore,
    ) -> Result<Strategy<'a>, PlanError> {
        let mut evac = Evacuating::new(kind, grid, taken_path.last().unwrap().pos)?;
        evac.replan(kind, grid, table, agent, taken_path, next_path, lookahead, rng)?;
        Ok(match kind {
            EvacKind::Retarget => Strategy::EvacRetarget(evac),
            EvacKind::Frontier => Strategy::EvacFrontier(evac),
            EvacKind::Fixed(_) => Strategy::EvacFixed(evac),
            EvacKind::Panic => Strategy::EvacPanic(evac),
        })
    }

    pub fn new_surfing(
        grid: &'a Grid,
        table: &mut ReservationTable,
        agent: usize,
        taken_path: &[SpaceTimeNode],
        next_path: &mut VecDeque<SpaceTimeNode>,
        lookahead: u32,
    ) -> Result<Strategy<'a>, PlanError> {
        let mut surf = Surfing::new(lookahead);
        surf.replan(grid, table, agent, taken_path, next_path, lookahead)?;
        Ok(Strategy::Surfing(surf))
    }

    pub fn step(
        &mut self,
        grid: &Grid,
        table: &mut ReservationTable,
        agent: usize,
        taken_path: &[SpaceTimeNode],
        next_path: &mut VecDeque<SpaceTimeNode>,
        lookahead: u32,
        rng: &mut dyn RngCore,
    ) -> Result<SpaceTimeNode, PlanError> {
        match self {
            Strategy::Surfing(s) => s.step(grid, table, agent, taken_path, next_path, lookahead),
            Strategy::EvacRetarget(e) => {
                e.retarget_if_stalled(EvacKind::Retarget, grid, table, agent, taken_path, next_path, lookahead, rng)?;
                e.step(EvacKind::Retarget, grid, table, agent, taken_path, next_path, lookahead, rng)
            }
            Strategy::EvacFrontier(e) => {
                e.step(EvacKind::Frontier, grid, table, agent, taken_path, next_path, lookahead, rng)
            }
            Strategy::EvacFixed(e) => {
                let k = EvacKind::Fixed(e.goal());
                e.step(k, grid, table, agent, taken_path, next_path, lookahead, rng)
            }
            Strategy::EvacPanic(e) => {
                e.step(EvacKind::Panic, grid, table, agent, taken_path, next_path, lookahead, rng)
            }
        }
    }
}

/// Discriminates how an `Evacuating` state finds its goal and searches its
/// window; carried alongside the enum tag in `Strategy` rather than
/// stored redundantly inside `Evacuating` itself.
#[derive(Clone, Copy)]
pub enum EvacKind {
    Retarget,
    Frontier,
    Fixed(Cell),
    Panic,
}

pub(crate) fn cancel_path(table: &mut ReservationTable, agent: usize, path: &VecDeque<SpaceTimeNode>) {
    for &stn in path {
        if table.get(stn).map(|r| r.agent) == Some(agent) {
            table.cancel(stn);
        }
        let twin = stn.incremented_t();
        if table.get(twin).map(|r| r.agent) == Some(agent) {
            table.cancel(twin);
        }
    }
}

/// Reserves every STN in `path` and its `(pos, t+1)` twin — the "double
/// reservation" idiom that blocks head-on swaps — each at the priority
/// given by `priorities[i]`, falling back to the last entry once the
/// slice runs out.
pub(crate) fn reserve_path(
    table: &mut ReservationTable,
    agent: usize,
    path: &VecDeque<SpaceTimeNode>,
    priorities: &[u8],
) {
    for (i, &stn) in path.iter().enumerate() {
        let priority = priorities.get(i).or_else(|| priorities.last()).copied().unwrap_or(2);
        for node in [stn, stn.incremented_t()] {
            if !table.writable_by(node, agent, priority) {
                tracing::warn!(agent, pos = node.pos, t = node.t, priority, "overwriting a higher-priority reservation");
            }
            table.reserve(node, evac_core::Reservation::new(agent, priority));
        }
    }
}

/// Whether every STN the agent still expects to occupy in `next_path` is
/// still reserved for it (or unreserved); false if a higher-priority
/// writer has since overwritten one of them.
pub(crate) fn check_reservations(table: &ReservationTable, agent: usize, next_path: &VecDeque<SpaceTimeNode>) -> bool {
    next_path.iter().all(|&stn| table.get(stn).map_or(true, |r| r.agent == agent))
}
