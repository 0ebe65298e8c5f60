//! LC-MAE driver: initializes agents and the reservation table,
//! then advances time one tick at a time until either every agent is
//! safe or the deadlock timer expires.

use evac_core::{Cell, Grid, ReservationTable, Scenario};
use rand::seq::SliceRandom;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::error::PlanError;
use crate::strategy::EvacKind;

/// Ticks without any agent changing position before the driver gives up
/// and returns agents still in danger at their last position. A magic
/// constant from the source kept configurable here.
pub const DEFAULT_DEADLOCK_TIMER: u32 = 15;

pub struct LcmaeConfig {
    pub seed: u64,
    pub lookahead: u32,
    pub deadlock_timer: u32,
}

impl Default for LcmaeConfig {
    fn default() -> Self {
        Self { seed: 42, lookahead: 10, deadlock_timer: DEFAULT_DEADLOCK_TIMER }
    }
}

/// Runs the decentralized cooperative planner to completion and returns,
/// for each agent in scenario registration order, the cell projection of
/// its taken path.
pub fn plan_lcmae(grid: &Grid, scenario: &Scenario, config: &LcmaeConfig) -> Result<Vec<Vec<Cell>>, PlanError> {
    let mut table = ReservationTable::new();
    let mut agents: Vec<Agent<'_>> = scenario
        .agents
        .iter()
        .enumerate()
        .map(|(id, spec)| Agent::new(id, spec, config.lookahead))
        .collect();

    for agent in &mut agents {
        agent.seed_reservations(&mut table);
    }

    // Fail fast if some retargeting/closest-frontier agent has no path to
    // safety at all; walking it through the full tick loop would only
    // surface the same error later with a less useful message. Fixed-target
    // agents path toward their own goal regardless of frontier reachability,
    // and panicked agents have no destination at all, so neither kind is
    // subject to this check — a stuck one just rides out the deadlock timer.
    for agent in &agents {
        let goal_directed = matches!(agent.evac_kind(), EvacKind::Retarget | EvacKind::Frontier);
        if goal_directed && !agent.is_safe(grid) && crate::closest_frontier::closest_frontier(grid, agent.pos()).is_err() {
            return Err(PlanError::NoFrontier);
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut endangered: Vec<usize> = Vec::new();
    let mut safe: Vec<usize> = Vec::new();
    for agent in &agents {
        if agent.is_safe(grid) {
            safe.push(agent.id);
        } else {
            endangered.push(agent.id);
        }
    }

    let mut deadlock_timer = 0u32;
    let mut tick = 0u32;
    while deadlock_timer < config.deadlock_timer && !endangered.is_empty() {
        let mut progressed = false;

        endangered.shuffle(&mut rng);
        for &id in &endangered {
            let before = agents[id].pos();
            agents[id].step(grid, &mut table, &mut rng)?;
            if agents[id].pos() != before {
                progressed = true;
            }
        }
        safe.shuffle(&mut rng);
        for &id in &safe {
            let before = agents[id].pos();
            agents[id].step(grid, &mut table, &mut rng)?;
            if agents[id].pos() != before {
                progressed = true;
            }
        }

        let mut now_safe = Vec::new();
        let mut still_endangered = Vec::new();
        for agent in &agents {
            if agent.is_safe(grid) {
                now_safe.push(agent.id);
            } else {
                still_endangered.push(agent.id);
            }
        }
        safe = now_safe;
        endangered = still_endangered;

        deadlock_timer = if progressed { 0 } else { deadlock_timer + 1 };
        tick += 1;
        debug!(tick, endangered = endangered.len(), deadlock_timer, "lc-mae tick complete");
    }

    if deadlock_timer >= config.deadlock_timer {
        warn!(remaining = endangered.len(), "lc-mae terminated on deadlock timer");
    } else {
        info!(ticks = tick, "lc-mae: all agents reached safety");
    }

    Ok(agents.iter().map(|a| a.taken_path.iter().map(|stn| stn.pos).collect()).collect())
}
