//! Error type shared by every search in this crate.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    /// No safe cell exists anywhere on the grid that the origin can reach.
    #[error("no frontier cell is reachable from the agent's position")]
    NoFrontier,
    /// A plain A* search exhausted its open set before reaching the goal.
    #[error("goal is unreachable from the start cell")]
    Unreachable,
    /// A windowed cooperative search exhausted its open set before any
    /// node at the target tick could be reserved.
    #[error("windowed search found no route to the lookahead horizon")]
    WhcaExhausted,
    /// The time-expanded max-flow search exceeded its horizon bound
    /// without saturating every agent (e.g. two agents sharing an origin
    /// cell, whose capacity-1 exit edge caps flow below agent count at
    /// every horizon).
    #[error("no feasible makespan found within the search horizon")]
    FlowInfeasible,
}
