//! Planning algorithms for the evacuation simulator: the decentralized
//! LC-MAE cooperative planner (the default) and a centralized
//! time-expanded max-flow planner for fully-retargeting scenarios.

mod agent;
mod astar;
mod closest_frontier;
mod error;
mod flow;
mod rra;
mod strategy;
mod whca;

pub mod driver;

pub use error::PlanError;
pub use flow::{plan_flow, FlowConfig};

pub use driver::{plan_lcmae, LcmaeConfig, DEFAULT_DEADLOCK_TIMER};
