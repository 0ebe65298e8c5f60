//! Core types for the evacuation planner: the grid graph, space-time
//! reservation table, and the map/scenario file formats.

mod grid;
mod map;
mod reservation;
mod scenario;
mod stn;

pub use grid::{Cell, Grid};
pub use map::{MapError, Tile, TileMap};
pub use reservation::{Reservation, ReservationTable};
pub use scenario::{AgentKind, AgentSpec, Scenario, ScenarioError};
pub use stn::{SpaceTimeNode, PRIORITY_HARD, PRIORITY_PASSIVE, PRIORITY_SOFT};
