//! Discrete-time vehicle simulation on an endless road with procedurally
//! spawned obstacles.
//!
//! A front end calls [`Simulation::step`] once per tick and reads
//! [`Simulation::render_state`] back for drawing.

pub mod config;
pub mod environment;
pub mod error;
pub mod logging;
pub mod policy;
pub mod simulation;
pub mod types;
pub mod utils;
pub mod vehicle;

pub use environment::{EnvironmentModel, EnvironmentParams, Obstacle, RoadRam, UpdateReport};
pub use error::{SimError, SimResult};
pub use simulation::{
    EpisodeStatus, RenderState, Simulation, SimulationBuilder, StepOutcome, initialize,
};
pub use types::{ControlInput, KeyState, Point, Rect, VehicleState};
pub use vehicle::{AckermannSteer, Parked, Vehicle, VehicleKind, VehicleModel, VehicleParameters};
