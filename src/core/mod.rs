//! Core module
//!
//! Configuration, events, and the scheduler that drives a simulation.

mod any;
mod config;
mod events;
mod scheduler;

pub use any::AsAny;
pub use config::{ConfigError, SimulationConfig};
pub use events::{EventQueue, GameEvent};
pub use scheduler::{Scheduler, SimulationError};
