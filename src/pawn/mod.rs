//! Pawn system
//!
//! Pawns are entities assembled from modules: movement, health, and
//! whatever else a game registers.

mod health;
mod module;
mod mover;
#[allow(clippy::module_inception)]
mod pawn;
mod registry;

pub use health::HealthModule;
pub use module::{ModuleContext, ModuleCore, ModulePhase, PawnError, PawnModule};
pub use mover::BasicMover;
pub use pawn::Pawn;
pub use registry::{ModuleFactory, ModuleRegistry};
