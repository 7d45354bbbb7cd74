//! Patrol AI and modular pawns on top of hecs
//!
//! This crate provides:
//! - State-machine AI controllers with a shared blackboard
//! - Waypoint patterns and a patrol state that walks them
//! - Pawns assembled from lifecycle-managed modules
//! - A fixed-step scheduler tying it all together

pub mod ai;
pub mod core;
pub mod ecs;
pub mod pawn;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        AiContext, AiError, AiState, Blackboard, MovementPattern, MovementPatternState,
        PATTERN_KEY, StateMachineAi, Transition, Waypoint,
    };
    pub use crate::core::{EventQueue, GameEvent, Scheduler, SimulationConfig, SimulationError};
    pub use crate::ecs::{Children, Name, Parent, Transform, World};
    pub use crate::pawn::{BasicMover, HealthModule, ModuleRegistry, Pawn, PawnModule};
    pub use glam::Vec3;
}
