//! AI module
//!
//! State-machine AI controllers and patrol-pattern traversal.

mod blackboard;
mod error;
mod fsm;
mod pattern;
mod patrol;
mod steering;

pub use blackboard::{Blackboard, BlackboardEntry};
pub use error::AiError;
pub use fsm::{AiContext, AiState, Binding, StateFactory, StateMachineAi, Transition};
pub use pattern::{
    DEFAULT_WAIT_TIME, ElementId, MovementPattern, PatternElement, Waypoint, nearest_pattern,
};
pub use patrol::{ENEMY_KEY, MovementPatternState, PATTERN_KEY, PROXIMITY_THRESHOLD_SQ};
pub use steering::{MoveStep, step_towards};
