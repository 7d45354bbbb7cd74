//! Errors raised by the AI layer
//!
//! Every variant is a wiring or configuration defect: the controller cannot
//! keep running once one is returned. Data-absence conditions such as a
//! missing blackboard entry are plain `Option`s and never reach this type.

use hecs::Entity;
use thiserror::Error;

use super::pattern::ElementId;

/// Fatal state-machine and patrol-data errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AiError {
    /// A state was driven before `change_state` linked it to a controller
    #[error("state `{state}` is not linked to an AI")]
    Unbound {
        /// Name of the offending state
        state: &'static str,
    },

    /// A state was linked a second time
    #[error("state `{state}` is already linked to controller {owner:?}")]
    AlreadyBound {
        /// Name of the offending state
        state: &'static str,
        /// Controller the state is linked to
        owner: Entity,
    },

    /// A state was driven by a controller it does not belong to
    #[error("state `{state}` belongs to {owner:?} but was driven by {controller:?}")]
    ForeignController {
        /// Name of the offending state
        state: &'static str,
        /// Controller the state is linked to
        owner: Entity,
        /// Controller that tried to drive it
        controller: Entity,
    },

    /// A state was updated without a successful `on_entry()`
    #[error("state `{state}` was updated before it was entered")]
    NotEntered {
        /// Name of the offending state
        state: &'static str,
    },

    /// `change_state` was handed an absent or reused state
    #[error("invalid state assignment: {reason}")]
    InvalidTransition {
        /// What was wrong with the requested state
        reason: &'static str,
    },

    /// The controller's body entity has no transform
    #[error("controller body {0:?} has no transform")]
    MissingBody(Entity),

    /// No movement pattern exists anywhere in the world
    #[error("no movement patterns found")]
    NoPatterns,

    /// A resolved movement pattern has no elements
    #[error("movement pattern {0:?} does not have any elements")]
    EmptyPattern(Entity),

    /// The pattern a state was following is gone from the world
    #[error("movement pattern {0:?} is no longer in the world")]
    PatternLost(Entity),

    /// A pattern element index outside the arena
    #[error("pattern element {0} does not exist")]
    UnknownElement(ElementId),
}
