//! Straight-line movement toward a point
//!
//! Shared by AI controllers and the pawn mover module. Only squared
//! distances are compared; the square root is taken once by `normalize`
//! when a partial step is needed.

use glam::Vec3;

/// Result of advancing one step toward a destination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveStep {
    /// Position after the step
    pub position: Vec3,
    /// Whether the step landed exactly on the destination
    pub reached: bool,
}

/// Advance `position` toward `destination` by at most `step` units.
///
/// If the remaining squared distance is within `step²`, the result snaps
/// onto `destination` and reports it as reached.
#[must_use]
pub fn step_towards(position: Vec3, destination: Vec3, step: f32) -> MoveStep {
    let to_destination = destination - position;

    if to_destination.length_squared() <= step * step {
        return MoveStep {
            position: destination,
            reached: true,
        };
    }

    MoveStep {
        position: position + to_destination.normalize_or_zero() * step,
        reached: false,
    }
}
