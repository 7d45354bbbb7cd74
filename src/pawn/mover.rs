//! Basic mover module
//!
//! Moves its pawn in a straight line toward a destination at a fixed speed.

use glam::Vec3;

use super::module::{ModuleContext, ModuleCore, PawnModule};
use crate::ai::step_towards;

/// Straight-line mover.
#[derive(Debug, Clone)]
pub struct BasicMover {
    core: ModuleCore,
    /// Units per second
    pub speed: f32,
    destination: Option<Vec3>,
    reached: bool,
}

impl BasicMover {
    #[must_use]
    pub fn new(speed: f32) -> Self {
        Self {
            core: ModuleCore::default(),
            speed,
            destination: None,
            reached: false,
        }
    }

    /// Head for `(x, y, z)`.
    ///
    /// Only a destination that differs from the current one resets the
    /// reached flag.
    pub fn set_destination(&mut self, x: f32, y: f32, z: f32) {
        let destination = Vec3::new(x, y, z);
        if self.destination != Some(destination) {
            self.destination = Some(destination);
            self.reached = false;
        }
    }

    /// Current destination; `None` until one is set
    #[must_use]
    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    #[must_use]
    pub fn reached_destination(&self) -> bool {
        self.reached
    }
}

impl Default for BasicMover {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl PawnModule for BasicMover {
    fn name(&self) -> &'static str {
        "BasicMover"
    }

    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn on_update(&mut self, ctx: &mut ModuleContext<'_>) {
        if self.reached {
            return;
        }
        let (Some(pawn), Some(destination)) = (self.core.pawn(), self.destination) else {
            return;
        };
        let Some(position) = ctx.world.position(pawn) else {
            log::warn!("Pawn {pawn:?} has no transform to move");
            return;
        };

        let step = step_towards(position, destination, self.speed * ctx.delta_time);
        ctx.world.set_position(pawn, step.position);
        if step.reached {
            log::debug!("Pawn {pawn:?} reached {destination}");
            self.reached = true;
        }
    }
}
