//! Pawn modules
//!
//! A module is a capability a [`Pawn`](super::Pawn) can hold: movement,
//! hit points, and so on. Every module follows the same lifecycle:
//!
//! 1. Constructed inert
//! 2. `initialise(pawn)` links it to its pawn and activates it
//! 3. `update(dt)` every tick while active
//! 4. `destroy()` marks it destroyed and runs `on_destroy()` exactly once
//!
//! Concrete modules implement the `on_*` hooks; the lifecycle rules live in
//! the inherent methods on `dyn PawnModule` and cannot be overridden.

use std::any::TypeId;
use std::fmt;

use hecs::Entity;
use thiserror::Error;

use crate::core::{AsAny, EventQueue};
use crate::ecs::World;

/// Errors raised by the pawn layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PawnError {
    /// A module was used while inert or after being destroyed
    #[error("module `{module}` is {phase:?}")]
    ModuleNotActive {
        module: &'static str,
        phase: ModulePhase,
    },

    /// A destroyed module cannot be initialised again
    #[error("module `{0}` was destroyed and cannot be initialised")]
    ModuleDestroyed(&'static str),

    /// A pawn already holds a module of this type
    #[error("pawn {pawn:?} already has a `{module}` module")]
    DuplicateModule { pawn: Entity, module: &'static str },

    /// No module type registered under this name
    #[error("unknown module type `{0}`")]
    UnknownModule(String),
}

/// Where a module is in its lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModulePhase {
    #[default]
    Inert,
    Active,
    Destroyed,
}

/// Lifecycle bookkeeping embedded in every module.
#[derive(Debug, Clone, Default)]
pub struct ModuleCore {
    pawn: Option<Entity>,
    phase: ModulePhase,
}

impl ModuleCore {
    /// Pawn this module belongs to, once initialised
    #[must_use]
    pub fn pawn(&self) -> Option<Entity> {
        self.pawn
    }

    #[must_use]
    pub fn phase(&self) -> ModulePhase {
        self.phase
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == ModulePhase::Active
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.phase == ModulePhase::Destroyed
    }
}

/// What a module can touch while initialising or updating.
pub struct ModuleContext<'a> {
    pub world: &'a mut World,
    pub events: &'a mut EventQueue,
    /// Seconds since the previous tick
    pub delta_time: f32,
}

/// A capability held by a pawn.
pub trait PawnModule: AsAny + fmt::Debug {
    /// Type name, unique per module type
    fn name(&self) -> &'static str;

    fn core(&self) -> &ModuleCore;

    fn core_mut(&mut self) -> &mut ModuleCore;

    /// Called when the owning pawn spawns.
    fn on_initialise(&mut self, _ctx: &mut ModuleContext<'_>) {}

    /// Called every tick while active.
    fn on_update(&mut self, _ctx: &mut ModuleContext<'_>) {}

    /// Called once when the module is destroyed.
    fn on_destroy(&mut self) {}
}

impl dyn PawnModule {
    /// Link to `pawn` and activate.
    ///
    /// Initialising an active module links it again; there is no dedup.
    pub fn initialise(&mut self, pawn: Entity, ctx: &mut ModuleContext<'_>) -> Result<(), PawnError> {
        if self.core().is_destroyed() {
            return Err(PawnError::ModuleDestroyed(self.name()));
        }
        let core = self.core_mut();
        core.pawn = Some(pawn);
        core.phase = ModulePhase::Active;
        self.on_initialise(ctx);
        Ok(())
    }

    /// Run one tick.
    pub fn update(&mut self, ctx: &mut ModuleContext<'_>) -> Result<(), PawnError> {
        if !self.core().is_active() {
            return Err(PawnError::ModuleNotActive {
                module: self.name(),
                phase: self.core().phase(),
            });
        }
        self.on_update(ctx);
        Ok(())
    }

    /// Mark destroyed and run `on_destroy()`. Later calls do nothing.
    pub fn destroy(&mut self) {
        if self.core().is_destroyed() {
            return;
        }
        self.core_mut().phase = ModulePhase::Destroyed;
        self.on_destroy();
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.core().is_destroyed()
    }

    #[must_use]
    pub fn pawn(&self) -> Option<Entity> {
        self.core().pawn()
    }

    /// Concrete module, if it is a `T`
    pub fn downcast_ref<T: PawnModule>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Concrete module, if it is a `T`
    pub fn downcast_mut<T: PawnModule>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// `TypeId` of the concrete module
    #[must_use]
    pub fn module_type_id(&self) -> TypeId {
        self.as_any().type_id()
    }
}
