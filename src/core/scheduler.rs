//! Fixed-step simulation scheduler
//!
//! Owns the world, the event queue, every AI controller and every pawn, and
//! advances them one tick at a time in a fixed order:
//!
//! 1. Swap the event queue
//! 2. Despawn pawns whose destruction was requested last tick
//! 3. Re-derive `previous` links on every movement pattern
//! 4. Activate and update AI controllers
//! 5. Update pawn modules

use hecs::Entity;
use thiserror::Error;

use super::events::{EventQueue, GameEvent};
use crate::ai::{AiError, MovementPattern, StateMachineAi};
use crate::ecs::World;
use crate::pawn::{HealthModule, ModuleContext, Pawn, PawnError};

/// Errors that stop the simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error(transparent)]
    Pawn(#[from] PawnError),
}

/// Drives controllers and pawns over a shared world.
#[derive(Debug, Default)]
pub struct Scheduler {
    world: World,
    events: EventQueue,
    controllers: Vec<StateMachineAi>,
    pawns: Vec<Pawn>,
    tick_count: u64,
    elapsed: f32,
}

impl Scheduler {
    #[must_use]
    pub fn new(world: World) -> Self {
        Self {
            world,
            ..Self::default()
        }
    }

    /// Add a controller. It activates on the next tick.
    pub fn add_controller(&mut self, controller: StateMachineAi) {
        log::debug!("Adding AI controller for {:?}", controller.body());
        self.controllers.push(controller);
    }

    /// Controller driving `body`
    #[must_use]
    pub fn controller(&self, body: Entity) -> Option<&StateMachineAi> {
        self.controllers.iter().find(|c| c.body() == body)
    }

    pub fn controller_mut(&mut self, body: Entity) -> Option<&mut StateMachineAi> {
        self.controllers.iter_mut().find(|c| c.body() == body)
    }

    pub fn controllers(&self) -> impl Iterator<Item = &StateMachineAi> {
        self.controllers.iter()
    }

    /// Initialise the pawn's modules and start updating it.
    pub fn spawn_pawn(&mut self, mut pawn: Pawn) -> Result<Entity, PawnError> {
        let entity = pawn.entity();
        pawn.initialise_modules(&mut ModuleContext {
            world: &mut self.world,
            events: &mut self.events,
            delta_time: 0.0,
        })?;
        log::info!("Spawned pawn {entity:?} with {} modules", pawn.module_count());
        self.pawns.push(pawn);
        Ok(entity)
    }

    #[must_use]
    pub fn pawn(&self, entity: Entity) -> Option<&Pawn> {
        self.pawns.iter().find(|p| p.entity() == entity)
    }

    pub fn pawn_mut(&mut self, entity: Entity) -> Option<&mut Pawn> {
        self.pawns.iter_mut().find(|p| p.entity() == entity)
    }

    /// Pawns in update order
    pub fn pawns(&self) -> impl Iterator<Item = &Pawn> {
        self.pawns.iter()
    }

    /// Deal `amount` damage to the pawn's [`HealthModule`].
    ///
    /// Returns whether its HP is depleted, or `None` if the pawn is unknown
    /// or has no health.
    pub fn damage_pawn(&mut self, entity: Entity, amount: f32) -> Result<Option<bool>, PawnError> {
        let Some(health) = self
            .pawns
            .iter_mut()
            .find(|p| p.entity() == entity)
            .and_then(|p| p.get_module_mut::<HealthModule>())
        else {
            return Ok(None);
        };
        health.take_damage(amount, &mut self.events).map(Some)
    }

    /// Destroy a pawn right away: tear down its modules, despawn its entity
    /// and drop any controller driving it.
    ///
    /// Returns `false` if no such pawn exists.
    pub fn despawn_pawn(&mut self, entity: Entity) -> bool {
        let Some(slot) = self.pawns.iter().position(|p| p.entity() == entity) else {
            return false;
        };
        let mut pawn = self.pawns.remove(slot);
        pawn.destroy_all_modules();

        if self.world.despawn(entity).is_err() {
            log::warn!("Pawn {entity:?} had no entity left to despawn");
        }
        self.controllers.retain(|c| c.body() != entity);

        log::info!("Despawned pawn {entity:?}");
        self.events.push(GameEvent::PawnDespawned { pawn: entity });
        true
    }

    /// Advance the simulation by `delta_time` seconds.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a controller or module. The tick is
    /// abandoned at that point.
    pub fn tick(&mut self, delta_time: f32) -> Result<(), SimulationError> {
        self.events.swap();

        let doomed: Vec<Entity> = self
            .events
            .iter()
            .filter_map(|event| match event {
                GameEvent::PawnDespawnRequested { pawn } => Some(*pawn),
                _ => None,
            })
            .collect();
        for pawn in doomed {
            self.despawn_pawn(pawn);
        }

        for (_, pattern) in self.world.query_mut::<&mut MovementPattern>() {
            pattern.maintain();
        }

        for controller in &mut self.controllers {
            if !controller.is_activated() {
                controller.activate(&mut self.world, &mut self.events)?;
            }
            controller.update(&mut self.world, &mut self.events, delta_time)?;
        }

        let mut ctx = ModuleContext {
            world: &mut self.world,
            events: &mut self.events,
            delta_time,
        };
        for pawn in &mut self.pawns {
            pawn.update_modules(&mut ctx)?;
        }

        self.tick_count += 1;
        self.elapsed += delta_time;
        log::trace!("Tick {} done ({:.3}s)", self.tick_count, self.elapsed);
        Ok(())
    }

    /// Run `ticks` ticks of `delta_time` each.
    pub fn run(&mut self, ticks: u32, delta_time: f32) -> Result<(), SimulationError> {
        for _ in 0..ticks {
            self.tick(delta_time)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Events from the previous tick
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Simulated seconds so far
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[must_use]
    pub fn pawn_count(&self) -> usize {
        self.pawns.len()
    }
}
