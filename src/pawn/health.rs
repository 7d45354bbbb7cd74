//! Health module
//!
//! Stores a pawn's hit points. Running out of them asks for the whole pawn
//! to be destroyed, not just this module.

use super::module::{ModuleContext, ModuleCore, ModulePhase, PawnError, PawnModule};
use crate::core::{EventQueue, GameEvent};

/// Hit-point tracker.
#[derive(Debug, Clone)]
pub struct HealthModule {
    core: ModuleCore,
    max_hp: f32,
    current_hp: f32,
}

impl HealthModule {
    /// Create with `max_hp`; current HP is filled on initialise.
    #[must_use]
    pub fn new(max_hp: f32) -> Self {
        Self {
            core: ModuleCore::default(),
            max_hp,
            current_hp: max_hp,
        }
    }

    /// Subtract `amount` from the current HP.
    ///
    /// When HP drops to zero or below, a despawn of the owning pawn is
    /// requested through `events`; this happens once, on the hit that
    /// depletes it. Returns whether HP is depleted.
    pub fn take_damage(&mut self, amount: f32, events: &mut EventQueue) -> Result<bool, PawnError> {
        let pawn = match (self.core.phase(), self.core.pawn()) {
            (ModulePhase::Active, Some(pawn)) => pawn,
            (phase, _) => {
                return Err(PawnError::ModuleNotActive {
                    module: "HealthModule",
                    phase,
                });
            }
        };

        let was_alive = !self.is_depleted();
        self.current_hp -= amount;
        log::debug!("Pawn {pawn:?} took {amount} damage, {} HP left", self.current_hp);
        events.push(GameEvent::PawnDamaged {
            pawn,
            amount,
            remaining: self.current_hp,
        });

        if was_alive && self.is_depleted() {
            log::debug!("Pawn {pawn:?} is out of HP");
            events.push(GameEvent::PawnDespawnRequested { pawn });
        }
        Ok(self.is_depleted())
    }

    #[must_use]
    pub fn current_hp(&self) -> f32 {
        self.current_hp
    }

    #[must_use]
    pub fn max_hp(&self) -> f32 {
        self.max_hp
    }

    pub fn set_max_hp(&mut self, max_hp: f32) {
        self.max_hp = max_hp;
    }

    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current_hp <= 0.0
    }
}

impl Default for HealthModule {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl PawnModule for HealthModule {
    fn name(&self) -> &'static str {
        "HealthModule"
    }

    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn on_initialise(&mut self, _ctx: &mut ModuleContext<'_>) {
        self.current_hp = self.max_hp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;
    use crate::pawn::Pawn;

    fn spawn_with_health(world: &mut World, events: &mut EventQueue, max_hp: f32) -> Pawn {
        let entity = world.spawn(());
        let mut pawn = Pawn::new(entity).with_module(HealthModule::new(max_hp)).unwrap();
        pawn.initialise_modules(&mut ModuleContext {
            world,
            events,
            delta_time: 0.0,
        })
        .unwrap();
        pawn
    }

    #[test]
    fn test_initialise_fills_hp() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let entity = world.spawn(());
        let mut health = HealthModule::new(8.0);
        health.current_hp = 1.0;

        let mut pawn = Pawn::new(entity).with_module(health).unwrap();
        pawn.initialise_modules(&mut ModuleContext {
            world: &mut world,
            events: &mut events,
            delta_time: 0.0,
        })
        .unwrap();

        assert_eq!(pawn.get_module::<HealthModule>().unwrap().current_hp(), 8.0);
    }

    #[test]
    fn test_damage_depletes_and_requests_despawn() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let mut pawn = spawn_with_health(&mut world, &mut events, 5.0);
        let entity = pawn.entity();

        let health = pawn.get_module_mut::<HealthModule>().unwrap();
        let depleted = health.take_damage(5.0, &mut events).unwrap();

        assert!(depleted);
        assert_eq!(health.current_hp(), 0.0);

        events.swap();
        let pending: Vec<_> = events.iter().cloned().collect();
        assert_eq!(
            pending,
            vec![
                GameEvent::PawnDamaged {
                    pawn: entity,
                    amount: 5.0,
                    remaining: 0.0,
                },
                GameEvent::PawnDespawnRequested { pawn: entity },
            ]
        );
    }

    #[test]
    fn test_partial_damage_keeps_pawn() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let mut pawn = spawn_with_health(&mut world, &mut events, 5.0);

        let health = pawn.get_module_mut::<HealthModule>().unwrap();
        assert!(!health.take_damage(2.0, &mut events).unwrap());
        assert_eq!(health.current_hp(), 3.0);

        events.swap();
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, GameEvent::PawnDespawnRequested { .. }))
        );
    }

    #[test]
    fn test_despawn_requested_once() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let mut pawn = spawn_with_health(&mut world, &mut events, 5.0);

        let health = pawn.get_module_mut::<HealthModule>().unwrap();
        health.take_damage(6.0, &mut events).unwrap();
        health.take_damage(1.0, &mut events).unwrap();

        events.swap();
        let requests = events
            .iter()
            .filter(|e| matches!(e, GameEvent::PawnDespawnRequested { .. }))
            .count();
        assert_eq!(requests, 1);
    }

    #[test]
    fn test_damage_before_initialise() {
        let mut events = EventQueue::new();
        let mut health = HealthModule::new(5.0);

        assert_eq!(
            health.take_damage(1.0, &mut events),
            Err(PawnError::ModuleNotActive {
                module: "HealthModule",
                phase: ModulePhase::Inert,
            })
        );
        assert_eq!(events.pending_count(), 0);
    }
}
