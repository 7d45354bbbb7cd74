//! Pawn entity
//!
//! A pawn is a physical entity controlled by an AI or a player. It owns an
//! ordered list of [`PawnModule`]s and drives their lifecycle.

use hecs::Entity;

use super::module::{ModuleContext, PawnError, PawnModule};

/// Entity composed of modules.
///
/// Holds at most one module per concrete type; [`Pawn::add_module`] rejects
/// duplicates.
#[derive(Debug)]
pub struct Pawn {
    entity: Entity,
    modules: Vec<Box<dyn PawnModule>>,
}

impl Pawn {
    /// Create a pawn driving `entity`
    #[must_use]
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            modules: Vec::new(),
        }
    }

    /// Builder form of [`Pawn::add_module`]
    pub fn with_module(mut self, module: impl PawnModule) -> Result<Self, PawnError> {
        self.add_module(Box::new(module))?;
        Ok(self)
    }

    /// Append a module.
    pub fn add_module(&mut self, module: Box<dyn PawnModule>) -> Result<(), PawnError> {
        let type_id = module.module_type_id();
        if self.modules.iter().any(|m| m.module_type_id() == type_id) {
            log::warn!("Pawn {:?} already has a {} module", self.entity, module.name());
            return Err(PawnError::DuplicateModule {
                pawn: self.entity,
                module: module.name(),
            });
        }
        self.modules.push(module);
        Ok(())
    }

    /// Initialise every module, in order.
    pub fn initialise_modules(&mut self, ctx: &mut ModuleContext<'_>) -> Result<(), PawnError> {
        for module in &mut self.modules {
            module.initialise(self.entity, ctx)?;
        }
        Ok(())
    }

    /// Update every active module, in order.
    ///
    /// Destroyed modules stay in the list until [`Pawn::remove_destroyed`]
    /// and are skipped here, as are modules added after spawning.
    pub fn update_modules(&mut self, ctx: &mut ModuleContext<'_>) -> Result<(), PawnError> {
        for module in &mut self.modules {
            if module.core().is_active() {
                module.update(ctx)?;
            }
        }
        Ok(())
    }

    /// First module of type `T`
    #[must_use]
    pub fn get_module<T: PawnModule>(&self) -> Option<&T> {
        self.modules.iter().find_map(|m| m.downcast_ref::<T>())
    }

    /// First module of type `T`
    pub fn get_module_mut<T: PawnModule>(&mut self) -> Option<&mut T> {
        self.modules.iter_mut().find_map(|m| m.downcast_mut::<T>())
    }

    /// Destroy the first module of type `T`. It stays in the list.
    ///
    /// Returns `false` if the pawn has no such module.
    pub fn destroy_module<T: PawnModule>(&mut self) -> bool {
        match self.get_module_mut::<T>() {
            Some(module) => {
                let module: &mut dyn PawnModule = module;
                module.destroy();
                true
            }
            None => false,
        }
    }

    /// Destroy every module, in order.
    pub fn destroy_all_modules(&mut self) {
        for module in &mut self.modules {
            module.destroy();
        }
    }

    /// Drop destroyed modules from the list. Returns how many were removed.
    pub fn remove_destroyed(&mut self) -> usize {
        let before = self.modules.len();
        self.modules.retain(|m| !m.is_destroyed());
        before - self.modules.len()
    }

    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn modules(&self) -> impl Iterator<Item = &dyn PawnModule> {
        self.modules.iter().map(|m| m.as_ref())
    }

    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EventQueue;
    use crate::ecs::World;
    use crate::pawn::module::tests::Counter;
    use crate::pawn::{BasicMover, HealthModule};

    fn context<'a>(world: &'a mut World, events: &'a mut EventQueue) -> ModuleContext<'a> {
        ModuleContext {
            world,
            events,
            delta_time: 1.0,
        }
    }

    fn spawned_pawn(world: &mut World, events: &mut EventQueue) -> Pawn {
        let entity = world.spawn(());
        let mut pawn = Pawn::new(entity)
            .with_module(Counter::default())
            .unwrap()
            .with_module(HealthModule::new(5.0))
            .unwrap();
        pawn.initialise_modules(&mut context(world, events)).unwrap();
        pawn
    }

    #[test]
    fn test_initialise_and_update_in_order() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let mut pawn = spawned_pawn(&mut world, &mut events);

        pawn.update_modules(&mut context(&mut world, &mut events))
            .unwrap();
        pawn.update_modules(&mut context(&mut world, &mut events))
            .unwrap();

        let counter = pawn.get_module::<Counter>().unwrap();
        assert_eq!(counter.initialised, 1);
        assert_eq!(counter.updated, 2);

        let names: Vec<_> = pawn.modules().map(|m| m.name()).collect();
        assert_eq!(names, vec!["Counter", "HealthModule"]);
        assert!(pawn.modules().all(|m| m.pawn() == Some(pawn.entity())));
    }

    #[test]
    fn test_get_module_miss() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let pawn = spawned_pawn(&mut world, &mut events);

        assert!(pawn.get_module::<BasicMover>().is_none());
        assert!(pawn.get_module::<HealthModule>().is_some());
    }

    #[test]
    fn test_duplicate_module_rejected() {
        let mut world = World::new();
        let entity = world.spawn(());
        let mut pawn = Pawn::new(entity).with_module(Counter::default()).unwrap();

        let result = pawn.add_module(Box::new(Counter::default()));

        assert_eq!(
            result,
            Err(PawnError::DuplicateModule {
                pawn: entity,
                module: "Counter",
            })
        );
        assert_eq!(pawn.module_count(), 1);
    }

    #[test]
    fn test_destroy_module_keeps_it_listed() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let mut pawn = spawned_pawn(&mut world, &mut events);

        assert!(pawn.destroy_module::<Counter>());
        assert!(pawn.destroy_module::<Counter>());
        assert!(!pawn.destroy_module::<BasicMover>());

        pawn.update_modules(&mut context(&mut world, &mut events))
            .unwrap();

        let counter = pawn.get_module::<Counter>().unwrap();
        assert_eq!(counter.destroyed, 1);
        assert_eq!(counter.updated, 0);
        assert_eq!(pawn.module_count(), 2);

        assert_eq!(pawn.remove_destroyed(), 1);
        assert!(pawn.get_module::<Counter>().is_none());
    }

    #[test]
    fn test_destroy_all_modules() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let mut pawn = spawned_pawn(&mut world, &mut events);

        pawn.destroy_all_modules();
        pawn.destroy_all_modules();

        assert!(pawn.modules().all(|m| m.is_destroyed()));
        assert_eq!(pawn.get_module::<Counter>().unwrap().destroyed, 1);
    }

    #[test]
    fn test_modules_added_after_spawn_are_not_updated() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let entity = world.spawn(());
        let mut pawn = Pawn::new(entity);
        pawn.initialise_modules(&mut context(&mut world, &mut events))
            .unwrap();

        pawn.add_module(Box::new(Counter::default())).unwrap();
        pawn.update_modules(&mut context(&mut world, &mut events))
            .unwrap();

        assert_eq!(pawn.get_module::<Counter>().unwrap().updated, 0);
    }
}
