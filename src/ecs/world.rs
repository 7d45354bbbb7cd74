//! World wrapper around hecs
//!
//! This is the world-query service the AI and pawn layers are handed every
//! tick: it enumerates components of a type and fetches components attached
//! to a given entity.

use std::fmt;

use glam::Vec3;
use hecs::Entity;

use super::{Children, Parent, Transform};

/// Game world containing all entities and components
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn an entity with the given components
    pub fn spawn(&mut self, components: impl hecs::DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Despawn an entity
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Attach a single component to an existing entity
    pub fn insert_one(
        &mut self,
        entity: Entity,
        component: impl hecs::Component,
    ) -> Result<(), hecs::NoSuchEntity> {
        self.inner.insert_one(entity, component)
    }

    /// Get a reference to a component
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Get a mutable reference to a component
    pub fn get_mut<T: hecs::Component>(
        &mut self,
        entity: Entity,
    ) -> Result<hecs::RefMut<'_, T>, hecs::ComponentError> {
        self.inner.get::<&mut T>(entity)
    }

    /// Check whether an entity carries a component of type `T`
    pub fn has<T: hecs::Component>(&self, entity: Entity) -> bool {
        self.inner
            .entity(entity)
            .map(|entity| entity.has::<T>())
            .unwrap_or(false)
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Get the number of entities
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if the world is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Query for entities with specific components
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query::<Q>()
    }

    /// Query for entities with specific components (mutable)
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<'_, Q> {
        self.inner.query_mut::<Q>()
    }

    /// World-space position of an entity, if it has a transform
    pub fn position(&self, entity: Entity) -> Option<Vec3> {
        self.get::<Transform>(entity).ok().map(|t| t.position)
    }

    /// Move an entity. Returns `false` if it has no transform.
    pub fn set_position(&mut self, entity: Entity, position: Vec3) -> bool {
        match self.get_mut::<Transform>(entity) {
            Ok(mut transform) => {
                transform.position = position;
                true
            }
            Err(_) => false,
        }
    }

    /// Attach `child` under `parent`, keeping `Parent` and `Children` in sync.
    ///
    /// A child that already hangs under another entity is moved.
    pub fn add_child(&mut self, parent: Entity, child: Entity) -> Result<(), hecs::NoSuchEntity> {
        if !self.inner.contains(parent) {
            return Err(hecs::NoSuchEntity);
        }

        let previous = self.inner.get::<&Parent>(child).ok().map(|p| p.entity());
        if let Some(old) = previous.filter(|&old| old != parent) {
            if let Ok(mut siblings) = self.inner.get::<&mut Children>(old) {
                siblings.detach(child);
            }
        }
        self.inner.insert_one(child, Parent(parent))?;

        let attached = self
            .inner
            .get::<&mut Children>(parent)
            .map(|mut children| children.attach(child))
            .is_ok();
        if !attached {
            self.inner.insert_one(parent, Children::single(child))?;
        }
        Ok(())
    }

    /// `root` followed by all of its descendants, depth-first pre-order
    pub fn descendants(&self, root: Entity) -> Vec<Entity> {
        let mut order = Vec::new();
        let mut stack = vec![root];

        while let Some(entity) = stack.pop() {
            order.push(entity);
            if let Ok(children) = self.get::<Children>(entity) {
                stack.extend(children.iter().rev());
            }
        }

        order
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World").field("entities", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_roundtrip() {
        let mut world = World::new();
        let entity = world.spawn((Transform::from_xyz(1.0, 2.0, 3.0),));
        let bare = world.spawn(());

        assert_eq!(world.position(entity), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert!(world.set_position(entity, Vec3::X));
        assert_eq!(world.position(entity), Some(Vec3::X));

        assert_eq!(world.position(bare), None);
        assert!(!world.set_position(bare, Vec3::X));
    }

    #[test]
    fn test_descendants_pre_order() {
        let mut world = World::new();
        let root = world.spawn(());
        let a = world.spawn(());
        let b = world.spawn(());
        let a_child = world.spawn(());

        world.add_child(root, a).unwrap();
        world.add_child(root, b).unwrap();
        world.add_child(a, a_child).unwrap();

        assert_eq!(world.descendants(root), vec![root, a, a_child, b]);
        assert_eq!(world.get::<Parent>(a_child).unwrap().entity(), a);
    }

    #[test]
    fn test_add_child_reparents() {
        let mut world = World::new();
        let first = world.spawn(());
        let second = world.spawn(());
        let child = world.spawn(());

        world.add_child(first, child).unwrap();
        world.add_child(second, child).unwrap();

        assert!(!world.get::<Children>(first).unwrap().contains(child));
        assert!(world.get::<Children>(second).unwrap().contains(child));
        assert_eq!(world.get::<Parent>(child).unwrap().entity(), second);
        assert_eq!(world.descendants(first), vec![first]);
    }

    #[test]
    fn test_add_child_to_missing_parent() {
        let mut world = World::new();
        let parent = world.spawn(());
        let child = world.spawn(());
        world.despawn(parent).unwrap();

        assert!(world.add_child(parent, child).is_err());
        assert!(!world.has::<Parent>(child));
    }

    #[test]
    fn test_has_component() {
        let mut world = World::new();
        let entity = world.spawn((Transform::default(),));

        assert!(world.has::<Transform>(entity));
        assert!(!world.has::<Children>(entity));

        world.despawn(entity).unwrap();
        assert!(!world.has::<Transform>(entity));
    }
}
