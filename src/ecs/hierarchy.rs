//! Entity hierarchy
//!
//! Patrol patterns are authored as a container entity whose descendants
//! carry the waypoints. Links are kept in sync by [`World::add_child`].
//!
//! [`World::add_child`]: super::World::add_child

use hecs::Entity;
use smallvec::SmallVec;

/// Points at the entity this one hangs under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Entity);

impl Parent {
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.0
    }
}

/// Direct children, in attach order.
///
/// Order matters: pattern collection walks children in this order, which
/// decides element ids.
#[derive(Debug, Clone, Default)]
pub struct Children(SmallVec<[Entity; 8]>);

impl Children {
    #[must_use]
    pub fn single(child: Entity) -> Self {
        let mut children = SmallVec::new();
        children.push(child);
        Self(children)
    }

    /// Append `child` unless already present
    pub fn attach(&mut self, child: Entity) {
        if !self.contains(child) {
            self.0.push(child);
        }
    }

    /// Remove `child`, keeping the order of the rest
    pub fn detach(&mut self, child: Entity) -> bool {
        match self.0.iter().position(|&e| e == child) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, child: Entity) -> bool {
        self.0.contains(&child)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Entity> + '_ {
        self.0.iter().copied()
    }
}
