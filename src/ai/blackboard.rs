//! AI blackboard
//!
//! Links names to world entities. Populated by level data before a
//! controller's first tick.

use hecs::Entity;

/// One named entity reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlackboardEntry {
    pub name: String,
    pub entity: Entity,
}

/// Named lookup table of world-object references owned by a controller
#[derive(Debug, Clone, Default)]
pub struct Blackboard {
    entries: Vec<BlackboardEntry>,
}

impl Blackboard {
    /// Create an empty blackboard
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Blackboard::insert`]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, entity: Entity) -> Self {
        self.insert(name, entity);
        self
    }

    /// Set an entry, replacing any existing entry with the same name.
    ///
    /// Returns the entity previously stored under `name`.
    pub fn insert(&mut self, name: impl Into<String>, entity: Entity) -> Option<Entity> {
        let name = name.into();
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => Some(std::mem::replace(&mut entry.entity, entity)),
            None => {
                self.entries.push(BlackboardEntry { name, entity });
                None
            }
        }
    }

    /// Look up the entity stored under `name`
    #[must_use]
    pub fn read(&self, name: &str) -> Option<Entity> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.entity)
    }

    /// Remove an entry, returning its entity
    pub fn remove(&mut self, name: &str) -> Option<Entity> {
        let index = self.entries.iter().position(|entry| entry.name == name)?;
        Some(self.entries.remove(index).entity)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlackboardEntry> {
        self.entries.iter()
    }
}
