//! Module registry
//!
//! Maps module type names to constructors so pawns can be assembled from
//! configuration.
//!
//! # Example
//!
//! ```ignore
//! let registry = ModuleRegistry::with_builtin();
//! let mut pawn = Pawn::new(entity);
//! for name in &config.pawn_modules {
//!     pawn.add_module(registry.create(name)?)?;
//! }
//! ```

use rustc_hash::FxHashMap;

use super::health::HealthModule;
use super::module::{PawnError, PawnModule};
use super::mover::BasicMover;

/// Builds a fresh, inert module
pub type ModuleFactory = fn() -> Box<dyn PawnModule>;

/// Name to factory lookup, in registration order.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    factories: Vec<(&'static str, ModuleFactory)>,
    index: FxHashMap<&'static str, usize>,
}

impl ModuleRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding `BasicMover` and `HealthModule`
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("BasicMover", || Box::new(BasicMover::default()));
        registry.register("HealthModule", || Box::new(HealthModule::default()));
        registry
    }

    /// Register `factory` under `name`, replacing any earlier one.
    ///
    /// Returns `true` if the name was new.
    pub fn register(&mut self, name: &'static str, factory: ModuleFactory) -> bool {
        match self.index.get(name) {
            Some(&slot) => {
                log::debug!("Replacing module factory `{name}`");
                self.factories[slot].1 = factory;
                false
            }
            None => {
                self.index.insert(name, self.factories.len());
                self.factories.push((name, factory));
                true
            }
        }
    }

    /// Build a module by type name
    pub fn create(&self, name: &str) -> Result<Box<dyn PawnModule>, PawnError> {
        let slot = self
            .index
            .get(name)
            .ok_or_else(|| PawnError::UnknownModule(name.to_owned()))?;
        Ok((self.factories[*slot].1)())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.iter().map(|(name, _)| *name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
