//! Downcasting support for trait objects
//!
//! States and pawn modules are stored as boxed trait objects; `AsAny` lets
//! callers recover the concrete type.

use std::any::Any;

/// Access to `self` as [`Any`]. Blanket-implemented for every `'static` type.
///
/// Call it on the trait object itself (`&dyn Trait`), not on a `Box` holding
/// one: the box is `Any` too and would be returned instead.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
