//! Event Queue System for Decoupled Communication
//!
//! A double-buffered event queue. Events are written during one tick and
//! read during the next, so what a system sees never depends on the order
//! systems run in within a tick.
//!
//! # Example
//!
//! ```ignore
//! // In a pawn module
//! ctx.events.push(GameEvent::PawnDamaged {
//!     pawn,
//!     amount: 10.0,
//!     remaining: 40.0,
//! });
//!
//! // Next tick, in the scheduler
//! for event in events.iter() {
//!     if let GameEvent::PawnDespawnRequested { pawn } = event {
//!         despawn(*pawn);
//!     }
//! }
//! ```

use std::collections::VecDeque;

use hecs::Entity;

use crate::ai::ElementId;

// ============================================================================
// Event Types
// ============================================================================

/// Things that happened during a tick.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GameEvent {
    // -------------------------------------------------------------------------
    // AI Events
    // -------------------------------------------------------------------------
    /// A controller entered a new state.
    StateChanged {
        /// Body entity of the controller
        controller: Entity,
        /// Name of the state left, if any
        from: Option<&'static str>,
        /// Name of the state entered
        to: &'static str,
    },

    /// A controller finished dwelling at a waypoint.
    WaypointVisited {
        /// Body entity of the controller
        controller: Entity,
        /// Container entity of the pattern
        pattern: Entity,
        /// Element dwelt at
        element: ElementId,
    },

    // -------------------------------------------------------------------------
    // Pawn Events
    // -------------------------------------------------------------------------
    /// A pawn took damage.
    PawnDamaged {
        /// The damaged pawn
        pawn: Entity,
        /// Amount of damage dealt
        amount: f32,
        /// Hit points left afterwards
        remaining: f32,
    },

    /// A pawn should be destroyed at the start of the next tick.
    PawnDespawnRequested {
        /// The pawn to destroy
        pawn: Entity,
    },

    /// A pawn was destroyed and its modules torn down.
    PawnDespawned {
        /// The destroyed pawn
        pawn: Entity,
    },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Two buffers of [`GameEvent`]s: one being written this tick, one holding
/// what was written last tick.
#[derive(Debug, Default)]
pub struct EventQueue {
    writing: VecDeque<GameEvent>,
    readable: VecDeque<GameEvent>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event. It becomes readable after the next [`EventQueue::swap`].
    #[inline]
    pub fn push(&mut self, event: GameEvent) {
        self.writing.push_back(event);
    }

    /// Tick boundary: last tick's writes become readable, and whatever was
    /// readable before is dropped.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.writing, &mut self.readable);
        self.writing.clear();
    }

    /// Events written during the previous tick, in push order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.readable.iter()
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.readable.is_empty()
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.readable.len()
    }

    /// Number of events written so far this tick
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.writing.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entity() -> Entity {
        let mut world = hecs::World::new();
        world.spawn(())
    }

    #[test]
    fn test_events_readable_after_swap() {
        let mut queue = EventQueue::new();
        let pawn = test_entity();

        queue.push(GameEvent::PawnDespawnRequested { pawn });
        assert!(queue.is_empty());
        assert_eq!(queue.pending_count(), 1);

        queue.swap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pending_count(), 0);
        assert_eq!(
            queue.iter().next(),
            Some(&GameEvent::PawnDespawnRequested { pawn })
        );
    }

    #[test]
    fn test_writes_during_read_wait_a_tick() {
        let mut queue = EventQueue::new();
        let body = test_entity();

        queue.push(GameEvent::PawnDespawned { pawn: body });
        queue.swap();

        queue.push(GameEvent::StateChanged {
            controller: body,
            from: None,
            to: "MovementPattern",
        });

        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GameEvent::PawnDespawned { .. }));

        queue.swap();
        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            GameEvent::StateChanged {
                to: "MovementPattern",
                ..
            }
        ));
    }

    #[test]
    fn test_unread_events_expire() {
        let mut queue = EventQueue::new();
        let pawn = test_entity();

        queue.push(GameEvent::PawnDamaged {
            pawn,
            amount: 2.0,
            remaining: 3.0,
        });
        queue.swap();
        queue.swap();

        assert!(queue.is_empty());
    }
}
