//! Patrol along a movement pattern
//!
//! The AI walks to a pattern element, waits there for the element's wait
//! time, then moves on to the element's `next`. When it reaches a dead end
//! it turns around and walks back along `previous` links, and turns around
//! again once it runs out of them. On a line this gives a ping-pong patrol;
//! on a cycle the AI simply loops.
//!
//! The state has three implicit phases:
//!
//! | Phase     | `dest_element` | `last_element` | In range |
//! |-----------|----------------|----------------|----------|
//! | Seeking   | set            | any            | no       |
//! | Dwelling  | set            | any            | yes      |
//! | Selecting | empty          | set            | -        |

use hecs::Entity;

use super::fsm::{AiContext, AiState, Binding, Transition};
use super::pattern::{ElementId, MovementPattern, nearest_pattern};
use super::AiError;
use crate::core::GameEvent;
use crate::ecs::World;

/// Blackboard entry naming the pattern to follow.
pub const PATTERN_KEY: &str = "Pattern";

/// Blackboard entry naming a hostile entity.
pub const ENEMY_KEY: &str = "Enemy";

/// Squared distance under which a destination counts as reached.
pub const PROXIMITY_THRESHOLD_SQ: f32 = 1.0;

/// Follows a [`MovementPattern`], dwelling at every element.
#[derive(Debug, Default)]
pub struct MovementPatternState {
    binding: Binding,
    pattern: Option<Entity>,
    /// Element most recently reached
    last_element: Option<ElementId>,
    /// Element being walked to or dwelt at
    dest_element: Option<ElementId>,
    /// Seconds spent within range of `dest_element`
    current_wait_time: f32,
    /// Walking `previous` links instead of `next`
    backward: bool,
}

impl MovementPatternState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Container entity of the pattern being followed
    #[must_use]
    pub fn pattern(&self) -> Option<Entity> {
        self.pattern
    }

    #[must_use]
    pub fn last_element(&self) -> Option<ElementId> {
        self.last_element
    }

    #[must_use]
    pub fn dest_element(&self) -> Option<ElementId> {
        self.dest_element
    }

    #[must_use]
    pub fn current_wait_time(&self) -> f32 {
        self.current_wait_time
    }

    #[must_use]
    pub fn is_backward(&self) -> bool {
        self.backward
    }

    fn resolve_pattern(ctx: &AiContext<'_>) -> Result<Entity, AiError> {
        let from_blackboard = ctx
            .read_blackboard(PATTERN_KEY)
            .filter(|&entity| ctx.world.has::<MovementPattern>(entity));

        match from_blackboard {
            Some(entity) => Ok(entity),
            None => {
                log::debug!(
                    "AI {:?} has no usable {PATTERN_KEY} entry, searching for the nearest pattern",
                    ctx.controller()
                );
                nearest_pattern(ctx.world, ctx.position()?).ok_or(AiError::NoPatterns)
            }
        }
    }

    fn load_pattern<'w>(
        world: &'w World,
        entity: Entity,
    ) -> Result<hecs::Ref<'w, MovementPattern>, AiError> {
        world
            .get::<MovementPattern>(entity)
            .map_err(|_| AiError::PatternLost(entity))
    }

    /// Pick the destination following `last_element`, honoring and possibly
    /// flipping the travel direction. Resets the dwell timer.
    ///
    /// A dead end without a `previous` leaves the state without a
    /// destination until the pattern changes.
    fn find_next_dest(&mut self, pattern: &MovementPattern) {
        let Some(last) = self.last_element else {
            return;
        };

        if self.backward {
            match pattern.previous_of(last) {
                Some(previous) => self.dest_element = Some(previous),
                None => {
                    log::debug!("Start of pattern at {last}, going forward");
                    self.backward = false;
                    self.dest_element = pattern.next_of(last);
                }
            }
        } else if !pattern.is_dead_end(last) {
            self.dest_element = pattern.next_of(last);
        } else if pattern.previous_of(last).is_some() {
            log::debug!("Dead end at {last}, going back");
            self.backward = true;
            self.find_next_dest(pattern);
        }

        self.current_wait_time = 0.0;
    }
}

impl AiState for MovementPatternState {
    fn name(&self) -> &'static str {
        "MovementPattern"
    }

    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut Binding {
        &mut self.binding
    }

    /// Resolve the pattern to follow and head for its nearest element.
    ///
    /// The blackboard's `"Pattern"` entry wins when it names an entity with
    /// a [`MovementPattern`]; otherwise the nearest pattern in the world is
    /// used.
    fn on_entry(&mut self, ctx: &mut AiContext<'_>) -> Result<(), AiError> {
        let entity = Self::resolve_pattern(ctx)?;
        let position = ctx.position()?;

        let pattern = Self::load_pattern(ctx.world, entity)?;
        log::debug!(
            "Finding closest pattern element from {} elements",
            pattern.len()
        );
        let closest = pattern
            .nearest(position)
            .ok_or(AiError::EmptyPattern(entity))?;

        self.pattern = Some(entity);
        self.dest_element = Some(closest);
        Ok(())
    }

    fn update(&mut self, ctx: &mut AiContext<'_>) -> Result<(), AiError> {
        let Some(entity) = self.pattern else {
            return Err(AiError::NotEntered { state: self.name() });
        };

        if let Some(dest) = self.dest_element {
            let (target, wait_time) = {
                let pattern = Self::load_pattern(ctx.world, entity)?;
                let element = pattern.get(dest).ok_or(AiError::UnknownElement(dest))?;
                (element.position, element.wait_time)
            };

            let distance_sq = (target - ctx.position()?).length_squared();
            if distance_sq > PROXIMITY_THRESHOLD_SQ {
                ctx.move_towards(target)?;
            } else if self.current_wait_time > wait_time {
                self.last_element = Some(dest);
                self.dest_element = None;
                let controller = ctx.controller();
                ctx.events.push(GameEvent::WaypointVisited {
                    controller,
                    pattern: entity,
                    element: dest,
                });
            } else {
                self.current_wait_time += ctx.delta_time;
            }
        } else if self.last_element.is_some() {
            let pattern = Self::load_pattern(ctx.world, entity)?;
            self.find_next_dest(&pattern);
            log::debug!(
                "AI {:?} next destination: {:?}",
                ctx.controller(),
                self.dest_element
            );
        }

        Ok(())
    }

    fn check_transitions(&mut self, ctx: &mut AiContext<'_>) -> Result<Transition, AiError> {
        if let Some(enemy) = ctx.read_blackboard(ENEMY_KEY) {
            // Hook for a combat state once one exists.
            log::trace!("AI {:?} knows about enemy {enemy:?}", ctx.controller());
        }
        Ok(Transition::None)
    }
}
