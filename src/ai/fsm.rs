//! Finite State Machine for AI Behavior
//!
//! A [`StateMachineAi`] is always in at most one [`AiState`]. A state is a
//! set of instructions and data that determines the AI's immediate
//! behavior, and it knows the conditions under which to hand over to
//! another state.
//!
//! # Lifecycle
//!
//! 1. The controller activates and enters its default state (patrol)
//! 2. Each tick: `update()` then `check_transitions()` on the current state
//! 3. On a transition: `on_exit()` on the old state, link, `on_entry()` on the new one
//!
//! States are never reused: every transition installs a fresh instance, and
//! an instance that has already been linked to a controller is rejected.
//!
//! # Example
//!
//! ```ignore
//! let mut ai = StateMachineAi::new(guard, 2.0)
//!     .with_blackboard(Blackboard::new().with(PATTERN_KEY, patrol_route));
//!
//! ai.activate(&mut world, &mut events)?;      // enters MovementPatternState
//! ai.update(&mut world, &mut events, 0.016)?; // once per tick
//! ```

use std::fmt;

use glam::Vec3;
use hecs::Entity;

use super::patrol::MovementPatternState;
use super::steering::step_towards;
use super::{AiError, Blackboard};
use crate::core::{AsAny, EventQueue, GameEvent};
use crate::ecs::World;

// ============================================================================
// Binding
// ============================================================================

/// Non-owning link from a state to the controller driving it.
///
/// Holds the controller's body entity. Linked exactly once, by
/// [`StateMachineAi::change_state`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Binding(Option<Entity>);

impl Binding {
    /// Link to `owner`. A binding can only be linked once.
    pub fn link(&mut self, owner: Entity, state: &'static str) -> Result<(), AiError> {
        match self.0 {
            Some(existing) => Err(AiError::AlreadyBound {
                state,
                owner: existing,
            }),
            None => {
                self.0 = Some(owner);
                Ok(())
            }
        }
    }

    /// Controller this binding points at
    pub fn owner(&self, state: &'static str) -> Result<Entity, AiError> {
        self.0.ok_or(AiError::Unbound { state })
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.0.is_some()
    }
}

// ============================================================================
// Context
// ============================================================================

/// What a state can see and touch while its controller drives it.
///
/// Only built by the controller after checking the state's [`Binding`]
/// against its own body, so a state holding a context is always linked to
/// the controller that is running it.
pub struct AiContext<'a> {
    /// World-query service
    pub world: &'a mut World,
    /// Event queue for this tick
    pub events: &'a mut EventQueue,
    /// Seconds since the previous tick
    pub delta_time: f32,
    body: Entity,
    speed: f32,
    blackboard: &'a Blackboard,
}

impl<'a> AiContext<'a> {
    pub(super) fn for_state(
        state: &dyn AiState,
        body: Entity,
        speed: f32,
        blackboard: &'a Blackboard,
        world: &'a mut World,
        events: &'a mut EventQueue,
        delta_time: f32,
    ) -> Result<Self, AiError> {
        let owner = state.binding().owner(state.name())?;
        if owner != body {
            return Err(AiError::ForeignController {
                state: state.name(),
                owner,
                controller: body,
            });
        }

        Ok(Self {
            world,
            events,
            delta_time,
            body,
            speed,
            blackboard,
        })
    }

    /// Body entity of the controller
    #[must_use]
    pub fn controller(&self) -> Entity {
        self.body
    }

    /// Movement speed in units per second
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Current position of the controller's body
    pub fn position(&self) -> Result<Vec3, AiError> {
        self.world
            .position(self.body)
            .ok_or(AiError::MissingBody(self.body))
    }

    /// See [`StateMachineAi::read_blackboard`]
    #[must_use]
    pub fn read_blackboard(&self, name: &str) -> Option<Entity> {
        self.blackboard.read(name)
    }

    /// See [`StateMachineAi::move_towards`]
    pub fn move_towards(&mut self, destination: Vec3) -> Result<bool, AiError> {
        move_body(
            self.world,
            self.body,
            destination,
            self.speed * self.delta_time,
        )
    }
}

fn move_body(world: &mut World, body: Entity, destination: Vec3, step: f32) -> Result<bool, AiError> {
    let position = world.position(body).ok_or(AiError::MissingBody(body))?;
    let result = step_towards(position, destination, step);
    world.set_position(body, result.position);
    log::trace!(
        "{body:?} moved to {} (reached: {})",
        result.position,
        result.reached
    );
    Ok(result.reached)
}

// ============================================================================
// State Trait
// ============================================================================

/// A behavior mode of a [`StateMachineAi`].
pub trait AiState: AsAny + fmt::Debug {
    /// State name for debugging and logging.
    fn name(&self) -> &'static str;

    /// Link to the controller running this state.
    fn binding(&self) -> &Binding;

    fn binding_mut(&mut self) -> &mut Binding;

    /// Called once, right after the state is linked.
    fn on_entry(&mut self, _ctx: &mut AiContext<'_>) -> Result<(), AiError> {
        Ok(())
    }

    /// Called each tick while this state is current.
    fn update(&mut self, ctx: &mut AiContext<'_>) -> Result<(), AiError>;

    /// Called each tick after `update()`.
    fn check_transitions(&mut self, _ctx: &mut AiContext<'_>) -> Result<Transition, AiError> {
        Ok(Transition::None)
    }

    /// Called once when another state replaces this one.
    fn on_exit(&mut self, _ctx: &mut AiContext<'_>) {}
}

impl dyn AiState {
    /// Concrete state, if it is a `T`
    pub fn downcast_ref<T: AiState>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

// ============================================================================
// Transition
// ============================================================================

/// Decision returned from [`AiState::check_transitions`].
pub enum Transition {
    /// Stay in the current state.
    None,
    /// Transition to a new state.
    To(Box<dyn AiState>),
}

impl Transition {
    /// Create a transition to a new state.
    pub fn to<S: AiState + 'static>(state: S) -> Self {
        Transition::To(Box::new(state))
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::None => write!(f, "Transition::None"),
            Transition::To(state) => write!(f, "Transition::To({})", state.name()),
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Builds the state a controller enters on activation.
pub type StateFactory = fn() -> Box<dyn AiState>;

fn patrol_state() -> Box<dyn AiState> {
    Box::new(MovementPatternState::new())
}

/// State-machine AI controller.
///
/// Drives a body entity (its `Transform` is the controller's position),
/// owns a blackboard, and owns at most one current state.
pub struct StateMachineAi {
    body: Entity,
    speed: f32,
    blackboard: Blackboard,
    current: Option<Box<dyn AiState>>,
    default_state: StateFactory,
    activated: bool,
}

impl StateMachineAi {
    /// Create a controller for `body` moving at `speed` units per second.
    ///
    /// No state is active until [`StateMachineAi::activate`].
    #[must_use]
    pub fn new(body: Entity, speed: f32) -> Self {
        Self {
            body,
            speed,
            blackboard: Blackboard::new(),
            current: None,
            default_state: patrol_state,
            activated: false,
        }
    }

    /// Set the blackboard
    #[must_use]
    pub fn with_blackboard(mut self, blackboard: Blackboard) -> Self {
        self.blackboard = blackboard;
        self
    }

    /// Replace the state entered on activation
    #[must_use]
    pub fn with_default_state(mut self, factory: StateFactory) -> Self {
        self.default_state = factory;
        self
    }

    /// Enter the default state.
    ///
    /// Does nothing once activation has succeeded. A failed activation leaves
    /// the controller inactive, so the next call tries again.
    pub fn activate(&mut self, world: &mut World, events: &mut EventQueue) -> Result<(), AiError> {
        if self.activated {
            return Ok(());
        }
        let initial = (self.default_state)();
        self.change_state(world, events, Some(initial))?;
        self.activated = true;
        log::info!("AI {:?} activated", self.body);
        Ok(())
    }

    /// Replace the current state.
    ///
    /// Fails with [`AiError::InvalidTransition`] when `new_state` is absent
    /// or has already been linked to a controller (the active state, or one
    /// that was exited); the current state is left untouched in that case.
    ///
    /// If the new state's `on_entry()` fails, the old state has already been
    /// exited and the controller is left with no state.
    pub fn change_state(
        &mut self,
        world: &mut World,
        events: &mut EventQueue,
        new_state: Option<Box<dyn AiState>>,
    ) -> Result<(), AiError> {
        self.transition(world, events, new_state, 0.0)
    }

    fn transition(
        &mut self,
        world: &mut World,
        events: &mut EventQueue,
        new_state: Option<Box<dyn AiState>>,
        delta_time: f32,
    ) -> Result<(), AiError> {
        let Some(next) = new_state else {
            return Err(AiError::InvalidTransition {
                reason: "no state given",
            });
        };
        if next.binding().is_bound() {
            return Err(AiError::InvalidTransition {
                reason: "state instance is already linked to an AI",
            });
        }

        let from = match self.current.as_mut() {
            Some(old) => {
                let mut ctx = AiContext::for_state(
                    &**old,
                    self.body,
                    self.speed,
                    &self.blackboard,
                    world,
                    events,
                    delta_time,
                )?;
                old.on_exit(&mut ctx);
                Some(old.name())
            }
            None => None,
        };

        let to = next.name();
        let state = self.current.insert(next);
        let entered = state.binding_mut().link(self.body, to).and_then(|()| {
            let mut ctx = AiContext::for_state(
                &**state,
                self.body,
                self.speed,
                &self.blackboard,
                world,
                events,
                delta_time,
            )?;
            state.on_entry(&mut ctx)
        });
        if let Err(error) = entered {
            log::error!("AI {:?} failed to enter {to}: {error}", self.body);
            self.current = None;
            return Err(error);
        }

        log::debug!("AI {:?}: {} -> {to}", self.body, from.unwrap_or("<none>"));
        events.push(GameEvent::StateChanged {
            controller: self.body,
            from,
            to,
        });
        Ok(())
    }

    /// Run one tick: the current state's `update()`, then its transition
    /// check. No-op when no state is active.
    pub fn update(&mut self, world: &mut World, events: &mut EventQueue, delta_time: f32) -> Result<(), AiError> {
        let Some(state) = self.current.as_mut() else {
            return Ok(());
        };

        let mut ctx = AiContext::for_state(
            &**state,
            self.body,
            self.speed,
            &self.blackboard,
            world,
            events,
            delta_time,
        )?;
        state.update(&mut ctx)?;
        let transition = state.check_transitions(&mut ctx)?;

        if let Transition::To(next) = transition {
            self.transition(world, events, Some(next), delta_time)?;
        }
        Ok(())
    }

    /// Entity stored under `name` on the blackboard, if any.
    #[must_use]
    pub fn read_blackboard(&self, name: &str) -> Option<Entity> {
        self.blackboard.read(name)
    }

    /// Step the body toward `destination` by `speed × delta_time`.
    ///
    /// Snaps onto the destination and returns `true` once the remaining
    /// distance is within one step.
    pub fn move_towards(&self, world: &mut World, destination: Vec3, delta_time: f32) -> Result<bool, AiError> {
        move_body(world, self.body, destination, self.speed * delta_time)
    }

    #[must_use]
    pub fn body(&self) -> Entity {
        self.body
    }

    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    #[must_use]
    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    #[must_use]
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Name of the current state, if one is active
    #[must_use]
    pub fn current_state_name(&self) -> Option<&'static str> {
        self.current.as_ref().map(|state| state.name())
    }

    /// Check if the controller is in a state with the given name.
    #[must_use]
    pub fn is_in_state(&self, name: &str) -> bool {
        self.current_state_name() == Some(name)
    }

    /// Current state, for inspection
    #[must_use]
    pub fn current_state(&self) -> Option<&dyn AiState> {
        self.current.as_deref()
    }
}

impl fmt::Debug for StateMachineAi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachineAi")
            .field("body", &self.body)
            .field("speed", &self.speed)
            .field("current", &self.current_state_name())
            .field("activated", &self.activated)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
