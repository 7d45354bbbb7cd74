//! Patrol pattern graph
//!
//! A [`MovementPattern`] is an arena of [`PatternElement`] waypoints. Each
//! element points at the next one through an [`ElementId`] and remembers the
//! element that points at it. The graph may contain cycles; an element whose
//! `next` is itself is a dead end.
//!
//! # Authoring
//!
//! Patterns are normally authored in the world: a container entity whose
//! descendants carry [`Waypoint`] components. [`MovementPattern::collect`]
//! turns that hierarchy into an arena.
//!
//! ```ignore
//! let root = world.spawn((Transform::default(),));
//! let a = world.spawn((Transform::from_xyz(0.0, 0.0, 0.0), Waypoint::new()));
//! world.add_child(root, a)?;
//! let pattern = MovementPattern::collect(&world, root);
//! world.insert_one(root, pattern)?;
//! ```

use std::fmt;

use glam::Vec3;
use hecs::Entity;
use rustc_hash::FxHashMap;

use super::AiError;
use crate::ecs::{Transform, World};

/// Default dwell time at a waypoint, in seconds.
pub const DEFAULT_WAIT_TIME: f32 = 1.0;

// ============================================================================
// Element Ids
// ============================================================================

/// Index of an element inside its [`MovementPattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl ElementId {
    /// Arena index
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Authoring Component
// ============================================================================

/// Waypoint authoring component.
///
/// Placed on entities below a pattern container. `next` names the entity of
/// the following waypoint; `None` makes this waypoint a dead end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    /// Seconds to dwell here
    pub wait_time: f32,
    /// Following waypoint entity
    pub next: Option<Entity>,
}

impl Waypoint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_wait_time(mut self, wait_time: f32) -> Self {
        self.wait_time = wait_time;
        self
    }

    #[must_use]
    pub fn with_next(mut self, next: Entity) -> Self {
        self.next = Some(next);
        self
    }
}

impl Default for Waypoint {
    fn default() -> Self {
        Self {
            wait_time: DEFAULT_WAIT_TIME,
            next: None,
        }
    }
}

// ============================================================================
// Pattern Element
// ============================================================================

/// One waypoint node.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternElement {
    /// World-space position
    pub position: Vec3,
    /// Seconds an AI dwells here before moving on
    pub wait_time: f32,
    next: ElementId,
    previous: Option<ElementId>,
}

impl PatternElement {
    /// Element that follows this one. Equal to the element's own id on a dead end.
    #[must_use]
    pub fn next(&self) -> ElementId {
        self.next
    }

    /// Element whose `next` points here, as of the last consistency pass.
    #[must_use]
    pub fn previous(&self) -> Option<ElementId> {
        self.previous
    }
}

// ============================================================================
// Movement Pattern
// ============================================================================

/// Arena of waypoints forming one patrol path.
///
/// Stored as a component on the pattern's container entity.
#[derive(Debug, Clone, Default)]
pub struct MovementPattern {
    elements: Vec<PatternElement>,
}

impl MovementPattern {
    /// Create an empty pattern
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pattern from every [`Waypoint`] found on `root` or its
    /// descendants, in depth-first pre-order.
    ///
    /// `Waypoint::next` entities outside the collected set fall back to a
    /// self-loop. An empty result is logged as an error; entering a patrol
    /// state on it fails.
    pub fn collect(world: &World, root: Entity) -> Self {
        let mut pattern = Self::new();
        let mut ids: FxHashMap<Entity, ElementId> = FxHashMap::default();
        let mut links: Vec<(ElementId, Entity)> = Vec::new();

        for entity in world.descendants(root) {
            let Ok(waypoint) = world.get::<Waypoint>(entity) else {
                continue;
            };
            let Ok(transform) = world.get::<Transform>(entity) else {
                log::warn!("Waypoint {entity:?} has no transform, skipping");
                continue;
            };

            let id = pattern.add_with_wait(transform.position, waypoint.wait_time);
            ids.insert(entity, id);
            if let Some(next) = waypoint.next {
                links.push((id, next));
            }
        }

        for (from, next) in links {
            match ids.get(&next) {
                Some(&to) => pattern.elements[from.0].next = to,
                None => log::warn!("Waypoint {next:?} is not part of pattern {root:?}"),
            }
        }

        pattern.maintain();

        if pattern.is_empty() {
            log::error!("No elements in pattern {root:?}");
        } else {
            log::info!("Pattern built: {} elements", pattern.len());
        }

        pattern
    }

    /// Append an element with the default wait time. Its `next` is itself.
    pub fn add(&mut self, position: Vec3) -> ElementId {
        self.add_with_wait(position, DEFAULT_WAIT_TIME)
    }

    /// Append an element. Its `next` is itself.
    pub fn add_with_wait(&mut self, position: Vec3, wait_time: f32) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(PatternElement {
            position,
            wait_time,
            next: id,
            previous: None,
        });
        id
    }

    /// Point `from` at `to`.
    ///
    /// `previous` links are refreshed by the next [`MovementPattern::maintain`].
    pub fn link(&mut self, from: ElementId, to: ElementId) -> Result<(), AiError> {
        self.check(to)?;
        self.element_mut(from)?.next = to;
        Ok(())
    }

    /// Turn `id` into a dead end
    pub fn unlink(&mut self, id: ElementId) -> Result<(), AiError> {
        self.element_mut(id)?.next = id;
        Ok(())
    }

    /// Change how long AIs dwell at `id`
    pub fn set_wait_time(&mut self, id: ElementId, wait_time: f32) -> Result<(), AiError> {
        self.element_mut(id)?.wait_time = wait_time;
        Ok(())
    }

    /// Consistency pass over `previous` links.
    ///
    /// First clears every `previous` that no longer points at an element
    /// whose `next` is this one, then sets `next.previous` for every element
    /// whose `next` points away from itself. When several elements point at
    /// the same one, the last in arena order wins.
    pub fn maintain(&mut self) {
        for index in 0..self.elements.len() {
            if let Some(previous) = self.elements[index].previous {
                let stale = previous.0 == index
                    || self
                        .elements
                        .get(previous.0)
                        .is_none_or(|p| p.next.0 != index);
                if stale {
                    self.elements[index].previous = None;
                }
            }
        }

        for index in 0..self.elements.len() {
            let next = self.elements[index].next;
            if next.0 != index {
                self.elements[next.0].previous = Some(ElementId(index));
            }
        }
    }

    /// Element nearest to `position`; the first one wins ties.
    #[must_use]
    pub fn nearest(&self, position: Vec3) -> Option<ElementId> {
        let mut closest: Option<(ElementId, f32)> = None;
        for (id, element) in self.iter() {
            let distance = (element.position - position).length_squared();
            if closest.is_none_or(|(_, shortest)| distance < shortest) {
                closest = Some((id, distance));
            }
        }
        closest.map(|(id, _)| id)
    }

    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&PatternElement> {
        self.elements.get(id.0)
    }

    #[must_use]
    pub fn next_of(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).map(PatternElement::next)
    }

    #[must_use]
    pub fn previous_of(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(PatternElement::previous)
    }

    /// Whether `id`'s `next` is itself
    #[must_use]
    pub fn is_dead_end(&self, id: ElementId) -> bool {
        self.next_of(id) == Some(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &PatternElement)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(index, element)| (ElementId(index), element))
    }

    fn check(&self, id: ElementId) -> Result<(), AiError> {
        if id.0 < self.elements.len() {
            Ok(())
        } else {
            Err(AiError::UnknownElement(id))
        }
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut PatternElement, AiError> {
        self.elements.get_mut(id.0).ok_or(AiError::UnknownElement(id))
    }
}

/// Movement pattern whose container is nearest to `position`.
///
/// Containers without a transform are measured from the origin. The first
/// pattern in query order wins ties.
pub fn nearest_pattern(world: &World, position: Vec3) -> Option<Entity> {
    let mut closest: Option<(Entity, f32)> = None;
    for (entity, (_, transform)) in world
        .query::<(&MovementPattern, Option<&Transform>)>()
        .iter()
    {
        let origin = transform.map_or(Vec3::ZERO, |t| t.position);
        let distance = (origin - position).length_squared();
        if closest.is_none_or(|(_, shortest)| distance < shortest) {
            closest = Some((entity, distance));
        }
    }
    closest.map(|(entity, _)| entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(count: usize) -> (MovementPattern, Vec<ElementId>) {
        let mut pattern = MovementPattern::new();
        let ids: Vec<_> = (0..count)
            .map(|i| pattern.add(Vec3::new(i as f32 * 5.0, 0.0, 0.0)))
            .collect();
        for pair in ids.windows(2) {
            pattern.link(pair[0], pair[1]).unwrap();
        }
        pattern.maintain();
        (pattern, ids)
    }

    #[test]
    fn test_new_element_is_self_loop() {
        let mut pattern = MovementPattern::new();
        let a = pattern.add(Vec3::ZERO);

        assert_eq!(pattern.next_of(a), Some(a));
        assert!(pattern.is_dead_end(a));
        assert_eq!(pattern.get(a).unwrap().wait_time, DEFAULT_WAIT_TIME);

        pattern.maintain();
        assert_eq!(pattern.previous_of(a), None);
    }

    #[test]
    fn test_maintain_sets_previous() {
        let (pattern, ids) = line(3);

        assert_eq!(pattern.previous_of(ids[0]), None);
        assert_eq!(pattern.previous_of(ids[1]), Some(ids[0]));
        assert_eq!(pattern.previous_of(ids[2]), Some(ids[1]));
        assert!(pattern.is_dead_end(ids[2]));
    }

    #[test]
    fn test_maintain_clears_stale_previous() {
        let (mut pattern, ids) = line(3);

        // a now skips b
        pattern.link(ids[0], ids[2]).unwrap();
        pattern.maintain();

        assert_eq!(pattern.previous_of(ids[1]), None);
        // b -> c was processed after a -> c
        assert_eq!(pattern.previous_of(ids[2]), Some(ids[1]));

        pattern.unlink(ids[1]).unwrap();
        pattern.maintain();
        assert_eq!(pattern.previous_of(ids[2]), Some(ids[0]));
    }

    #[test]
    fn test_cycle_keeps_previous() {
        let (mut pattern, ids) = line(3);
        pattern.link(ids[2], ids[0]).unwrap();
        pattern.maintain();

        assert_eq!(pattern.previous_of(ids[0]), Some(ids[2]));
        assert!(!pattern.is_dead_end(ids[2]));
    }

    #[test]
    fn test_link_rejects_unknown_element() {
        let (mut pattern, ids) = line(2);
        let missing = ElementId(7);

        assert_eq!(
            pattern.link(ids[0], missing),
            Err(AiError::UnknownElement(missing))
        );
        assert_eq!(
            pattern.set_wait_time(missing, 2.0),
            Err(AiError::UnknownElement(missing))
        );
    }

    #[test]
    fn test_nearest_element() {
        let mut pattern = MovementPattern::new();
        let origin = pattern.add(Vec3::new(0.0, 0.0, 0.0));
        pattern.add(Vec3::new(5.0, 0.0, 0.0));
        pattern.add(Vec3::new(1.0, 0.0, 0.0));

        assert_eq!(pattern.nearest(Vec3::ZERO), Some(origin));
    }

    #[test]
    fn test_nearest_element_tie_prefers_first() {
        let mut pattern = MovementPattern::new();
        let left = pattern.add(Vec3::new(-1.0, 0.0, 0.0));
        pattern.add(Vec3::new(1.0, 0.0, 0.0));

        assert_eq!(pattern.nearest(Vec3::ZERO), Some(left));
        assert_eq!(MovementPattern::new().nearest(Vec3::ZERO), None);
    }

    #[test]
    fn test_collect_from_hierarchy() {
        let mut world = World::new();
        let root = world.spawn((Transform::default(),));
        let c = world.spawn((Transform::from_xyz(10.0, 0.0, 0.0), Waypoint::new()));
        let b = world.spawn((
            Transform::from_xyz(5.0, 0.0, 0.0),
            Waypoint::new().with_next(c),
        ));
        let a = world.spawn((
            Transform::from_xyz(0.0, 0.0, 0.0),
            Waypoint::new().with_wait_time(2.0).with_next(b),
        ));
        let decoration = world.spawn((Transform::default(),));

        world.add_child(root, a).unwrap();
        world.add_child(root, decoration).unwrap();
        world.add_child(a, b).unwrap();
        world.add_child(b, c).unwrap();

        let pattern = MovementPattern::collect(&world, root);
        assert_eq!(pattern.len(), 3);

        let ids: Vec<_> = pattern.iter().map(|(id, _)| id).collect();
        assert_eq!(pattern.get(ids[0]).unwrap().wait_time, 2.0);
        assert_eq!(pattern.next_of(ids[0]), Some(ids[1]));
        assert_eq!(pattern.next_of(ids[1]), Some(ids[2]));
        assert!(pattern.is_dead_end(ids[2]));
        assert_eq!(pattern.previous_of(ids[2]), Some(ids[1]));
    }

    #[test]
    fn test_collect_unknown_next_is_self_loop() {
        let mut world = World::new();
        let outsider = world.spawn((Transform::default(), Waypoint::new()));
        let root = world.spawn((
            Transform::default(),
            Waypoint::new().with_next(outsider),
        ));

        let pattern = MovementPattern::collect(&world, root);
        assert_eq!(pattern.len(), 1);
        assert!(pattern.is_dead_end(ElementId(0)));
    }

    #[test]
    fn test_collect_empty() {
        let mut world = World::new();
        let root = world.spawn((Transform::default(),));

        assert!(MovementPattern::collect(&world, root).is_empty());
    }

    #[test]
    fn test_nearest_pattern() {
        let mut world = World::new();
        assert_eq!(nearest_pattern(&world, Vec3::ZERO), None);

        let far = world.spawn((Transform::from_xyz(50.0, 0.0, 0.0), MovementPattern::new()));
        let near = world.spawn((Transform::from_xyz(2.0, 0.0, 0.0), MovementPattern::new()));

        assert_eq!(nearest_pattern(&world, Vec3::ZERO), Some(near));
        assert_eq!(nearest_pattern(&world, Vec3::new(45.0, 0.0, 0.0)), Some(far));
    }
}
