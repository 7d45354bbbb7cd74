//! Common ECS components

use glam::Vec3;

/// World-space placement of an entity.
///
/// Patrol data and pawns live in a flat scene: positions are not propagated
/// through the hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub position: Vec3,
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self { position }
    }

    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self::from_position(Vec3::new(x, y, z))
    }
}

/// Name component for debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
