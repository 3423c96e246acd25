//! Draw submission interface used by the entity system
//!
//! The renderer should be a passive library: it receives pre-computed entity
//! data and draws it. It never owns or mutates entities.

use crate::ecs::{Entity, EntityState, EntityType};
use crate::foundation::math::Vec3;

/// Data for the default visualization of one entity
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDrawCommand {
    /// Allocation id of the entity
    pub id: u64,
    /// World-space position
    pub position: Vec3,
    /// Classification tag
    pub entity_type: EntityType,
    /// Behavioral state tag
    pub state: EntityState,
}

impl EntityDrawCommand {
    /// Build the default draw command for an entity
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            id: entity.id(),
            position: entity.position,
            entity_type: entity.entity_type,
            state: entity.state,
        }
    }
}

/// Opaque render submission interface
pub trait DrawDevice {
    /// Default render of one entity; called exactly once per entity per draw
    fn draw_entity(&mut self, command: &EntityDrawCommand);

    /// Extra marker submitted by custom draw hooks
    fn draw_marker(&mut self, _position: Vec3, _label: &str) {}
}

/// One recorded submission
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// A default entity draw
    Entity(EntityDrawCommand),
    /// A marker from a custom draw hook
    Marker {
        /// Marker position
        position: Vec3,
        /// Marker label
        label: String,
    },
}

/// In-memory draw device that records every submission in order.
///
/// Used for headless runs and tests.
#[derive(Debug, Default)]
pub struct DrawRecorder {
    /// Recorded calls, oldest first
    pub calls: Vec<DrawCall>,
}

impl DrawRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of every entity drawn, in submission order
    pub fn entity_ids(&self) -> Vec<u64> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Entity(command) => Some(command.id),
                DrawCall::Marker { .. } => None,
            })
            .collect()
    }

    /// Number of recorded calls
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl DrawDevice for DrawRecorder {
    fn draw_entity(&mut self, command: &EntityDrawCommand) {
        self.calls.push(DrawCall::Entity(command.clone()));
    }

    fn draw_marker(&mut self, position: Vec3, label: &str) {
        self.calls.push(DrawCall::Marker {
            position,
            label: label.to_string(),
        });
    }
}
