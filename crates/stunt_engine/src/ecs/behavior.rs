//! Per-entity behavior hooks
//!
//! Game logic attaches one [`Behavior`] object to an entity after allocation.
//! Every hook has a no-op default, so implementors only override what they use
//! and an entity without a behavior simply has no hooks.

use thiserror::Error;

use super::{Entity, EntityHandle};
use crate::render::DrawDevice;

/// Error a hook may report. The pool logs it and carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BehaviorError {
    /// Free-form failure description
    #[error("behavior error: {0}")]
    Custom(String),
}

/// One damage event as seen by the target's `damage` hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Damage {
    /// Amount of damage dealt
    pub amount: i32,
    /// The entity that physically caused the damage (a projectile, say)
    pub inflictor: Option<EntityHandle>,
    /// The entity credited with the damage
    pub attacker: Option<EntityHandle>,
}

impl Damage {
    /// Who gets credit for the hit
    pub const fn source(&self) -> Option<EntityHandle> {
        self.attacker
    }
}

/// Polymorphic hooks invoked by the entity system with the owning entity as receiver.
pub trait Behavior {
    /// Called before the update pass to make decisions or handle input
    fn think(&mut self, _entity: &mut Entity) {}

    /// Called after the system has integrated the entity's motion
    fn update(&mut self, _entity: &mut Entity) {}

    /// Called after the default draw for custom effects
    fn draw(&mut self, _entity: &Entity, _device: &mut dyn DrawDevice) {}

    /// Called when this entity touches `other`; returns an application-defined code
    fn touch(&mut self, _entity: &mut Entity, _other: &mut Entity) -> i32 {
        0
    }

    /// Called when this entity takes damage; returns an application-defined code
    fn damage(&mut self, _entity: &mut Entity, _damage: &Damage) -> i32 {
        0
    }

    /// Called when this entity dies
    fn die(&mut self, _entity: &mut Entity) {}

    /// Called when the entity is freed, before its slot is cleared
    fn free(&mut self, _entity: &mut Entity) -> Result<(), BehaviorError> {
        Ok(())
    }
}
