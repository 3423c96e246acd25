//! Entity system
//!
//! A fixed-capacity pool of game objects with per-entity behavior hooks and
//! the per-frame passes that drive them.

pub mod entity;
pub mod behavior;
pub mod error;
pub mod pool;
mod dispatch;

#[cfg(test)]
mod tests;

pub use entity::{Entity, EntityHandle, EntityState, EntityType};
pub use behavior::{Behavior, BehaviorError, Damage};
pub use error::EntityError;
pub use pool::EntitySystem;
