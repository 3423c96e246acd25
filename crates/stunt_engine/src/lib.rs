//! # Stunt Engine
//!
//! A small 3D game engine core built around a fixed-capacity entity pool.
//!
//! ## Features
//!
//! - **Entity Pool**: Fixed-capacity storage with generation-checked handles
//! - **Behavior Hooks**: Per-entity think/update/draw/touch/damage/die/free callbacks
//! - **Frame Dispatch**: Think, update (integration + reaping) and draw passes
//! - **Swapchain Policy**: Surface format, present mode and extent negotiation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stunt_engine::prelude::*;
//!
//! struct Rocket;
//!
//! impl Behavior for Rocket {
//!     fn think(&mut self, entity: &mut Entity) {
//!         entity.acceleration = Vec3::new(0.0, 0.0, 0.1);
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut entities = EntitySystem::with_capacity(64)?;
//!     let rocket = entities.new_entity()?;
//!     entities.get_mut(rocket)?.entity_type = EntityType::Weapon;
//!     entities.set_behavior(rocket, Box::new(Rocket))?;
//!
//!     let mut device = DrawRecorder::new();
//!     entities.think_all()?;
//!     entities.update_all()?;
//!     entities.draw_all(&mut device)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod ecs;
pub mod render;

mod application;
mod engine;

pub use application::{Application, AppError};
pub use engine::{Engine, EngineError, FrameSurface};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Application, AppError,
        Engine, EngineError, FrameSurface,
        config::{Config, ConfigError, EngineConfig, EntityConfig, SwapchainConfig},
        ecs::{
            Behavior, BehaviorError, Damage, Entity, EntityError, EntityHandle, EntityState,
            EntitySystem, EntityType,
        },
        foundation::math::Vec3,
        render::{DrawDevice, DrawRecorder, EntityDrawCommand},
    };
}
