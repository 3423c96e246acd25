//! Application trait and lifecycle management

use crate::ecs::{EntityError, EntitySystem};
use crate::engine::{Engine, EngineError};
use crate::render::DrawDevice;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to put game logic on top of the engine. The engine
/// calls it between the entity passes of every frame.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once after the engine is initialized. Use this to spawn the
    /// initial entities and attach their behaviors.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame after the think pass and before the update pass, so
    /// changes made here are integrated in the same frame.
    ///
    /// # Arguments
    /// * `entities` - The engine's entity pool
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, entities: &mut EntitySystem, delta_time: f32) -> Result<(), AppError>;

    /// Custom rendering after every entity has been drawn
    fn render(&mut self, _device: &mut dyn DrawDevice) -> Result<(), AppError> {
        Ok(())
    }

    /// Checked after each frame; returning `true` ends the main loop
    fn should_quit(&self) -> bool {
        false
    }

    /// Cleanup the application
    ///
    /// Called when the application is shutting down, before the entity pool
    /// is released.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Entity system error
    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),

    /// Game logic error
    #[error("Game logic error: {0}")]
    GameLogic(String),
}
