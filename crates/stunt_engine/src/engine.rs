//! Core engine implementation

use crate::{
    application::Application,
    config::EngineConfig,
    ecs::{EntityError, EntitySystem},
    foundation::time::Timer,
    render::DrawDevice,
};
use thiserror::Error;

/// Presentable surface handed to the engine by the windowing/swapchain layer.
///
/// The engine only needs to acquire an image, draw into it through the
/// [`DrawDevice`] half of the trait and present it.
pub trait FrameSurface: DrawDevice {
    /// Acquire the next swap image, returning its index
    fn acquire_frame(&mut self) -> Result<u32, String>;

    /// Present a previously acquired image
    fn present_frame(&mut self, image_index: u32) -> Result<(), String>;
}

/// Main engine struct
///
/// The engine owns the entity pool and drives the fixed per-frame order:
/// think, application update, update, draw.
pub struct Engine {
    /// Entity pool
    pub entities: EntitySystem,

    /// Frame timing
    timer: Timer,

    /// Engine configuration
    config: EngineConfig,

    /// Whether the engine should continue running
    running: bool,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");

        config
            .validate()
            .map_err(|e| EngineError::ConfigError(e.to_string()))?;

        let mut entities = EntitySystem::new();
        entities
            .start(config.entities.max_entities)
            .map_err(|e| EngineError::InitializationFailed(format!("Entity system: {e}")))?;
        entities.set_time_step(config.entities.time_step);

        Ok(Self {
            entities,
            timer: Timer::new(),
            config,
            running: true,
        })
    }

    /// Run one frame
    pub fn frame<A: Application, S: FrameSurface>(
        &mut self,
        app: &mut A,
        surface: &mut S,
    ) -> Result<(), EngineError> {
        self.timer.update();
        let delta_time = self.timer.delta_time();

        let image_index = surface.acquire_frame().map_err(EngineError::SurfaceError)?;

        self.entities.think_all()?;
        app.update(&mut self.entities, delta_time)
            .map_err(|e| EngineError::ApplicationError(format!("App update: {e}")))?;
        self.entities.update_all()?;
        self.entities.draw_all(surface)?;
        app.render(surface)
            .map_err(|e| EngineError::ApplicationError(format!("App render: {e}")))?;

        surface
            .present_frame(image_index)
            .map_err(EngineError::SurfaceError)?;

        if app.should_quit() {
            self.quit();
        }
        Ok(())
    }

    /// Run the main loop until the application quits or `max_frames` frames ran.
    ///
    /// Returns the number of frames run. The application is cleaned up and the
    /// entity pool shut down afterwards whether or not initialization or the
    /// loop ended in an error.
    pub fn run<A: Application, S: FrameSurface>(
        &mut self,
        app: &mut A,
        surface: &mut S,
        max_frames: Option<u64>,
    ) -> Result<u64, EngineError> {
        if let Err(e) = app.initialize(self) {
            log::error!("Application failed to initialize: {e}");
            app.cleanup(self);
            self.entities.shutdown();
            return Err(EngineError::ApplicationError(format!("App initialization: {e}")));
        }

        log::info!("Starting main loop...");
        let mut frames = 0;
        let mut result = Ok(());
        while self.running && max_frames.map_or(true, |max| frames < max) {
            result = self.frame(app, surface);
            if result.is_err() {
                break;
            }
            frames += 1;
        }

        app.cleanup(self);
        self.entities.shutdown();

        match result {
            Ok(()) => {
                log::info!("Engine shutdown complete after {frames} frames");
                Ok(frames)
            }
            Err(e) => {
                log::error!("Main loop stopped after {frames} frames: {e}");
                Err(e)
            }
        }
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the main loop should keep going
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Engine configuration
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the current frame delta time
    pub fn delta_time(&self) -> f32 {
        self.timer.delta_time()
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.timer.frame_count()
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Initialization error
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Entity system error
    #[error("Entity system error: {0}")]
    Entity(#[from] EntityError),

    /// Surface acquire/present error
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
