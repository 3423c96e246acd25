//! Configuration system
//!
//! Engine settings are plain serde structures that can be loaded from and saved
//! to TOML or RON files. Every structure has sensible defaults so partial files
//! are accepted.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value was read successfully but is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Entity pool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    /// Number of slots reserved when the pool starts
    pub max_entities: u32,
    /// Integration step applied by the update pass.
    ///
    /// `1.0` advances velocity and position by one whole unit per frame.
    pub time_step: f32,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            max_entities: 1024,
            time_step: 1.0,
        }
    }
}

/// Presentation preferences handed to swapchain negotiation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapchainConfig {
    /// Requested surface width in pixels
    pub width: u32,
    /// Requested surface height in pixels
    pub height: u32,
    /// Prefer MAILBOX presentation over FIFO when the surface offers it
    pub prefer_mailbox: bool,
}

impl Default for SwapchainConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 700,
            prefer_mailbox: true,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Entity pool settings
    pub entities: EntityConfig,
    /// Presentation settings
    pub swapchain: SwapchainConfig,
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entities.max_entities == 0 {
            return Err(ConfigError::Invalid("entities.max_entities must be at least 1".into()));
        }
        let step = self.entities.time_step;
        if !step.is_finite() || step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "entities.time_step must be a positive finite number, got {step}"
            )));
        }
        if self.swapchain.width == 0 || self.swapchain.height == 0 {
            return Err(ConfigError::Invalid("swapchain extent must be non-zero".into()));
        }
        Ok(())
    }
}
