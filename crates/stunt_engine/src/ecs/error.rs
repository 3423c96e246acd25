//! Entity system errors

use thiserror::Error;

use super::EntityHandle;

/// Errors reported by the entity pool and dispatcher
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    /// An operation ran before `start` or after `shutdown`
    #[error("entity system is not initialized")]
    NotInitialized,

    /// Every slot is occupied
    #[error("entity pool exhausted ({capacity} slots in use)")]
    PoolExhausted {
        /// Configured pool capacity
        capacity: usize,
    },

    /// The handle's entity has been freed (its slot may hold a newer entity)
    #[error("stale entity handle {handle}")]
    StaleHandle {
        /// The rejected handle
        handle: EntityHandle,
    },

    /// `start` was asked for zero slots
    #[error("entity pool capacity must be at least 1")]
    InvalidCapacity,

    /// The same entity was passed for both sides of an interaction
    #[error("entity {handle} cannot interact with itself")]
    AliasedHandles {
        /// The duplicated handle
        handle: EntityHandle,
    },
}

impl EntityError {
    /// Whether the caller can carry on (retry next frame, drop the request)
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::PoolExhausted { .. } | Self::StaleHandle { .. })
    }
}
