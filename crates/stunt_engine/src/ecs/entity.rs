//! Entity records and handles
//!
//! An [`Entity`] is plain gameplay data. Game logic reads and writes its fields
//! directly; the pool only owns the slot the record lives in. Entities are
//! addressed through [`EntityHandle`], which pairs the slot index with the
//! allocation id so a handle kept past `free_entity` can never alias the next
//! occupant of the slot.

use std::fmt;

use crate::foundation::math::{utils, Vec3};

/// Behavioral state tag owned by game logic.
///
/// The pool stores the current tag but never validates transitions. The
/// conventional flow is `Idle -> Moving -> TrickStart -> Trick -> {TrickSucc, TrickFail}`
/// and back to `Idle`/`Moving`; `Inactive` entities are skipped by game logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntityState {
    /// Standing still
    #[default]
    Idle,
    /// Moving under its own velocity
    Moving,
    /// Excluded from active simulation by game logic
    Inactive,
    /// Trick input received, not yet committed
    TrickStart,
    /// In the process of performing a trick
    Trick,
    /// Trick failed
    TrickFail,
    /// Trick succeeded
    TrickSucc,
}

impl EntityState {
    /// True for every state that belongs to a trick sequence
    pub const fn is_trick(self) -> bool {
        matches!(self, Self::TrickStart | Self::Trick | Self::TrickFail | Self::TrickSucc)
    }

    /// True unless the entity has been parked as `Inactive`
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Inactive)
    }
}

/// Classification used by game logic for dispatch and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntityType {
    /// Computer-controlled opponent
    #[default]
    Bot,
    /// Player-controlled entity
    Player,
    /// Projectile or other weapon object
    Weapon,
}

/// Generation-checked reference to one allocation in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    index: u32,
    id: u64,
}

impl EntityHandle {
    pub(crate) const fn new(index: u32, id: u64) -> Self {
        Self { index, id }
    }

    /// Slot index inside the pool
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Allocation id of the entity this handle was issued for
    pub const fn id(self) -> u64 {
        self.id
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.index, self.id)
    }
}

/// A game object record.
///
/// `Entity::default()` is the canonical empty value a slot is reset to on
/// allocation and release: zero vectors and attributes, `Idle`, `Bot`, not dead.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    id: u64,

    /// Behavioral state tag
    pub state: EntityState,
    /// Classification
    pub entity_type: EntityType,

    /// Position of the entity
    pub position: Vec3,
    /// Movement direction and magnitude
    pub velocity: Vec3,
    /// Change in velocity applied each update
    pub acceleration: Vec3,

    /// Speed limit enforced by integration (0 = no limit)
    pub max_speed: f32,
    /// Magnitude of `velocity` after the last update
    pub speed: f32,
    /// Amount of "power chunks" held (players and bots)
    pub power_ability: i32,
    /// Current health
    pub health: i32,
    /// Health ceiling
    pub max_health: i32,

    /// When true, the next update pass frees the entity
    pub dead: bool,
}

impl Entity {
    pub(crate) fn with_id(id: u64) -> Self {
        Self { id, ..Self::default() }
    }

    /// Allocation id; unique across every allocation made by one pool
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Subtract `amount` from health, clamping at zero.
    ///
    /// Marks the entity dead once health reaches zero and returns `true` only on
    /// the call that killed it. Negative amounts heal up to `max_health` when a
    /// ceiling is set.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if self.dead {
            return false;
        }
        let mut health = self.health.saturating_sub(amount).max(0);
        if amount < 0 && self.max_health > 0 {
            health = health.min(self.max_health);
        }
        self.health = health;
        if self.health == 0 {
            self.dead = true;
            return true;
        }
        false
    }

    /// Explicit Euler step: acceleration into velocity, velocity into position
    pub fn integrate(&mut self, time_step: f32) {
        self.velocity += self.acceleration * time_step;
        self.velocity = utils::clamp_magnitude(self.velocity, self.max_speed);
        self.speed = self.velocity.magnitude();
        self.position += self.velocity * time_step;
    }
}
