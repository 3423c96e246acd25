//! Game behaviors for the demo: a trick-performing player, bots that chase it
//! and projectiles the bots throw.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use stunt_engine::prelude::*;

/// Frames a trick takes from start to landing
const TRICK_FRAMES: u32 = 3;

/// Trick results shared between the player's hooks and the game loop
#[derive(Debug, Default)]
pub struct TrickStats {
    pub landed: u32,
    pub bailed: u32,
}

/// Player runs forward and attempts a trick every `trick_every` frames
pub struct PlayerBehavior {
    frame: u32,
    trick_every: u32,
    trick_frames: u32,
    stats: Rc<RefCell<TrickStats>>,
}

impl PlayerBehavior {
    pub fn new(trick_every: u32, stats: Rc<RefCell<TrickStats>>) -> Self {
        Self {
            frame: 0,
            trick_every: trick_every.max(1),
            trick_frames: 0,
            stats,
        }
    }
}

impl Behavior for PlayerBehavior {
    fn think(&mut self, entity: &mut Entity) {
        self.frame += 1;
        match entity.state {
            EntityState::Idle => {
                entity.acceleration = Vec3::new(0.0, 0.0, 0.05);
                entity.state = EntityState::Moving;
            }
            EntityState::Moving if self.frame % self.trick_every == 0 => {
                entity.state = EntityState::TrickStart;
            }
            EntityState::TrickStart => {
                entity.state = EntityState::Trick;
                self.trick_frames = 0;
            }
            EntityState::Trick => {
                self.trick_frames += 1;
                if self.trick_frames >= TRICK_FRAMES {
                    // Landing needs enough speed and spare power
                    entity.state = if entity.speed > 0.2 && entity.power_ability > 0 {
                        EntityState::TrickSucc
                    } else {
                        EntityState::TrickFail
                    };
                }
            }
            EntityState::TrickSucc => {
                self.stats.borrow_mut().landed += 1;
                entity.power_ability += 1;
                entity.state = EntityState::Moving;
            }
            EntityState::TrickFail => {
                self.stats.borrow_mut().bailed += 1;
                entity.power_ability = (entity.power_ability - 1).max(0);
                entity.velocity *= 0.5;
                entity.state = EntityState::Moving;
            }
            _ => {}
        }
    }

    fn draw(&mut self, entity: &Entity, device: &mut dyn DrawDevice) {
        if entity.state.is_trick() {
            device.draw_marker(entity.position, "trick");
        }
    }

    fn damage(&mut self, entity: &mut Entity, damage: &Damage) -> i32 {
        if entity.state.is_trick() {
            // Mid-trick hits knock the player out of the trick
            entity.state = EntityState::TrickFail;
        }
        if entity.apply_damage(damage.amount) {
            self.die(entity);
        }
        entity.health
    }

    fn die(&mut self, entity: &mut Entity) {
        log::info!("Player {} wiped out", entity.id());
        entity.state = EntityState::Inactive;
    }
}

/// Bot steering towards the player's last known position
pub struct BotBehavior {
    target: Rc<Cell<Vec3>>,
}

impl BotBehavior {
    pub fn new(target: Rc<Cell<Vec3>>) -> Self {
        Self { target }
    }
}

impl Behavior for BotBehavior {
    fn think(&mut self, entity: &mut Entity) {
        let to_target = self.target.get() - entity.position;
        entity.acceleration = if to_target.magnitude() > 0.01 {
            to_target.normalize() * 0.1
        } else {
            Vec3::zeros()
        };
        entity.state = EntityState::Moving;
    }

    fn damage(&mut self, entity: &mut Entity, damage: &Damage) -> i32 {
        if entity.apply_damage(damage.amount) {
            self.die(entity);
        }
        entity.health
    }

    fn die(&mut self, entity: &mut Entity) {
        log::info!("Bot {} destroyed", entity.id());
        entity.state = EntityState::Inactive;
    }

    fn free(&mut self, entity: &mut Entity) -> Result<(), BehaviorError> {
        log::debug!("Bot {} returned to the pool", entity.id());
        Ok(())
    }
}

/// Projectile that expires after a fixed number of frames.
///
/// Its `power_ability` is the damage it deals on contact.
pub struct ProjectileBehavior {
    frames_left: u32,
}

impl ProjectileBehavior {
    pub fn new(lifetime: u32) -> Self {
        Self {
            frames_left: lifetime,
        }
    }
}

impl Behavior for ProjectileBehavior {
    fn update(&mut self, entity: &mut Entity) {
        self.frames_left = self.frames_left.saturating_sub(1);
        if self.frames_left == 0 {
            entity.dead = true;
        }
    }

    fn touch(&mut self, entity: &mut Entity, other: &mut Entity) -> i32 {
        if entity.dead || other.entity_type != EntityType::Player {
            return 0;
        }
        entity.dead = true;
        entity.power_ability
    }
}
