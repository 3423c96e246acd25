//! Multi-step scenarios covering allocation, combat and reaping together

use crate::ecs::{Behavior, Damage, Entity, EntityError, EntitySystem, EntityType};
use crate::foundation::math::Vec3;
use crate::render::DrawRecorder;

/// Subtracts damage from health and flags death at zero
struct Fragile;

impl Behavior for Fragile {
    fn damage(&mut self, entity: &mut Entity, damage: &Damage) -> i32 {
        entity.health -= damage.amount;
        if entity.health <= 0 {
            entity.health = 0;
            entity.dead = true;
        }
        entity.health
    }
}

#[test]
fn test_two_slot_pool_lifecycle() {
    let mut system = EntitySystem::with_capacity(2).unwrap();

    let a = system.new_entity().unwrap();
    let b = system.new_entity().unwrap();
    assert_eq!(
        system.new_entity(),
        Err(EntityError::PoolExhausted { capacity: 2 })
    );

    system.get_mut(a).unwrap().health = 99;
    system.free_entity(a).unwrap();
    let d = system.new_entity().unwrap();
    assert_eq!(d.index(), a.index());
    assert_eq!(system.get(d).unwrap().health, 0);
    assert!(!system.get(d).unwrap().dead);

    system.get_mut(b).unwrap().health = 10;
    system.set_behavior(b, Box::new(Fragile)).unwrap();
    assert_eq!(system.entity_damage(Some(b), None, None, 10), Ok(0));
    assert_eq!(system.get(b).unwrap().health, 0);
    assert!(system.get(b).unwrap().dead);

    system.update_all().unwrap();
    assert!(!system.is_alive(b));
    assert!(system.is_alive(d));

    let e = system.new_entity().unwrap();
    assert_eq!(e.index(), b.index());
    assert_eq!(system.len(), 2);
}

/// Fires a projectile-like velocity change once it has thought `ready_after` times
struct Skater {
    thoughts: u32,
    ready_after: u32,
}

impl Behavior for Skater {
    fn think(&mut self, entity: &mut Entity) {
        self.thoughts += 1;
        if self.thoughts == self.ready_after {
            entity.acceleration = Vec3::new(0.0, 0.0, 1.0);
        }
    }

    fn update(&mut self, entity: &mut Entity) {
        if entity.speed > 0.0 {
            entity.state = crate::ecs::EntityState::Moving;
        }
    }
}

#[test]
fn test_think_decisions_applied_by_same_frame_update() {
    let mut system = EntitySystem::with_capacity(4).unwrap();
    let player = system.new_entity().unwrap();
    system.get_mut(player).unwrap().entity_type = EntityType::Player;
    system
        .set_behavior(player, Box::new(Skater { thoughts: 0, ready_after: 2 }))
        .unwrap();
    let mut recorder = DrawRecorder::new();

    for _ in 0..3 {
        system.think_all().unwrap();
        system.update_all().unwrap();
        system.draw_all(&mut recorder).unwrap();
    }

    let entity = system.get(player).unwrap();
    // Frame 2 sets acceleration and integrates it; frame 3 integrates again
    assert_eq!(entity.velocity, Vec3::new(0.0, 0.0, 2.0));
    assert_eq!(entity.position, Vec3::new(0.0, 0.0, 3.0));
    assert_eq!(entity.state, crate::ecs::EntityState::Moving);
    assert_eq!(recorder.entity_ids(), vec![player.id(); 3]);
}

#[test]
fn test_ids_strictly_increase_across_reuse_and_restart() {
    let mut system = EntitySystem::with_capacity(1).unwrap();
    let mut last = 0;
    for _ in 0..5 {
        let handle = system.new_entity().unwrap();
        assert!(handle.id() > last);
        last = handle.id();
        system.free_entity(handle).unwrap();
    }

    system.start(1).unwrap();
    let handle = system.new_entity().unwrap();
    assert!(handle.id() > last);
}
