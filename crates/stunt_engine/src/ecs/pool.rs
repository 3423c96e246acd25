//! Fixed-capacity entity pool
//!
//! The pool reserves every slot up front in `start` and never grows. Allocation
//! is a linear scan for the first free slot, which is cheap at the entity counts
//! a game frame deals with (tens to low hundreds) and keeps iteration order equal
//! to slot order.
//!
//! Each allocation receives an id from a pool-wide counter that never repeats,
//! including across `start`/`shutdown`. Handles carry that id, so a handle that
//! outlived its entity is rejected instead of reaching the slot's next occupant.

use super::{Behavior, Entity, EntityError, EntityHandle, EntityType};
use crate::render::{DrawDevice, EntityDrawCommand};

/// One storage location: free, or holding exactly one live entity
#[derive(Default)]
pub(crate) struct Slot {
    pub(crate) entity: Entity,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
    pub(crate) in_use: bool,
}

/// Owner of all entity storage
pub struct EntitySystem {
    pub(crate) slots: Vec<Slot>,
    started: bool,
    next_id: u64,
    live: usize,
    pub(crate) time_step: f32,
}

impl Default for EntitySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl EntitySystem {
    /// Create an uninitialized system; call [`start`](Self::start) before use
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            started: false,
            next_id: 1,
            live: 0,
            time_step: 1.0,
        }
    }

    /// Create a system and start it with `max_entities` slots
    pub fn with_capacity(max_entities: u32) -> Result<Self, EntityError> {
        let mut system = Self::new();
        system.start(max_entities)?;
        Ok(system)
    }

    /// Allocate storage for up to `max_entities` entities, all initially free.
    ///
    /// Starting a running system shuts it down first, so every live entity is
    /// freed (running its `free` hook) and every outstanding handle goes stale.
    pub fn start(&mut self, max_entities: u32) -> Result<(), EntityError> {
        if max_entities == 0 {
            return Err(EntityError::InvalidCapacity);
        }
        if self.started {
            log::info!("Restarting entity system; invalidating {} live entities", self.live);
            self.shutdown();
        }

        self.slots = std::iter::repeat_with(Slot::default)
            .take(max_entities as usize)
            .collect();
        self.live = 0;
        self.started = true;
        log::info!("Entity system started with {max_entities} slots");
        Ok(())
    }

    /// Free every live entity and release storage
    pub fn shutdown(&mut self) {
        if !self.started {
            return;
        }
        for index in 0..self.slots.len() {
            if self.slots[index].in_use {
                self.release_slot(index);
            }
        }
        self.slots = Vec::new();
        self.started = false;
        log::info!("Entity system shut down");
    }

    /// Whether `start` has been called (and `shutdown` has not)
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live entities
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Whether no entity is live
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Integration step used by the update pass
    pub const fn time_step(&self) -> f32 {
        self.time_step
    }

    /// Change the integration step used by the update pass
    pub fn set_time_step(&mut self, time_step: f32) {
        self.time_step = time_step;
    }

    /// Claim the first free slot and reset it to a fresh entity.
    ///
    /// Returns [`EntityError::PoolExhausted`] when every slot is taken; that
    /// error is recoverable and the caller decides whether to retry later.
    pub fn new_entity(&mut self) -> Result<EntityHandle, EntityError> {
        self.ensure_started()?;

        let Some(index) = self.slots.iter().position(|slot| !slot.in_use) else {
            log::warn!("Entity pool exhausted ({} slots)", self.slots.len());
            return Err(EntityError::PoolExhausted {
                capacity: self.slots.len(),
            });
        };

        let id = self.next_id;
        self.next_id += 1;

        let slot = &mut self.slots[index];
        slot.entity = Entity::with_id(id);
        slot.behavior = None;
        slot.in_use = true;
        self.live += 1;

        // Slot count comes from a u32 in `start`
        #[allow(clippy::cast_possible_truncation)]
        let handle = EntityHandle::new(index as u32, id);
        log::debug!("Allocated entity {handle}");
        Ok(handle)
    }

    /// Run the entity's `free` hook, clear its slot and return it to the pool.
    ///
    /// Freeing a handle whose entity is already gone is a no-op and returns
    /// `Ok(false)`.
    pub fn free_entity(&mut self, handle: EntityHandle) -> Result<bool, EntityError> {
        match self.slot_index(handle) {
            Ok(index) => {
                self.release_slot(index);
                log::debug!("Freed entity {handle}");
                Ok(true)
            }
            Err(EntityError::StaleHandle { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Whether `handle` still refers to a live entity
    pub fn is_alive(&self, handle: EntityHandle) -> bool {
        self.slot_index(handle).is_ok()
    }

    /// Borrow a live entity
    pub fn get(&self, handle: EntityHandle) -> Result<&Entity, EntityError> {
        let index = self.slot_index(handle)?;
        Ok(&self.slots[index].entity)
    }

    /// Mutably borrow a live entity
    pub fn get_mut(&mut self, handle: EntityHandle) -> Result<&mut Entity, EntityError> {
        let index = self.slot_index(handle)?;
        Ok(&mut self.slots[index].entity)
    }

    /// Attach hooks to a live entity, replacing any previous ones
    pub fn set_behavior(
        &mut self,
        handle: EntityHandle,
        behavior: Box<dyn Behavior>,
    ) -> Result<(), EntityError> {
        let index = self.slot_index(handle)?;
        self.slots[index].behavior = Some(behavior);
        Ok(())
    }

    /// Detach and return the entity's hooks
    pub fn clear_behavior(
        &mut self,
        handle: EntityHandle,
    ) -> Result<Option<Box<dyn Behavior>>, EntityError> {
        let index = self.slot_index(handle)?;
        Ok(self.slots[index].behavior.take())
    }

    /// Whether the entity has hooks attached
    pub fn has_behavior(&self, handle: EntityHandle) -> Result<bool, EntityError> {
        let index = self.slot_index(handle)?;
        Ok(self.slots[index].behavior.is_some())
    }

    /// Live entities in slot order
    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &Entity)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.in_use)
            .map(|(index, slot)| (Self::handle_at(index, &slot.entity), &slot.entity))
    }

    /// Live entities in slot order, mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityHandle, &mut Entity)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, slot)| slot.in_use)
            .map(|(index, slot)| (Self::handle_at(index, &slot.entity), &mut slot.entity))
    }

    /// Handles of every live entity in slot order
    pub fn handles(&self) -> Vec<EntityHandle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Live entities of one classification
    pub fn find_by_type(
        &self,
        entity_type: EntityType,
    ) -> impl Iterator<Item = (EntityHandle, &Entity)> {
        self.iter()
            .filter(move |(_, entity)| entity.entity_type == entity_type)
    }

    /// Default render of one entity followed by its custom `draw` hook
    pub fn draw_entity(
        &mut self,
        handle: EntityHandle,
        device: &mut dyn DrawDevice,
    ) -> Result<(), EntityError> {
        let index = self.slot_index(handle)?;
        self.draw_slot(index, device);
        Ok(())
    }

    pub(crate) fn draw_slot(&mut self, index: usize, device: &mut dyn DrawDevice) {
        let slot = &mut self.slots[index];
        device.draw_entity(&EntityDrawCommand::from_entity(&slot.entity));
        if let Some(behavior) = slot.behavior.as_mut() {
            behavior.draw(&slot.entity, device);
        }
    }

    pub(crate) const fn ensure_started(&self) -> Result<(), EntityError> {
        if self.started {
            Ok(())
        } else {
            Err(EntityError::NotInitialized)
        }
    }

    /// Resolve a handle to its slot, rejecting freed or reused slots
    pub(crate) fn slot_index(&self, handle: EntityHandle) -> Result<usize, EntityError> {
        self.ensure_started()?;
        let index = handle.index() as usize;
        match self.slots.get(index) {
            Some(slot) if slot.in_use && slot.entity.id() == handle.id() => Ok(index),
            _ => Err(EntityError::StaleHandle { handle }),
        }
    }

    /// Run the `free` hook, then reset the slot to the canonical empty value
    pub(crate) fn release_slot(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        if let Some(mut behavior) = slot.behavior.take() {
            if let Err(e) = behavior.free(&mut slot.entity) {
                log::warn!("Free hook for entity {} failed: {e}", slot.entity.id());
            }
        }
        *slot = Slot::default();
        self.live -= 1;
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn handle_at(index: usize, entity: &Entity) -> EntityHandle {
        EntityHandle::new(index as u32, entity.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::BehaviorError;
    use crate::foundation::math::Vec3;
    use crate::render::DrawRecorder;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct FreeCounter {
        frees: Rc<RefCell<u32>>,
        fail: bool,
    }

    impl Behavior for FreeCounter {
        fn free(&mut self, _entity: &mut Entity) -> Result<(), BehaviorError> {
            *self.frees.borrow_mut() += 1;
            if self.fail {
                Err(BehaviorError::Custom("cleanup failed".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_operations_before_start_fail_fast() {
        let mut system = EntitySystem::new();
        let handle = EntityHandle::new(0, 1);

        assert!(!system.is_started());
        assert_eq!(system.new_entity(), Err(EntityError::NotInitialized));
        assert_eq!(system.free_entity(handle), Err(EntityError::NotInitialized));
        assert_eq!(system.get(handle).unwrap_err(), EntityError::NotInitialized);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            EntitySystem::with_capacity(0).err(),
            Some(EntityError::InvalidCapacity)
        );
    }

    #[test]
    fn test_allocates_up_to_capacity() {
        let mut system = EntitySystem::with_capacity(4).unwrap();

        let handles: Vec<_> = (0..4).map(|_| system.new_entity().unwrap()).collect();
        for (i, a) in handles.iter().enumerate() {
            for b in &handles[i + 1..] {
                assert_ne!(a, b);
                assert_ne!(a.id(), b.id());
            }
        }
        assert_eq!(system.len(), 4);

        let err = system.new_entity().unwrap_err();
        assert_eq!(err, EntityError::PoolExhausted { capacity: 4 });
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_free_then_new_reuses_slot_with_reset_fields() {
        let mut system = EntitySystem::with_capacity(1).unwrap();
        let first = system.new_entity().unwrap();
        {
            let entity = system.get_mut(first).unwrap();
            entity.position = Vec3::new(1.0, 2.0, 3.0);
            entity.velocity = Vec3::new(4.0, 5.0, 6.0);
            entity.health = 50;
            entity.dead = true;
            entity.entity_type = EntityType::Weapon;
        }
        system
            .set_behavior(first, Box::new(FreeCounter { frees: Rc::default(), fail: false }))
            .unwrap();

        assert_eq!(system.free_entity(first), Ok(true));
        let second = system.new_entity().unwrap();

        assert_eq!(second.index(), first.index());
        assert!(second.id() > first.id());
        let entity = system.get(second).unwrap();
        assert_eq!(entity.position, Vec3::zeros());
        assert_eq!(entity.velocity, Vec3::zeros());
        assert_eq!(entity.health, 0);
        assert!(!entity.dead);
        assert_eq!(entity.entity_type, EntityType::Bot);
        assert_eq!(system.has_behavior(second), Ok(false));
    }

    #[test]
    fn test_stale_handle_detected_after_reuse() {
        let mut system = EntitySystem::with_capacity(1).unwrap();
        let old = system.new_entity().unwrap();
        system.free_entity(old).unwrap();
        let new = system.new_entity().unwrap();

        assert!(!system.is_alive(old));
        assert!(system.is_alive(new));
        assert_eq!(
            system.get(old).unwrap_err(),
            EntityError::StaleHandle { handle: old }
        );
        // Freeing through the stale handle must not touch the new occupant
        assert_eq!(system.free_entity(old), Ok(false));
        assert!(system.is_alive(new));
    }

    #[test]
    fn test_double_free_is_noop() {
        let mut system = EntitySystem::with_capacity(2).unwrap();
        let frees = Rc::new(RefCell::new(0));
        let handle = system.new_entity().unwrap();
        system
            .set_behavior(handle, Box::new(FreeCounter { frees: frees.clone(), fail: false }))
            .unwrap();

        assert_eq!(system.free_entity(handle), Ok(true));
        assert_eq!(system.free_entity(handle), Ok(false));
        assert_eq!(*frees.borrow(), 1);
        assert!(system.is_empty());
    }

    #[test]
    fn test_failing_free_hook_does_not_block_cleanup() {
        let mut system = EntitySystem::with_capacity(1).unwrap();
        let frees = Rc::new(RefCell::new(0));
        let handle = system.new_entity().unwrap();
        system
            .set_behavior(handle, Box::new(FreeCounter { frees: frees.clone(), fail: true }))
            .unwrap();

        assert_eq!(system.free_entity(handle), Ok(true));
        assert_eq!(*frees.borrow(), 1);
        assert!(system.new_entity().is_ok());
    }

    #[test]
    fn test_restart_invalidates_handles_and_runs_free_hooks() {
        let mut system = EntitySystem::with_capacity(2).unwrap();
        let frees = Rc::new(RefCell::new(0));
        let handle = system.new_entity().unwrap();
        system
            .set_behavior(handle, Box::new(FreeCounter { frees: frees.clone(), fail: false }))
            .unwrap();

        system.start(3).unwrap();

        assert_eq!(*frees.borrow(), 1);
        assert_eq!(system.capacity(), 3);
        assert!(system.is_empty());
        let fresh = system.new_entity().unwrap();
        assert_eq!(fresh.index(), handle.index());
        assert!(!system.is_alive(handle));
    }

    #[test]
    fn test_shutdown_returns_to_uninitialized() {
        let mut system = EntitySystem::with_capacity(2).unwrap();
        system.new_entity().unwrap();
        system.shutdown();

        assert!(!system.is_started());
        assert_eq!(system.capacity(), 0);
        assert_eq!(system.new_entity(), Err(EntityError::NotInitialized));
    }

    #[test]
    fn test_iteration_in_slot_order_and_type_filter() {
        let mut system = EntitySystem::with_capacity(4).unwrap();
        let a = system.new_entity().unwrap();
        let b = system.new_entity().unwrap();
        let c = system.new_entity().unwrap();
        system.get_mut(b).unwrap().entity_type = EntityType::Player;
        system.free_entity(a).unwrap();

        assert_eq!(system.handles(), vec![b, c]);
        let players: Vec<_> = system.find_by_type(EntityType::Player).map(|(h, _)| h).collect();
        assert_eq!(players, vec![b]);

        for (_, entity) in system.iter_mut() {
            entity.health = 7;
        }
        assert!(system.iter().all(|(_, e)| e.health == 7));
    }

    #[test]
    fn test_draw_entity_submits_default_then_hook() {
        struct Sparkle;
        impl Behavior for Sparkle {
            fn draw(&mut self, entity: &Entity, device: &mut dyn DrawDevice) {
                device.draw_marker(entity.position, "sparkle");
            }
        }

        let mut system = EntitySystem::with_capacity(1).unwrap();
        let handle = system.new_entity().unwrap();
        system.get_mut(handle).unwrap().position = Vec3::new(0.0, 1.0, 0.0);
        system.set_behavior(handle, Box::new(Sparkle)).unwrap();

        let mut recorder = DrawRecorder::new();
        system.draw_entity(handle, &mut recorder).unwrap();

        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.entity_ids(), vec![handle.id()]);
        assert!(matches!(
            &recorder.calls[1],
            crate::render::DrawCall::Marker { label, .. } if label == "sparkle"
        ));
    }
}
