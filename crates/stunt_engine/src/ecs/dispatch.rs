//! Per-frame batch passes over the entity pool
//!
//! A frame runs `think_all`, then game logic, then `update_all`, then
//! `draw_all`, always in that order. Every pass walks the slots in pool order.

use super::{Damage, EntityError, EntityHandle, EntitySystem};
use crate::render::DrawDevice;

impl EntitySystem {
    /// Invoke every live entity's `think` hook
    pub fn think_all(&mut self) -> Result<(), EntityError> {
        self.ensure_started()?;
        for slot in self.slots.iter_mut().filter(|slot| slot.in_use) {
            if let Some(behavior) = slot.behavior.as_mut() {
                behavior.think(&mut slot.entity);
            }
        }
        Ok(())
    }

    /// Reap dead entities, integrate motion and run `update` hooks.
    ///
    /// An entity already marked `dead` when the pass reaches it is freed and
    /// skipped. Entities that die inside their own `update` hook are reaped on
    /// the next pass. Returns the number of entities reaped.
    pub fn update_all(&mut self) -> Result<usize, EntityError> {
        self.ensure_started()?;
        let time_step = self.time_step;
        let mut reaped = 0;

        for index in 0..self.slots.len() {
            if !self.slots[index].in_use {
                continue;
            }
            if self.slots[index].entity.dead {
                log::debug!("Reaping dead entity {}", self.slots[index].entity.id());
                self.release_slot(index);
                reaped += 1;
                continue;
            }

            let slot = &mut self.slots[index];
            slot.entity.integrate(time_step);
            if let Some(behavior) = slot.behavior.as_mut() {
                behavior.update(&mut slot.entity);
            }
        }

        log::trace!("Update pass: {} live, {reaped} reaped", self.len());
        Ok(reaped)
    }

    /// Draw every live entity
    pub fn draw_all(&mut self, device: &mut dyn DrawDevice) -> Result<(), EntityError> {
        self.ensure_started()?;
        for index in 0..self.slots.len() {
            if self.slots[index].in_use {
                self.draw_slot(index, device);
            }
        }
        Ok(())
    }

    /// Deal damage to `target` through its `damage` hook.
    ///
    /// `inflictor` is the entity that physically caused the damage, `attacker`
    /// the one credited with it; handles that no longer refer to a live entity
    /// are passed on as `None`. Returns the hook's result, or `0` with no effect
    /// when the target is missing, stale or has no hook.
    pub fn entity_damage(
        &mut self,
        target: Option<EntityHandle>,
        inflictor: Option<EntityHandle>,
        attacker: Option<EntityHandle>,
        damage: i32,
    ) -> Result<i32, EntityError> {
        self.ensure_started()?;
        let Some(target) = target else {
            return Ok(0);
        };
        let index = match self.slot_index(target) {
            Ok(index) => index,
            Err(EntityError::StaleHandle { .. }) => {
                log::debug!("Ignoring damage to stale entity {target}");
                return Ok(0);
            }
            Err(e) => return Err(e),
        };

        let event = Damage {
            amount: damage,
            inflictor: inflictor.filter(|h| self.is_alive(*h)),
            attacker: attacker.filter(|h| self.is_alive(*h)),
        };
        log::debug!(
            "Entity {target} takes {damage} damage (inflictor {:?}, attacker {:?})",
            event.inflictor,
            event.attacker
        );

        let slot = &mut self.slots[index];
        Ok(slot
            .behavior
            .as_mut()
            .map_or(0, |behavior| behavior.damage(&mut slot.entity, &event)))
    }

    /// Invoke `entity`'s `touch` hook with `other` as the touched entity.
    ///
    /// Returns the hook's result, or `0` when either handle is stale or the
    /// entity has no hook.
    pub fn touch(&mut self, entity: EntityHandle, other: EntityHandle) -> Result<i32, EntityError> {
        self.ensure_started()?;
        let (Ok(a), Ok(b)) = (self.slot_index(entity), self.slot_index(other)) else {
            return Ok(0);
        };
        if a == b {
            return Err(EntityError::AliasedHandles { handle: entity });
        }

        let (first, second) = if a < b {
            let (left, right) = self.slots.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.slots.split_at_mut(a);
            (&mut right[0], &mut left[b])
        };

        Ok(first
            .behavior
            .as_mut()
            .map_or(0, |behavior| behavior.touch(&mut first.entity, &mut second.entity)))
    }

    /// Run the entity's `die` hook and mark it for removal on the next update.
    ///
    /// Returns `Ok(false)` if the entity is stale or already dead.
    pub fn kill_entity(&mut self, handle: EntityHandle) -> Result<bool, EntityError> {
        let index = match self.slot_index(handle) {
            Ok(index) => index,
            Err(EntityError::StaleHandle { .. }) => return Ok(false),
            Err(e) => return Err(e),
        };

        let slot = &mut self.slots[index];
        if slot.entity.dead {
            return Ok(false);
        }
        if let Some(behavior) = slot.behavior.as_mut() {
            behavior.die(&mut slot.entity);
        }
        slot.entity.dead = true;
        log::debug!("Entity {handle} killed");
        Ok(true)
    }
}
