// A mobile: the physical body of a creature or the player's avatar.
//
// Mobiles live in the world's arena (`World::mobiles`, keyed by `MobileId`);
// tiles refer to them by id. The struct holds only per-body state: type,
// life, position, equipment, memory of the last attacker, and the bound
// controller. Everything that touches tiles (moving, fighting, picking up)
// is a world verb in `actions.rs` / `combat.rs`, because it must update the
// chunk, level and world together.
//
// Equipment holds at most `MAX_EQUIPMENT` items and never the same item
// twice. `add_item` hands a rejected item back to the caller so nothing is
// silently lost.
//
// The position is written only by the world's relocation protocol.

use crate::catalog::{ItemType, MobileType};
use crate::controller::Controller;
use crate::item::Item;
use crate::types::{ItemId, MobileId, Position};
use smallvec::SmallVec;
use std::fmt;

pub const MAX_EQUIPMENT: usize = 10;

pub type Equipment = SmallVec<[Item; MAX_EQUIPMENT]>;

pub struct Mobile {
    pub id: MobileId,
    pub kind: MobileType,
    pub(crate) life: i32,
    pub(crate) position: Position,
    pub(crate) equipment: Equipment,
    pub(crate) last_attacker: Option<MobileId>,
    pub(crate) last_attacked_cycle: u64,
    /// `None` while the controller is acting.
    pub(crate) controller: Option<Box<dyn Controller>>,
    /// Cycle of the last turn taken, so a mobile acts at most once per cycle.
    pub(crate) acted_cycle: Option<u64>,
}

impl Mobile {
    /// A detached mobile at full life with empty equipment.
    pub fn new(id: MobileId, kind: MobileType, mut controller: Box<dyn Controller>) -> Self {
        controller.bind(id);
        Self {
            id,
            kind,
            life: kind.max_life(),
            position: Position::new(0, 0, 0),
            equipment: SmallVec::new(),
            last_attacker: None,
            last_attacked_cycle: 0,
            controller: Some(controller),
            acted_cycle: None,
        }
    }

    pub fn life(&self) -> i32 {
        self.life
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_placed(&self) -> bool {
        !self.position.is_detached()
    }

    pub fn equipment(&self) -> &[Item] {
        &self.equipment
    }

    pub fn is_full(&self) -> bool {
        self.equipment.len() >= MAX_EQUIPMENT
    }

    /// Add an item to the equipment. A full inventory or an item that is
    /// already carried hands the item back.
    pub fn add_item(&mut self, item: Item) -> Result<(), Item> {
        if self.is_full() || self.equipment.iter().any(|it| it.id == item.id) {
            return Err(item);
        }
        self.equipment.push(item);
        Ok(())
    }

    pub fn remove_item_at(&mut self, index: usize) -> Option<Item> {
        (index < self.equipment.len()).then(|| self.equipment.remove(index))
    }

    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let index = self.equipment.iter().position(|it| it.id == id)?;
        self.remove_item_at(index)
    }

    pub fn find_item(&self, kind: ItemType) -> Option<usize> {
        self.equipment.iter().position(|it| it.kind == kind)
    }

    pub fn has_item(&self, kind: ItemType) -> bool {
        self.find_item(kind).is_some()
    }

    /// Index of the carried item whose `damage` beats bare hands, if the
    /// mobile knows how to use tools. Ties go to bare hands.
    pub fn best_item(&self, damage: impl Fn(&Item) -> i32) -> Option<usize> {
        if !self.kind.is_tool_user() {
            return None;
        }
        let mut best = None;
        let mut best_damage = self.kind.damage();
        for (i, item) in self.equipment.iter().enumerate() {
            let d = damage(item);
            if d > best_damage {
                best = Some(i);
                best_damage = d;
            }
        }
        best
    }

    pub fn has_weapon(&self) -> bool {
        self.kind.is_tool_user() && self.equipment.iter().any(|it| it.kind.is_weapon())
    }

    /// The last attacker, unless it was forgotten: memory lasts
    /// `forget_cycles` cycles.
    pub fn last_attacker(&self, now: u64, forget_cycles: u64) -> Option<MobileId> {
        self.last_attacker
            .filter(|_| now.saturating_sub(self.last_attacked_cycle) < forget_cycles)
    }
}

impl fmt::Debug for Mobile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mobile")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("life", &self.life)
            .field("position", &self.position)
            .field("equipment", &self.equipment)
            .field("last_attacker", &self.last_attacker)
            .field("has_controller", &self.controller.is_some())
            .finish()
    }
}
