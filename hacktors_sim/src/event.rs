// Notifications delivered to controllers.
//
// Every state change a controller may care about is a `MobileEvent`
// addressed to one mobile. Mutations never call controllers directly: they
// push `(MobileId, MobileEvent)` pairs onto the world's pending queue, and
// `World::dispatch_events` delivers them once the acting controller has
// returned. A notification can therefore never re-enter a mutation that is
// still in progress, and a controller that ignores an event loses nothing.
//
// See also: `controller.rs` for the receiving side, `world.rs` for the queue
// and dispatch.
//
// **Critical constraint: determinism.** Events are queued and delivered in
// the order the mutations happened.

use crate::catalog::{BlockType, ItemType, MobileType};
use crate::item::Item;
use crate::types::MobileId;
use serde::{Deserialize, Serialize};

/// What inflicted damage on a mobile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    /// A melee attack by another mobile.
    Mobile { attacker: MobileId, kind: MobileType },
    /// A block the mobile stepped on (traps).
    Block(BlockType),
    /// A thrown item, with its thrower when known.
    Missile {
        kind: ItemType,
        shooter: Option<MobileId>,
    },
}

impl DamageSource {
    /// Armor absorbs blows and missiles, not traps.
    pub fn is_absorbed_by_armor(&self) -> bool {
        !matches!(self, DamageSource::Block(_))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MobileEvent {
    /// The mobile's tile changed, or it was evicted (then it is detached).
    PositionChanged { changed_level: bool },
    DirectionChanged,
    PickedUp { items: Vec<Item> },
    /// Life lost after armor absorption.
    Damaged { amount: i32, source: DamageSource },
    Died,
    AttackedMobile {
        target: MobileId,
        target_kind: MobileType,
        weapon: Option<ItemType>,
        killed: bool,
    },
    AttackedBlock {
        block: BlockType,
        weapon: Option<ItemType>,
        destroyed: bool,
    },
    ItemAdded { item: Item },
    ItemRemoved { item: Item },
    Ate { item: Item },
    /// The clock stopped.
    Stopped,
}
