// Portable objects.
//
// An `Item` is an owned value with a deterministic `ItemId`. Items move
// between collections (a tile's floor, a chest's content, a mobile's
// equipment) by value; "the same item" always means "the same id".
//
// Life counts remaining uses. Every use (a hit with a weapon, turning a key,
// landing as a missile) consumes one point, and the holder drops the item
// once `use_once` reports it destroyed.

use crate::catalog::{BlockType, ItemType};
use crate::prng::SimRng;
use crate::types::ItemId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemType,
    /// Set only for `ItemType::Block`: the block this item lays.
    pub block_type: Option<BlockType>,
    pub life: i32,
}

impl Item {
    /// A new item of `kind` with type-driven starting life.
    ///
    /// Single-use types and keys start at full life, everything else at a
    /// uniform value in `1..=max_life`. Block items pick a random block type.
    pub fn create(kind: ItemType, rng: &mut SimRng) -> Item {
        let id = ItemId::new(rng);
        let max = kind.max_life();
        let life = if max <= 1 || kind == ItemType::Key {
            max.max(1)
        } else {
            rng.range_i32(1, max + 1)
        };
        let block_type = (kind == ItemType::Block).then(|| BlockType::choose(rng));
        Item {
            id,
            kind,
            block_type,
            life,
        }
    }

    /// A block item that lays `block_type`.
    pub fn block(block_type: BlockType, rng: &mut SimRng) -> Item {
        Item {
            id: ItemId::new(rng),
            kind: ItemType::Block,
            block_type: Some(block_type),
            life: ItemType::Block.max_life(),
        }
    }

    /// An item of a uniformly random type.
    pub fn random(rng: &mut SimRng) -> Item {
        let kind = ItemType::choose(rng);
        Item::create(kind, rng)
    }

    pub fn with_life(mut self, life: i32) -> Item {
        self.life = life;
        self
    }

    /// Consume one use. Returns `true` if the item is now destroyed.
    pub fn use_once(&mut self) -> bool {
        self.life -= 1;
        self.is_destroyed()
    }

    pub fn is_destroyed(&self) -> bool {
        self.life <= 0
    }

    pub fn mobile_damage(&self) -> i32 {
        self.kind.mobile_damage()
    }

    pub fn block_damage(&self) -> i32 {
        self.kind.block_damage()
    }

    pub fn range(&self) -> i32 {
        self.kind.range()
    }

    pub fn glyph(&self) -> char {
        self.kind.glyph()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.block_type {
            Some(block) => write!(f, "{}({block})", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_use_items_start_at_one() {
        let mut rng = SimRng::new(1);
        for kind in [ItemType::Apple, ItemType::Meat, ItemType::DogEgg, ItemType::Block] {
            assert_eq!(Item::create(kind, &mut rng).life, 1, "{kind}");
        }
    }

    #[test]
    fn keys_get_their_fixed_use_count() {
        let mut rng = SimRng::new(2);
        for _ in 0..50 {
            assert_eq!(Item::create(ItemType::Key, &mut rng).life, 10);
        }
    }

    #[test]
    fn durable_items_start_within_their_range() {
        let mut rng = SimRng::new(3);
        for _ in 0..500 {
            let sword = Item::create(ItemType::Sword, &mut rng);
            assert!((1..=100).contains(&sword.life), "life {}", sword.life);
        }
    }

    #[test]
    fn only_block_items_carry_a_block_type() {
        let mut rng = SimRng::new(4);
        for _ in 0..200 {
            let item = Item::random(&mut rng);
            assert_eq!(item.block_type.is_some(), item.kind == ItemType::Block);
        }
        let stone = Item::block(BlockType::Stone, &mut rng);
        assert_eq!(stone.block_type, Some(BlockType::Stone));
        assert_eq!(stone.to_string(), "Block(Stone)");
    }

    #[test]
    fn use_once_counts_down_to_destruction() {
        let mut rng = SimRng::new(5);
        let mut key = Item::create(ItemType::Key, &mut rng).with_life(2);
        assert!(!key.use_once());
        assert!(key.use_once());
        assert!(key.is_destroyed());
    }

    #[test]
    fn ids_are_distinct() {
        let mut rng = SimRng::new(6);
        let a = Item::create(ItemType::Apple, &mut rng);
        let b = Item::create(ItemType::Apple, &mut rng);
        assert_ne!(a.id, b.id);
    }
}
