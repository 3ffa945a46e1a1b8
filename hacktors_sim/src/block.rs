// Terrain cells.
//
// A tile's block is either `Fixed` (Empty or Bedrock: no life, no content,
// never mutated) or `Live` (every damageable kind: its own life counter and,
// for chests, the items stored inside). Keeping the immutable kinds as a
// plain tag means there is no shared instance that could be mutated by
// accident.
//
// When a live block's life drops to zero the tile reverts to `Block::EMPTY`
// and the block turns into loot (see `into_loot`); the caller scatters the
// loot on the tile.

use crate::catalog::{BlockType, ItemType};
use crate::item::Item;
use crate::prng::SimRng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    Fixed(BlockType),
    Live {
        kind: BlockType,
        life: i32,
        content: Vec<Item>,
    },
}

impl Default for Block {
    fn default() -> Self {
        Block::EMPTY
    }
}

impl Block {
    pub const EMPTY: Block = Block::Fixed(BlockType::Empty);
    pub const BEDROCK: Block = Block::Fixed(BlockType::Bedrock);

    /// A block of `kind` at full life with no content.
    pub fn new(kind: BlockType) -> Block {
        if kind.is_damageable() {
            Block::Live {
                kind,
                life: kind.max_life(),
                content: Vec::new(),
            }
        } else {
            Block::Fixed(kind)
        }
    }

    /// Factory with type-driven content: closed chests come stocked with
    /// one or two random items.
    pub fn create(kind: BlockType, rng: &mut SimRng) -> Block {
        let mut block = Block::new(kind);
        if kind == BlockType::ClosedChest {
            let count = 1 + rng.index(2);
            let stock = (0..count).map(|_| Item::random(rng)).collect();
            block.set_content(stock);
        }
        block
    }

    /// A block of `kind` at full life holding `content`.
    pub fn with_content(kind: BlockType, content: Vec<Item>) -> Block {
        let mut block = Block::new(kind);
        block.set_content(content);
        block
    }

    pub fn kind(&self) -> BlockType {
        match self {
            Block::Fixed(kind) => *kind,
            Block::Live { kind, .. } => *kind,
        }
    }

    pub fn life(&self) -> i32 {
        match self {
            Block::Fixed(_) => 0,
            Block::Live { life, .. } => *life,
        }
    }

    pub fn is_solid(&self) -> bool {
        self.kind().is_solid()
    }

    pub fn is_empty(&self) -> bool {
        self.kind() == BlockType::Empty
    }

    pub fn content(&self) -> &[Item] {
        match self {
            Block::Fixed(_) => &[],
            Block::Live { content, .. } => content,
        }
    }

    pub fn content_mut(&mut self) -> Option<&mut Vec<Item>> {
        match self {
            Block::Fixed(_) => None,
            Block::Live { content, .. } => Some(content),
        }
    }

    /// Replace the stored items. Ignored on fixed blocks.
    pub fn set_content(&mut self, items: Vec<Item>) {
        if let Some(content) = self.content_mut() {
            *content = items;
        }
    }

    pub fn take_content(&mut self) -> Vec<Item> {
        self.content_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Apply `amount` damage. Returns `true` if the block is destroyed.
    /// Fixed blocks ignore damage.
    pub fn damage(&mut self, amount: i32) -> bool {
        match self {
            Block::Fixed(_) => false,
            Block::Live { life, .. } => {
                *life -= amount;
                *life <= 0
            }
        }
    }

    /// What a destroyed block leaves behind.
    pub fn into_loot(self, rng: &mut SimRng) -> Vec<Item> {
        let kind = self.kind();
        match kind {
            BlockType::Tree => vec![
                Item::create(ItemType::Stick, rng),
                Item::create(ItemType::Apple, rng),
            ],
            BlockType::ClosedChest | BlockType::OpenChest => {
                let mut loot = match self {
                    Block::Live { content, .. } => content,
                    Block::Fixed(_) => Vec::new(),
                };
                loot.push(Item::block(BlockType::OpenChest, rng));
                loot
            }
            BlockType::ClosedDoor | BlockType::OpenDoor => Vec::new(),
            BlockType::Empty | BlockType::Bedrock => Vec::new(),
            other => vec![Item::block(other, rng)],
        }
    }

    pub fn glyph(&self) -> char {
        self.kind().glyph()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immutable_kinds_are_fixed() {
        assert_eq!(Block::new(BlockType::Empty), Block::EMPTY);
        assert_eq!(Block::new(BlockType::Bedrock), Block::BEDROCK);
        assert!(matches!(Block::new(BlockType::Stone), Block::Live { life: 100, .. }));
    }

    #[test]
    fn fixed_blocks_ignore_damage() {
        let mut b = Block::BEDROCK;
        assert!(!b.damage(1_000));
        assert_eq!(b, Block::BEDROCK);
    }

    #[test]
    fn destroyed_iff_damage_reaches_life() {
        let mut earth = Block::new(BlockType::Earth);
        assert!(!earth.damage(29));
        assert!(earth.damage(1));

        let mut stone = Block::new(BlockType::Stone);
        assert!(stone.damage(100));
    }

    #[test]
    fn closed_chests_are_stocked() {
        let mut rng = SimRng::new(8);
        for _ in 0..100 {
            let chest = Block::create(BlockType::ClosedChest, &mut rng);
            assert!((1..=2).contains(&chest.content().len()));
        }
        assert!(Block::create(BlockType::OpenChest, &mut rng).content().is_empty());
    }

    #[test]
    fn tree_loot_is_stick_and_apple() {
        let mut rng = SimRng::new(9);
        let loot = Block::new(BlockType::Tree).into_loot(&mut rng);
        let kinds: Vec<_> = loot.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![ItemType::Stick, ItemType::Apple]);
    }

    #[test]
    fn chest_loot_keeps_content_and_adds_the_chest() {
        let mut rng = SimRng::new(10);
        let apple = Item::create(ItemType::Apple, &mut rng);
        let chest = Block::with_content(BlockType::ClosedChest, vec![apple.clone()]);
        let loot = chest.into_loot(&mut rng);
        assert_eq!(loot.len(), 2);
        assert_eq!(loot[0], apple);
        assert_eq!(loot[1].block_type, Some(BlockType::OpenChest));
    }

    #[test]
    fn doors_leave_nothing_and_others_leave_themselves() {
        let mut rng = SimRng::new(11);
        assert!(Block::new(BlockType::ClosedDoor).into_loot(&mut rng).is_empty());
        let loot = Block::new(BlockType::Anvil).into_loot(&mut rng);
        assert_eq!(loot.len(), 1);
        assert_eq!(loot[0].block_type, Some(BlockType::Anvil));
    }

    #[test]
    fn content_on_fixed_blocks_is_dropped() {
        let mut rng = SimRng::new(12);
        let mut empty = Block::EMPTY;
        empty.set_content(vec![Item::random(&mut rng)]);
        assert!(empty.content().is_empty());
        assert!(empty.take_content().is_empty());
    }
}
