// Static type catalogs: blocks, items and mobiles.
//
// Every behavior that depends only on an entity's *type* is a `const` table
// here: block life and solidity, item damage/food/range/category, mobile
// stats, who hunts and fears whom, what each mobile eats and what it carries
// when it spawns. The catalogs are game-balance data, not configuration, so
// they are compiled in rather than loaded from `WorldConfig`.
//
// Selection helpers (`BlockType::choose`, `ItemType::choose`,
// `ItemType::choose_craftable`) take the world's `SimRng` so generated
// content stays reproducible.
//
// See also: `item.rs` and `block.rs` for the factories that turn these types
// into values, `ai.rs` for the consumer of the hunt/fear/food tables.

use crate::prng::SimRng;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// The terrain type of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockType {
    Bedrock,
    Empty,
    Stone,
    Earth,
    Tree,
    ClosedDoor,
    OpenDoor,
    ClosedChest,
    OpenChest,
    StairsUp,
    StairsDown,
    Anvil,
    Trap,
}

impl BlockType {
    pub const ALL: [BlockType; 13] = [
        BlockType::Bedrock,
        BlockType::Empty,
        BlockType::Stone,
        BlockType::Earth,
        BlockType::Tree,
        BlockType::ClosedDoor,
        BlockType::OpenDoor,
        BlockType::ClosedChest,
        BlockType::OpenChest,
        BlockType::StairsUp,
        BlockType::StairsDown,
        BlockType::Anvil,
        BlockType::Trap,
    ];

    /// Starting life. Zero means indestructible.
    pub const fn max_life(self) -> i32 {
        match self {
            BlockType::Bedrock | BlockType::Empty => 0,
            BlockType::Stone | BlockType::Anvil => 100,
            BlockType::Earth | BlockType::Tree => 30,
            BlockType::ClosedDoor | BlockType::ClosedChest | BlockType::Trap => 20,
            BlockType::OpenDoor | BlockType::OpenChest => 10,
            BlockType::StairsUp | BlockType::StairsDown => 200,
        }
    }

    /// Solid blocks cannot share a tile with a mobile and stop missiles.
    pub const fn is_solid(self) -> bool {
        matches!(
            self,
            BlockType::Bedrock
                | BlockType::Stone
                | BlockType::Earth
                | BlockType::Tree
                | BlockType::ClosedDoor
        )
    }

    pub const fn is_damageable(self) -> bool {
        self.max_life() > 0
    }

    pub const fn is_door(self) -> bool {
        matches!(self, BlockType::ClosedDoor | BlockType::OpenDoor)
    }

    pub const fn is_chest(self) -> bool {
        matches!(self, BlockType::ClosedChest | BlockType::OpenChest)
    }

    pub const fn glyph(self) -> char {
        match self {
            BlockType::Bedrock => '#',
            BlockType::Empty => '.',
            BlockType::Stone => '%',
            BlockType::Earth => ':',
            BlockType::Tree => 'T',
            BlockType::ClosedDoor => '+',
            BlockType::OpenDoor => '/',
            BlockType::ClosedChest => '=',
            BlockType::OpenChest => '_',
            BlockType::StairsUp => '<',
            BlockType::StairsDown => '>',
            BlockType::Anvil => 'A',
            BlockType::Trap => '!',
        }
    }

    /// A uniformly random type. Never bedrock.
    pub fn choose(rng: &mut SimRng) -> BlockType {
        BlockType::ALL[1 + rng.index(BlockType::ALL.len() - 1)]
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Food,
    Egg,
    Material,
    Tool,
    Weapon,
    Armor,
}

impl ItemCategory {
    pub const fn is_edible(self) -> bool {
        matches!(self, ItemCategory::Food | ItemCategory::Egg)
    }
}

/// Per-type item stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemStats {
    pub max_life: i32,
    /// Life restored when eaten. Negative values poison.
    pub food: i32,
    pub mobile_damage: i32,
    pub block_damage: i32,
    pub category: ItemCategory,
    /// Tiles travelled when fired.
    pub range: i32,
}

const fn stats(
    max_life: i32,
    food: i32,
    mobile_damage: i32,
    block_damage: i32,
    category: ItemCategory,
    range: i32,
) -> ItemStats {
    ItemStats {
        max_life,
        food,
        mobile_damage,
        block_damage,
        category,
        range,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemType {
    Apple,
    Meat,
    PigEgg,
    HumanEgg,
    ZombieEgg,
    DogEgg,
    Stick,
    Bone,
    Block,
    Iron,
    PickAxe,
    Key,
    Sword,
    Dagger,
    Helm,
    Gloves,
    Boots,
    Chestplate,
}

impl ItemType {
    pub const ALL: [ItemType; 18] = [
        ItemType::Apple,
        ItemType::Meat,
        ItemType::PigEgg,
        ItemType::HumanEgg,
        ItemType::ZombieEgg,
        ItemType::DogEgg,
        ItemType::Stick,
        ItemType::Bone,
        ItemType::Block,
        ItemType::Iron,
        ItemType::PickAxe,
        ItemType::Key,
        ItemType::Sword,
        ItemType::Dagger,
        ItemType::Helm,
        ItemType::Gloves,
        ItemType::Boots,
        ItemType::Chestplate,
    ];

    pub const CRAFTABLE: [ItemType; 8] = [
        ItemType::PickAxe,
        ItemType::Key,
        ItemType::Sword,
        ItemType::Dagger,
        ItemType::Helm,
        ItemType::Gloves,
        ItemType::Boots,
        ItemType::Chestplate,
    ];

    pub const fn stats(self) -> ItemStats {
        use ItemCategory::*;
        match self {
            ItemType::Apple => stats(1, 5, 1, 1, Food, 1),
            ItemType::Meat => stats(1, 20, 1, 1, Food, 1),
            ItemType::PigEgg | ItemType::HumanEgg | ItemType::DogEgg => stats(1, 5, 1, 1, Egg, 5),
            ItemType::ZombieEgg => stats(1, -5, 1, 1, Egg, 5),
            ItemType::Stick => stats(20, 0, 5, 5, Material, 1),
            ItemType::Bone => stats(30, 0, 7, 7, Material, 1),
            ItemType::Block => stats(1, 0, 5, 5, Material, 1),
            ItemType::Iron => stats(100, 0, 10, 10, Material, 1),
            ItemType::PickAxe => stats(100, 0, 15, 30, Tool, 1),
            ItemType::Key => stats(10, 0, 1, 1, Tool, 1),
            ItemType::Sword => stats(100, 0, 30, 15, Weapon, 1),
            ItemType::Dagger => stats(30, 0, 15, 10, Weapon, 5),
            ItemType::Helm | ItemType::Chestplate => stats(100, 0, 5, 5, Armor, 1),
            ItemType::Gloves | ItemType::Boots => stats(100, 0, 7, 7, Armor, 1),
        }
    }

    pub const fn max_life(self) -> i32 {
        self.stats().max_life
    }

    pub const fn food(self) -> i32 {
        self.stats().food
    }

    pub const fn mobile_damage(self) -> i32 {
        self.stats().mobile_damage
    }

    pub const fn block_damage(self) -> i32 {
        self.stats().block_damage
    }

    pub const fn category(self) -> ItemCategory {
        self.stats().category
    }

    pub const fn range(self) -> i32 {
        self.stats().range
    }

    pub const fn is_edible(self) -> bool {
        self.category().is_edible()
    }

    pub const fn is_egg(self) -> bool {
        matches!(self.category(), ItemCategory::Egg)
    }

    pub const fn is_armor(self) -> bool {
        matches!(self.category(), ItemCategory::Armor)
    }

    pub const fn is_weapon(self) -> bool {
        matches!(self.category(), ItemCategory::Weapon)
    }

    /// Items meant to be thrown.
    pub const fn is_missile(self) -> bool {
        matches!(self, ItemType::Dagger) || self.is_egg()
    }

    pub const fn is_craftable(self) -> bool {
        matches!(
            self.category(),
            ItemCategory::Armor | ItemCategory::Weapon | ItemCategory::Tool
        )
    }

    /// The creature an egg hatches into when it lands.
    pub const fn hatches(self) -> Option<MobileType> {
        match self {
            ItemType::PigEgg => Some(MobileType::Pig),
            ItemType::HumanEgg => Some(MobileType::Human),
            ItemType::ZombieEgg => Some(MobileType::Zombie),
            ItemType::DogEgg => Some(MobileType::Dog),
            _ => None,
        }
    }

    pub const fn glyph(self) -> char {
        match self {
            ItemType::Apple => 'a',
            ItemType::Meat => 'm',
            ItemType::PigEgg => 'p',
            ItemType::HumanEgg => 'h',
            ItemType::ZombieEgg => 'z',
            ItemType::DogEgg => 'd',
            ItemType::Stick => 's',
            ItemType::Bone => 'b',
            ItemType::Block => 'l',
            ItemType::Iron => 'i',
            ItemType::PickAxe => 'x',
            ItemType::Key => 'k',
            ItemType::Sword => 'w',
            ItemType::Dagger => 't',
            ItemType::Helm => 'e',
            ItemType::Gloves => 'g',
            ItemType::Boots => 'o',
            ItemType::Chestplate => 'c',
        }
    }

    pub fn choose(rng: &mut SimRng) -> ItemType {
        ItemType::ALL[rng.index(ItemType::ALL.len())]
    }

    pub fn choose_craftable(rng: &mut SimRng) -> ItemType {
        ItemType::CRAFTABLE[rng.index(ItemType::CRAFTABLE.len())]
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// Mobiles
// ---------------------------------------------------------------------------

/// Per-type mobile stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MobileStats {
    pub max_life: i32,
    /// Bare-hands damage against both mobiles and blocks.
    pub damage: i32,
    /// Radius of the square a mobile can see.
    pub perception: i32,
    pub speed: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MobileType {
    Pig,
    Human,
    Zombie,
    Dog,
}

impl MobileType {
    pub const ALL: [MobileType; 4] = [
        MobileType::Pig,
        MobileType::Human,
        MobileType::Zombie,
        MobileType::Dog,
    ];

    pub const fn stats(self) -> MobileStats {
        let (max_life, damage, perception, speed) = match self {
            MobileType::Pig => (20, 1, 3, 10),
            MobileType::Human => (100, 5, 4, 8),
            MobileType::Zombie => (100, 10, 3, 10),
            MobileType::Dog => (50, 10, 4, 5),
        };
        MobileStats {
            max_life,
            damage,
            perception,
            speed,
        }
    }

    pub const fn max_life(self) -> i32 {
        self.stats().max_life
    }

    pub const fn damage(self) -> i32 {
        self.stats().damage
    }

    pub const fn perception(self) -> i32 {
        self.stats().perception
    }

    pub const fn hunts(self) -> &'static [MobileType] {
        match self {
            MobileType::Human => &[MobileType::Pig],
            MobileType::Zombie => &[MobileType::Human],
            MobileType::Dog => &[MobileType::Zombie],
            MobileType::Pig => &[],
        }
    }

    pub const fn fears(self) -> &'static [MobileType] {
        match self {
            MobileType::Pig => &[MobileType::Dog],
            MobileType::Human => &[MobileType::Zombie],
            MobileType::Zombie | MobileType::Dog => &[],
        }
    }

    pub const fn food(self) -> &'static [ItemType] {
        match self {
            MobileType::Pig => &[ItemType::Apple],
            MobileType::Human => &[ItemType::Apple, ItemType::Meat],
            MobileType::Dog => &[ItemType::Meat],
            MobileType::Zombie => &[],
        }
    }

    /// What a freshly spawned mobile may carry. `None` is a random item.
    /// Each slot is rolled independently against `dropping_chance`.
    pub const fn droppings(self) -> &'static [Option<ItemType>] {
        match self {
            MobileType::Pig => &[Some(ItemType::Meat), Some(ItemType::Meat), Some(ItemType::Meat)],
            MobileType::Zombie => &[None, Some(ItemType::Bone), Some(ItemType::Bone)],
            MobileType::Dog => &[Some(ItemType::Bone)],
            MobileType::Human => &[None, None, None],
        }
    }

    /// Tool users fight with the best item they carry.
    pub const fn is_tool_user(self) -> bool {
        matches!(self, MobileType::Human)
    }

    /// Mindless mobiles never flee.
    pub const fn is_mindless(self) -> bool {
        matches!(self, MobileType::Zombie)
    }

    pub const fn glyph(self) -> char {
        match self {
            MobileType::Pig => 'P',
            MobileType::Human => 'H',
            MobileType::Zombie => 'Z',
            MobileType::Dog => 'D',
        }
    }
}

impl fmt::Display for MobileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_bedrock_and_empty_are_indestructible() {
        for b in BlockType::ALL {
            let fixed = matches!(b, BlockType::Bedrock | BlockType::Empty);
            assert_eq!(!b.is_damageable(), fixed, "{b}");
        }
    }

    #[test]
    fn chests_are_walkable() {
        assert!(!BlockType::ClosedChest.is_solid());
        assert!(!BlockType::OpenChest.is_solid());
        assert!(BlockType::ClosedDoor.is_solid());
        assert!(!BlockType::OpenDoor.is_solid());
    }

    #[test]
    fn choose_never_yields_bedrock() {
        let mut rng = SimRng::new(5);
        for _ in 0..5_000 {
            assert_ne!(BlockType::choose(&mut rng), BlockType::Bedrock);
        }
    }

    #[test]
    fn non_missiles_have_range_one() {
        for t in ItemType::ALL {
            if !t.is_missile() {
                assert_eq!(t.range(), 1, "{t}");
            } else {
                assert_eq!(t.range(), 5, "{t}");
            }
        }
    }

    #[test]
    fn eggs_hatch_their_namesake() {
        assert_eq!(ItemType::DogEgg.hatches(), Some(MobileType::Dog));
        assert_eq!(ItemType::ZombieEgg.hatches(), Some(MobileType::Zombie));
        assert_eq!(ItemType::Dagger.hatches(), None);
        assert!(ItemType::ZombieEgg.food() < 0);
    }

    #[test]
    fn craftable_list_matches_categories() {
        for t in ItemType::ALL {
            assert_eq!(ItemType::CRAFTABLE.contains(&t), t.is_craftable(), "{t}");
        }
        let mut rng = SimRng::new(11);
        for _ in 0..200 {
            assert!(ItemType::choose_craftable(&mut rng).is_craftable());
        }
    }

    #[test]
    fn predator_tables() {
        assert_eq!(MobileType::Dog.hunts(), &[MobileType::Zombie]);
        assert_eq!(MobileType::Pig.fears(), &[MobileType::Dog]);
        assert!(MobileType::Zombie.food().is_empty());
        assert!(MobileType::Human.is_tool_user());
        assert!(!MobileType::Dog.is_tool_user());
        assert_eq!(MobileType::Human.droppings().len(), 3);
    }
}
