// Core types shared across the simulation.
//
// Defines the grid dimensions, facing directions, `Position` (a tile
// coordinate plus facing plus the id of the world it is placed in),
// and the strongly-typed entity identifiers (`MobileId`, `ItemId` as UUID v4
// wrappers, `WorldId` as a process-unique counter).
//
// Coordinate conventions:
// - x grows east, y grows south, z grows downward (level 0 is the surface,
//   `go_up` decrements z).
// - North = (0, -1), South = (0, +1), East = (+1, 0), West = (-1, 0). Every
//   helper below (`next`, `towards`, `away_from`, `opposite`, `normals`)
//   derives from `Direction::delta`, so they cannot disagree.
//
// A `Position` whose `world` is `None` is detached: the mobile exists in the
// arena but occupies no tile.
//
// **Critical constraint: determinism.** Entity IDs are generated from the
// world's `SimRng`. Do not use external UUID libraries or OS entropy.

use crate::prng::SimRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// ---------------------------------------------------------------------------
// Grid dimensions
// ---------------------------------------------------------------------------

/// Tiles along each side of a chunk.
pub const CHUNK_SIZE: i32 = 16;
/// Chunks along each side of a level.
pub const LEVEL_CHUNKS: i32 = 16;
/// Tiles along each side of a level (and the world's X and Y extent).
pub const WORLD_SIZE: i32 = CHUNK_SIZE * LEVEL_CHUNKS;
/// Number of levels stacked in a world.
pub const WORLD_DEPTH: i32 = 256;
/// Tiles per chunk.
pub const CHUNK_TILES: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;
/// Chunks per level.
pub const LEVEL_SLOTS: usize = (LEVEL_CHUNKS * LEVEL_CHUNKS) as usize;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the four compass directions a mobile can face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Tile offset of one step in this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// The two directions perpendicular to this one.
    pub const fn normals(self) -> [Direction; 2] {
        match self {
            Direction::North | Direction::South => [Direction::East, Direction::West],
            Direction::East | Direction::West => [Direction::North, Direction::South],
        }
    }

    pub fn random(rng: &mut SimRng) -> Direction {
        Direction::ALL[rng.index(Direction::ALL.len())]
    }

    /// Arrow glyph used when rendering a facing.
    pub const fn glyph(self) -> char {
        match self {
            Direction::North => '^',
            Direction::South => 'v',
            Direction::East => '>',
            Direction::West => '<',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// World identity and positions
// ---------------------------------------------------------------------------

static NEXT_WORLD_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a `World` instance. Positions carry it instead of a pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldId(pub u64);

impl WorldId {
    /// A fresh id, distinct from every other id handed out in this process.
    pub fn next() -> Self {
        Self(NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A tile coordinate, a facing, and the world the coordinate belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub direction: Direction,
    pub world: Option<WorldId>,
}

impl Position {
    /// A detached position facing north.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self {
            x,
            y,
            z,
            direction: Direction::North,
            world: None,
        }
    }

    pub const fn facing(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub const fn in_world(mut self, world: WorldId) -> Self {
        self.world = Some(world);
        self
    }

    pub const fn is_detached(&self) -> bool {
        self.world.is_none()
    }

    /// The tile one step ahead in the current facing.
    pub const fn next(&self) -> Position {
        self.step(self.direction)
    }

    /// The tile one step in `direction`, keeping the current facing.
    pub const fn step(&self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Whether both positions name the same tile (facing and world ignored).
    pub const fn same_tile(&self, other: &Position) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z
    }

    /// Straight-line distance to `(x, y)` on the same level.
    pub fn distance_to(&self, x: i32, y: i32) -> f32 {
        let dx = (x - self.x) as f32;
        let dy = (y - self.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn distance(&self, other: &Position) -> f32 {
        self.distance_to(other.x, other.y)
    }

    /// The direction that closes the larger of the two axis gaps toward
    /// `(x, y)`. Ties go to the x axis; the current facing is kept when the
    /// target is this tile.
    pub fn towards_tile(&self, x: i32, y: i32) -> Direction {
        let dx = x - self.x;
        let dy = y - self.y;
        if dx == 0 && dy == 0 {
            self.direction
        } else if dx.abs() >= dy.abs() {
            if dx > 0 { Direction::East } else { Direction::West }
        } else if dy > 0 {
            Direction::South
        } else {
            Direction::North
        }
    }

    pub fn towards(&self, other: &Position) -> Direction {
        self.towards_tile(other.x, other.y)
    }

    pub fn away_from(&self, other: &Position) -> Direction {
        self.towards(other).opposite()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}) facing {}", self.x, self.y, self.z, self.direction)
    }
}

// ---------------------------------------------------------------------------
// Entity IDs: deterministic UUID v4
// ---------------------------------------------------------------------------

/// A UUID v4 drawn from the world's PRNG.
///
/// RFC 4122 layout: version nibble 0100 in byte 6, variant bits 10 in byte 8.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimUuid(u128);

impl SimUuid {
    pub fn new_v4(rng: &mut SimRng) -> Self {
        let mut bytes = rng.next_128_bits();
        bytes[6] = (bytes[6] & 0x0F) | 0x40;
        bytes[8] = (bytes[8] & 0x3F) | 0x80;
        Self(u128::from_be_bytes(bytes))
    }

    pub fn as_bytes(&self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// Parse the 8-4-4-4-12 hex form.
    pub fn parse(s: &str) -> Option<Self> {
        let hex: String = s.chars().filter(|c| *c != '-').collect();
        if hex.len() != 32 {
            return None;
        }
        u128::from_str_radix(&hex, 16).ok().map(Self)
    }
}

// Serialized as the hex string so ids can key JSON maps.
impl Serialize for SimUuid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SimUuid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SimUuid::parse(&s).ok_or_else(|| serde::de::Error::custom("invalid UUID format"))
    }
}

impl fmt::Debug for SimUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimUuid({self})")
    }
}

impl fmt::Display for SimUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 48) as u16,
            v & 0xFFFF_FFFF_FFFF,
        )
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub SimUuid);

        impl $name {
            pub fn new(rng: &mut SimRng) -> Self {
                Self(SimUuid::new_v4(rng))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

entity_id!(/// Unique identifier for a mobile (player avatar or creature).
MobileId);
entity_id!(/// Unique identifier for an item. Two items are "the same" iff their ids match.
ItemId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_follows_the_delta_table() {
        let p = Position::new(10, 10, 0);
        assert_eq!((p.facing(Direction::North).next().x, p.facing(Direction::North).next().y), (10, 9));
        assert_eq!((p.facing(Direction::South).next().x, p.facing(Direction::South).next().y), (10, 11));
        assert_eq!((p.facing(Direction::East).next().x, p.facing(Direction::East).next().y), (11, 10));
        assert_eq!((p.facing(Direction::West).next().x, p.facing(Direction::West).next().y), (9, 10));
    }

    #[test]
    fn towards_and_next_agree() {
        let origin = Position::new(50, 50, 0);
        for d in Direction::ALL {
            let ahead = origin.step(d);
            assert_eq!(origin.towards(&ahead), d);
            assert_eq!(origin.away_from(&ahead), d.opposite());
        }
    }

    #[test]
    fn towards_prefers_the_larger_gap() {
        let p = Position::new(0, 0, 0);
        assert_eq!(p.towards_tile(5, 2), Direction::East);
        assert_eq!(p.towards_tile(-1, -7), Direction::North);
        assert_eq!(p.towards_tile(3, -3), Direction::East);
        assert_eq!(p.facing(Direction::West).towards_tile(0, 0), Direction::West);
    }

    #[test]
    fn normals_are_perpendicular() {
        for d in Direction::ALL {
            for n in d.normals() {
                let (dx, dy) = d.delta();
                let (nx, ny) = n.delta();
                assert_eq!(dx * nx + dy * ny, 0);
            }
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn detached_until_placed() {
        let p = Position::new(1, 2, 3);
        assert!(p.is_detached());
        assert!(!p.in_world(WorldId::next()).is_detached());
    }

    #[test]
    fn world_ids_are_unique() {
        let a = WorldId::next();
        let b = WorldId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn uuid_v4_version_and_variant_bits() {
        let mut rng = SimRng::new(42);
        for _ in 0..1000 {
            let bytes = SimUuid::new_v4(&mut rng).as_bytes();
            assert_eq!(bytes[6] >> 4, 4, "UUID version must be 4");
            assert_eq!(bytes[8] >> 6, 2, "UUID variant must be RFC 4122");
        }
    }

    #[test]
    fn uuid_text_form_parses_back() {
        let mut rng = SimRng::new(7);
        let id = SimUuid::new_v4(&mut rng);
        let text = id.to_string();
        assert_eq!(text.len(), 36);
        assert_eq!(SimUuid::parse(&text), Some(id));
        assert_eq!(SimUuid::parse("not-a-uuid"), None);
    }

    #[test]
    fn entity_id_determinism() {
        let mut a = SimRng::new(99);
        let mut b = SimRng::new(99);
        assert_eq!(MobileId::new(&mut a), MobileId::new(&mut b));
        assert_eq!(ItemId::new(&mut a), ItemId::new(&mut b));
    }

    #[test]
    fn ids_key_json_maps() {
        let mut rng = SimRng::new(3);
        let mut map = std::collections::BTreeMap::new();
        map.insert(MobileId::new(&mut rng), 1u32);
        let json = serde_json::to_string(&map).unwrap();
        let restored: std::collections::BTreeMap<MobileId, u32> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(map, restored);
    }
}
