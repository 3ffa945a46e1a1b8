// Terrain generators.
//
// A `Generator` fills a freshly created chunk exactly once, right after the
// owning level has assigned the chunk its origin. Generators only touch the
// chunk they are handed (through the `*_local` setters) and draw all their
// randomness from the world's `SimRng`.
//
// Each level is assigned one generator when it is created (see
// `choose_level_generator`): either a fixed terrain generator for the whole
// level, or `RandomGenerator`, which picks a terrain generator per chunk.
//
// The stock terrains:
// - `EmptyGenerator`:    nothing.
// - `PlainGenerator`:    a handful of random blocks.
// - `ForestGenerator`:   scattered trees plus a few random blocks.
// - `MountainGenerator`: dense stone plus a few random blocks.
// - `VillageGenerator`:  up to four 6x6 houses on fixed lots, each with
//                        walls, one door and a chest in the middle.
//
// **Critical constraint: determinism.** Generation must consume the PRNG in
// a fixed order for a given chunk so the same seed builds the same map.

use crate::block::Block;
use crate::catalog::BlockType;
use crate::chunk::Chunk;
use crate::config::WorldConfig;
use crate::error::WorldResult;
use crate::prng::SimRng;
use crate::types::{CHUNK_SIZE, CHUNK_TILES};
use std::fmt;
use std::sync::Arc;

/// Fills a newly created chunk.
pub trait Generator: fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn fill(&self, chunk: &mut Chunk, rng: &mut SimRng) -> WorldResult<()>;
}

/// Place `n` blocks at random tiles. `kind: None` picks a random type per
/// block.
fn scatter(chunk: &mut Chunk, rng: &mut SimRng, n: usize, kind: Option<BlockType>) -> WorldResult<()> {
    for _ in 0..n {
        let x = rng.range_i32(0, CHUNK_SIZE);
        let y = rng.range_i32(0, CHUNK_SIZE);
        let kind = kind.unwrap_or_else(|| BlockType::choose(rng));
        let block = Block::create(kind, rng);
        chunk.set_block_local(x, y, block)?;
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct EmptyGenerator;

impl Generator for EmptyGenerator {
    fn name(&self) -> &'static str {
        "empty"
    }

    fn fill(&self, _chunk: &mut Chunk, _rng: &mut SimRng) -> WorldResult<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct PlainGenerator;

impl Generator for PlainGenerator {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn fill(&self, chunk: &mut Chunk, rng: &mut SimRng) -> WorldResult<()> {
        let n = rng.index(CHUNK_TILES / 10 + 5);
        scatter(chunk, rng, n, None)
    }
}

#[derive(Debug, Default)]
pub struct ForestGenerator;

impl Generator for ForestGenerator {
    fn name(&self) -> &'static str {
        "forest"
    }

    fn fill(&self, chunk: &mut Chunk, rng: &mut SimRng) -> WorldResult<()> {
        scatter(chunk, rng, CHUNK_TILES / 8, Some(BlockType::Tree))?;
        let n = rng.index(10);
        scatter(chunk, rng, n, None)
    }
}

#[derive(Debug, Default)]
pub struct MountainGenerator;

impl Generator for MountainGenerator {
    fn name(&self) -> &'static str {
        "mountain"
    }

    fn fill(&self, chunk: &mut Chunk, rng: &mut SimRng) -> WorldResult<()> {
        scatter(chunk, rng, CHUNK_TILES / 2, Some(BlockType::Stone))?;
        let n = rng.index(10);
        scatter(chunk, rng, n, None)
    }
}

// ---------------------------------------------------------------------------
// Village
// ---------------------------------------------------------------------------

/// Top-left corner of each house lot, chunk-local.
pub const HOUSE_LOTS: [(i32, i32); 4] = [(1, 1), (1, 9), (9, 1), (9, 9)];
/// Side length of a house, walls included.
pub const HOUSE_SIZE: i32 = 6;
/// Candidate door tiles, relative to the lot corner.
pub const DOOR_SPOTS: [(i32, i32); 4] = [(3, 0), (0, 3), (5, 2), (2, 5)];
/// Chest tile, relative to the lot corner.
pub const CHEST_SPOT: (i32, i32) = (3, 3);

#[derive(Debug)]
pub struct VillageGenerator {
    /// Probability that a given lot gets a house.
    pub house_chance: f32,
}

impl Default for VillageGenerator {
    fn default() -> Self {
        Self {
            house_chance: WorldConfig::default().village_house_chance,
        }
    }
}

impl VillageGenerator {
    fn build_house(
        &self,
        chunk: &mut Chunk,
        rng: &mut SimRng,
        (hx, hy): (i32, i32),
        wall: BlockType,
    ) -> WorldResult<()> {
        let last = HOUSE_SIZE - 1;
        for j in 1..last {
            for (x, y) in [(j, 0), (j, last), (0, j), (last, j)] {
                chunk.set_block_local(hx + x, hy + y, Block::new(wall))?;
            }
        }
        if rng.coin() {
            for (x, y) in [(0, 0), (last, 0), (0, last), (last, last)] {
                chunk.set_block_local(hx + x, hy + y, Block::new(wall))?;
            }
        }

        let (dx, dy) = DOOR_SPOTS[rng.index(DOOR_SPOTS.len())];
        let door = if rng.coin() {
            BlockType::OpenDoor
        } else {
            BlockType::ClosedDoor
        };
        chunk.set_block_local(hx + dx, hy + dy, Block::new(door))?;

        let chest = if rng.coin() {
            Block::create(BlockType::ClosedChest, rng)
        } else {
            Block::new(BlockType::OpenChest)
        };
        let (cx, cy) = CHEST_SPOT;
        chunk.set_block_local(hx + cx, hy + cy, chest)?;
        Ok(())
    }
}

impl Generator for VillageGenerator {
    fn name(&self) -> &'static str {
        "village"
    }

    fn fill(&self, chunk: &mut Chunk, rng: &mut SimRng) -> WorldResult<()> {
        let wall = if rng.coin() {
            BlockType::Stone
        } else {
            BlockType::Earth
        };
        for lot in HOUSE_LOTS {
            if rng.chance(self.house_chance) {
                self.build_house(chunk, rng, lot, wall)?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Per-chunk random choice
// ---------------------------------------------------------------------------

/// Delegates each chunk to a uniformly chosen generator.
#[derive(Debug)]
pub struct RandomGenerator {
    choices: Vec<Arc<dyn Generator>>,
}

impl RandomGenerator {
    /// Returns `None` for an empty choice list.
    pub fn new(choices: Vec<Arc<dyn Generator>>) -> Option<Self> {
        (!choices.is_empty()).then_some(Self { choices })
    }
}

impl Generator for RandomGenerator {
    fn name(&self) -> &'static str {
        "random"
    }

    fn fill(&self, chunk: &mut Chunk, rng: &mut SimRng) -> WorldResult<()> {
        let i = rng.index(self.choices.len());
        self.choices[i].fill(chunk, rng)
    }
}

/// The stock terrain set.
pub fn terrain_generators(config: &WorldConfig) -> Vec<Arc<dyn Generator>> {
    vec![
        Arc::new(EmptyGenerator),
        Arc::new(PlainGenerator),
        Arc::new(ForestGenerator),
        Arc::new(MountainGenerator),
        Arc::new(VillageGenerator {
            house_chance: config.village_house_chance,
        }),
    ]
}

/// Pick the generator for a new level: the per-chunk random generator with
/// probability `random_level_chance`, otherwise one terrain for the whole
/// level.
pub fn choose_level_generator(config: &WorldConfig, rng: &mut SimRng) -> Arc<dyn Generator> {
    let terrains = terrain_generators(config);
    if rng.chance(config.random_level_chance)
        && let Some(random) = RandomGenerator::new(terrains.clone())
    {
        return Arc::new(random);
    }
    let i = rng.index(terrains.len());
    terrains[i].clone()
}
