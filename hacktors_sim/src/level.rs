// One depth slice of the world: a 16x16 grid of lazily created chunks.
//
// Chunks do not exist until something touches one of their tiles. The first
// access through `get_or_create_chunk` builds an empty chunk, assigns its
// origin, lets the level's generator fill it and stores it; every later
// access returns that same chunk. `chunk` is the non-creating lookup.
//
// The level keeps an occupant count that is the exact sum of its chunks'
// counts. Moves inside the level adjust it by tile deltas (see
// `actions.rs`); `set_chunk` is the one place it is rebased wholesale, by
// the full count of the chunk going out and the chunk coming in.
//
// Missile flight also lives here (`resolve_missile`): it walks the level's
// tiles and reports where the missile stopped. Applying the outcome (damage,
// hatching, dropping the item) needs the mobile arena and is done by the
// world.
//
// See also: `chunk.rs`, `generator.rs`, `world.rs` which owns levels.

use crate::chunk::Chunk;
use crate::error::{WorldResult, check_axis};
use crate::generator::Generator;
use crate::item::Item;
use crate::prng::SimRng;
use crate::types::{CHUNK_SIZE, Direction, LEVEL_CHUNKS, LEVEL_SLOTS, MobileId, WORLD_SIZE, WorldId};
use std::sync::Arc;
use tracing::trace;

/// Where a missile's flight ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissileStop {
    /// Struck the mobile on its path.
    Hit(MobileId),
    /// Came to rest on this tile.
    Land { x: i32, y: i32 },
}

#[derive(Debug)]
pub struct Level {
    z: i32,
    world: Option<WorldId>,
    chunks: Vec<Option<Box<Chunk>>>,
    generator: Arc<dyn Generator>,
    mobile_count: usize,
}

impl Level {
    pub fn new(world: Option<WorldId>, z: i32, generator: Arc<dyn Generator>) -> Self {
        Self {
            z,
            world,
            chunks: (0..LEVEL_SLOTS).map(|_| None).collect(),
            generator,
            mobile_count: 0,
        }
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    pub fn world(&self) -> Option<WorldId> {
        self.world
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    pub fn mobile_count(&self) -> usize {
        self.mobile_count
    }

    /// Number of chunks materialized so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_some()).count()
    }

    fn slot(cx: i32, cy: i32) -> WorldResult<usize> {
        check_axis('x', cx, LEVEL_CHUNKS)?;
        check_axis('y', cy, LEVEL_CHUNKS)?;
        Ok((cx + cy * LEVEL_CHUNKS) as usize)
    }

    /// Chunk coordinates of the chunk holding tile `(x, y)`.
    fn chunk_coords(x: i32, y: i32) -> WorldResult<(i32, i32)> {
        check_axis('x', x, WORLD_SIZE)?;
        check_axis('y', y, WORLD_SIZE)?;
        Ok((x / CHUNK_SIZE, y / CHUNK_SIZE))
    }

    // -----------------------------------------------------------------------
    // Chunk access
    // -----------------------------------------------------------------------

    /// The chunk at chunk coordinates `(cx, cy)`, without creating it.
    pub fn chunk(&self, cx: i32, cy: i32) -> WorldResult<Option<&Chunk>> {
        Ok(self.chunks[Self::slot(cx, cy)?].as_deref())
    }

    pub fn chunk_mut(&mut self, cx: i32, cy: i32) -> WorldResult<Option<&mut Chunk>> {
        let i = Self::slot(cx, cy)?;
        Ok(self.chunks[i].as_deref_mut())
    }

    /// The chunk at `(cx, cy)`, generating it on first access.
    pub fn get_or_create_chunk(&mut self, cx: i32, cy: i32, rng: &mut SimRng) -> WorldResult<&mut Chunk> {
        let i = Self::slot(cx, cy)?;
        let chunk = match self.chunks[i].take() {
            Some(chunk) => chunk,
            None => {
                let mut fresh = Chunk::new();
                fresh.attach(self.world, cx * CHUNK_SIZE, cy * CHUNK_SIZE, self.z);
                self.generator.fill(&mut fresh, rng)?;
                trace!(z = self.z, cx, cy, generator = self.generator.name(), "chunk materialized");
                self.mobile_count += fresh.mobile_count();
                Box::new(fresh)
            }
        };
        Ok(&mut **self.chunks[i].insert(chunk))
    }

    /// The chunk holding tile `(x, y)`, without creating it.
    pub fn chunk_at(&self, x: i32, y: i32) -> WorldResult<Option<&Chunk>> {
        let (cx, cy) = Self::chunk_coords(x, y)?;
        self.chunk(cx, cy)
    }

    pub fn chunk_at_mut(&mut self, x: i32, y: i32) -> WorldResult<Option<&mut Chunk>> {
        let (cx, cy) = Self::chunk_coords(x, y)?;
        self.chunk_mut(cx, cy)
    }

    /// The chunk holding tile `(x, y)`, generating it on first access.
    pub fn get_or_create_chunk_at(&mut self, x: i32, y: i32, rng: &mut SimRng) -> WorldResult<&mut Chunk> {
        let (cx, cy) = Self::chunk_coords(x, y)?;
        self.get_or_create_chunk(cx, cy, rng)
    }

    /// Swap the chunk at `(cx, cy)` and return the old one, detached.
    ///
    /// The level count drops by the old chunk's full count and grows by the
    /// new chunk's full count. The caller is responsible for the world count.
    pub fn set_chunk(&mut self, cx: i32, cy: i32, chunk: Option<Chunk>) -> WorldResult<Option<Box<Chunk>>> {
        let i = Self::slot(cx, cy)?;
        let mut old = self.chunks[i].take();
        if let Some(old) = old.as_deref_mut() {
            old.detach();
            self.mobile_count -= old.mobile_count();
        }
        if let Some(mut chunk) = chunk {
            chunk.attach(self.world, cx * CHUNK_SIZE, cy * CHUNK_SIZE, self.z);
            self.mobile_count += chunk.mobile_count();
            self.chunks[i] = Some(Box::new(chunk));
        }
        Ok(old)
    }

    /// Chunk coordinates of every chunk with at least one occupant, in slot
    /// order.
    pub fn occupied_chunks(&self) -> Vec<(i32, i32)> {
        if self.mobile_count == 0 {
            return Vec::new();
        }
        self.chunks
            .iter()
            .enumerate()
            .filter(|(_, c)| c.as_ref().is_some_and(|c| c.mobile_count() > 0))
            .map(|(i, _)| (i as i32 % LEVEL_CHUNKS, i as i32 / LEVEL_CHUNKS))
            .collect()
    }

    /// Apply an occupant delta coming from one of this level's chunks.
    pub(crate) fn adjust_count(&mut self, delta: isize) {
        self.mobile_count = self.mobile_count.saturating_add_signed(delta);
    }

    // -----------------------------------------------------------------------
    // Missiles
    // -----------------------------------------------------------------------

    /// Walk a missile from `(x, y)` toward `direction` for up to its range.
    ///
    /// Flight stops before a solid tile or the level edge. An occupied tile
    /// stops it too: non-eggs hit the occupant, eggs land one tile short.
    pub fn resolve_missile(
        &mut self,
        item: &Item,
        x: i32,
        y: i32,
        direction: Direction,
        rng: &mut SimRng,
    ) -> WorldResult<MissileStop> {
        let (dx, dy) = direction.delta();
        let (mut cx, mut cy) = (x, y);
        for _ in 0..item.range() {
            let (nx, ny) = (cx + dx, cy + dy);
            if !(0..WORLD_SIZE).contains(&nx) || !(0..WORLD_SIZE).contains(&ny) {
                break;
            }
            let chunk = self.get_or_create_chunk_at(nx, ny, rng)?;
            if let Some(target) = chunk.mobile(nx, ny)? {
                if item.kind.is_egg() {
                    break;
                }
                return Ok(MissileStop::Hit(target));
            }
            if chunk.block(nx, ny)?.is_solid() {
                break;
            }
            cx = nx;
            cy = ny;
        }
        Ok(MissileStop::Land { x: cx, y: cy })
    }
}
