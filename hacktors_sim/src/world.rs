// The world: a stack of lazily created levels plus the mobile arena.
//
// `World` owns everything: `levels` (one slot per depth, `None` until first
// touched), the `mobiles` arena keyed by `MobileId`, the single `SimRng`, the
// config, the clock, and the queue of pending controller notifications.
// Tiles reference mobiles by id and mobiles reference their world by
// `WorldId`, so there are no pointer cycles.
//
// Counts: `mobile_count` is the exact sum of every level's count, which is
// the exact sum of its chunks' counts. All three are maintained
// incrementally by the relocation protocol in `actions.rs`.
//
// The per-cycle cascade lives in `update`: every level with occupants, then
// every occupied chunk, then each occupant in tile order. Each occupant's
// controller is taken out of the mobile, asked to `act`, put back, and then
// the notifications queued during its turn are dispatched. A mobile acts at
// most once per cycle, even if it walks into a chunk that is visited later.
//
// See also: `actions.rs` / `combat.rs` for the verbs, `clock.rs` for the
// loop that calls `update`, `level.rs` and `chunk.rs` for the grids.
//
// **Critical constraint: determinism.** Levels and chunks are visited in
// index order, occupants in tile order, and the arena is a `BTreeMap`.
// All randomness comes from `rng`.

use crate::ai::CreatureController;
use crate::block::Block;
use crate::catalog::MobileType;
use crate::chunk::Chunk;
use crate::clock::Clock;
use crate::config::WorldConfig;
use crate::controller::Controller;
use crate::error::{WorldError, WorldResult};
use crate::event::MobileEvent;
use crate::generator::{Generator, choose_level_generator};
use crate::item::Item;
use crate::level::Level;
use crate::mobile::Mobile;
use crate::prng::SimRng;
use crate::types::{CHUNK_SIZE, MobileId, Position, WORLD_DEPTH, WORLD_SIZE, WorldId};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug)]
pub struct World {
    pub(crate) id: WorldId,
    pub(crate) levels: Vec<Option<Box<Level>>>,
    pub(crate) mobile_count: usize,
    pub(crate) mobiles: BTreeMap<MobileId, Mobile>,
    pub(crate) rng: SimRng,
    pub(crate) config: WorldConfig,
    pub(crate) clock: Clock,
    pub(crate) pending: Vec<(MobileId, MobileEvent)>,
    /// When set, every level uses this generator instead of a random pick.
    level_generator: Option<Arc<dyn Generator>>,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        let clock = Clock::new(config.clock_mode, Duration::from_millis(config.cycle_duration_ms));
        let world = Self {
            id: WorldId::next(),
            levels: (0..WORLD_DEPTH).map(|_| None).collect(),
            mobile_count: 0,
            mobiles: BTreeMap::new(),
            rng: SimRng::new(config.seed),
            config,
            clock,
            pending: Vec::new(),
            level_generator: None,
        };
        info!(world = world.id.0, seed = world.config.seed, "world created");
        world
    }

    /// A world whose levels all use `generator`.
    pub fn with_generator(config: WorldConfig, generator: Arc<dyn Generator>) -> Self {
        let mut world = Self::new(config);
        world.level_generator = Some(generator);
        world
    }

    pub fn id(&self) -> WorldId {
        self.id
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Ask the running clock to stop after the current cycle.
    pub fn request_stop(&self) {
        self.clock.stop_handle().stop();
    }

    pub fn rng_mut(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    /// Number of placed mobiles.
    pub fn mobile_count(&self) -> usize {
        self.mobile_count
    }

    // -----------------------------------------------------------------------
    // Positions and grid lookup
    // -----------------------------------------------------------------------

    pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        (0..WORLD_SIZE).contains(&x) && (0..WORLD_SIZE).contains(&y) && (0..WORLD_DEPTH).contains(&z)
    }

    /// A position is valid iff it belongs to this world and lies inside it.
    pub fn is_valid(&self, position: &Position) -> bool {
        position.world == Some(self.id) && Self::in_bounds(position.x, position.y, position.z)
    }

    pub(crate) fn check_position(x: i32, y: i32, z: i32) -> WorldResult<()> {
        if Self::in_bounds(x, y, z) {
            Ok(())
        } else {
            Err(WorldError::InvalidPosition { x, y, z })
        }
    }

    /// A detached position at `(x, y, z)` tagged with this world.
    pub fn position(&self, x: i32, y: i32, z: i32) -> Position {
        Position::new(x, y, z).in_world(self.id)
    }

    pub fn level(&self, z: i32) -> Option<&Level> {
        if !(0..WORLD_DEPTH).contains(&z) {
            return None;
        }
        self.levels[z as usize].as_deref()
    }

    /// Every materialized level, top to bottom.
    pub fn levels(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter().flatten().map(|l| &**l)
    }

    pub fn get_or_create_level(&mut self, z: i32) -> WorldResult<&mut Level> {
        Self::check_position(0, 0, z)?;
        let World {
            id,
            levels,
            rng,
            config,
            level_generator,
            ..
        } = self;
        materialize_level(levels, *id, z, level_generator.as_ref(), config, rng)
    }

    /// The chunk holding `position`, created on first access. `None` when
    /// the position is not valid in this world.
    pub fn get_or_create_chunk(&mut self, position: &Position) -> WorldResult<Option<&mut Chunk>> {
        if !self.is_valid(position) {
            return Ok(None);
        }
        self.get_or_create_chunk_at(position.x, position.y, position.z).map(Some)
    }

    /// The chunk holding tile `(x, y, z)`, created on first access.
    pub fn get_or_create_chunk_at(&mut self, x: i32, y: i32, z: i32) -> WorldResult<&mut Chunk> {
        Self::check_position(x, y, z)?;
        let World {
            id,
            levels,
            rng,
            config,
            level_generator,
            ..
        } = self;
        let level = materialize_level(levels, *id, z, level_generator.as_ref(), config, rng)?;
        level.get_or_create_chunk_at(x, y, rng)
    }

    /// Level `z` together with the PRNG, for operations that need both.
    pub(crate) fn level_and_rng(&mut self, z: i32) -> WorldResult<(&mut Level, &mut SimRng)> {
        Self::check_position(0, 0, z)?;
        let World {
            id,
            levels,
            rng,
            config,
            level_generator,
            ..
        } = self;
        let level = materialize_level(levels, *id, z, level_generator.as_ref(), config, rng)?;
        Ok((level, rng))
    }

    /// The chunk holding tile `(x, y, z)` if it already exists.
    pub fn chunk(&self, x: i32, y: i32, z: i32) -> Option<&Chunk> {
        if !Self::in_bounds(x, y, z) {
            return None;
        }
        self.level(z)?.chunk_at(x, y).ok().flatten()
    }

    pub(crate) fn chunk_mut(&mut self, x: i32, y: i32, z: i32) -> Option<&mut Chunk> {
        if !Self::in_bounds(x, y, z) {
            return None;
        }
        self.levels[z as usize].as_deref_mut()?.chunk_at_mut(x, y).ok().flatten()
    }

    /// Block on an existing tile; never creates chunks.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> Option<&Block> {
        self.chunk(x, y, z)?.block(x, y).ok()
    }

    /// Occupant of an existing tile; never creates chunks.
    pub fn mobile_at(&self, x: i32, y: i32, z: i32) -> Option<MobileId> {
        self.chunk(x, y, z)?.mobile(x, y).ok().flatten()
    }

    /// Floor items on an existing tile; never creates chunks.
    pub fn items_at(&self, x: i32, y: i32, z: i32) -> &[Item] {
        self.chunk(x, y, z)
            .and_then(|c| c.items(x, y).ok())
            .unwrap_or(&[])
    }

    /// Swap out a whole chunk. Occupants of the outgoing chunk are
    /// detached, and the level and world counts are rebased by the full
    /// counts of both chunks.
    pub fn replace_chunk(&mut self, cx: i32, cy: i32, z: i32, chunk: Chunk) -> WorldResult<Option<Box<Chunk>>> {
        Self::check_position(cx * CHUNK_SIZE, cy * CHUNK_SIZE, z)?;
        let incoming = chunk.mobile_count();
        let old = self.get_or_create_level(z)?.set_chunk(cx, cy, Some(chunk))?;
        if let Some(old) = old.as_deref() {
            self.mobile_count -= old.mobile_count();
            for id in old.actors() {
                if let Some(m) = self.mobiles.get_mut(&id) {
                    m.position.world = None;
                    self.pending.push((id, MobileEvent::PositionChanged { changed_level: false }));
                }
            }
        }
        self.mobile_count += incoming;
        Ok(old)
    }

    // -----------------------------------------------------------------------
    // Mobile arena
    // -----------------------------------------------------------------------

    pub fn mobile(&self, id: MobileId) -> Option<&Mobile> {
        self.mobiles.get(&id)
    }

    pub fn mobile_mut(&mut self, id: MobileId) -> Option<&mut Mobile> {
        self.mobiles.get_mut(&id)
    }

    pub(crate) fn mobile_ref(&self, id: MobileId) -> WorldResult<&Mobile> {
        self.mobiles.get(&id).ok_or(WorldError::UnknownMobile { mobile: id })
    }

    pub(crate) fn mobile_ref_mut(&mut self, id: MobileId) -> WorldResult<&mut Mobile> {
        self.mobiles.get_mut(&id).ok_or(WorldError::UnknownMobile { mobile: id })
    }

    pub fn mobiles(&self) -> impl Iterator<Item = &Mobile> {
        self.mobiles.values()
    }

    /// Ids of every mobile currently on a tile, in id order.
    pub fn placed_mobiles(&self) -> Vec<MobileId> {
        self.mobiles
            .values()
            .filter(|m| m.is_placed())
            .map(|m| m.id)
            .collect()
    }

    /// Create a detached mobile, rolling its type's droppings into its
    /// equipment.
    pub fn create_mobile(&mut self, kind: MobileType, controller: Box<dyn Controller>) -> MobileId {
        let id = MobileId::new(&mut self.rng);
        let mut mobile = Mobile::new(id, kind, controller);
        for slot in kind.droppings() {
            if self.rng.chance(self.config.dropping_chance) {
                let item = match slot {
                    Some(kind) => Item::create(*kind, &mut self.rng),
                    None => Item::random(&mut self.rng),
                };
                // Droppings never exceed the cap.
                let _ = mobile.add_item(item);
            }
        }
        self.mobiles.insert(id, mobile);
        id
    }

    /// Spawn a creature driven by the stock AI.
    pub fn spawn(&mut self, kind: MobileType, x: i32, y: i32, z: i32) -> WorldResult<MobileId> {
        self.spawn_with(kind, x, y, z, Box::new(CreatureController::default()))
    }

    /// Create a mobile and place it on `(x, y, z)`, which must be inside the
    /// world, walkable and free.
    pub fn spawn_with(
        &mut self,
        kind: MobileType,
        x: i32,
        y: i32,
        z: i32,
        controller: Box<dyn Controller>,
    ) -> WorldResult<MobileId> {
        let chunk = self.get_or_create_chunk_at(x, y, z)?;
        if chunk.block(x, y)?.is_solid() {
            return Err(WorldError::SolidTile { x, y });
        }
        if chunk.is_occupied(x, y)? {
            return Err(WorldError::TileOccupied { x, y });
        }
        let id = self.create_mobile(kind, controller);
        if let Err(err) = self.place_mobile(id, x, y, z) {
            self.mobiles.remove(&id);
            return Err(err);
        }
        debug!(%id, %kind, x, y, z, "mobile spawned");
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    pub(crate) fn emit(&mut self, mobile: MobileId, event: MobileEvent) {
        self.pending.push((mobile, event));
    }

    /// Notifications queued but not yet delivered.
    pub fn pending_events(&self) -> &[(MobileId, MobileEvent)] {
        &self.pending
    }

    /// Deliver every queued notification to its mobile's controller. A
    /// mobile is removed from the arena once its `Died` has been delivered.
    pub fn dispatch_events(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for (id, event) in pending {
            if let Some(controller) = self.mobiles.get_mut(&id).and_then(|m| m.controller.as_mut()) {
                controller.notify(id, &event);
            }
            if event == MobileEvent::Died {
                self.mobiles.remove(&id);
                debug!(%id, "mobile removed");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Cycle update
    // -----------------------------------------------------------------------

    /// Give every placed mobile its turn for the current cycle.
    pub fn update(&mut self) -> WorldResult<()> {
        if self.mobile_count == 0 {
            return Ok(());
        }
        let cycle = self.clock.cycle();
        for z in 0..self.levels.len() {
            let occupied = match self.levels[z].as_deref() {
                Some(level) if level.mobile_count() > 0 => level.occupied_chunks(),
                _ => continue,
            };
            for (cx, cy) in occupied {
                let actors = match self.levels[z].as_deref() {
                    Some(level) => match level.chunk(cx, cy)? {
                        Some(chunk) => chunk.actors(),
                        None => continue,
                    },
                    None => continue,
                };
                for id in actors {
                    self.activate(id, cycle)?;
                }
            }
        }
        Ok(())
    }

    fn activate(&mut self, id: MobileId, cycle: u64) -> WorldResult<()> {
        let Some(mobile) = self.mobiles.get_mut(&id) else {
            return Ok(());
        };
        if !mobile.is_placed() || !mobile.is_alive() || mobile.acted_cycle == Some(cycle) {
            return Ok(());
        }
        mobile.acted_cycle = Some(cycle);
        let Some(mut controller) = mobile.controller.take() else {
            return Ok(());
        };
        let result = controller.act(self, id);
        if let Some(mobile) = self.mobiles.get_mut(&id) {
            mobile.controller = Some(controller);
        }
        self.dispatch_events();
        result
    }
}

/// Level `z`, created with its generator on first access.
fn materialize_level<'a>(
    levels: &'a mut [Option<Box<Level>>],
    world: WorldId,
    z: i32,
    fixed: Option<&Arc<dyn Generator>>,
    config: &WorldConfig,
    rng: &mut SimRng,
) -> WorldResult<&'a mut Level> {
    let slot = &mut levels[z as usize];
    let level = match slot.take() {
        Some(level) => level,
        None => {
            let generator = match fixed {
                Some(generator) => generator.clone(),
                None => choose_level_generator(config, rng),
            };
            info!(z, generator = generator.name(), "level created");
            Box::new(Level::new(Some(world), z, generator))
        }
    };
    Ok(&mut **slot.insert(level))
}
