// 16x16 tile grid, the smallest lazily generated unit of the map.
//
// A chunk owns three parallel per-tile arrays: the block, the occupying
// mobile (by id; the mobile itself lives in the world's arena), and the items
// lying on the floor. It also caches how many tiles are occupied, which the
// level and world aggregate.
//
// Every accessor comes in two flavors: `*_local` takes chunk-local
// coordinates in `0..CHUNK_SIZE` and fails with `OutOfBounds` otherwise; the
// plain form takes absolute world coordinates and subtracts the chunk's
// origin first.
//
// Occupancy is written only through `set_mobile_local`, which is
// crate-private: the world's relocation protocol (see `actions.rs`) calls it
// and takes care of the mobile's own position, its notifications and the
// ancestor counts. A chunk never reaches out to the mobiles it references.
//
// See also: `level.rs` which owns chunks and assigns their origin,
// `generator.rs` for what fills a chunk on creation.

use crate::block::Block;
use crate::error::{WorldError, WorldResult, check_axis};
use crate::item::Item;
use crate::types::{CHUNK_SIZE, CHUNK_TILES, ItemId, MobileId, WorldId};

#[derive(Clone, Debug)]
pub struct Chunk {
    /// World x of the top-left tile.
    origin_x: i32,
    /// World y of the top-left tile.
    origin_y: i32,
    z: i32,
    world: Option<WorldId>,
    blocks: Vec<Block>,
    mobiles: Vec<Option<MobileId>>,
    items: Vec<Vec<Item>>,
    mobile_count: usize,
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunk {
    /// An empty, detached chunk: every block `EMPTY`, nobody home.
    pub fn new() -> Self {
        Self {
            origin_x: 0,
            origin_y: 0,
            z: 0,
            world: None,
            blocks: vec![Block::EMPTY; CHUNK_TILES],
            mobiles: vec![None; CHUNK_TILES],
            items: vec![Vec::new(); CHUNK_TILES],
            mobile_count: 0,
        }
    }

    /// Record where this chunk sits. Called by the owning level.
    pub(crate) fn attach(&mut self, world: Option<WorldId>, origin_x: i32, origin_y: i32, z: i32) {
        self.world = world;
        self.origin_x = origin_x;
        self.origin_y = origin_y;
        self.z = z;
    }

    pub(crate) fn detach(&mut self) {
        self.world = None;
    }

    pub fn world(&self) -> Option<WorldId> {
        self.world
    }

    pub fn origin(&self) -> (i32, i32, i32) {
        (self.origin_x, self.origin_y, self.z)
    }

    pub fn mobile_count(&self) -> usize {
        self.mobile_count
    }

    fn index(x: i32, y: i32) -> WorldResult<usize> {
        check_axis('x', x, CHUNK_SIZE)?;
        check_axis('y', y, CHUNK_SIZE)?;
        Ok((x + y * CHUNK_SIZE) as usize)
    }

    fn to_local(&self, x: i32, y: i32) -> (i32, i32) {
        (x - self.origin_x, y - self.origin_y)
    }

    // -----------------------------------------------------------------------
    // Blocks
    // -----------------------------------------------------------------------

    pub fn block_local(&self, x: i32, y: i32) -> WorldResult<&Block> {
        Ok(&self.blocks[Self::index(x, y)?])
    }

    pub fn block_local_mut(&mut self, x: i32, y: i32) -> WorldResult<&mut Block> {
        let i = Self::index(x, y)?;
        Ok(&mut self.blocks[i])
    }

    /// Replace the block on a tile, returning the old one. A solid block
    /// cannot go on an occupied tile.
    pub fn set_block_local(&mut self, x: i32, y: i32, block: Block) -> WorldResult<Block> {
        let i = Self::index(x, y)?;
        if block.is_solid() && self.mobiles[i].is_some() {
            return Err(WorldError::TileOccupied {
                x: x + self.origin_x,
                y: y + self.origin_y,
            });
        }
        Ok(std::mem::replace(&mut self.blocks[i], block))
    }

    pub fn block(&self, x: i32, y: i32) -> WorldResult<&Block> {
        let (lx, ly) = self.to_local(x, y);
        self.block_local(lx, ly)
    }

    pub fn block_mut(&mut self, x: i32, y: i32) -> WorldResult<&mut Block> {
        let (lx, ly) = self.to_local(x, y);
        self.block_local_mut(lx, ly)
    }

    pub fn set_block(&mut self, x: i32, y: i32, block: Block) -> WorldResult<Block> {
        let (lx, ly) = self.to_local(x, y);
        self.set_block_local(lx, ly, block)
    }

    // -----------------------------------------------------------------------
    // Occupancy
    // -----------------------------------------------------------------------

    pub fn mobile_local(&self, x: i32, y: i32) -> WorldResult<Option<MobileId>> {
        Ok(self.mobiles[Self::index(x, y)?])
    }

    pub fn mobile(&self, x: i32, y: i32) -> WorldResult<Option<MobileId>> {
        let (lx, ly) = self.to_local(x, y);
        self.mobile_local(lx, ly)
    }

    pub fn is_occupied(&self, x: i32, y: i32) -> WorldResult<bool> {
        Ok(self.mobile(x, y)?.is_some())
    }

    /// Write a tile's occupant slot and keep the local count exact.
    ///
    /// Placing a mobile on a solid tile fails. Returns the previous
    /// occupant, which the caller must detach.
    pub(crate) fn set_mobile_local(
        &mut self,
        x: i32,
        y: i32,
        mobile: Option<MobileId>,
    ) -> WorldResult<Option<MobileId>> {
        let i = Self::index(x, y)?;
        if mobile.is_some() && self.blocks[i].is_solid() {
            return Err(WorldError::SolidTile {
                x: x + self.origin_x,
                y: y + self.origin_y,
            });
        }
        let previous = std::mem::replace(&mut self.mobiles[i], mobile);
        match (previous.is_some(), mobile.is_some()) {
            (false, true) => self.mobile_count += 1,
            (true, false) => self.mobile_count -= 1,
            _ => {}
        }
        Ok(previous)
    }

    pub(crate) fn set_mobile(
        &mut self,
        x: i32,
        y: i32,
        mobile: Option<MobileId>,
    ) -> WorldResult<Option<MobileId>> {
        let (lx, ly) = self.to_local(x, y);
        self.set_mobile_local(lx, ly, mobile)
    }

    /// Snapshot of every occupant in row-major tile order.
    pub fn actors(&self) -> Vec<MobileId> {
        if self.mobile_count == 0 {
            return Vec::new();
        }
        self.mobiles.iter().flatten().copied().collect()
    }

    // -----------------------------------------------------------------------
    // Floor items
    // -----------------------------------------------------------------------

    pub fn items_local(&self, x: i32, y: i32) -> WorldResult<&[Item]> {
        Ok(&self.items[Self::index(x, y)?])
    }

    /// Drop an item on a tile. An item already lying there is not added
    /// twice.
    pub fn add_item_local(&mut self, x: i32, y: i32, item: Item) -> WorldResult<()> {
        let i = Self::index(x, y)?;
        let stack = &mut self.items[i];
        if !stack.iter().any(|it| it.id == item.id) {
            stack.push(item);
        }
        Ok(())
    }

    pub fn remove_item_local(&mut self, x: i32, y: i32, item: ItemId) -> WorldResult<Item> {
        let i = Self::index(x, y)?;
        let stack = &mut self.items[i];
        match stack.iter().position(|it| it.id == item) {
            Some(pos) => Ok(stack.remove(pos)),
            None => Err(WorldError::ItemNotFound { item }),
        }
    }

    pub fn take_items_local(&mut self, x: i32, y: i32) -> WorldResult<Vec<Item>> {
        let i = Self::index(x, y)?;
        Ok(std::mem::take(&mut self.items[i]))
    }

    pub fn items(&self, x: i32, y: i32) -> WorldResult<&[Item]> {
        let (lx, ly) = self.to_local(x, y);
        self.items_local(lx, ly)
    }

    pub fn add_item(&mut self, x: i32, y: i32, item: Item) -> WorldResult<()> {
        let (lx, ly) = self.to_local(x, y);
        self.add_item_local(lx, ly, item)
    }

    pub fn remove_item(&mut self, x: i32, y: i32, item: ItemId) -> WorldResult<Item> {
        let (lx, ly) = self.to_local(x, y);
        self.remove_item_local(lx, ly, item)
    }

    pub fn take_items(&mut self, x: i32, y: i32) -> WorldResult<Vec<Item>> {
        let (lx, ly) = self.to_local(x, y);
        self.take_items_local(lx, ly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BlockType, ItemType};
    use crate::prng::SimRng;

    fn ids(n: usize) -> Vec<MobileId> {
        let mut rng = SimRng::new(77);
        (0..n).map(|_| MobileId::new(&mut rng)).collect()
    }

    #[test]
    fn local_bounds_are_enforced() {
        let chunk = Chunk::new();
        assert!(chunk.block_local(0, 0).is_ok());
        assert!(chunk.block_local(15, 15).is_ok());
        assert!(matches!(
            chunk.block_local(16, 0),
            Err(WorldError::OutOfBounds { axis: 'x', value: 16, .. })
        ));
        assert!(matches!(
            chunk.mobile_local(0, -1),
            Err(WorldError::OutOfBounds { axis: 'y', value: -1, .. })
        ));
    }

    #[test]
    fn absolute_accessors_subtract_the_origin() {
        let mut chunk = Chunk::new();
        chunk.attach(Some(WorldId::next()), 32, 48, 3);
        chunk.set_block(33, 50, Block::new(BlockType::Stone)).unwrap();
        assert_eq!(chunk.block_local(1, 2).unwrap().kind(), BlockType::Stone);
        assert!(chunk.block(31, 48).is_err());
        assert!(chunk.block(48, 48).is_err());
    }

    #[test]
    fn count_follows_placements() {
        let mut chunk = Chunk::new();
        let m = ids(2);
        assert_eq!(chunk.set_mobile_local(1, 1, Some(m[0])).unwrap(), None);
        assert_eq!(chunk.mobile_count(), 1);
        // Replacing an occupant keeps the count and hands back the old one.
        assert_eq!(chunk.set_mobile_local(1, 1, Some(m[1])).unwrap(), Some(m[0]));
        assert_eq!(chunk.mobile_count(), 1);
        assert_eq!(chunk.set_mobile_local(1, 1, None).unwrap(), Some(m[1]));
        assert_eq!(chunk.mobile_count(), 0);
        assert_eq!(chunk.set_mobile_local(1, 1, None).unwrap(), None);
        assert_eq!(chunk.mobile_count(), 0);
    }

    #[test]
    fn solid_tiles_reject_mobiles() {
        let mut chunk = Chunk::new();
        chunk.set_block_local(2, 2, Block::new(BlockType::Tree)).unwrap();
        let m = ids(1);
        assert_eq!(
            chunk.set_mobile_local(2, 2, Some(m[0])),
            Err(WorldError::SolidTile { x: 2, y: 2 })
        );
        assert_eq!(chunk.mobile_count(), 0);
    }

    #[test]
    fn occupied_tiles_reject_solid_blocks() {
        let mut chunk = Chunk::new();
        let m = ids(1);
        chunk.set_mobile_local(4, 5, Some(m[0])).unwrap();
        assert_eq!(
            chunk.set_block_local(4, 5, Block::new(BlockType::Stone)),
            Err(WorldError::TileOccupied { x: 4, y: 5 })
        );
        // Walkable blocks are fine.
        assert!(chunk.set_block_local(4, 5, Block::new(BlockType::Trap)).is_ok());
    }

    #[test]
    fn actors_snapshot_in_tile_order() {
        let mut chunk = Chunk::new();
        assert!(chunk.actors().is_empty());
        let m = ids(3);
        chunk.set_mobile_local(5, 9, Some(m[0])).unwrap();
        chunk.set_mobile_local(0, 0, Some(m[1])).unwrap();
        chunk.set_mobile_local(15, 0, Some(m[2])).unwrap();
        assert_eq!(chunk.actors(), vec![m[1], m[2], m[0]]);
    }

    #[test]
    fn items_are_a_set_per_tile() {
        let mut rng = SimRng::new(3);
        let mut chunk = Chunk::new();
        let apple = Item::create(ItemType::Apple, &mut rng);
        chunk.add_item_local(3, 3, apple.clone()).unwrap();
        chunk.add_item_local(3, 3, apple.clone()).unwrap();
        assert_eq!(chunk.items_local(3, 3).unwrap().len(), 1);
        assert_eq!(chunk.remove_item_local(3, 3, apple.id).unwrap(), apple);
        assert_eq!(
            chunk.remove_item_local(3, 3, apple.id),
            Err(WorldError::ItemNotFound { item: apple.id })
        );
    }
}
