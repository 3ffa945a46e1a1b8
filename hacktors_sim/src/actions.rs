// Mobile verbs and the relocation protocol.
//
// Moving a mobile is never a single field write. `set_mobile` is the one
// routine that changes where a mobile stands, and it keeps four things in
// step: the destination tile's occupant slot, the origin tile's slot, the
// mobile's own `Position`, and the chunk/level/world counts. Callers validate
// first (`try_relocate` checks bounds, solidity and occupancy without
// touching anything), so a refused move leaves no trace.
//
// The verbs are the soft-failure surface controllers work with: each returns
// `Ok(true)` if it did something, `Ok(false)` if the situation did not allow
// it (wall ahead, no key, nothing to pick up, detached or dead actor), and
// `Err` only for hard failures such as an unknown mobile id.
//
// Changing level (`go_up` / `go_down`) repairs the paired stairs tile on the
// destination level when generation left something else there, and reports
// `changed_level: true` in the position notification.
//
// See also: `combat.rs` for attacks, damage and missiles, `command.rs` for
// the `Command` entry point that maps onto these verbs.

use crate::block::Block;
use crate::catalog::{BlockType, ItemType};
use crate::error::{WorldError, WorldResult};
use crate::event::{DamageSource, MobileEvent};
use crate::item::Item;
use crate::types::{Direction, ItemId, MobileId, Position, WORLD_DEPTH};
use crate::world::World;

impl World {
    // -----------------------------------------------------------------------
    // Relocation protocol
    // -----------------------------------------------------------------------

    /// Put `id` on tile `(x, y, z)`, wherever it was before.
    ///
    /// Any other mobile already on that tile is evicted (left detached, with
    /// a `PositionChanged` notification). Fails without changing anything if
    /// the tile is outside the world or solid.
    pub fn place_mobile(&mut self, id: MobileId, x: i32, y: i32, z: i32) -> WorldResult<()> {
        self.set_mobile(id, x, y, z)
    }

    pub(crate) fn set_mobile(&mut self, id: MobileId, x: i32, y: i32, z: i32) -> WorldResult<()> {
        let old = self.mobile_ref(id)?.position;
        Self::check_position(x, y, z)?;
        let was_placed = !old.is_detached();
        if was_placed && old.x == x && old.y == y && old.z == z {
            return Ok(());
        }

        // Destination first: this is the only step that can still fail.
        let previous = self.get_or_create_chunk_at(x, y, z)?.set_mobile(x, y, Some(id))?;
        match previous {
            Some(evicted) if evicted != id => {
                if let Some(m) = self.mobiles.get_mut(&evicted) {
                    m.position.world = None;
                }
                self.emit(evicted, MobileEvent::PositionChanged { changed_level: false });
            }
            Some(_) => {}
            None => self.adjust_counts(z, 1),
        }

        if was_placed {
            self.clear_tile(id, old.x, old.y, old.z)?;
        }

        let world = self.id;
        let m = self.mobile_ref_mut(id)?;
        m.position = Position {
            x,
            y,
            z,
            direction: old.direction,
            world: Some(world),
        };
        self.emit(id, MobileEvent::PositionChanged {
            changed_level: was_placed && old.z != z,
        });
        Ok(())
    }

    /// Empty the slot at `(x, y, z)` if it still holds `id`.
    fn clear_tile(&mut self, id: MobileId, x: i32, y: i32, z: i32) -> WorldResult<()> {
        let Some(chunk) = self.chunk_mut(x, y, z) else {
            return Ok(());
        };
        if chunk.mobile(x, y)? == Some(id) {
            chunk.set_mobile(x, y, None)?;
            self.adjust_counts(z, -1);
        }
        Ok(())
    }

    /// Take `id` off the grid. Its position keeps the last coordinates but
    /// no longer names a world.
    pub(crate) fn detach_mobile(&mut self, id: MobileId) -> WorldResult<()> {
        let pos = self.mobile_ref(id)?.position;
        if pos.is_detached() {
            return Ok(());
        }
        self.clear_tile(id, pos.x, pos.y, pos.z)?;
        self.mobile_ref_mut(id)?.position.world = None;
        Ok(())
    }

    fn adjust_counts(&mut self, z: i32, delta: isize) {
        if let Some(level) = self.levels[z as usize].as_deref_mut() {
            level.adjust_count(delta);
        }
        self.mobile_count = self.mobile_count.saturating_add_signed(delta);
    }

    /// Move `id` to `(x, y, z)` if that tile is inside the world, walkable
    /// and free.
    pub(crate) fn try_relocate(&mut self, id: MobileId, x: i32, y: i32, z: i32) -> WorldResult<bool> {
        if !Self::in_bounds(x, y, z) {
            return Ok(false);
        }
        let chunk = self.get_or_create_chunk_at(x, y, z)?;
        if chunk.block(x, y)?.is_solid() || chunk.is_occupied(x, y)? {
            return Ok(false);
        }
        self.set_mobile(id, x, y, z)?;
        Ok(true)
    }

    /// Where `id` stands, if it is alive and placed. Unknown ids are an
    /// error.
    pub(crate) fn actor_position(&self, id: MobileId) -> WorldResult<Option<Position>> {
        let m = self.mobile_ref(id)?;
        Ok((m.is_placed() && m.is_alive()).then_some(m.position))
    }

    /// Where `id` stands. Detached mobiles are an error.
    pub fn position_of(&self, id: MobileId) -> WorldResult<Position> {
        let m = self.mobile_ref(id)?;
        if m.is_placed() {
            Ok(m.position)
        } else {
            Err(WorldError::Detached { mobile: id })
        }
    }

    /// The tile ahead of `id`, if `id` can act and the tile is in the world.
    fn ahead(&self, id: MobileId) -> WorldResult<Option<Position>> {
        Ok(self
            .actor_position(id)?
            .map(|p| p.next())
            .filter(|p| Self::in_bounds(p.x, p.y, p.z)))
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    /// Face `direction`. Always succeeds for a known mobile.
    pub fn turn(&mut self, id: MobileId, direction: Direction) -> WorldResult<bool> {
        self.mobile_ref_mut(id)?.position.direction = direction;
        self.emit(id, MobileEvent::DirectionChanged);
        Ok(true)
    }

    /// Step one tile forward. Landing on a trap hurts.
    pub fn move_forward(&mut self, id: MobileId) -> WorldResult<bool> {
        let Some(next) = self.ahead(id)? else {
            return Ok(false);
        };
        if !self.try_relocate(id, next.x, next.y, next.z)? {
            return Ok(false);
        }
        let on_trap = self
            .block_at(next.x, next.y, next.z)
            .is_some_and(|b| b.kind() == BlockType::Trap);
        if on_trap {
            let damage = self.config.trap_damage;
            self.damage_mobile(id, damage, DamageSource::Block(BlockType::Trap))?;
        }
        Ok(true)
    }

    /// Climb the stairs-up under `id`: z decreases by one.
    pub fn go_up(&mut self, id: MobileId) -> WorldResult<bool> {
        self.change_level(id, BlockType::StairsUp, BlockType::StairsDown, -1)
    }

    /// Descend the stairs-down under `id`: z increases by one.
    pub fn go_down(&mut self, id: MobileId) -> WorldResult<bool> {
        self.change_level(id, BlockType::StairsDown, BlockType::StairsUp, 1)
    }

    fn change_level(&mut self, id: MobileId, from: BlockType, to: BlockType, dz: i32) -> WorldResult<bool> {
        let Some(pos) = self.actor_position(id)? else {
            return Ok(false);
        };
        let here = self.get_or_create_chunk_at(pos.x, pos.y, pos.z)?.block(pos.x, pos.y)?.kind();
        let z = pos.z + dz;
        if here != from || !(0..WORLD_DEPTH).contains(&z) {
            return Ok(false);
        }
        let chunk = self.get_or_create_chunk_at(pos.x, pos.y, z)?;
        if chunk.is_occupied(pos.x, pos.y)? {
            return Ok(false);
        }
        if chunk.block(pos.x, pos.y)?.kind() != to {
            chunk.set_block(pos.x, pos.y, Block::new(to))?;
        }
        self.set_mobile(id, pos.x, pos.y, z)?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Doors and chests
    // -----------------------------------------------------------------------

    /// Open the closed door or chest ahead. Needs a key, which wears out;
    /// without one a door is attacked instead.
    pub fn open(&mut self, id: MobileId) -> WorldResult<bool> {
        let Some(at) = self.ahead(id)? else {
            return Ok(false);
        };
        let kind = self.get_or_create_chunk_at(at.x, at.y, at.z)?.block(at.x, at.y)?.kind();
        let opened = match kind {
            BlockType::ClosedDoor => BlockType::OpenDoor,
            BlockType::ClosedChest => BlockType::OpenChest,
            _ => return Ok(false),
        };
        match self.mobile_ref(id)?.find_item(ItemType::Key) {
            Some(key) => {
                self.use_item_at(id, key)?;
                self.swap_block(at, opened)?;
                Ok(true)
            }
            None if kind == BlockType::ClosedDoor => {
                self.attack_block(id, at.x, at.y, at.z)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Close the open door or chest ahead. Needs a key. A door cannot close
    /// on a mobile standing in it.
    pub fn close(&mut self, id: MobileId) -> WorldResult<bool> {
        let Some(at) = self.ahead(id)? else {
            return Ok(false);
        };
        let chunk = self.get_or_create_chunk_at(at.x, at.y, at.z)?;
        let kind = chunk.block(at.x, at.y)?.kind();
        let closed = match kind {
            BlockType::OpenDoor => BlockType::ClosedDoor,
            BlockType::OpenChest => BlockType::ClosedChest,
            _ => return Ok(false),
        };
        if closed.is_solid() && chunk.is_occupied(at.x, at.y)? {
            return Ok(false);
        }
        let Some(key) = self.mobile_ref(id)?.find_item(ItemType::Key) else {
            return Ok(false);
        };
        self.use_item_at(id, key)?;
        self.swap_block(at, closed)?;
        Ok(true)
    }

    /// Replace the block at `at` with a fresh `kind`, keeping chest content.
    fn swap_block(&mut self, at: Position, kind: BlockType) -> WorldResult<()> {
        let chunk = self.get_or_create_chunk_at(at.x, at.y, at.z)?;
        let content = chunk.block_mut(at.x, at.y)?.take_content();
        chunk.set_block(at.x, at.y, Block::with_content(kind, content))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Inventory
    // -----------------------------------------------------------------------

    /// Hand `item` to `id`. Returns `false` (and drops the item) when the
    /// equipment is full or already holds it.
    pub fn give_item(&mut self, id: MobileId, item: Item) -> WorldResult<bool> {
        let added = self.mobile_ref_mut(id)?.add_item(item.clone()).is_ok();
        if added {
            self.emit(id, MobileEvent::ItemAdded { item });
        }
        Ok(added)
    }

    /// Remove an item from `id`'s equipment by id.
    pub fn take_item(&mut self, id: MobileId, item: ItemId) -> WorldResult<Option<Item>> {
        let removed = self.mobile_ref_mut(id)?.remove_item(item);
        if let Some(item) = &removed {
            self.emit(id, MobileEvent::ItemRemoved { item: item.clone() });
        }
        Ok(removed)
    }

    /// Remove the item at `index` from `id`'s equipment.
    pub(crate) fn take_item_at(&mut self, id: MobileId, index: usize) -> WorldResult<Option<Item>> {
        let removed = self.mobile_ref_mut(id)?.remove_item_at(index);
        if let Some(item) = &removed {
            self.emit(id, MobileEvent::ItemRemoved { item: item.clone() });
        }
        Ok(removed)
    }

    /// Wear the item at `index` by one use, discarding it when it breaks.
    pub(crate) fn use_item_at(&mut self, id: MobileId, index: usize) -> WorldResult<()> {
        let broke = match self.mobile_ref_mut(id)?.equipment.get_mut(index) {
            Some(item) => item.use_once(),
            None => false,
        };
        if broke {
            self.take_item_at(id, index)?;
        }
        Ok(())
    }

    /// Eat the first edible item carried, if not already at full life.
    /// Life is capped at the type's maximum; poison can kill.
    pub fn eat(&mut self, id: MobileId) -> WorldResult<bool> {
        let m = self.mobile_ref(id)?;
        let max = m.kind.max_life();
        if !m.is_alive() || m.life >= max {
            return Ok(false);
        }
        let Some(index) = m.equipment.iter().position(|it| it.kind.is_edible()) else {
            return Ok(false);
        };
        let Some(food) = self.take_item_at(id, index)? else {
            return Ok(false);
        };
        let m = self.mobile_ref_mut(id)?;
        m.life = (m.life + food.kind.food()).min(max);
        let dead = m.life <= 0;
        self.emit(id, MobileEvent::Ate { item: food });
        if dead {
            self.kill(id)?;
        }
        Ok(true)
    }

    /// Pick up what lies on the floor, then what an open chest here holds,
    /// until the equipment is full.
    pub fn pick_up(&mut self, id: MobileId) -> WorldResult<bool> {
        let Some(pos) = self.actor_position(id)? else {
            return Ok(false);
        };
        let (x, y) = (pos.x, pos.y);

        let floor = self.get_or_create_chunk_at(x, y, pos.z)?.take_items(x, y)?;
        let (mut taken, leftover) = self.stow(id, floor)?;
        let chunk = self.get_or_create_chunk_at(x, y, pos.z)?;
        for item in leftover {
            chunk.add_item(x, y, item)?;
        }

        let block = chunk.block_mut(x, y)?;
        if block.kind() == BlockType::OpenChest {
            let content = block.take_content();
            let (from_chest, leftover) = self.stow(id, content)?;
            taken.extend(from_chest);
            if let Some(content) = self.get_or_create_chunk_at(x, y, pos.z)?.block_mut(x, y)?.content_mut() {
                *content = leftover;
            }
        }

        if taken.is_empty() {
            return Ok(false);
        }
        self.emit(id, MobileEvent::PickedUp { items: taken });
        Ok(true)
    }

    /// Add as many of `items` as fit. Returns `(taken, leftover)`.
    fn stow(&mut self, id: MobileId, items: Vec<Item>) -> WorldResult<(Vec<Item>, Vec<Item>)> {
        let m = self.mobile_ref_mut(id)?;
        let mut taken = Vec::new();
        let mut leftover = Vec::new();
        for item in items {
            match m.add_item(item.clone()) {
                Ok(()) => taken.push(item),
                Err(item) => leftover.push(item),
            }
        }
        Ok((taken, leftover))
    }

    /// Lay the first carried block item on the empty tile ahead.
    pub fn lay_block(&mut self, id: MobileId) -> WorldResult<bool> {
        let Some(at) = self.ahead(id)? else {
            return Ok(false);
        };
        let Some((index, kind)) = self
            .mobile_ref(id)?
            .equipment
            .iter()
            .enumerate()
            .find_map(|(i, it)| Some((i, it.block_type?)))
        else {
            return Ok(false);
        };
        let chunk = self.get_or_create_chunk_at(at.x, at.y, at.z)?;
        if !chunk.block(at.x, at.y)?.is_empty() || (kind.is_solid() && chunk.is_occupied(at.x, at.y)?) {
            return Ok(false);
        }
        let block = Block::create(kind, &mut self.rng);
        self.take_item_at(id, index)?;
        self.get_or_create_chunk_at(at.x, at.y, at.z)?
            .set_block(at.x, at.y, block)?;
        Ok(true)
    }

    /// Forge an Iron and a Stick into a random craftable item on the anvil
    /// ahead.
    pub fn craft(&mut self, id: MobileId) -> WorldResult<bool> {
        let Some(at) = self.ahead(id)? else {
            return Ok(false);
        };
        let anvil = self.get_or_create_chunk_at(at.x, at.y, at.z)?.block(at.x, at.y)?.kind() == BlockType::Anvil;
        let m = self.mobile_ref(id)?;
        if !anvil || !m.has_item(ItemType::Iron) || !m.has_item(ItemType::Stick) {
            return Ok(false);
        }
        for kind in [ItemType::Iron, ItemType::Stick] {
            if let Some(index) = self.mobile_ref(id)?.find_item(kind) {
                self.take_item_at(id, index)?;
            }
        }
        let kind = ItemType::choose_craftable(&mut self.rng);
        let item = Item::create(kind, &mut self.rng);
        self.give_item(id, item)?;
        Ok(true)
    }
}
