// Fighting: melee, damage resolution, death, and thrown items.
//
// Melee uses the attacker's best carried item for the target (mobile damage
// against mobiles, block damage against blocks), falling back to the
// creature's bare-handed damage when nothing beats it or the creature cannot
// use tools. The item used wears out by one and is discarded when it breaks.
//
// Damage against a mobile first goes through its armor, in equipment order:
// each piece soaks up to its remaining life, and spent pieces are dropped.
// Only what gets through is reported as `Damaged`. Traps bypass armor. A
// mobile at zero life or below leaves its tile at once and is sent `Died`;
// the arena entry goes away after that notification is delivered.
//
// A destroyed block turns into empty floor and leaves its loot (chest
// content plus, for some kinds, a block item) on the tile.
//
// Missiles: `fire` takes the item out of the equipment and lets the level
// trace its flight (`Level::resolve_missile`). A hit damages the target and
// the missile falls at its feet; a landing egg on a free tile hatches,
// anything else wears by one use and lies where it landed.
//
// See also: `actions.rs` for the relocation protocol and the other verbs,
// `event.rs` for `DamageSource`.

use crate::block::Block;
use crate::error::WorldResult;
use crate::event::{DamageSource, MobileEvent};
use crate::item::Item;
use crate::level::MissileStop;
use crate::types::MobileId;
use crate::world::World;
use tracing::{debug, info};

impl World {
    /// Attack whatever is ahead: the occupant if there is one, otherwise a
    /// damageable block.
    pub fn attack(&mut self, id: MobileId) -> WorldResult<bool> {
        let Some(at) = self
            .actor_position(id)?
            .map(|p| p.next())
            .filter(|p| Self::in_bounds(p.x, p.y, p.z))
        else {
            return Ok(false);
        };
        let chunk = self.get_or_create_chunk_at(at.x, at.y, at.z)?;
        if let Some(target) = chunk.mobile(at.x, at.y)? {
            self.attack_mobile(id, target)?;
            return Ok(true);
        }
        if chunk.block(at.x, at.y)?.kind().is_damageable() {
            self.attack_block(id, at.x, at.y, at.z)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Hit `target` with the attacker's best weapon or bare hands. Returns
    /// whether the target died.
    pub fn attack_mobile(&mut self, attacker: MobileId, target: MobileId) -> WorldResult<bool> {
        let a = self.mobile_ref(attacker)?;
        let kind = a.kind;
        let best = a.best_item(Item::mobile_damage);
        let (damage, weapon) = match best {
            Some(i) => (a.equipment[i].mobile_damage(), Some(a.equipment[i].kind)),
            None => (kind.damage(), None),
        };
        let target_kind = self.mobile_ref(target)?.kind;

        let killed = self.damage_mobile(target, damage, DamageSource::Mobile { attacker, kind })?;
        self.emit(attacker, MobileEvent::AttackedMobile {
            target,
            target_kind,
            weapon,
            killed,
        });
        if let Some(i) = best {
            self.use_item_at(attacker, i)?;
        }
        Ok(killed)
    }

    /// Hit the block at `(x, y, z)`. Returns whether it was destroyed.
    pub fn attack_block(&mut self, attacker: MobileId, x: i32, y: i32, z: i32) -> WorldResult<bool> {
        let a = self.mobile_ref(attacker)?;
        let best = a.best_item(Item::block_damage);
        let (damage, weapon) = match best {
            Some(i) => (a.equipment[i].block_damage(), Some(a.equipment[i].kind)),
            None => (a.kind.damage(), None),
        };

        let chunk = self.get_or_create_chunk_at(x, y, z)?;
        let block = chunk.block_mut(x, y)?;
        let kind = block.kind();
        let destroyed = block.damage(damage);
        if destroyed {
            let wreck = chunk.set_block(x, y, Block::EMPTY)?;
            let loot = wreck.into_loot(&mut self.rng);
            debug!(%kind, x, y, z, loot = loot.len(), "block destroyed");
            let chunk = self.get_or_create_chunk_at(x, y, z)?;
            for item in loot {
                chunk.add_item(x, y, item)?;
            }
        }

        self.emit(attacker, MobileEvent::AttackedBlock {
            block: kind,
            weapon,
            destroyed,
        });
        if let Some(i) = best {
            self.use_item_at(attacker, i)?;
        }
        Ok(destroyed)
    }

    /// Apply `amount` damage from `source` to `id`, armor first. Returns
    /// whether the mobile died.
    pub fn damage_mobile(&mut self, id: MobileId, amount: i32, source: DamageSource) -> WorldResult<bool> {
        let cycle = self.clock.cycle();
        let m = self.mobile_ref_mut(id)?;
        if !m.is_alive() {
            return Ok(false);
        }

        let mut remaining = amount.max(0);
        let mut spent = Vec::new();
        if source.is_absorbed_by_armor() {
            let mut i = 0;
            while i < m.equipment.len() && remaining > 0 {
                let piece = &mut m.equipment[i];
                if !piece.kind.is_armor() {
                    i += 1;
                    continue;
                }
                let soaked = remaining.min(piece.life);
                piece.life -= soaked;
                remaining -= soaked;
                if piece.is_destroyed() {
                    spent.push(m.equipment.remove(i));
                } else {
                    i += 1;
                }
            }
        }

        match source {
            DamageSource::Mobile { attacker, .. }
            | DamageSource::Missile {
                shooter: Some(attacker),
                ..
            } => {
                m.last_attacker = Some(attacker);
                m.last_attacked_cycle = cycle;
            }
            _ => {}
        }

        m.life -= remaining;
        let killed = !m.is_alive();

        for item in spent {
            self.emit(id, MobileEvent::ItemRemoved { item });
        }
        if remaining > 0 {
            self.emit(id, MobileEvent::Damaged {
                amount: remaining,
                source,
            });
        }
        if killed {
            self.kill(id)?;
        }
        Ok(killed)
    }

    /// Take a dead mobile off the grid and tell it so.
    pub(crate) fn kill(&mut self, id: MobileId) -> WorldResult<()> {
        let m = self.mobile_ref(id)?;
        let (kind, pos) = (m.kind, m.position);
        self.detach_mobile(id)?;
        self.emit(id, MobileEvent::Died);
        info!(%id, %kind, x = pos.x, y = pos.y, z = pos.z, "mobile died");
        Ok(())
    }

    /// Who hurt `id` recently enough to be remembered.
    pub fn last_attacker(&self, id: MobileId) -> WorldResult<Option<MobileId>> {
        let m = self.mobile_ref(id)?;
        Ok(m.last_attacker(self.clock.cycle(), self.config.forget_cycles))
    }

    // -----------------------------------------------------------------------
    // Missiles
    // -----------------------------------------------------------------------

    /// Throw the item at `index` in the facing direction.
    pub fn fire(&mut self, id: MobileId, index: usize) -> WorldResult<bool> {
        let Some(pos) = self.actor_position(id)? else {
            return Ok(false);
        };
        let Some(missile) = self.take_item_at(id, index)? else {
            return Ok(false);
        };
        let (level, rng) = self.level_and_rng(pos.z)?;
        let stop = level.resolve_missile(&missile, pos.x, pos.y, pos.direction, rng)?;
        debug!(%id, item = %missile.kind, ?stop, "missile fired");
        match stop {
            MissileStop::Hit(target) => {
                self.hit_by(target, missile, Some(id))?;
            }
            MissileStop::Land { x, y } => self.land_missile(missile, x, y, pos.z)?,
        }
        Ok(true)
    }

    /// `target` is struck by a thrown `missile`. The missile then drops on
    /// the target's tile unless it broke. Returns whether the target died.
    pub fn hit_by(&mut self, target: MobileId, missile: Item, shooter: Option<MobileId>) -> WorldResult<bool> {
        let pos = self.position_of(target)?;
        let source = DamageSource::Missile {
            kind: missile.kind,
            shooter,
        };
        let killed = self.damage_mobile(target, missile.mobile_damage(), source)?;
        self.drop_worn(missile, pos.x, pos.y, pos.z)?;
        Ok(killed)
    }

    fn land_missile(&mut self, missile: Item, x: i32, y: i32, z: i32) -> WorldResult<()> {
        if let Some(kind) = missile.kind.hatches() {
            let chunk = self.get_or_create_chunk_at(x, y, z)?;
            let free = !chunk.is_occupied(x, y)? && !chunk.block(x, y)?.is_solid();
            if free {
                let hatchling = self.spawn(kind, x, y, z)?;
                debug!(%hatchling, %kind, x, y, z, "egg hatched");
                return Ok(());
            }
            let chunk = self.get_or_create_chunk_at(x, y, z)?;
            chunk.add_item(x, y, missile)?;
            return Ok(());
        }
        self.drop_worn(missile, x, y, z)
    }

    /// Wear `item` by one use and leave it on the tile if it survives.
    fn drop_worn(&mut self, mut item: Item, x: i32, y: i32, z: i32) -> WorldResult<()> {
        if item.use_once() {
            return Ok(());
        }
        self.get_or_create_chunk_at(x, y, z)?.add_item(x, y, item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BlockType, ItemType, MobileType};
    use crate::config::WorldConfig;
    use crate::controller::Idle;
    use crate::generator::EmptyGenerator;
    use crate::types::Direction;
    use std::sync::Arc;

    fn world() -> World {
        let config = WorldConfig {
            dropping_chance: 0.0,
            ..WorldConfig::default()
        };
        World::with_generator(config, Arc::new(EmptyGenerator))
    }

    fn spawn(world: &mut World, kind: MobileType, x: i32, y: i32) -> MobileId {
        world.spawn_with(kind, x, y, 0, Box::new(Idle)).unwrap()
    }

    fn arm(world: &mut World, id: MobileId, kind: ItemType, life: i32) {
        let item = Item::create(kind, world.rng_mut()).with_life(life);
        assert!(world.give_item(id, item).unwrap());
    }

    fn count(world: &World, id: MobileId, wanted: &MobileEvent) -> usize {
        world
            .pending_events()
            .iter()
            .filter(|(m, e)| *m == id && e == wanted)
            .count()
    }

    #[test]
    fn sword_kills_a_zombie_in_four_blows() {
        let mut w = world();
        let human = spawn(&mut w, MobileType::Human, 10, 10);
        arm(&mut w, human, ItemType::Sword, 100);
        arm(&mut w, human, ItemType::Key, 10);
        let zombie = spawn(&mut w, MobileType::Zombie, 10, 9);

        for _ in 0..3 {
            assert!(w.attack(human).unwrap());
        }
        assert_eq!(w.mobile(zombie).unwrap().life(), 10);
        assert!(w.attack(human).unwrap());

        assert_eq!(count(&w, zombie, &MobileEvent::Died), 1);
        assert_eq!(w.mobile_at(10, 9, 0), None);
        assert_eq!(w.mobile_count(), 1);
        assert_eq!(w.mobile(human).unwrap().equipment()[0].life, 96);
        assert!(w.pending_events().contains(&(
            human,
            MobileEvent::AttackedMobile {
                target: zombie,
                target_kind: MobileType::Zombie,
                weapon: Some(ItemType::Sword),
                killed: true,
            }
        )));

        w.dispatch_events();
        assert!(w.mobile(zombie).is_none());
        // Nothing left to hit.
        assert!(!w.attack(human).unwrap());
    }

    #[test]
    fn armor_soaks_damage_and_breaks() {
        let mut w = world();
        let human = spawn(&mut w, MobileType::Human, 10, 10);
        arm(&mut w, human, ItemType::Helm, 4);
        let zombie = spawn(&mut w, MobileType::Zombie, 10, 9);
        w.dispatch_events();

        assert!(!w.attack_mobile(zombie, human).unwrap());
        let m = w.mobile(human).unwrap();
        assert_eq!(m.life(), 94);
        assert!(m.equipment().is_empty());
        assert!(w.pending_events().contains(&(
            human,
            MobileEvent::Damaged {
                amount: 6,
                source: DamageSource::Mobile {
                    attacker: zombie,
                    kind: MobileType::Zombie,
                },
            }
        )));
    }

    #[test]
    fn fully_absorbed_blows_report_no_damage() {
        let mut w = world();
        let human = spawn(&mut w, MobileType::Human, 10, 10);
        arm(&mut w, human, ItemType::Chestplate, 50);
        let dog = spawn(&mut w, MobileType::Dog, 10, 9);
        w.dispatch_events();

        w.attack_mobile(dog, human).unwrap();
        assert_eq!(w.mobile(human).unwrap().life(), 100);
        assert_eq!(w.mobile(human).unwrap().equipment()[0].life, 40);
        assert!(
            !w.pending_events()
                .iter()
                .any(|(_, e)| matches!(e, MobileEvent::Damaged { .. }))
        );
    }

    #[test]
    fn attackers_are_remembered_for_a_while() {
        let mut w = world();
        let pig = spawn(&mut w, MobileType::Pig, 10, 10);
        let dog = spawn(&mut w, MobileType::Dog, 10, 9);
        w.attack_mobile(dog, pig).unwrap();
        assert_eq!(w.last_attacker(pig).unwrap(), Some(dog));
        for _ in 0..w.config().forget_cycles {
            w.clock.advance();
        }
        assert_eq!(w.last_attacker(pig).unwrap(), None);
    }

    #[test]
    fn destroyed_blocks_leave_loot() {
        let mut w = world();
        let human = spawn(&mut w, MobileType::Human, 10, 10);
        w.get_or_create_chunk_at(10, 9, 0)
            .unwrap()
            .set_block(10, 9, Block::new(BlockType::Tree))
            .unwrap();

        // Bare hands: 5 per blow against 30 life.
        for _ in 0..5 {
            assert!(!w.attack_block(human, 10, 9, 0).unwrap());
        }
        assert_eq!(w.block_at(10, 9, 0).unwrap().life(), 5);
        assert!(w.attack_block(human, 10, 9, 0).unwrap());
        assert_eq!(w.block_at(10, 9, 0).unwrap().kind(), BlockType::Empty);
        let loot: Vec<_> = w.items_at(10, 9, 0).iter().map(|i| i.kind).collect();
        assert_eq!(loot, vec![ItemType::Stick, ItemType::Apple]);
    }

    #[test]
    fn pick_axe_fells_a_tree_in_one_blow() {
        let mut w = world();
        let human = spawn(&mut w, MobileType::Human, 10, 10);
        arm(&mut w, human, ItemType::PickAxe, 1);
        w.get_or_create_chunk_at(10, 9, 0)
            .unwrap()
            .set_block(10, 9, Block::new(BlockType::Tree))
            .unwrap();
        assert!(w.attack(human).unwrap());
        assert_eq!(w.block_at(10, 9, 0).unwrap().kind(), BlockType::Empty);
        // The pick axe had one use left.
        assert!(w.mobile(human).unwrap().equipment().is_empty());
    }

    #[test]
    fn bedrock_and_floor_cannot_be_attacked() {
        let mut w = world();
        let human = spawn(&mut w, MobileType::Human, 10, 10);
        assert!(!w.attack(human).unwrap());
        w.get_or_create_chunk_at(10, 9, 0)
            .unwrap()
            .set_block(10, 9, Block::BEDROCK)
            .unwrap();
        assert!(!w.attack(human).unwrap());
    }

    #[test]
    fn thrown_dagger_hits_and_drops() {
        let mut w = world();
        let human = spawn(&mut w, MobileType::Human, 10, 10);
        w.turn(human, Direction::East).unwrap();
        arm(&mut w, human, ItemType::Dagger, 30);
        let pig = spawn(&mut w, MobileType::Pig, 13, 10);

        assert!(w.fire(human, 0).unwrap());
        assert_eq!(w.mobile(pig).unwrap().life(), 5);
        assert_eq!(w.last_attacker(pig).unwrap(), Some(human));
        let dropped = w.items_at(13, 10, 0);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].life, 29);
        assert!(w.mobile(human).unwrap().equipment().is_empty());
    }

    #[test]
    fn missiles_stop_before_walls() {
        let mut w = world();
        let human = spawn(&mut w, MobileType::Human, 10, 10);
        w.turn(human, Direction::East).unwrap();
        arm(&mut w, human, ItemType::Dagger, 30);
        w.get_or_create_chunk_at(12, 10, 0)
            .unwrap()
            .set_block(12, 10, Block::new(BlockType::Stone))
            .unwrap();
        assert!(w.fire(human, 0).unwrap());
        assert_eq!(w.items_at(11, 10, 0).len(), 1);
    }

    #[test]
    fn worn_out_missiles_vanish() {
        let mut w = world();
        let human = spawn(&mut w, MobileType::Human, 10, 10);
        arm(&mut w, human, ItemType::Stick, 1);
        assert!(w.fire(human, 0).unwrap());
        assert!(w.items_at(10, 9, 0).is_empty());
        assert!(w.items_at(10, 10, 0).is_empty());
    }

    #[test]
    fn eggs_hatch_where_they_land() {
        let mut w = world();
        let human = spawn(&mut w, MobileType::Human, 10, 10);
        w.turn(human, Direction::East).unwrap();
        arm(&mut w, human, ItemType::DogEgg, 1);
        assert!(w.fire(human, 0).unwrap());
        let dog = w.mobile_at(15, 10, 0).unwrap();
        assert_eq!(w.mobile(dog).unwrap().kind, MobileType::Dog);
        assert_eq!(w.mobile_count(), 2);
    }

    #[test]
    fn eggs_land_short_of_mobiles() {
        let mut w = world();
        let human = spawn(&mut w, MobileType::Human, 10, 10);
        w.turn(human, Direction::East).unwrap();
        arm(&mut w, human, ItemType::PigEgg, 1);
        let zombie = spawn(&mut w, MobileType::Zombie, 13, 10);
        assert!(w.fire(human, 0).unwrap());
        assert_eq!(w.mobile(zombie).unwrap().life(), 100);
        let hatched = w.mobile_at(12, 10, 0).unwrap();
        assert_eq!(w.mobile(hatched).unwrap().kind, MobileType::Pig);
    }

    #[test]
    fn eggs_blocked_at_once_fall_at_the_thrower() {
        let mut w = world();
        let human = spawn(&mut w, MobileType::Human, 10, 10);
        w.turn(human, Direction::East).unwrap();
        arm(&mut w, human, ItemType::HumanEgg, 1);
        spawn(&mut w, MobileType::Pig, 11, 10);
        assert!(w.fire(human, 0).unwrap());
        assert_eq!(w.mobile_count(), 2);
        let kinds: Vec<_> = w.items_at(10, 10, 0).iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![ItemType::HumanEgg]);
    }

    #[test]
    fn fire_needs_an_item() {
        let mut w = world();
        let human = spawn(&mut w, MobileType::Human, 10, 10);
        assert!(!w.fire(human, 0).unwrap());
    }
}
