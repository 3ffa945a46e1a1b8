// End-to-end scenarios against the public world API.
//
// Each test builds a small world, drives mobiles through the same verbs the
// controllers use, and checks the grid, the counts and the notifications
// that come out. Worlds use the empty generator unless a test is about
// terrain, so tiles start as open floor.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hacktors_sim::block::Block;
use hacktors_sim::catalog::{BlockType, ItemType, MobileType};
use hacktors_sim::chunk::Chunk;
use hacktors_sim::config::WorldConfig;
use hacktors_sim::controller::Idle;
use hacktors_sim::event::MobileEvent;
use hacktors_sim::generator::{CHEST_SPOT, DOOR_SPOTS, EmptyGenerator, Generator, HOUSE_LOTS, VillageGenerator};
use hacktors_sim::item::Item;
use hacktors_sim::mobile::MAX_EQUIPMENT;
use hacktors_sim::prng::SimRng;
use hacktors_sim::types::{MobileId, Position};
use hacktors_sim::{World, WorldResult};

fn quiet_config() -> WorldConfig {
    WorldConfig {
        dropping_chance: 0.0,
        ..WorldConfig::default()
    }
}

fn empty_world() -> World {
    World::with_generator(quiet_config(), Arc::new(EmptyGenerator))
}

fn put_block(world: &mut World, x: i32, y: i32, z: i32, kind: BlockType) {
    world
        .get_or_create_chunk_at(x, y, z)
        .unwrap()
        .set_block(x, y, Block::new(kind))
        .unwrap();
}

// ---------------------------------------------------------------------------
// Combat
// ---------------------------------------------------------------------------

#[test]
fn sword_wielder_kills_zombie_in_four_blows() {
    let mut world = empty_world();
    let human = world.spawn_with(MobileType::Human, 50, 50, 0, Box::new(Idle)).unwrap();
    let sword = Item::create(ItemType::Sword, world.rng_mut()).with_life(100);
    let key = Item::create(ItemType::Key, world.rng_mut());
    assert!(world.give_item(human, sword).unwrap());
    assert!(world.give_item(human, key).unwrap());
    let zombie = world.spawn_with(MobileType::Zombie, 50, 49, 0, Box::new(Idle)).unwrap();
    world.dispatch_events();

    for _ in 0..4 {
        assert!(world.attack(human).unwrap());
    }

    let deaths = world
        .pending_events()
        .iter()
        .filter(|(id, event)| *id == zombie && *event == MobileEvent::Died)
        .count();
    assert_eq!(deaths, 1);
    assert_eq!(world.mobile_at(50, 49, 0), None);
    assert_eq!(world.mobile_count(), 1);
    world.dispatch_events();
    assert!(world.mobile(zombie).is_none());
}

#[test]
fn a_block_falls_to_a_blow_at_least_its_life() {
    let mut world = empty_world();
    let human = world.spawn_with(MobileType::Human, 8, 8, 2, Box::new(Idle)).unwrap();
    let pick = Item::create(ItemType::PickAxe, world.rng_mut()).with_life(10);
    world.give_item(human, pick).unwrap();
    put_block(&mut world, 8, 7, 2, BlockType::Earth);

    assert!(world.attack_block(human, 8, 7, 2).unwrap());
    assert_eq!(world.block_at(8, 7, 2).unwrap().kind(), BlockType::Empty);
    let loot = world.items_at(8, 7, 2);
    assert_eq!(loot.len(), 1);
    assert_eq!(loot[0].kind, ItemType::Block);
    assert_eq!(loot[0].block_type, Some(BlockType::Earth));
}

// ---------------------------------------------------------------------------
// Relocation
// ---------------------------------------------------------------------------

#[test]
fn going_up_lands_on_repaired_stairs() {
    let mut world = empty_world();
    let human = world.spawn_with(MobileType::Human, 30, 30, 5, Box::new(Idle)).unwrap();
    put_block(&mut world, 30, 30, 5, BlockType::StairsUp);
    put_block(&mut world, 30, 30, 4, BlockType::Anvil);
    world.dispatch_events();

    assert!(world.go_up(human).unwrap());
    let pos = world.mobile(human).unwrap().position();
    assert_eq!((pos.x, pos.y, pos.z), (30, 30, 4));
    assert!(world.is_valid(&pos));
    assert_eq!(world.block_at(30, 30, 4).unwrap().kind(), BlockType::StairsDown);
    assert_eq!(
        world.pending_events(),
        &[(human, MobileEvent::PositionChanged { changed_level: true })]
    );
}

#[test]
fn validity_checks_world_and_bounds() {
    let world = empty_world();
    let stranger = empty_world();
    assert!(world.is_valid(&world.position(0, 0, 0)));
    assert!(world.is_valid(&world.position(255, 255, 255)));
    for (x, y, z) in [(-1, 0, 0), (0, 256, 0), (0, 0, -1), (0, 0, 256)] {
        assert!(!world.is_valid(&world.position(x, y, z)));
    }
    assert!(!world.is_valid(&stranger.position(3, 3, 3)));
    assert!(!world.is_valid(&Position::new(3, 3, 3)));
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

#[test]
fn equipment_holds_ten_distinct_items() {
    let mut world = empty_world();
    let human = world.spawn_with(MobileType::Human, 1, 1, 0, Box::new(Idle)).unwrap();
    let first = Item::create(ItemType::Stick, world.rng_mut());
    assert!(world.give_item(human, first.clone()).unwrap());
    assert!(!world.give_item(human, first).unwrap());
    for _ in 1..MAX_EQUIPMENT {
        let stick = Item::create(ItemType::Stick, world.rng_mut());
        assert!(world.give_item(human, stick).unwrap());
    }
    let before = world.mobile(human).unwrap().equipment().to_vec();
    let extra = Item::create(ItemType::Apple, world.rng_mut());
    assert!(!world.give_item(human, extra).unwrap());
    assert_eq!(world.mobile(human).unwrap().equipment(), &before[..]);
}

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Counting {
    fills: AtomicUsize,
}

impl Generator for Counting {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn fill(&self, _chunk: &mut Chunk, _rng: &mut SimRng) -> WorldResult<()> {
        self.fills.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[test]
fn chunks_are_generated_exactly_once() {
    let generator = Arc::new(Counting::default());
    let mut world = World::with_generator(quiet_config(), generator.clone());
    assert!(world.chunk(70, 70, 9).is_none());
    assert_eq!(generator.fills.load(Ordering::Relaxed), 0);

    let first = world.get_or_create_chunk_at(70, 70, 9).unwrap().origin();
    let second = world.get_or_create_chunk_at(79, 64, 9).unwrap().origin();
    assert_eq!(first, (64, 64, 9));
    assert_eq!(first, second);
    assert_eq!(generator.fills.load(Ordering::Relaxed), 1);

    world.get_or_create_chunk_at(80, 64, 9).unwrap();
    assert_eq!(generator.fills.load(Ordering::Relaxed), 2);
}

#[test]
fn village_houses_are_well_formed() {
    let village = VillageGenerator { house_chance: 1.0 };
    for seed in 0..64 {
        let mut rng = SimRng::new(seed);
        let mut chunk = Chunk::new();
        village.fill(&mut chunk, &mut rng).unwrap();
        for (hx, hy) in HOUSE_LOTS {
            let doors = DOOR_SPOTS
                .iter()
                .filter(|(dx, dy)| chunk.block_local(hx + dx, hy + dy).unwrap().kind().is_door())
                .count();
            assert_eq!(doors, 1, "seed {seed}, lot ({hx}, {hy})");
            let (cx, cy) = CHEST_SPOT;
            assert!(chunk.block_local(hx + cx, hy + cy).unwrap().kind().is_chest());
        }
    }
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

fn snapshot(world: &World) -> Vec<(MobileId, i32, i32, i32, i32)> {
    world
        .mobiles()
        .map(|m| {
            let p = m.position();
            (m.id, m.life(), p.x, p.y, p.z)
        })
        .collect()
}

fn populated(seed: u64) -> World {
    let mut world = World::new(WorldConfig {
        seed,
        ..WorldConfig::default()
    });
    for (i, kind) in MobileType::ALL.iter().cycle().take(12).enumerate() {
        let x = 120 + 2 * (i as i32 % 4);
        let y = 120 + 2 * (i as i32 / 4);
        world
            .get_or_create_chunk_at(x, y, 0)
            .unwrap()
            .set_block(x, y, Block::EMPTY)
            .unwrap();
        world.spawn(*kind, x, y, 0).unwrap();
    }
    world
}

#[test]
fn same_seed_same_story() {
    let mut a = populated(7);
    let mut b = populated(7);
    for _ in 0..40 {
        a.step_cycle().unwrap();
        b.step_cycle().unwrap();
    }
    assert_eq!(snapshot(&a), snapshot(&b));
    assert_eq!(a.mobile_count(), b.mobile_count());
}
