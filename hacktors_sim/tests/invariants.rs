// Property tests: grid bookkeeping survives arbitrary command sequences.
//
// A handful of armed mobiles are dropped on generated terrain and driven by
// random `Command`s. After every command the test checks that each placed
// mobile is found on exactly the tile its position names, that chunk, level
// and world counts agree with the tiles, and that no equipment exceeds the
// cap or holds an item twice.

use hacktors_sim::block::Block;
use hacktors_sim::catalog::{BlockType, ItemType, MobileType};
use hacktors_sim::command::{Command, execute};
use hacktors_sim::config::WorldConfig;
use hacktors_sim::controller::Idle;
use hacktors_sim::item::Item;
use hacktors_sim::mobile::MAX_EQUIPMENT;
use hacktors_sim::types::{Direction, LEVEL_CHUNKS};
use hacktors_sim::World;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn command(code: u8, arg: usize) -> Command {
    match code % 12 {
        0 => Command::Move(Direction::North),
        1 => Command::Move(Direction::South),
        2 => Command::Move(Direction::East),
        3 => Command::Move(Direction::West),
        4 => Command::Attack,
        5 => Command::Open,
        6 => Command::Close,
        7 => Command::Eat,
        8 => Command::PickUp,
        9 => Command::LayBlock,
        10 => Command::Craft,
        _ => Command::Fire(arg % MAX_EQUIPMENT),
    }
}

fn arena(seed: u64, stock_ai: bool) -> World {
    let mut world = World::new(WorldConfig {
        seed,
        ..WorldConfig::default()
    });
    let spots = [
        (14, 14, MobileType::Human),
        (17, 14, MobileType::Human),
        (14, 17, MobileType::Zombie),
        (17, 17, MobileType::Dog),
        (15, 16, MobileType::Pig),
    ];
    for (x, y, kind) in spots {
        world
            .get_or_create_chunk_at(x, y, 0)
            .unwrap()
            .set_block(x, y, Block::EMPTY)
            .unwrap();
        let id = if stock_ai {
            world.spawn(kind, x, y, 0).unwrap()
        } else {
            world.spawn_with(kind, x, y, 0, Box::new(Idle)).unwrap()
        };
        if kind == MobileType::Human {
            for gear in [ItemType::Dagger, ItemType::Key, ItemType::DogEgg, ItemType::Iron, ItemType::Stick] {
                let item = Item::create(gear, world.rng_mut());
                world.give_item(id, item).unwrap();
            }
            let block = Item::block(BlockType::Stone, world.rng_mut());
            world.give_item(id, block).unwrap();
        }
    }
    world.dispatch_events();
    world
}

fn check(world: &World) {
    let placed = world.placed_mobiles();
    for &id in &placed {
        let m = world.mobile(id).unwrap();
        let p = m.position();
        assert!(world.is_valid(&p));
        assert_eq!(world.mobile_at(p.x, p.y, p.z), Some(id));
        assert!(m.is_alive());
        assert!(m.equipment().len() <= MAX_EQUIPMENT);
        let ids: BTreeSet<_> = m.equipment().iter().map(|it| it.id).collect();
        assert_eq!(ids.len(), m.equipment().len());
    }

    let mut world_total = 0;
    for level in world.levels() {
        let mut level_total = 0;
        for cy in 0..LEVEL_CHUNKS {
            for cx in 0..LEVEL_CHUNKS {
                if let Some(chunk) = level.chunk(cx, cy).unwrap() {
                    assert_eq!(chunk.actors().len(), chunk.mobile_count());
                    level_total += chunk.mobile_count();
                }
            }
        }
        assert_eq!(level.mobile_count(), level_total);
        world_total += level_total;
    }
    assert_eq!(world.mobile_count(), world_total);
    assert_eq!(world.mobile_count(), placed.len());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn bookkeeping_survives_random_commands(
        seed in any::<u64>(),
        script in prop::collection::vec((0usize..5, any::<u8>(), 0usize..16), 1..120),
    ) {
        let mut world = arena(seed, false);
        check(&world);
        for (who, code, arg) in script {
            let placed = world.placed_mobiles();
            if placed.is_empty() {
                break;
            }
            let id = placed[who % placed.len()];
            execute(&mut world, id, command(code, arg)).unwrap();
            world.dispatch_events();
            check(&world);
        }
    }

    #[test]
    fn cycles_keep_counts_exact(seed in any::<u64>(), cycles in 1u64..40) {
        let mut world = arena(seed, true);
        for _ in 0..cycles {
            world.step_cycle().unwrap();
            check(&world);
        }
        prop_assert_eq!(world.clock().cycle(), cycles);
    }
}
