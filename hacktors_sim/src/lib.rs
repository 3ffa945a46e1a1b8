// hacktors_sim: tile-world simulation library.
//
// This crate contains all simulation logic for Hacktors: the three-tier map
// (World -> Level -> Chunk), mobiles and their equipment, the relocation
// protocol, combat and missiles, terrain generation, the stock creature AI,
// and the cycle clock. It does no terminal I/O and can be tested,
// benchmarked, and run headless.
//
// Module overview:
// - `world.rs`:      World: lazily created levels, the mobile arena, per-cycle update.
// - `level.rs`:      16x16 grid of lazily created chunks; missile flight.
// - `chunk.rs`:      16x16 tile grid: blocks, occupant slots, floor items, local count.
// - `actions.rs`:    Relocation protocol and the non-combat verbs (move, stairs, doors, inventory).
// - `combat.rs`:     Melee, armor, death, block destruction, thrown items.
// - `mobile.rs`:     Mobile: life, position, equipment, attacker memory.
// - `controller.rs`: Controller trait (bind / act / notify).
// - `event.rs`:      MobileEvent notifications and DamageSource.
// - `ai.rs`:         CreatureController, the stock AI for every creature type.
// - `command.rs`:    Command enum + `execute`, the data form of every verb.
// - `clock.rs`:      Cycle clock, run loop, stop handle.
// - `generator.rs`:  Terrain generators (empty, plain, forest, mountain, village, random).
// - `catalog.rs`:    Block, item and mobile type tables.
// - `block.rs`:      Block: fixed singletons vs. live blocks with life and content.
// - `item.rs`:       Item instances and their factories.
// - `config.rs`:     WorldConfig, loadable from JSON.
// - `error.rs`:      WorldError.
// - `prng`:          Re-exported from `hacktors_prng`: xoshiro256++ PRNG with SplitMix64 seeding.
// - `types.rs`:      Grid constants, Direction, Position, entity IDs.
//
// The companion crate `hacktors_cli` drives this library from a terminal.
//
// **Critical constraint: determinism.** Given a seed and the same controller
// inputs, a run is reproducible. All randomness comes from the world's
// seeded PRNG. No `HashMap`, no OS entropy. Use `BTreeMap` for ordered
// collections. Wall-clock time only paces the clock in real-time mode.

pub mod actions;
pub mod ai;
pub mod block;
pub mod catalog;
pub mod chunk;
pub mod clock;
pub mod combat;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod generator;
pub mod item;
pub mod level;
pub mod mobile;
pub mod types;
pub mod world;

pub use error::{WorldError, WorldResult};
pub use hacktors_prng as prng;
pub use world::World;
