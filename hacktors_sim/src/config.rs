// Data-driven world configuration.
//
// The tunable parameters of a run live in `WorldConfig`: the seed, clock
// pacing, trap damage, how long a mobile remembers its attacker, and the
// probabilities that shape generated content. The static type catalogs
// (block/item/mobile stats) are not here; they are compiled-in tables in
// `catalog.rs`.
//
// Configs load from JSON. Missing fields fall back to the defaults, so a
// config file only needs to name what it changes.
//
// See also: `world.rs` which owns the `WorldConfig`, `clock.rs` for
// `ClockMode`.
//
// **Critical constraint: determinism.** Config values feed directly into
// simulation logic. Two runs with the same config and the same input produce
// the same world.

use crate::clock::ClockMode;
use crate::error::{WorldError, WorldResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for the world's PRNG.
    pub seed: u64,
    /// Wall-clock length of one cycle in `RealTime` mode.
    pub cycle_duration_ms: u64,
    pub clock_mode: ClockMode,
    /// Damage dealt to a mobile stepping onto a trap. Armor does not help.
    pub trap_damage: i32,
    /// Cycles after which a mobile forgets who last attacked it.
    pub forget_cycles: u64,
    /// Probability that each dropping slot of a new mobile yields an item.
    pub dropping_chance: f32,
    /// Probability that a new level picks its terrain per chunk.
    pub random_level_chance: f32,
    /// Probability that a village lot gets a house.
    pub village_house_chance: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            cycle_duration_ms: 1000,
            clock_mode: ClockMode::RealTime,
            trap_damage: 10,
            forget_cycles: 10,
            dropping_chance: 0.2,
            random_level_chance: 0.5,
            village_house_chance: 0.2,
        }
    }
}

impl WorldConfig {
    pub fn from_json(json: &str) -> WorldResult<Self> {
        let config: WorldConfig =
            serde_json::from_str(json).map_err(|e| WorldError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> WorldResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| WorldError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Probabilities must lie in `[0, 1]` and trap damage must not heal.
    pub fn validate(&self) -> WorldResult<()> {
        for (name, p) in [
            ("dropping_chance", self.dropping_chance),
            ("random_level_chance", self.random_level_chance),
            ("village_house_chance", self.village_house_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(WorldError::Config(format!("{name} must be within [0, 1], got {p}")));
            }
        }
        if self.trap_damage < 0 {
            return Err(WorldError::Config(format!(
                "trap_damage must not be negative, got {}",
                self.trap_damage
            )));
        }
        Ok(())
    }
}
