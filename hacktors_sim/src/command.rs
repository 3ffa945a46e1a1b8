// Commands a controller can issue for its mobile.
//
// `Command` names every verb as data, so input-driven controllers (the
// terminal player, replay scripts, tests) can map keys or records to actions
// without matching on method names. `execute` dispatches one command to the
// matching world verb and passes its soft-failure result through.
// Current commands:
// - `Move` turns to face a direction and steps; a blocked step becomes an
//   attack on whatever is in the way.
// - `Attack`, `Open`, `Close`, `LayBlock`, `Craft` act on the tile ahead.
// - `GoUp`, `GoDown`, `PickUp`, `Eat` act on the mobile's own tile or gear.
// - `Fire` throws an equipment slot in the facing direction.
//
// See also: `actions.rs` and `combat.rs` for the verbs themselves.
//
// **Critical constraint: determinism.** A command has no inputs beyond the
// world state and the world's PRNG.

use crate::error::WorldResult;
use crate::types::{Direction, MobileId};
use crate::world::World;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Move(Direction),
    Attack,
    Open,
    Close,
    GoUp,
    GoDown,
    Eat,
    PickUp,
    LayBlock,
    Craft,
    /// Throw the equipment item at this index.
    Fire(usize),
}

/// Run `command` for `mobile`. `Ok(false)` means nothing happened.
pub fn execute(world: &mut World, mobile: MobileId, command: Command) -> WorldResult<bool> {
    match command {
        Command::Move(direction) => {
            world.turn(mobile, direction)?;
            if world.move_forward(mobile)? {
                Ok(true)
            } else {
                world.attack(mobile)
            }
        }
        Command::Attack => world.attack(mobile),
        Command::Open => world.open(mobile),
        Command::Close => world.close(mobile),
        Command::GoUp => world.go_up(mobile),
        Command::GoDown => world.go_down(mobile),
        Command::Eat => world.eat(mobile),
        Command::PickUp => world.pick_up(mobile),
        Command::LayBlock => world.lay_block(mobile),
        Command::Craft => world.craft(mobile),
        Command::Fire(index) => world.fire(mobile, index),
    }
}
