// Error taxonomy for the world model.
//
// Only the hard failures live here: bounds errors (a coordinate outside a
// grid's extent), invariant violations (placing a solid block on an occupied
// tile, removing an item that is not there, acting with a mobile that is not
// in the arena or not placed) and clock misuse. All of them indicate a caller
// bug and are propagated with `?` up to the clock, which logs them and stops
// the run.
//
// Soft failures are NOT errors. A verb that cannot be carried out (moving
// into a wall, opening without a key, picking up from an empty floor) returns
// `Ok(false)`, and controllers branch on that.
//
// See also: `clock.rs` for the boundary that turns an `Err` into
// `StopReason::Failed`.

use crate::types::{ItemId, MobileId};
use thiserror::Error;

/// A hard failure raised by the world model.
#[derive(Debug, Error, PartialEq)]
pub enum WorldError {
    #[error("{axis} coordinate {value} is outside 0..{limit}")]
    OutOfBounds { axis: char, value: i32, limit: i32 },

    #[error("position ({x}, {y}, {z}) is not a valid position in this world")]
    InvalidPosition { x: i32, y: i32, z: i32 },

    #[error("tile ({x}, {y}) holds a solid block")]
    SolidTile { x: i32, y: i32 },

    #[error("tile ({x}, {y}) is occupied by a mobile")]
    TileOccupied { x: i32, y: i32 },

    #[error("{item} is not present")]
    ItemNotFound { item: ItemId },

    #[error("{mobile} does not exist")]
    UnknownMobile { mobile: MobileId },

    #[error("{mobile} is not placed in the world")]
    Detached { mobile: MobileId },

    #[error("the clock is already running")]
    ClockAlreadyRunning,

    #[error("configuration error: {0}")]
    Config(String),
}

pub type WorldResult<T> = Result<T, WorldError>;

/// Bounds check for a single axis.
pub(crate) fn check_axis(axis: char, value: i32, limit: i32) -> WorldResult<()> {
    if (0..limit).contains(&value) {
        Ok(())
    } else {
        Err(WorldError::OutOfBounds { axis, value, limit })
    }
}
