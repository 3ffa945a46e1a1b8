// The decision-making capability bound to a mobile.
//
// A controller is asked to `act` once per cycle while its mobile is alive
// and placed. It receives the whole `World` mutably together with the id of
// the mobile it drives, and issues verbs (`World::move_forward`,
// `World::attack`, ..., or `command::execute`). A single `act` call is the
// controller's atomic unit of mutation: the world's invariants hold before
// it is called and must hold again when it returns.
//
// Notifications arrive through `notify` after `act` has returned (see
// `event.rs`). The default implementation ignores them.
//
// While a controller is acting it is temporarily taken out of its mobile, so
// a controller never observes itself through the world.
//
// See also: `ai.rs` for the stock creature AI, the CLI crate for the
// player-input controller.

use crate::error::WorldResult;
use crate::event::MobileEvent;
use crate::types::MobileId;
use crate::world::World;

pub trait Controller {
    /// Called once when the controller is attached to its mobile.
    fn bind(&mut self, _mobile: MobileId) {}

    /// Take this cycle's turn.
    fn act(&mut self, world: &mut World, mobile: MobileId) -> WorldResult<()>;

    /// Fire-and-forget notification. Must not panic.
    fn notify(&mut self, _mobile: MobileId, _event: &MobileEvent) {}
}

/// A controller that never does anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Idle;

impl Controller for Idle {
    fn act(&mut self, _world: &mut World, _mobile: MobileId) -> WorldResult<()> {
        Ok(())
    }
}
