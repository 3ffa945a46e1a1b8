// Terminal front end for the Hacktors simulation.
//
// `console.rs` abstracts the text screen and the keyboard; `player.rs` is
// the controller that binds a human player to a mobile. The binary in
// `main.rs` wires them to a freshly generated world.

pub mod console;
pub mod player;
