// The player's controller: renders the avatar's view and turns keys into
// commands.
//
// Each turn `act` draws the perception square around the avatar (the
// avatar is `@`; otherwise a mobile, then a lone item, `*` for a pile, then
// the block glyph), a status line, the equipment list, what lies underfoot,
// and the recent messages. It then reads one key: in step mode it waits for
// it, in real-time mode it takes whatever is buffered and otherwise lets the
// cycle pass. Movement keys attack when the way is blocked.
//
// Messages come from `MobileEvent`s and stay on screen for `MESSAGE_TTL`.
// Death and `q` both stop the clock through its `StopHandle`; `Stopped`
// prints the remaining messages one last time.
//
// The view reads only chunks that already exist, so rendering never
// generates terrain.

use crate::console::Console;
use hacktors_sim::World;
use hacktors_sim::catalog::BlockType;
use hacktors_sim::clock::{ClockMode, StopHandle};
use hacktors_sim::command::{Command, execute};
use hacktors_sim::controller::Controller;
use hacktors_sim::event::{DamageSource, MobileEvent};
use hacktors_sim::item::Item;
use hacktors_sim::types::{Direction, MobileId};
use hacktors_sim::{WorldError, WorldResult};
use std::fmt::Write;
use std::time::{Duration, Instant};

/// How long a message stays on screen.
pub const MESSAGE_TTL: Duration = Duration::from_secs(5);

const HELP: &str = "\
h - help (what you see now)
q - quit
w/s/a/d - move north/south/west/east (attacks if blocked)
o - open a chest or door
c - close a chest or door
< - go upstairs
> - go downstairs
e - eat
b - lay a block
p - pick up
i - craft an item (needs an anvil, iron and a stick)
0-9 - throw the item in that slot
";

/// What a key does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Command(Command),
    Help,
    Quit,
}

pub fn key_action(key: char) -> Option<KeyAction> {
    let command = match key {
        'h' => return Some(KeyAction::Help),
        'q' => return Some(KeyAction::Quit),
        'w' => Command::Move(Direction::North),
        's' => Command::Move(Direction::South),
        'a' => Command::Move(Direction::West),
        'd' => Command::Move(Direction::East),
        'o' => Command::Open,
        'c' => Command::Close,
        '<' => Command::GoUp,
        '>' => Command::GoDown,
        'e' => Command::Eat,
        'b' => Command::LayBlock,
        'p' => Command::PickUp,
        'i' => Command::Craft,
        _ => Command::Fire(key.to_digit(10)? as usize),
    };
    Some(KeyAction::Command(command))
}

fn failure(command: Command) -> &'static str {
    match command {
        Command::Move(_) | Command::Attack => "You can't go that way.",
        Command::Open => "FAILED TO OPEN!",
        Command::Close => "FAILED TO CLOSE!",
        Command::GoUp => "FAILED TO GO UP!",
        Command::GoDown => "FAILED TO GO DOWN!",
        Command::Eat => "FAILED TO EAT!",
        Command::PickUp => "FAILED TO PICK UP!",
        Command::LayBlock => "FAILED TO LAY BLOCK!",
        Command::Craft => "FAILED TO CRAFT ITEM!",
        Command::Fire(_) => "Nothing to throw in that slot.",
    }
}

fn describe(source: &DamageSource) -> String {
    match source {
        DamageSource::Mobile { kind, .. } => format!("a {kind}"),
        DamageSource::Block(block) => format!("a {block}"),
        DamageSource::Missile { kind, .. } => format!("a thrown {kind}"),
    }
}

#[derive(Debug)]
struct Message {
    text: String,
    created: Instant,
}

pub struct PlayerController {
    console: Box<dyn Console>,
    stop: StopHandle,
    mobile: Option<MobileId>,
    messages: Vec<Message>,
}

impl PlayerController {
    pub fn new(console: Box<dyn Console>, stop: StopHandle) -> Self {
        Self {
            console,
            stop,
            mobile: None,
            messages: Vec::new(),
        }
    }

    fn say(&mut self, text: impl Into<String>) {
        self.messages.push(Message {
            text: text.into(),
            created: Instant::now(),
        });
    }

    fn quit(&mut self) {
        self.say("Bye!");
        self.stop.stop();
    }

    /// The screen for this turn. Drops expired messages.
    fn render(&mut self, world: &World, id: MobileId) -> WorldResult<String> {
        let me = world.mobile(id).ok_or(WorldError::UnknownMobile { mobile: id })?;
        let pos = me.position();
        let reach = me.kind.perception();
        let mut screen = String::new();

        for y in pos.y - reach..=pos.y + reach {
            for x in pos.x - reach..=pos.x + reach {
                let glyph = if x == pos.x && y == pos.y {
                    '@'
                } else if let Some(other) = world.mobile_at(x, y, pos.z).and_then(|m| world.mobile(m)) {
                    other.kind.glyph()
                } else {
                    match world.items_at(x, y, pos.z) {
                        [item] => item.glyph(),
                        [] => world.block_at(x, y, pos.z).map_or(' ', |b| b.glyph()),
                        _ => '*',
                    }
                };
                screen.push(glyph);
            }
            screen.push('\n');
        }

        let _ = writeln!(
            screen,
            "({},{},{}) TIME: {} HP: {} DIR: {} RACE: {}",
            pos.x,
            pos.y,
            pos.z,
            world.clock().cycle(),
            me.life(),
            pos.direction.glyph(),
            me.kind
        );
        for (i, item) in me.equipment().iter().enumerate() {
            let _ = write!(screen, "{i}: {item} ");
            if i % 4 == 3 {
                screen.push('\n');
            }
        }
        if !me.equipment().is_empty() {
            screen.push('\n');
        }

        let mut underfoot: Vec<String> = Vec::new();
        if let Some(block) = world.block_at(pos.x, pos.y, pos.z)
            && block.kind() != BlockType::Empty
        {
            underfoot.push(block.kind().to_string());
        }
        underfoot.extend(world.items_at(pos.x, pos.y, pos.z).iter().map(Item::to_string));
        if !underfoot.is_empty() {
            let _ = writeln!(screen, "You are standing on: {}", underfoot.join(" "));
        }

        self.messages.retain(|m| m.created.elapsed() < MESSAGE_TTL);
        for message in &self.messages {
            screen.push_str(&message.text);
            screen.push('\n');
        }
        Ok(screen)
    }
}

impl Controller for PlayerController {
    fn bind(&mut self, mobile: MobileId) {
        self.mobile = Some(mobile);
    }

    fn act(&mut self, world: &mut World, id: MobileId) -> WorldResult<()> {
        let screen = self.render(world, id)?;
        self.console.write(&screen, true);

        let key = match world.clock().mode() {
            ClockMode::Step => match self.console.wait_key() {
                Some(key) => key,
                None => {
                    self.quit();
                    return Ok(());
                }
            },
            ClockMode::RealTime => match self.console.read_key() {
                Some(key) => key,
                None => return Ok(()),
            },
        };

        match key_action(key) {
            Some(KeyAction::Help) => self.say(HELP),
            Some(KeyAction::Quit) => self.quit(),
            Some(KeyAction::Command(command)) => {
                if !execute(world, id, command)? {
                    self.say(failure(command));
                }
            }
            None => {
                self.say(format!("UNKNOWN COMMAND: {key}"));
                self.say(HELP);
            }
        }
        Ok(())
    }

    fn notify(&mut self, _mobile: MobileId, event: &MobileEvent) {
        match event {
            MobileEvent::PickedUp { items } => {
                let names: Vec<_> = items.iter().map(Item::to_string).collect();
                self.say(format!("You picked up: {}", names.join(", ")));
            }
            MobileEvent::Damaged { amount, source } => {
                self.say(format!("You took {amount} damage from {}", describe(source)));
            }
            MobileEvent::Died => {
                self.say("YOU DIE! GAME OVER!");
                self.stop.stop();
            }
            MobileEvent::AttackedMobile {
                target_kind,
                weapon,
                killed,
                ..
            } => {
                let mut text = format!("You attacked the {target_kind}");
                if let Some(weapon) = weapon {
                    let _ = write!(text, " with a {weapon}");
                }
                if *killed {
                    text.push_str(" and killed it!");
                }
                self.say(text);
            }
            MobileEvent::AttackedBlock {
                block,
                weapon,
                destroyed,
            } => {
                let mut text = format!("You attacked the {block}");
                if let Some(weapon) = weapon {
                    let _ = write!(text, " with a {weapon}");
                }
                if *destroyed {
                    text.push_str(" and destroyed it!");
                }
                self.say(text);
            }
            MobileEvent::ItemAdded { item } => {
                self.say(format!("Added to your inventory: {item}"));
            }
            MobileEvent::ItemRemoved { item } => {
                self.say(format!("Removed from your inventory: {item}"));
            }
            MobileEvent::Ate { item } => {
                let mut text = format!("You ate a {}.", item.kind);
                if item.kind.food() < 0 {
                    text.push_str(" You feel poisoned!");
                }
                self.say(text);
            }
            MobileEvent::Stopped => {
                let farewell: Vec<_> = self.messages.drain(..).map(|m| m.text).collect();
                if !farewell.is_empty() {
                    self.console.write(&(farewell.join("\n") + "\n"), false);
                }
            }
            MobileEvent::PositionChanged { .. } | MobileEvent::DirectionChanged => {}
        }
    }
}
