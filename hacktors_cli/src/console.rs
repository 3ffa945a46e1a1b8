// Text sink and keystroke source for the player controller.
//
// The simulation thread never blocks on the terminal directly.
// `TerminalConsole` starts a background thread that reads stdin line by line
// and pushes every non-whitespace character into a crossbeam channel; the
// controller only polls (`read_key`) or, in step mode, waits on the channel
// (`wait_key`). The reader thread never touches the world.
//
// `ScriptedConsole` replays a fixed key sequence and records every screen,
// for headless runs (`--keys`) and tests.

use anyhow::Context;
use crossbeam_channel::{Receiver, TryRecvError, unbounded};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::thread;

pub trait Console {
    /// Show `text`, clearing the screen first when `clear` is set.
    fn write(&mut self, text: &str, clear: bool);

    /// Next buffered key, without waiting.
    fn read_key(&mut self) -> Option<char>;

    /// Next key, waiting for one. `None` once input is exhausted.
    fn wait_key(&mut self) -> Option<char>;
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

pub struct TerminalConsole {
    keys: Receiver<char>,
    closed: bool,
}

impl TerminalConsole {
    /// Start the stdin reader thread.
    pub fn spawn() -> anyhow::Result<Self> {
        let (tx, keys) = unbounded();
        thread::Builder::new()
            .name("stdin".into())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    let Ok(line) = line else {
                        break;
                    };
                    for key in line.chars().filter(|c| !c.is_whitespace()) {
                        if tx.send(key).is_err() {
                            return;
                        }
                    }
                }
                tracing::debug!("stdin closed");
            })
            .context("failed to start the stdin reader")?;
        Ok(Self { keys, closed: false })
    }
}

impl Console for TerminalConsole {
    fn write(&mut self, text: &str, clear: bool) {
        let mut out = io::stdout().lock();
        // ANSI: clear screen, cursor home.
        let prefix = if clear { "\x1b[2J\x1b[H" } else { "" };
        let _ = write!(out, "{prefix}{text}");
        let _ = out.flush();
    }

    fn read_key(&mut self) -> Option<char> {
        match self.keys.try_recv() {
            Ok(key) => Some(key),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    fn wait_key(&mut self) -> Option<char> {
        if self.closed {
            return None;
        }
        let key = self.keys.recv().ok();
        self.closed = key.is_none();
        key
    }
}

// ---------------------------------------------------------------------------
// Scripted
// ---------------------------------------------------------------------------

/// Every screen written so far, shared with whoever created the console.
pub type Screens = Rc<RefCell<Vec<String>>>;

#[derive(Debug, Default)]
pub struct ScriptedConsole {
    keys: VecDeque<char>,
    screens: Screens,
}

impl ScriptedConsole {
    pub fn new(keys: &str) -> Self {
        Self {
            keys: keys.chars().filter(|c| !c.is_whitespace()).collect(),
            screens: Screens::default(),
        }
    }

    pub fn screens(&self) -> Screens {
        self.screens.clone()
    }
}

impl Console for ScriptedConsole {
    fn write(&mut self, text: &str, _clear: bool) {
        self.screens.borrow_mut().push(text.to_owned());
    }

    fn read_key(&mut self) -> Option<char> {
        self.keys.pop_front()
    }

    fn wait_key(&mut self) -> Option<char> {
        self.keys.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_console_skips_whitespace() {
        let mut console = ScriptedConsole::new("w d\nq");
        assert_eq!(console.read_key(), Some('w'));
        assert_eq!(console.wait_key(), Some('d'));
        assert_eq!(console.read_key(), Some('q'));
        assert_eq!(console.wait_key(), None);
    }

    #[test]
    fn scripted_console_records_screens() {
        let mut console = ScriptedConsole::new("");
        let screens = console.screens();
        console.write("one", true);
        console.write("two", false);
        assert_eq!(*screens.borrow(), vec!["one".to_owned(), "two".to_owned()]);
    }
}
