// Cycle clock and the simulation loop.
//
// The clock is a two-state machine, `Stopped -> Running -> Stopped`. While
// running, each iteration records its start time, calls `World::update`,
// increments the cycle counter, and in `RealTime` mode sleeps away whatever
// is left of `cycle_duration`. In `Step` mode nothing sleeps; the loop is
// paced by whatever the controllers block on (the player controller waits
// for a key).
//
// Stopping is cooperative: `StopHandle::stop` raises a shared flag that the
// loop checks between iterations. A cycle in progress always runs to
// completion.
//
// An `Err` from a cycle is the iteration-fatal case: it is logged, the loop
// stops, and `run` returns `StopReason::Failed`. On every exit path each
// placed mobile receives exactly one `Stopped` notification.
//
// See also: `world.rs` for `update`, `config.rs` for the pacing settings.

use crate::error::{WorldError, WorldResult};
use crate::event::MobileEvent;
use crate::world::World;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, info};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockMode {
    /// Fixed wall-clock cycle length.
    #[default]
    RealTime,
    /// No sleeping; controllers pace the loop.
    Step,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
}

/// Why `World::run` returned.
#[derive(Debug, PartialEq)]
pub enum StopReason {
    /// Someone raised the stop flag.
    Requested,
    /// `run_for` used up its cycle budget.
    CyclesElapsed,
    /// A cycle failed.
    Failed(WorldError),
}

/// Shared stop flag. Clones refer to the same clock.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct Clock {
    cycle: u64,
    state: ClockState,
    mode: ClockMode,
    cycle_duration: Duration,
    stop: StopHandle,
}

impl Clock {
    pub fn new(mode: ClockMode, cycle_duration: Duration) -> Self {
        Self {
            cycle: 0,
            state: ClockState::Stopped,
            mode,
            cycle_duration,
            stop: StopHandle::default(),
        }
    }

    /// Cycles completed so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ClockMode) {
        self.mode = mode;
    }

    pub fn cycle_duration(&self) -> Duration {
        self.cycle_duration
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub(crate) fn advance(&mut self) {
        self.cycle += 1;
    }
}

impl World {
    /// Run one iteration: update every placed mobile, then advance the cycle.
    pub fn step_cycle(&mut self) -> WorldResult<()> {
        let result = self.update();
        self.clock.advance();
        result
    }

    /// Run until stopped.
    pub fn run(&mut self) -> WorldResult<StopReason> {
        self.run_loop(None)
    }

    /// Run at most `cycles` iterations.
    pub fn run_for(&mut self, cycles: u64) -> WorldResult<StopReason> {
        self.run_loop(Some(cycles))
    }

    fn run_loop(&mut self, budget: Option<u64>) -> WorldResult<StopReason> {
        if self.clock.state == ClockState::Running {
            return Err(WorldError::ClockAlreadyRunning);
        }
        self.clock.state = ClockState::Running;
        self.clock.stop.reset();
        info!(cycle = self.clock.cycle, mode = ?self.clock.mode, "clock started");

        let mut done = 0u64;
        let reason = loop {
            if self.clock.stop.is_stopped() {
                break StopReason::Requested;
            }
            if budget.is_some_and(|b| done >= b) {
                break StopReason::CyclesElapsed;
            }
            let start = Instant::now();
            let result = self.step_cycle();
            done += 1;
            if let Err(err) = result {
                error!(cycle = self.clock.cycle, %err, "cycle failed, stopping the clock");
                self.clock.stop.stop();
                break StopReason::Failed(err);
            }
            if self.clock.mode == ClockMode::RealTime {
                let elapsed = start.elapsed();
                if elapsed < self.clock.cycle_duration {
                    std::thread::sleep(self.clock.cycle_duration - elapsed);
                }
            }
        };

        for id in self.placed_mobiles() {
            self.emit(id, MobileEvent::Stopped);
        }
        self.dispatch_events();
        self.clock.state = ClockState::Stopped;
        info!(cycle = self.clock.cycle, ?reason, "clock stopped");
        Ok(reason)
    }
}
