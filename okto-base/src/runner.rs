//! Runs a [`Machine`] on a dedicated thread, driving its two clocks.
//!
//! The instruction clock is paced at a configurable rate; the timer clock
//! runs at its fixed 60Hz cadence off a [`TimerPacer`], independent of how
//! many instructions execute in between. The host talks to the running
//! machine exclusively over channels: key transitions in, screen snapshots
//! and sound-state transitions out.

use std::{
    thread,
    time::{Duration, Instant},
};

use flume::TryRecvError;
pub use flume::{Receiver, Sender};
use tracing::{debug, info, instrument, trace, warn};

use crate::{
    keypad::{Key, KeyState},
    machine::{Machine, MachineError, StepOutcome},
    screen::Screen,
    timer::TimerPacer,
};

/// Host-to-machine messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    KeyStateChange { key: Key, new_state: KeyState },
}

/// Machine-to-host messages.
#[derive(Debug, Clone, PartialEq)]
pub enum MachineEvent {
    /// A draw or clear happened; `screen` is an owned snapshot, safe to
    /// render without tearing.
    ScreenUpdate { screen: Screen },
    /// The sound timer crossed between zero and non-zero. The host starts
    /// or stops its tone accordingly; nothing is synthesized here.
    SoundStateChange { active: bool },
    /// The machine halted on an error. No further events follow.
    ErrorEncountered { error: MachineError },
}

/// Pacing configuration for the instruction clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Target instruction rate. The timer cadence stays at 60Hz no matter
    /// what this is set to.
    pub instructions_per_second: u32,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            instructions_per_second: 700,
        }
    }
}

impl Machine {
    /// Run this machine on its own thread with default pacing.
    ///
    /// Returns the control sender, the event receiver and the thread's join
    /// handle. Dropping the control sender stops the machine between steps;
    /// the join result reports the error if the machine halted on one.
    pub fn start(
        self,
    ) -> (
        Sender<ControlEvent>,
        Receiver<MachineEvent>,
        thread::JoinHandle<Result<(), MachineError>>,
    ) {
        self.start_with_options(RunnerOptions::default())
    }

    pub fn start_with_options(
        self,
        options: RunnerOptions,
    ) -> (
        Sender<ControlEvent>,
        Receiver<MachineEvent>,
        thread::JoinHandle<Result<(), MachineError>>,
    ) {
        let (control_sender, control_receiver) = flume::unbounded();
        let (event_sender, event_receiver) = flume::unbounded();

        let join_handle = thread::Builder::new()
            .name("okto machine".to_owned())
            .spawn(move || run(self, options, control_receiver, event_sender))
            .expect("could not spawn machine thread");

        (control_sender, event_receiver, join_handle)
    }
}

#[instrument(skip(machine, control_receiver, event_sender))]
fn run(
    mut machine: Machine,
    options: RunnerOptions,
    control_receiver: Receiver<ControlEvent>,
    event_sender: Sender<MachineEvent>,
) -> Result<(), MachineError> {
    let cycle = Duration::from_secs(1) / options.instructions_per_second.max(1);
    let mut pacer = TimerPacer::new(Instant::now());
    let mut sound_was_active = machine.sound_active();

    info!("machine started");

    loop {
        loop {
            match control_receiver.try_recv() {
                Ok(ControlEvent::KeyStateChange { key, new_state }) => {
                    debug!(?key, ?new_state, "key state change");
                    machine.set_key(key, new_state);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    info!("control channel closed, machine stopping");
                    return Ok(());
                }
            }
        }

        for _ in 0..pacer.due_ticks(Instant::now()) {
            machine.decrement_timers();
        }

        match machine.step() {
            Ok(StepOutcome::Executed) => (),
            Ok(StepOutcome::AwaitingKey) => trace!("stalled awaiting a key press"),
            Err(error) => {
                warn!(%error, "machine halted");
                // The host may already be gone; nothing left to do then.
                let _ = event_sender.send(MachineEvent::ErrorEncountered {
                    error: error.clone(),
                });
                return Err(error);
            }
        }

        let sound_active = machine.sound_active();
        if sound_active != sound_was_active {
            sound_was_active = sound_active;
            let _ = event_sender.send(MachineEvent::SoundStateChange {
                active: sound_active,
            });
        }

        if let Some(screen) = machine.take_dirty_screen() {
            let _ = event_sender.send(MachineEvent::ScreenUpdate { screen });
        }

        spin_sleep::sleep(cycle);
    }
}
