use std::time::{Duration, Instant};

/// The delay and sound timers: two 8-bit counters that decrement at a fixed
/// 60Hz cadence and stop at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timers {
    delay: u8,
    sound: u8,
}

impl Timers {
    /// Decrements per second for both timers.
    pub const RATE: u32 = 60;
    /// Wall-clock interval between two decrements.
    pub const INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / Self::RATE as u64);

    /// Count both timers down one step. Timers at zero stay at zero.
    pub fn decrement(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    pub const fn delay(&self) -> u8 {
        self.delay
    }

    pub fn set_delay(&mut self, value: u8) {
        self.delay = value;
    }

    pub fn set_sound(&mut self, value: u8) {
        self.sound = value;
    }

    /// The sound timer being non-zero is the sole signal for the host to
    /// play a tone (and to stop it again once this turns false).
    pub const fn sound_active(&self) -> bool {
        self.sound > 0
    }
}

/// Converts elapsed wall-clock time into due timer decrements.
///
/// Accumulates the time between polls and carries the remainder below one
/// interval forward, so the 60Hz cadence does not drift no matter how
/// irregularly it is polled. The caller supplies the monotonic clock
/// readings; this type never reads the clock itself.
#[derive(Debug, Clone, Copy)]
pub struct TimerPacer {
    last_poll: Instant,
    pending: Duration,
}

impl TimerPacer {
    pub fn new(now: Instant) -> Self {
        Self {
            last_poll: now,
            pending: Duration::ZERO,
        }
    }

    /// Number of decrements that became due since the last poll.
    pub fn due_ticks(&mut self, now: Instant) -> u32 {
        self.pending += now.saturating_duration_since(self.last_poll);
        self.last_poll = now;

        let ticks = (self.pending.as_nanos() / Timers::INTERVAL.as_nanos()) as u32;
        self.pending -= Timers::INTERVAL * ticks;
        ticks
    }
}
