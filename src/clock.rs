use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub const TICKS_PER_SECOND: u32 = 60;

pub fn sec_to_ticks(seconds: f64) -> i64 {
    (seconds * f64::from(TICKS_PER_SECOND)).round() as i64
}

pub fn ticks_to_sec(ticks: i64) -> f64 {
    ticks as f64 / f64::from(TICKS_PER_SECOND)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clock {
    ticks: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) {
        self.ticks += 1;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn seconds(&self) -> f64 {
        self.ticks as f64 / f64::from(TICKS_PER_SECOND)
    }
}

/// A duration of [`TickTimer::ONE_TICK`] expires on the next tick,
/// [`TickTimer::INDEFINITE`] never expires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickTimer {
    duration: i64,
    remaining: i64,
    running: bool,
}

impl TickTimer {
    pub const ONE_TICK: i64 = -1;
    pub const INDEFINITE: i64 = i64::MAX;

    pub fn new(duration: i64) -> Self {
        let duration = if duration == Self::ONE_TICK {
            1
        } else {
            duration.max(0)
        };
        Self {
            duration,
            remaining: duration,
            running: true,
        }
    }

    pub fn stopped() -> Self {
        Self {
            duration: 0,
            remaining: 0,
            running: false,
        }
    }

    pub fn reset(&mut self, duration: i64) {
        *self = Self::new(duration);
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        if self.remaining > 0 {
            self.running = true;
        }
    }

    /// Counts down one tick. Returns `true` only on the tick the timer expires.
    pub fn tick(&mut self) -> bool {
        if !self.running || self.remaining == 0 || self.is_indefinite() {
            return false;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.running = false;
            return true;
        }
        false
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_expired(&self) -> bool {
        self.remaining == 0 && self.duration > 0
    }

    pub fn is_indefinite(&self) -> bool {
        self.remaining == Self::INDEFINITE
    }

    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    pub fn elapsed(&self) -> i64 {
        if self.is_indefinite() {
            0
        } else {
            self.duration - self.remaining
        }
    }
}

/// Alternates between on and off every `period` ticks.
///
/// Used for blinking energizers, flashing ghosts and the flashing maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pulse {
    period: u32,
    counter: u32,
    on: bool,
    running: bool,
}

impl Pulse {
    pub fn new(period: u32) -> Self {
        Self {
            period: period.max(1),
            counter: 0,
            on: true,
            running: false,
        }
    }

    pub fn restart(&mut self) {
        self.counter = 0;
        self.on = true;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.on = true;
    }

    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        self.counter += 1;
        if self.counter == self.period {
            self.counter = 0;
            self.on = !self.on;
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Everything a tick needs from outside the game state: the clock and the
/// random source used for frightened steering.
#[derive(Debug)]
pub struct Context<R = ChaCha8Rng> {
    pub clock: Clock,
    pub rng: R,
}

impl Context<ChaCha8Rng> {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Context<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            clock: Clock::new(),
            rng,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_expires_on_exact_tick() {
        let mut timer = TickTimer::new(3);
        assert!(!timer.tick());
        assert!(!timer.tick());
        assert!(timer.tick());
        assert!(timer.has_expired());
        assert!(!timer.tick());
        assert_eq!(timer.elapsed(), 3);
    }

    #[test]
    fn test_one_tick_timer() {
        let mut timer = TickTimer::new(TickTimer::ONE_TICK);
        assert_eq!(timer.remaining(), 1);
        assert!(timer.tick());
    }

    #[test]
    fn test_indefinite_timer_never_expires() {
        let mut timer = TickTimer::new(TickTimer::INDEFINITE);
        for _ in 0..10_000 {
            assert!(!timer.tick());
        }
        assert!(timer.is_running());
        assert_eq!(timer.elapsed(), 0);
    }

    #[test]
    fn test_stopped_timer_does_not_count() {
        let mut timer = TickTimer::new(5);
        timer.stop();
        timer.tick();
        assert_eq!(timer.remaining(), 5);
        timer.resume();
        timer.tick();
        assert_eq!(timer.remaining(), 4);
        assert!(!TickTimer::stopped().has_expired());
    }

    #[test]
    fn test_pulse_alternates() {
        let mut pulse = Pulse::new(2);
        pulse.restart();
        let mut states = Vec::new();
        for _ in 0..6 {
            pulse.tick();
            states.push(pulse.is_on());
        }
        assert_eq!(states, vec![true, false, false, true, true, false]);
    }

    #[test]
    fn test_seconds_conversion() {
        assert_eq!(sec_to_ticks(7.0), 420);
        assert_eq!(sec_to_ticks(1033.0), 61_980);
        assert_eq!(ticks_to_sec(90), 1.5);
        let mut clock = Clock::new();
        for _ in 0..120 {
            clock.tick();
        }
        assert_eq!(clock.seconds(), 2.0);
    }
}
