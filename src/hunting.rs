use tracing::debug;

use crate::clock::TickTimer;
use crate::ghost::{Ghost, GhostMode};

pub const PHASES: usize = 8;

/// Alternating scatter/chase timetable of one level. Even phases scatter,
/// odd phases chase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuntingScheduler {
    durations: [i64; PHASES],
    phase: usize,
    timer: TickTimer,
}

impl HuntingScheduler {
    /// Durations in ticks; see [`TickTimer::new`] for the special values.
    pub fn new(durations: [i64; PHASES]) -> Self {
        Self {
            durations,
            phase: 0,
            timer: TickTimer::new(durations[0]),
        }
    }

    /// Restarts at the first scatter phase.
    pub fn start(&mut self) {
        self.phase = 0;
        self.timer = TickTimer::new(self.durations[0]);
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    pub fn mode(&self) -> GhostMode {
        if self.phase % 2 == 0 {
            GhostMode::Scatter
        } else {
            GhostMode::Chase
        }
    }

    pub fn ticks_remaining(&self) -> i64 {
        self.timer.remaining()
    }

    pub fn is_paused(&self) -> bool {
        !self.timer.is_running()
    }

    pub fn pause(&mut self) {
        self.timer.stop();
    }

    pub fn resume(&mut self) {
        self.timer.resume();
    }

    /// Runs one tick. When the phase ends every scatter or chase ghost takes
    /// the new mode and turns around; the new mode is returned.
    pub fn update(&mut self, ghosts: &mut [Ghost]) -> Option<GhostMode> {
        if !self.timer.tick() || self.phase + 1 >= PHASES {
            return None;
        }
        self.phase += 1;
        self.timer = TickTimer::new(self.durations[self.phase]);
        let mode = self.mode();
        debug!(phase = self.phase, ?mode, "hunting phase changed");
        for ghost in ghosts.iter_mut().filter(|g| g.mode.is_hunting()) {
            ghost.mode = mode;
            ghost.request_reversal();
        }
        Some(mode)
    }
}
