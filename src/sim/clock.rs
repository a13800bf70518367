//! Tick scheduling
//!
//! Hosts report wall time; a `TickSource` answers how many fixed simulation
//! ticks to run for it. Tests use `ManualClock` to step without real time.

use crate::consts::{MAX_SUBSTEPS, SIM_DT_MS};

pub trait TickSource {
    /// Report the host's current time and get the number of ticks to run.
    fn advance(&mut self, now_ms: f64) -> u32;

    /// Simulated duration of one tick
    fn tick_ms(&self) -> f32;

    /// Forget accumulated time (after a pause or tab switch)
    fn reset(&mut self) {}
}

/// Fixed-timestep accumulator with a substep cap
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step_ms: f64,
    max_substeps: u32,
    accumulator: f64,
    last_ms: Option<f64>,
}

impl Default for FixedStepClock {
    fn default() -> Self {
        Self::new(SIM_DT_MS, MAX_SUBSTEPS)
    }
}

impl FixedStepClock {
    pub fn new(step_ms: f32, max_substeps: u32) -> Self {
        Self {
            step_ms: step_ms.max(1.0) as f64,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
            last_ms: None,
        }
    }
}

impl TickSource for FixedStepClock {
    fn advance(&mut self, now_ms: f64) -> u32 {
        let Some(last) = self.last_ms.replace(now_ms) else {
            // First frame runs exactly one tick
            return 1;
        };

        // Clamp so a stalled tab can't queue up a spiral of catch-up ticks
        let frame_ms = (now_ms - last).clamp(0.0, self.step_ms * self.max_substeps as f64);
        self.accumulator += frame_ms;

        let mut steps = 0;
        while self.accumulator >= self.step_ms && steps < self.max_substeps {
            self.accumulator -= self.step_ms;
            steps += 1;
        }
        steps
    }

    fn tick_ms(&self) -> f32 {
        self.step_ms as f32
    }

    fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_ms = None;
    }
}

/// Test clock: runs exactly the ticks queued on it
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    pending: u32,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&mut self, ticks: u32) {
        self.pending += ticks;
    }
}

impl TickSource for ManualClock {
    fn advance(&mut self, _now_ms: f64) -> u32 {
        std::mem::take(&mut self.pending)
    }

    fn tick_ms(&self) -> f32 {
        SIM_DT_MS
    }

    fn reset(&mut self) {
        self.pending = 0;
    }
}
