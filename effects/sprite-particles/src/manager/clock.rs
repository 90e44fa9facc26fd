//! Gated simulation clock

/// Accumulates host time and decides when a simulation pass is due
///
/// Steps smaller than the configured precision are banked until enough time
/// has accumulated, so a fast frame rate does not produce many tiny passes.
/// Absolute time is kept in `f64` so small frames still register after days
/// of simulated time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationClock {
    accumulated_ms: f64,
    last_update_ms: f64,
    since_last_step_ms: f64,
}

impl SimulationClock {
    /// Bank `dt_ms`; returns the time covered by the pass when one is due
    pub fn advance(&mut self, dt_ms: f32, precision_ms: f32) -> Option<f32> {
        self.accumulated_ms += f64::from(dt_ms);
        self.since_last_step_ms = self.accumulated_ms - self.last_update_ms;
        if self.since_last_step_ms < f64::from(precision_ms) {
            return None;
        }

        let elapsed = self.since_last_step_ms as f32;
        self.last_update_ms = self.accumulated_ms;
        self.since_last_step_ms = 0.0;
        Some(elapsed)
    }

    /// Total simulated time in ms
    pub fn now_ms(&self) -> f64 {
        self.accumulated_ms
    }

    /// Simulated time at the last pass
    pub fn last_update_ms(&self) -> f64 {
        self.last_update_ms
    }

    /// Banked time not yet simulated
    pub fn pending_ms(&self) -> f32 {
        self.since_last_step_ms as f32
    }
}
