//! Release-rate limiting

use rand::Rng;

use crate::config::ParticleConfig;

/// Length of a release window in ms
pub const RELEASE_WINDOW_MS: f32 = 1000.0;

/// Counts releases inside one-second windows
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlowControl {
    window_start_ms: f64,
    released: usize,
}

impl FlowControl {
    /// How many particles may be released in a pass covering `elapsed_ms`
    /// that ends at `now_ms`
    ///
    /// The count follows the emission rate with random variance, is at least
    /// one when guaranteed release is on, and never pushes the window total
    /// past `ceil(rate)`.
    pub fn budget<R: Rng + ?Sized>(
        &mut self,
        now_ms: f64,
        elapsed_ms: f32,
        config: &ParticleConfig,
        rng: &mut R,
    ) -> usize {
        if now_ms - self.window_start_ms > f64::from(RELEASE_WINDOW_MS) {
            self.released = 0;
            self.window_start_ms = now_ms;
        }

        let rate = config.emission_rate();
        let factor = 1.0 + config.emission_variance() * (rng.random::<f32>() - 0.5);
        let wanted = (rate * elapsed_ms / 1000.0 * factor).floor();
        let wanted = if wanted <= 0.0 {
            usize::from(config.guaranteed_release())
        } else {
            wanted as usize
        };

        let remaining = (rate.ceil() as usize).saturating_sub(self.released);
        wanted.min(remaining)
    }

    /// Count one release against the current window
    pub fn record_release(&mut self) {
        self.released += 1;
    }

    /// Releases counted in the current window
    pub fn released(&self) -> usize {
        self.released
    }

    /// Simulation time at which the current window opened
    pub fn window_start_ms(&self) -> f64 {
        self.window_start_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn config(rate: f32, guaranteed: bool) -> ParticleConfig {
        let mut config = ParticleConfig::default();
        config.set_emission_rate(rate);
        config.set_guaranteed_release(guaranteed);
        config
    }

    #[test]
    fn test_budget_follows_rate() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut flow = FlowControl::default();
        assert_eq!(flow.budget(100.0, 100.0, &config(50.0, true), &mut rng), 5);
    }

    #[test]
    fn test_guaranteed_release_floor() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut flow = FlowControl::default();
        assert_eq!(flow.budget(10.0, 10.0, &config(10.0, true), &mut rng), 1);
        assert_eq!(flow.budget(20.0, 10.0, &config(10.0, false), &mut rng), 0);
    }

    #[test]
    fn test_window_cap_and_reset() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut flow = FlowControl::default();
        let config = config(3.0, true);
        for _ in 0..3 {
            flow.record_release();
        }
        assert_eq!(flow.budget(500.0, 500.0, &config, &mut rng), 0);

        assert_eq!(flow.budget(1001.0, 501.0, &config, &mut rng), 1);
        assert_eq!(flow.released(), 0);
        assert_eq!(flow.window_start_ms(), 1001.0);
    }

    #[test]
    fn test_windows_roll_over_late_in_a_run() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut flow = FlowControl::default();
        let config = config(3.0, true);
        flow.budget(3.0e8, 10.0, &config, &mut rng);
        flow.record_release();
        assert_eq!(flow.window_start_ms(), 3.0e8);

        flow.budget(3.0e8 + 1001.0, 10.0, &config, &mut rng);
        assert_eq!(flow.released(), 0);
        assert_eq!(flow.window_start_ms(), 3.0e8 + 1001.0);
    }
}
