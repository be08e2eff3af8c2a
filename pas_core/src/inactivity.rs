//! Pedaling-stopped detection.
//!
//! Sampling is assumed periodic, so elapsed time is approximated by a fixed
//! step per sample instead of reading the clock.

#[derive(Debug, Default, Clone)]
pub struct InactivityMonitor {
    elapsed_s: f32,
}

impl InactivityMonitor {
    /// Account for one sample without an accepted edge.
    /// Returns `true` once the elapsed time exceeds `max_pulse_period`.
    #[inline]
    pub fn tick(&mut self, step_s: f32, max_pulse_period: f32) -> bool {
        // saturate instead of growing without bound while parked
        if self.elapsed_s <= max_pulse_period {
            self.elapsed_s += step_s;
        }
        self.elapsed_s > max_pulse_period
    }

    #[inline]
    pub fn reset(&mut self) {
        self.elapsed_s = 0.0;
    }

    /// Whether the monitor has already reported pedaling as stopped.
    #[inline]
    pub fn timed_out(&self, max_pulse_period: f32) -> bool {
        self.elapsed_s > max_pulse_period
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed_s
    }
}
