//! Cadence-to-current arbitration.
//!
//! Pure state machine: the supervisory thread feeds it the shared cadence once
//! per loop period and forwards what it returns. Time advances by a fixed
//! `1 / loop_hz` per tick.

use crate::config::{AssistCurve, OutputMode, PasConfig};
use crate::status::ArbiterState;
use crate::util::{period_us, step_towards};

/// Below this the output counts as "no power delivered".
pub const OUTPUT_EPSILON: f32 = 0.001;

#[derive(Debug, Clone)]
pub struct Arbiter {
    cfg: PasConfig,
    mode: OutputMode,
    state: ArbiterState,
    us_without_power: u64,
    output: f32,
}

impl Arbiter {
    pub fn new(cfg: PasConfig) -> Self {
        Self {
            cfg,
            mode: OutputMode::Primary,
            state: ArbiterState::Stopped,
            us_without_power: 0,
            output: 0.0,
        }
    }

    pub fn start(&mut self, mode: OutputMode) {
        self.mode = mode;
        self.state = ArbiterState::Starting;
        self.us_without_power = 0;
        self.output = 0.0;
    }

    /// Swap the snapshot. Accumulated ramp state is invalidated, so a running
    /// arbiter goes back through the safe-start delay.
    pub fn reconfigure(&mut self, cfg: PasConfig) {
        self.cfg = cfg;
        self.us_without_power = 0;
        self.output = 0.0;
        if self.state == ArbiterState::Running {
            self.state = ArbiterState::Starting;
        }
    }

    /// Advance one loop period with the latest cadence.
    ///
    /// Returns the fraction to command, or `None` while output is gated
    /// (stopped or in the safe-start delay); the published value is then 0.
    pub fn tick(&mut self, cadence_rpm: f32) -> Option<f32> {
        let dt_us = period_us(self.cfg.loop_hz);
        match self.state {
            ArbiterState::Stopped | ArbiterState::Stopping => None,
            ArbiterState::Starting => {
                self.us_without_power = self.us_without_power.saturating_add(dt_us);
                if self.us_without_power >= self.cfg.min_ms_without_power.saturating_mul(1000) {
                    self.state = ArbiterState::Running;
                    tracing::debug!(
                        ms_without_power = self.ms_without_power(),
                        "safe-start delay elapsed"
                    );
                }
                None
            }
            ArbiterState::Running => {
                let target = self.assist_target(cadence_rpm);
                let ramp_time = if target > self.output {
                    self.cfg.ramp_time_pos_s
                } else {
                    self.cfg.ramp_time_neg_s
                };
                let dt = dt_us as f32 / 1_000_000.0;
                self.output = step_towards(self.output, target, dt / ramp_time)
                    .clamp(0.0, self.cfg.current_scaling);
                if self.output < OUTPUT_EPSILON {
                    self.us_without_power = self.us_without_power.saturating_add(dt_us);
                } else {
                    self.us_without_power = 0;
                }
                Some(self.output)
            }
        }
    }

    /// Unramped output requested for a cadence.
    pub fn assist_target(&self, cadence_rpm: f32) -> f32 {
        // reverse pedaling never drives the motor forward
        if cadence_rpm.is_nan() || cadence_rpm <= 0.0 {
            return 0.0;
        }
        let start = self.cfg.pedal_rpm_start;
        let level = match self.cfg.assist {
            AssistCurve::Off => 0.0,
            AssistCurve::Basic => {
                if cadence_rpm > start + 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
            AssistCurve::Linear => {
                ((cadence_rpm - start) / (self.cfg.pedal_rpm_end - start)).clamp(0.0, 1.0)
            }
        };
        level * self.cfg.current_scaling
    }

    /// Enter `Stopping` and drop the output to zero immediately.
    pub fn request_stop(&mut self) {
        self.state = ArbiterState::Stopping;
        self.output = 0.0;
    }

    /// Acknowledge the stop.
    pub fn finish(&mut self) {
        self.state = ArbiterState::Stopped;
        self.output = 0.0;
    }

    pub fn state(&self) -> ArbiterState {
        self.state
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn output(&self) -> f32 {
        self.output
    }

    pub fn ms_without_power(&self) -> u64 {
        self.us_without_power / 1000
    }

    pub fn config(&self) -> &PasConfig {
        &self.cfg
    }
}
