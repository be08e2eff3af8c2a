//! Runtime configuration snapshot for the pedal-assist core.
//!
//! `PasConfig` is what `PasApp::configure` accepts. It is separate from the
//! TOML-deserialized config in `pas_config`; see `conversions`.

use crate::error::{PasError, Result};

/// How cadence maps to the requested assist level before ramping and scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssistCurve {
    /// Never assist.
    Off,
    /// Full assist once cadence exceeds `pedal_rpm_start + 1`.
    Basic,
    /// Linear from `pedal_rpm_start` (0) to `pedal_rpm_end` (1).
    #[default]
    Linear,
}

/// Who consumes the arbitrated current fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// The supervisory loop drives the `CurrentSink` directly.
    #[default]
    Primary,
    /// The value is only published; another controller reads and blends it.
    Shared,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PasConfig {
    /// Magnets (pulses) per pedal revolution.
    pub magnets: u32,
    pub pedal_rpm_start: f32,
    pub pedal_rpm_end: f32,
    pub invert_pedal_direction: bool,
    /// Sampling rate of the pedal inputs; also the inactivity step.
    pub update_rate_hz: u32,
    /// Low-pass weight of the newest period measurement, (0.0, 1.0].
    pub alpha: f32,
    pub assist: AssistCurve,
    /// Ceiling of the output fraction, (0.0, 1.0].
    pub current_scaling: f32,
    pub ramp_time_pos_s: f32,
    pub ramp_time_neg_s: f32,
    /// Supervisory loop rate.
    pub loop_hz: u32,
    /// Output is held at zero for this long after start or reconfigure.
    pub min_ms_without_power: u64,
}

impl Default for PasConfig {
    fn default() -> Self {
        Self {
            magnets: 24,
            pedal_rpm_start: 10.0,
            pedal_rpm_end: 120.0,
            invert_pedal_direction: false,
            update_rate_hz: 1000,
            alpha: 1.0,
            assist: AssistCurve::Linear,
            current_scaling: 1.0,
            ramp_time_pos_s: 0.6,
            ramp_time_neg_s: 0.3,
            loop_hz: 100,
            min_ms_without_power: 500,
        }
    }
}

/// Values derived once per configure call and consumed by the sampling path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Seconds without a qualifying edge after which cadence is forced to zero.
    pub max_pulse_period: f32,
    /// Per-revolution periods shorter than this are rejected as noise.
    pub min_pedal_period: f32,
    /// -1.0 when the sensor is mounted inverted, else 1.0.
    pub direction_sign: f32,
    /// Seconds added to the inactivity accumulator per sample.
    pub inactivity_step: f32,
    pub magnets: u32,
    pub alpha: f32,
}

fn positive_finite(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

fn reject(msg: &str) -> Result<()> {
    Err(PasError::Config(msg.to_string()))
}

impl PasConfig {
    pub fn validate(&self) -> Result<()> {
        if self.magnets == 0 {
            return reject("magnets must be > 0");
        }
        if !positive_finite(self.pedal_rpm_start) {
            return reject("pedal_rpm_start must be > 0");
        }
        if !positive_finite(self.pedal_rpm_end) {
            return reject("pedal_rpm_end must be > 0");
        }
        if self.pedal_rpm_end <= self.pedal_rpm_start {
            return reject("pedal_rpm_end must be greater than pedal_rpm_start");
        }
        if self.update_rate_hz == 0 {
            return reject("update_rate_hz must be > 0");
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return reject("alpha must be in (0.0, 1.0]");
        }
        if !(self.current_scaling > 0.0 && self.current_scaling <= 1.0) {
            return reject("current_scaling must be in (0.0, 1.0]");
        }
        if !positive_finite(self.ramp_time_pos_s) || !positive_finite(self.ramp_time_neg_s) {
            return reject("ramp times must be > 0");
        }
        if self.loop_hz == 0 {
            return reject("loop_hz must be > 0");
        }
        Ok(())
    }

    /// Precompute the sampling-path thresholds. Call only on a validated config.
    pub fn thresholds(&self) -> Thresholds {
        let magnets = self.magnets as f32;
        Thresholds {
            // a period longer than this should immediately reduce power to zero
            max_pulse_period: 1.0 / ((self.pedal_rpm_start / 60.0) * magnets) * 1.2,
            // three times the end cadence is beyond anything a rider produces
            min_pedal_period: 1.0 / (self.pedal_rpm_end * 3.0 / 60.0),
            direction_sign: if self.invert_pedal_direction { -1.0 } else { 1.0 },
            inactivity_step: 1.0 / self.update_rate_hz as f32,
            magnets: self.magnets,
            alpha: self.alpha,
        }
    }

    /// Supervisory loop period in seconds.
    pub fn loop_period_s(&self) -> f32 {
        1.0 / self.loop_hz.max(1) as f32
    }
}
