#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the pedal-assist application.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - Only `[pas]` is mandatory; every other section has working defaults.
use serde::Deserialize;

/// Sensor geometry and cadence thresholds.
#[derive(Debug, Deserialize, Clone)]
pub struct PasCfg {
    /// Magnets (pulses) per pedal revolution.
    pub magnets: u32,
    /// Cadence (RPM) at which assist may begin; also sets the inactivity timeout.
    pub pedal_rpm_start: f32,
    /// Cadence (RPM) at which the linear curve reaches full assist.
    pub pedal_rpm_end: f32,
    #[serde(default)]
    pub invert_pedal_direction: bool,
    /// Sampling rate of the pedal inputs.
    pub update_rate_hz: u32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilterCfg {
    /// Low-pass weight of the newest period sample. Range: (0.0, 1.0]; 1.0 disables smoothing.
    pub alpha: f32,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssistCurve {
    Off,
    Basic,
    #[default]
    Linear,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlCfg {
    pub assist: AssistCurve,
    /// Upper bound of the relative current command.
    pub current_scaling: f32,
    /// Seconds for a full 0 -> 1 output swing.
    pub ramp_time_pos_s: f32,
    /// Seconds for a full 1 -> 0 output swing.
    pub ramp_time_neg_s: f32,
    /// Supervisory loop rate.
    pub loop_hz: u32,
    /// Settling delay after start before any current is issued.
    pub min_ms_without_power: u64,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self {
            assist: AssistCurve::Linear,
            current_scaling: 1.0,
            ramp_time_pos_s: 0.6,
            ramp_time_neg_s: 0.3,
            loop_hz: 100,
            min_ms_without_power: 500,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// The app owns the motor current command.
    #[default]
    Primary,
    /// The app publishes a value that another controller blends.
    Shared,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RunnerCfg {
    pub output: OutputMode,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    /// BCM number of the first quadrature channel.
    pub pas1: u8,
    /// BCM number of the second quadrature channel.
    pub pas2: u8,
    /// Enable internal pull-ups (open-collector hall sensors).
    pub pull_up: bool,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            pas1: 17,
            pas2: 27,
            pull_up: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pas: PasCfg,
    #[serde(default)]
    pub filter: FilterCfg,
    #[serde(default)]
    pub control: ControlCfg,
    #[serde(default)]
    pub runner: RunnerCfg,
    #[serde(default)]
    pub pins: Pins,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file; validation is left to the caller.
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))
}

fn positive_finite(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sensor
        if self.pas.magnets == 0 {
            eyre::bail!("pas.magnets must be > 0");
        }
        if !positive_finite(self.pas.pedal_rpm_start) {
            eyre::bail!("pas.pedal_rpm_start must be > 0");
        }
        if !positive_finite(self.pas.pedal_rpm_end) {
            eyre::bail!("pas.pedal_rpm_end must be > 0");
        }
        if self.pas.pedal_rpm_end <= self.pas.pedal_rpm_start {
            eyre::bail!("pas.pedal_rpm_end must be greater than pas.pedal_rpm_start");
        }
        if self.pas.update_rate_hz == 0 {
            eyre::bail!("pas.update_rate_hz must be > 0");
        }

        // Filter
        if !(self.filter.alpha > 0.0 && self.filter.alpha <= 1.0) {
            eyre::bail!("filter.alpha must be in (0.0, 1.0]");
        }

        // Control
        if !(self.control.current_scaling > 0.0 && self.control.current_scaling <= 1.0) {
            eyre::bail!("control.current_scaling must be in (0.0, 1.0]");
        }
        if !positive_finite(self.control.ramp_time_pos_s) {
            eyre::bail!("control.ramp_time_pos_s must be > 0");
        }
        if !positive_finite(self.control.ramp_time_neg_s) {
            eyre::bail!("control.ramp_time_neg_s must be > 0");
        }
        if self.control.loop_hz == 0 {
            eyre::bail!("control.loop_hz must be > 0");
        }
        if self.control.min_ms_without_power > 60 * 1000 {
            eyre::bail!("control.min_ms_without_power is unreasonably large (>60s)");
        }

        // Pins
        if self.pins.pas1 == self.pins.pas2 {
            eyre::bail!("pins.pas1 and pins.pas2 must differ");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
