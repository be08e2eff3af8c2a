//! `From` implementations bridging `pas_config` types to `pas_core` types.

use crate::config::{AssistCurve, OutputMode, PasConfig};

impl From<pas_config::AssistCurve> for AssistCurve {
    fn from(c: pas_config::AssistCurve) -> Self {
        match c {
            pas_config::AssistCurve::Off => Self::Off,
            pas_config::AssistCurve::Basic => Self::Basic,
            pas_config::AssistCurve::Linear => Self::Linear,
        }
    }
}

impl From<pas_config::OutputMode> for OutputMode {
    fn from(m: pas_config::OutputMode) -> Self {
        match m {
            pas_config::OutputMode::Primary => Self::Primary,
            pas_config::OutputMode::Shared => Self::Shared,
        }
    }
}

impl From<&pas_config::Config> for PasConfig {
    fn from(c: &pas_config::Config) -> Self {
        Self {
            magnets: c.pas.magnets,
            pedal_rpm_start: c.pas.pedal_rpm_start,
            pedal_rpm_end: c.pas.pedal_rpm_end,
            invert_pedal_direction: c.pas.invert_pedal_direction,
            update_rate_hz: c.pas.update_rate_hz,
            alpha: c.filter.alpha,
            assist: c.control.assist.into(),
            current_scaling: c.control.current_scaling,
            ramp_time_pos_s: c.control.ramp_time_pos_s,
            ramp_time_neg_s: c.control.ramp_time_neg_s,
            loop_hz: c.control.loop_hz,
            min_ms_without_power: c.control.min_ms_without_power,
        }
    }
}
