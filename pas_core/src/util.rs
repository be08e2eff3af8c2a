//! Rate/period helpers shared by the sampling and supervisory paths.

use std::time::Duration;

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// Compute the period in microseconds for a given rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 microsecond.
#[inline]
pub fn period_us(hz: u32) -> u64 {
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

#[inline]
pub fn period(hz: u32) -> Duration {
    Duration::from_micros(period_us(hz))
}

/// Single-pole low-pass: `value + alpha * (sample - value)`.
#[inline]
pub fn lp_fast(value: f32, sample: f32, alpha: f32) -> f32 {
    value + alpha * (sample - value)
}

/// Move `value` toward `goal` by at most `step`.
#[inline]
pub fn step_towards(value: f32, goal: f32, step: f32) -> f32 {
    if value < goal {
        (value + step).min(goal)
    } else if value > goal {
        (value - step).max(goal)
    } else {
        value
    }
}
