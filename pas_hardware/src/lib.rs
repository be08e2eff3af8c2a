//! Pedal and motor backends: a simulated crank and a recording current sink
//! for development, plus GPIO pedal pins behind the `hardware` feature.

pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;

use pas_traits::{Clock, CurrentSink, PedalPins};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::error::HwError;

/// Quadrature state for each quarter of a magnet cycle, forward order.
const QUARTER_STATES: [u8; 4] = [0, 2, 3, 1];

/// Simulated crank producing two-channel quadrature levels from a cadence.
///
/// Phase advances by the time elapsed between reads, so the cadence measured
/// by the core depends only on the clock, not on how often `read` is called.
/// A negative cadence walks the sequence backwards.
pub struct SimulatedPedal<C: Clock> {
    clock: C,
    last: Instant,
    /// Magnet cycles travelled.
    phase: f64,
    magnets: u32,
    rpm_bits: Arc<AtomicU32>,
}

/// Remote control for a `SimulatedPedal` owned by another thread.
#[derive(Debug, Clone)]
pub struct PedalControl {
    rpm_bits: Arc<AtomicU32>,
}

impl PedalControl {
    pub fn set_rpm(&self, rpm: f32) {
        self.rpm_bits.store(rpm.to_bits(), Ordering::Relaxed);
    }

    pub fn rpm(&self) -> f32 {
        f32::from_bits(self.rpm_bits.load(Ordering::Relaxed))
    }
}

impl<C: Clock> SimulatedPedal<C> {
    pub fn new(clock: C, magnets: u32) -> (Self, PedalControl) {
        let rpm_bits = Arc::new(AtomicU32::new(0.0f32.to_bits()));
        let last = clock.now();
        (
            Self {
                clock,
                last,
                phase: 0.0,
                magnets: magnets.max(1),
                rpm_bits: Arc::clone(&rpm_bits),
            },
            PedalControl { rpm_bits },
        )
    }
}

impl<C: Clock> PedalPins for SimulatedPedal<C> {
    fn read(&mut self) -> (bool, bool) {
        let now = self.clock.now();
        let dt = now.saturating_duration_since(self.last).as_secs_f64();
        self.last = now;
        let rpm = f64::from(f32::from_bits(self.rpm_bits.load(Ordering::Relaxed)));
        self.phase += dt * rpm / 60.0 * f64::from(self.magnets);

        let quarter = (self.phase.rem_euclid(1.0) * 4.0) as usize;
        let bits = QUARTER_STATES[quarter.min(3)];
        (bits & 1 != 0, bits & 2 != 0)
    }
}

/// Shared, cloneable log of the commands a `RecordingMotor` received.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    inner: Arc<Mutex<Vec<f32>>>,
}

impl CommandLog {
    pub fn commands(&self) -> Vec<f32> {
        self.inner.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<f32> {
        self.inner.lock().ok().and_then(|v| v.last().copied())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Current sink that records every command; stands in for the motor controller.
#[derive(Debug)]
pub struct RecordingMotor {
    log: CommandLog,
    fail: bool,
}

impl RecordingMotor {
    pub fn new() -> (Self, CommandLog) {
        let log = CommandLog::default();
        (
            Self {
                log: log.clone(),
                fail: false,
            },
            log,
        )
    }

    /// A motor whose every command is rejected (still recorded).
    pub fn failing() -> (Self, CommandLog) {
        let (mut m, log) = Self::new();
        m.fail = true;
        (m, log)
    }
}

impl CurrentSink for RecordingMotor {
    fn set_current_rel(
        &mut self,
        fraction: f32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Ok(mut v) = self.log.inner.lock() {
            v.push(fraction);
        }
        tracing::trace!(fraction, "motor current command");
        if self.fail {
            return Err(Box::new(HwError::Rejected("simulated fault".into())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pas_traits::clock::test_clock::TestClock;
    use std::time::Duration;

    fn state(levels: (bool, bool)) -> u8 {
        u8::from(levels.1) * 2 + u8::from(levels.0)
    }

    #[test]
    fn parked_pedal_stays_in_state_zero() {
        let clock = TestClock::new();
        let (mut pedal, _ctl) = SimulatedPedal::new(clock.clone(), 4);
        for _ in 0..10 {
            clock.advance(Duration::from_millis(10));
            assert_eq!(state(pedal.read()), 0);
        }
    }

    #[test]
    fn forward_cadence_walks_gray_sequence() {
        let clock = TestClock::new();
        let (mut pedal, ctl) = SimulatedPedal::new(clock.clone(), 4);
        // 60 rpm * 4 magnets = 4 cycles/s -> one quarter every 62.5 ms
        ctl.set_rpm(60.0);
        let mut seen = Vec::new();
        for _ in 0..4 {
            clock.advance(Duration::from_micros(62_600));
            seen.push(state(pedal.read()));
        }
        assert_eq!(seen, vec![2, 3, 1, 0]);
    }

    #[test]
    fn negative_cadence_walks_backwards() {
        let clock = TestClock::new();
        let (mut pedal, ctl) = SimulatedPedal::new(clock.clone(), 4);
        ctl.set_rpm(-60.0);
        let mut seen = Vec::new();
        for _ in 0..4 {
            clock.advance(Duration::from_micros(62_400));
            seen.push(state(pedal.read()));
        }
        assert_eq!(seen, vec![1, 3, 2, 0]);
    }

    #[test]
    fn recording_motor_keeps_commands_in_order() {
        let (mut m, log) = RecordingMotor::new();
        m.set_current_rel(0.2).unwrap();
        m.set_current_rel(0.0).unwrap();
        assert_eq!(log.commands(), vec![0.2, 0.0]);
        assert_eq!(log.last(), Some(0.0));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn failing_motor_reports_error_but_records() {
        let (mut m, log) = RecordingMotor::failing();
        let err = m.set_current_rel(0.5).unwrap_err();
        assert!(err.to_string().contains("simulated fault"));
        assert_eq!(log.commands(), vec![0.5]);
    }
}
