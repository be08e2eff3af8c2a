//! Lock-free values shared between the sampling path and the supervisory loop.
//!
//! Every value is a single word; writers overwrite, readers tolerate being one
//! update behind. Nothing here blocks, so the sampling path stays bounded.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use crate::config::Thresholds;

/// `f32` stored as its bit pattern in an `AtomicU32`.
#[derive(Debug, Default)]
pub struct AtomicF32 {
    bits: AtomicU32,
}

impl AtomicF32 {
    pub const fn zero() -> Self {
        Self {
            bits: AtomicU32::new(0),
        }
    }

    pub fn new(v: f32) -> Self {
        Self {
            bits: AtomicU32::new(v.to_bits()),
        }
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, v: f32) {
        self.bits.store(v.to_bits(), Ordering::Relaxed);
    }
}

/// Sampling-side half of the configuration snapshot.
///
/// Fields are stored individually; a reader racing a `store` may observe a
/// mix of old and new values, which is why reconfiguring during active
/// sampling is a caller error.
#[derive(Debug, Default)]
pub struct ThresholdCell {
    max_pulse_period: AtomicF32,
    min_pedal_period: AtomicF32,
    direction_sign: AtomicF32,
    inactivity_step: AtomicF32,
    alpha: AtomicF32,
    magnets: AtomicU32,
}

impl ThresholdCell {
    pub fn new(t: &Thresholds) -> Self {
        let cell = Self::default();
        cell.store(t);
        cell
    }

    pub fn store(&self, t: &Thresholds) {
        self.max_pulse_period.store(t.max_pulse_period);
        self.min_pedal_period.store(t.min_pedal_period);
        self.direction_sign.store(t.direction_sign);
        self.inactivity_step.store(t.inactivity_step);
        self.alpha.store(t.alpha);
        self.magnets.store(t.magnets, Ordering::Relaxed);
    }

    #[inline]
    pub fn load(&self) -> Thresholds {
        Thresholds {
            max_pulse_period: self.max_pulse_period.load(),
            min_pedal_period: self.min_pedal_period.load(),
            direction_sign: self.direction_sign.load(),
            inactivity_step: self.inactivity_step.load(),
            alpha: self.alpha.load(),
            magnets: self.magnets.load(Ordering::Relaxed),
        }
    }
}

/// State visible to both execution contexts and to status readers.
#[derive(Debug)]
pub struct Shared {
    pub(crate) thresholds: ThresholdCell,
    /// Signed pedal cadence; written only by the sampling path.
    pub(crate) cadence_rpm: AtomicF32,
    /// Arbitrated current fraction; written only by the supervisory side.
    pub(crate) output: AtomicF32,
    pub(crate) running: AtomicBool,
    /// Rejected motor commands; written only by the supervisory side.
    pub(crate) sink_failures: AtomicU64,
}

impl Shared {
    pub(crate) fn new(t: &Thresholds) -> Self {
        Self {
            thresholds: ThresholdCell::new(t),
            cadence_rpm: AtomicF32::zero(),
            output: AtomicF32::zero(),
            running: AtomicBool::new(false),
            sink_failures: AtomicU64::new(0),
        }
    }

    pub fn cadence_rpm(&self) -> f32 {
        self.cadence_rpm.load()
    }

    pub fn output_fraction(&self) -> f32 {
        self.output.load()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }
}
