//! Background pedal sampling.
//!
//! Stands in for a hardware timer interrupt: spawns a thread that owns the
//! `CadenceSensor` and calls `sample()` at a fixed rate, deadline-paced so
//! that the inactivity step stays close to wall time.
//!
//! Each `PedalSampler` spawns exactly one thread that is shut down when the
//! sampler is dropped.
use pas_traits::{Clock, PedalPins};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::sensor::CadenceSensor;

pub struct PedalSampler {
    samples: Arc<AtomicU64>,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl PedalSampler {
    pub fn spawn<P, C>(mut sensor: CadenceSensor<P, C>, hz: u32) -> Self
    where
        P: PedalPins + Send + 'static,
        C: Clock + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let samples = Arc::new(AtomicU64::new(0));
        let samples_clone = samples.clone();
        let period = Duration::from_micros(crate::util::period_us(hz));

        let join_handle = std::thread::spawn(move || {
            let mut next = sensor.clock().now() + period;
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("pedal sampler received shutdown signal");
                    break;
                }

                sensor.sample();
                samples_clone.fetch_add(1, Ordering::Relaxed);

                if sensor.clock().sleep_until(next) {
                    next += period;
                } else {
                    // overran; resynchronise instead of bursting to catch up
                    next = sensor.clock().now() + period;
                }
            }
            tracing::trace!("pedal sampler thread exiting cleanly");
        });

        Self {
            samples,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Number of sampling events executed so far.
    pub fn sample_count(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }
}

impl Drop for PedalSampler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("pedal sampler thread joined successfully");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we're in Drop)
                    tracing::warn!(?e, "pedal sampler thread panicked during shutdown");
                }
            }
        }
    }
}
