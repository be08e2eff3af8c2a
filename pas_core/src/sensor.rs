//! The sampling-event path: decode, filter, detect inactivity.
//!
//! `CadenceSensor::sample` is meant to be called from a timer at the
//! configured update rate. It reads the pins itself, never allocates, never
//! blocks and publishes its result only through the shared cadence value.

use std::sync::Arc;
use std::time::Instant;

use pas_traits::{Clock, PedalPins};

use crate::cadence::{CadenceFilter, rpm_from_period};
use crate::config::Thresholds;
use crate::inactivity::InactivityMonitor;
use crate::quadrature::{QuadState, QuadratureDecoder, Step};
use crate::shared::Shared;

pub struct CadenceSensor<P, C> {
    pins: P,
    clock: C,
    shared: Arc<Shared>,
    decoder: QuadratureDecoder,
    filter: CadenceFilter,
    monitor: InactivityMonitor,
    last_edge: Option<Instant>,
}

impl<P: PedalPins, C: Clock> CadenceSensor<P, C> {
    pub(crate) fn new(pins: P, clock: C, shared: Arc<Shared>) -> Self {
        Self {
            pins,
            clock,
            shared,
            decoder: QuadratureDecoder::default(),
            filter: CadenceFilter::default(),
            monitor: InactivityMonitor::default(),
            last_edge: None,
        }
    }

    /// Process one sampling event.
    pub fn sample(&mut self) {
        let t = self.shared.thresholds.load();
        let (a, b) = self.pins.read();
        let next = QuadState::from_levels(a, b);
        let step = self.decoder.update(next);

        if next == QuadState::REFERENCE
            && let Some(direction) = step.direction()
            && self.on_reference_edge(step, direction, &t)
        {
            self.monitor.reset();
            return;
        }

        // if no pedal activity, set RPM as zero
        if self.monitor.tick(t.inactivity_step, t.max_pulse_period) {
            self.shared.cadence_rpm.store(0.0);
        }
    }

    /// Returns `true` when the edge counts as pedal activity.
    #[inline]
    fn on_reference_edge(&mut self, step: Step, direction: f32, t: &Thresholds) -> bool {
        let now = self.clock.now();
        let Some(prev) = self.last_edge.replace(now) else {
            // first edge only establishes the timing reference
            return true;
        };
        let interval = now.saturating_duration_since(prev).as_secs_f32();
        if interval > t.max_pulse_period || self.monitor.timed_out(t.max_pulse_period) {
            // resuming after a pause: the previous edge is stale, start over from this one
            self.filter.reset();
            self.shared.cadence_rpm.store(0.0);
            tracing::trace!(interval, "pedaling resumed; timing reference reseeded");
            return true;
        }
        let period = interval * t.magnets as f32;
        match self.filter.update(period, t.alpha, t.min_pedal_period) {
            Some(filtered) => {
                self.shared
                    .cadence_rpm
                    .store(rpm_from_period(filtered, t.direction_sign * direction));
                true
            }
            None => {
                tracing::trace!(period, ?step, "pedal period rejected");
                false
            }
        }
    }

    /// Last published cadence.
    pub fn cadence_rpm(&self) -> f32 {
        self.shared.cadence_rpm()
    }

    pub fn filtered_period(&self) -> Option<f32> {
        self.filter.filtered_period()
    }

    /// Seconds accumulated since the last accepted edge.
    pub fn inactivity_s(&self) -> f32 {
        self.monitor.elapsed()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
