//! Low-pass filtering of per-revolution pedal periods.

use crate::util::lp_fast;

/// Filtered pedal period with implausibly-short-period rejection.
#[derive(Debug, Default, Clone)]
pub struct CadenceFilter {
    filtered: Option<f32>,
}

impl CadenceFilter {
    /// Feed one per-revolution period (seconds).
    ///
    /// Returns the new filtered period, or `None` when the measurement is
    /// rejected; a rejected measurement leaves the filter untouched. The first
    /// accepted measurement seeds the filter directly.
    pub fn update(&mut self, period_s: f32, alpha: f32, min_period_s: f32) -> Option<f32> {
        if period_s.is_nan() || period_s < min_period_s {
            return None;
        }
        let candidate = match self.filtered {
            Some(prev) => lp_fast(prev, period_s, alpha),
            None => period_s,
        };
        if candidate < min_period_s {
            return None;
        }
        self.filtered = Some(candidate);
        Some(candidate)
    }

    pub fn filtered_period(&self) -> Option<f32> {
        self.filtered
    }

    /// Forget the filtered period; the next accepted measurement seeds again.
    #[inline]
    pub fn reset(&mut self) {
        self.filtered = None;
    }
}

/// Signed cadence in RPM for a per-revolution period.
#[inline]
pub fn rpm_from_period(period_s: f32, sign: f32) -> f32 {
    60.0 / period_s * sign
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: f32 = 0.2;

    #[test]
    fn short_period_is_rejected_and_state_kept() {
        let mut f = CadenceFilter::default();
        assert_eq!(f.update(0.3, 1.0, MIN), Some(0.3));
        assert_eq!(f.update(0.15, 1.0, MIN), None);
        assert_eq!(f.filtered_period(), Some(0.3));
    }

    #[test]
    fn short_period_never_pulls_filter_down_even_with_smoothing() {
        let mut f = CadenceFilter::default();
        f.update(0.25, 0.5, MIN);
        // 0.5*0.25 + 0.5*0.19 would be accepted; the raw check prevents it.
        assert_eq!(f.update(0.19, 0.5, MIN), None);
        assert_eq!(f.filtered_period(), Some(0.25));
    }

    #[test]
    fn first_measurement_seeds_the_filter() {
        let mut f = CadenceFilter::default();
        assert_eq!(f.update(1.0, 0.1, MIN), Some(1.0));
        let next = f.update(0.5, 0.1, MIN).unwrap();
        assert!((next - 0.95).abs() < 1e-6);
    }

    #[test]
    fn filter_converges_to_steady_period() {
        let mut f = CadenceFilter::default();
        f.update(1.2, 0.3, MIN);
        let mut last = 0.0;
        for _ in 0..60 {
            last = f.update(0.3, 0.3, MIN).unwrap();
        }
        assert!((last - 0.3).abs() < 1e-4);
        assert!((rpm_from_period(last, 1.0) - 200.0).abs() < 0.1);
    }

    #[test]
    fn reset_lets_the_next_measurement_seed_again() {
        let mut f = CadenceFilter::default();
        f.update(8.3, 0.2, MIN);
        f.reset();
        assert_eq!(f.filtered_period(), None);
        assert_eq!(f.update(0.3, 0.2, MIN), Some(0.3));
    }

    #[test]
    fn nan_period_is_rejected() {
        let mut f = CadenceFilter::default();
        assert_eq!(f.update(f32::NAN, 1.0, MIN), None);
        assert_eq!(f.filtered_period(), None);
    }

    #[test]
    fn rpm_sign_follows_direction() {
        assert_eq!(rpm_from_period(0.5, -1.0), -120.0);
    }
}
