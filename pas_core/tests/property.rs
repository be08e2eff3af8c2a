use pas_core::{Arbiter, AssistCurve, OutputMode, PasApp, PasConfig};
use pas_core::mocks::NullSink;
use pas_traits::PedalPins;
use pas_traits::clock::test_clock::TestClock;
use proptest::prelude::*;
use std::time::Duration;

fn cadence_strategy() -> impl Strategy<Value = f32> {
    prop_oneof![
        8 => -300.0f32..300.0,
        1 => Just(f32::NAN),
        1 => Just(0.0f32),
    ]
}

fn curve_strategy() -> impl Strategy<Value = AssistCurve> {
    prop_oneof![
        Just(AssistCurve::Off),
        Just(AssistCurve::Basic),
        Just(AssistCurve::Linear),
    ]
}

proptest! {
    #[test]
    fn arbiter_output_is_bounded_and_ramp_limited(
        cadences in prop::collection::vec(cadence_strategy(), 1..400),
        scaling in 0.1f32..=1.0,
        ramp_pos in 0.05f32..2.0,
        ramp_neg in 0.05f32..2.0,
        loop_hz in 10u32..500,
        curve in curve_strategy(),
    ) {
        let cfg = PasConfig {
            current_scaling: scaling,
            ramp_time_pos_s: ramp_pos,
            ramp_time_neg_s: ramp_neg,
            loop_hz,
            min_ms_without_power: 0,
            assist: curve,
            ..PasConfig::default()
        };
        let mut arb = Arbiter::new(cfg);
        arb.start(OutputMode::Primary);
        let dt = 1.0 / loop_hz as f32;
        let max_step = dt / ramp_pos.min(ramp_neg) + 1e-4;
        let mut prev = 0.0f32;
        for c in cadences {
            let out = arb.tick(c).unwrap_or(0.0);
            prop_assert!(!out.is_nan());
            prop_assert!((0.0..=scaling).contains(&out), "out {} outside [0, {}]", out, scaling);
            prop_assert!((out - prev).abs() <= max_step, "jump {} -> {}", prev, out);
            prev = out;
        }
    }

    #[test]
    fn reverse_cadence_never_raises_output(
        cadences in prop::collection::vec(-300.0f32..=0.0, 1..200),
    ) {
        let mut arb = Arbiter::new(PasConfig { min_ms_without_power: 0, ..PasConfig::default() });
        arb.start(OutputMode::Shared);
        for c in cadences {
            prop_assert_eq!(arb.tick(c).unwrap_or(0.0), 0.0);
        }
    }
}

/// Replays a scripted sequence of pin levels.
struct ScriptPins {
    levels: Vec<(bool, bool)>,
    idx: usize,
}

impl PedalPins for ScriptPins {
    fn read(&mut self) -> (bool, bool) {
        let lv = self.levels.get(self.idx).copied().unwrap_or((false, false));
        self.idx += 1;
        lv
    }
}

proptest! {
    #[test]
    fn arbitrary_pin_noise_never_yields_implausible_cadence(
        steps in prop::collection::vec((any::<bool>(), any::<bool>(), 0u64..40), 1..2000),
    ) {
        let cfg = PasConfig {
            magnets: 4,
            pedal_rpm_start: 30.0,
            pedal_rpm_end: 100.0,
            ..PasConfig::default()
        };
        let app = PasApp::new(cfg, NullSink).unwrap();
        let clock = TestClock::new();
        let levels: Vec<_> = steps.iter().map(|&(a, b, _)| (a, b)).collect();
        let mut sensor = app.sensor(ScriptPins { levels, idx: 0 }, clock.clone());
        // fastest accepted cadence is 60 / min_pedal_period = 3 * end
        let limit = 3.0 * cfg.pedal_rpm_end + 1e-2;
        // slowest is one max_pulse_period (0.6 s) per magnet
        let floor = 60.0 / (0.6 * cfg.magnets as f32) - 1e-2;
        for &(_, _, ms) in &steps {
            clock.advance(Duration::from_millis(ms));
            sensor.sample();
            let rpm = sensor.cadence_rpm();
            prop_assert!(!rpm.is_nan());
            prop_assert!(rpm.abs() <= limit, "rpm {}", rpm);
            prop_assert!(rpm == 0.0 || rpm.abs() >= floor, "rpm {}", rpm);
        }
    }
}
