//! Sampling-path behaviour: decode, filter, inactivity.
//!
//! Every sample advances a TestClock by 1 ms, matching update_rate_hz = 1000.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use pas_core::mocks::NullSink;
use pas_core::{CadenceSensor, PasApp, PasConfig};
use pas_hardware::{PedalControl, SimulatedPedal};
use pas_traits::PedalPins;
use rstest::rstest;
use pas_traits::clock::test_clock::TestClock;

fn scenario() -> PasConfig {
    PasConfig {
        magnets: 4,
        pedal_rpm_start: 30.0,
        pedal_rpm_end: 100.0,
        invert_pedal_direction: false,
        update_rate_hz: 1000,
        ..PasConfig::default()
    }
}

struct Rig {
    app: PasApp<NullSink>,
    sensor: CadenceSensor<SimulatedPedal<TestClock>, TestClock>,
    clock: TestClock,
    pedal: PedalControl,
}

impl Rig {
    fn new(cfg: PasConfig) -> Self {
        let app = PasApp::new(cfg, NullSink).expect("valid config");
        let clock = TestClock::new();
        let (pins, pedal) = SimulatedPedal::new(clock.clone(), cfg.magnets);
        let sensor = app.sensor(pins, clock.clone());
        Self {
            app,
            sensor,
            clock,
            pedal,
        }
    }

    fn run_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.clock.advance(Duration::from_millis(1));
            self.sensor.sample();
        }
    }
}

#[test]
fn steady_pedaling_yields_sixty_over_period() {
    // 0.3 s per revolution = 75 ms between reference edges with 4 magnets
    let mut rig = Rig::new(scenario());
    rig.pedal.set_rpm(200.0);
    rig.run_ms(1000);
    let rpm = rig.sensor.cadence_rpm();
    assert!((rpm - 200.0).abs() < 0.5, "rpm = {rpm}");
    let period = rig.sensor.filtered_period().expect("filtered");
    assert!((period - 0.3).abs() < 1e-3);
}

#[test]
fn smoothing_converges_to_the_same_cadence() {
    let mut rig = Rig::new(PasConfig {
        alpha: 0.2,
        ..scenario()
    });
    rig.pedal.set_rpm(120.0);
    rig.run_ms(500);
    rig.pedal.set_rpm(200.0);
    rig.run_ms(3000);
    let rpm = rig.sensor.cadence_rpm();
    assert!((rpm - 200.0).abs() < 1.0, "rpm = {rpm}");
}

#[test]
fn reverse_pedaling_is_negative() {
    let mut rig = Rig::new(scenario());
    rig.pedal.set_rpm(-200.0);
    rig.run_ms(1000);
    let rpm = rig.sensor.cadence_rpm();
    assert!((rpm + 200.0).abs() < 0.5, "rpm = {rpm}");
}

#[test]
fn inverted_mounting_flips_the_sign() {
    let mut rig = Rig::new(PasConfig {
        invert_pedal_direction: true,
        ..scenario()
    });
    rig.pedal.set_rpm(200.0);
    rig.run_ms(1000);
    assert!(rig.sensor.cadence_rpm() < -199.0);
}

#[test]
fn first_reference_edge_only_seeds_timing() {
    let mut rig = Rig::new(scenario());
    rig.pedal.set_rpm(200.0);
    // first entry into the reference state happens at 37.5 ms
    rig.run_ms(60);
    assert_eq!(rig.sensor.cadence_rpm(), 0.0);
    assert_eq!(rig.sensor.filtered_period(), None);
    rig.run_ms(60);
    assert!(rig.sensor.cadence_rpm() > 0.0);
}

#[test]
fn too_fast_periods_never_update_cadence() {
    let mut rig = Rig::new(scenario());
    rig.pedal.set_rpm(200.0);
    rig.run_ms(1000);
    // 0.15 s per revolution, below min_pedal_period = 0.2 s
    rig.pedal.set_rpm(400.0);
    rig.run_ms(120);
    let period = rig.sensor.filtered_period().expect("filtered");
    let rpm = rig.sensor.cadence_rpm();
    assert!(period >= 0.2);
    rig.run_ms(300);
    assert_eq!(rig.sensor.filtered_period(), Some(period));
    assert_eq!(rig.sensor.cadence_rpm(), rpm);
}

#[test]
fn rejected_edges_still_let_cadence_time_out() {
    let mut rig = Rig::new(scenario());
    rig.pedal.set_rpm(200.0);
    rig.run_ms(1000);
    rig.pedal.set_rpm(400.0);
    rig.run_ms(1000);
    assert_eq!(rig.sensor.cadence_rpm(), 0.0);
}

#[rstest]
#[case::unsmoothed(1.0)]
#[case::smoothed(0.2)]
fn resuming_after_a_stop_measures_from_a_fresh_edge(#[case] alpha: f32) {
    let mut rig = Rig::new(PasConfig {
        alpha,
        ..scenario()
    });
    rig.pedal.set_rpm(200.0);
    rig.run_ms(1000);
    rig.pedal.set_rpm(0.0);
    rig.run_ms(2000);
    assert_eq!(rig.sensor.cadence_rpm(), 0.0);

    // pedal is parked mid-cycle, so the first reference edge comes ~13 ms in
    rig.pedal.set_rpm(200.0);
    for _ in 0..60 {
        rig.run_ms(1);
        assert_eq!(rig.sensor.cadence_rpm(), 0.0, "the pre-stop edge must not be measured");
    }
    assert_eq!(rig.sensor.filtered_period(), None);

    // the next edge, 75 ms after the first, gives the true cadence at once
    rig.run_ms(40);
    let rpm = rig.sensor.cadence_rpm();
    assert!((rpm - 200.0).abs() < 0.5, "rpm = {rpm}");
    rig.run_ms(500);
    let rpm = rig.sensor.cadence_rpm();
    assert!((rpm - 200.0).abs() < 0.5, "rpm = {rpm}");
}

/// Pedal frozen at whatever levels the test sets.
#[derive(Clone)]
struct ManualPins(Rc<Cell<(bool, bool)>>);

impl PedalPins for ManualPins {
    fn read(&mut self) -> (bool, bool) {
        self.0.get()
    }
}

#[test]
fn cadence_is_exactly_zero_after_max_pulse_period_without_edges() {
    let mut rig = Rig::new(scenario());
    rig.pedal.set_rpm(200.0);
    // run until an accepted edge has just reset the inactivity timer
    rig.run_ms(500);
    while rig.sensor.inactivity_s() != 0.0 {
        rig.run_ms(1);
    }
    rig.pedal.set_rpm(0.0);
    let before = rig.sensor.cadence_rpm();
    assert!(before > 190.0);

    rig.run_ms(590);
    assert_eq!(rig.sensor.cadence_rpm(), before, "still within 0.6 s");
    rig.run_ms(20);
    assert_eq!(rig.sensor.cadence_rpm(), 0.0, "0.61 s without an edge");
}

#[test]
fn invalid_jump_into_reference_is_not_an_edge() {
    let app = PasApp::new(scenario(), NullSink).expect("valid");
    let clock = TestClock::new();
    let levels = Rc::new(Cell::new((false, false)));
    let mut sensor = app.sensor(ManualPins(levels.clone()), clock.clone());
    let mut tick = |lv: (bool, bool)| {
        levels.set(lv);
        clock.advance(Duration::from_millis(1));
        sensor.sample();
        sensor.inactivity_s()
    };

    // 0 -> 3 is a two-step jump: counted as inactivity, not as an edge
    let t0 = tick((false, false));
    let t1 = tick((true, true));
    assert!(t1 > t0);
    // staying at 3 is not an edge either
    let t2 = tick((true, true));
    assert!(t2 > t1);
    // 3 -> 2 -> 3 is valid, but the earlier jump set no timing reference,
    // so this first real edge only seeds timing
    tick((false, true));
    assert_eq!(tick((true, true)), 0.0);
    assert_eq!(app.cadence_rpm(), 0.0);
}

#[test]
fn edge_after_a_long_gap_reseeds_before_the_timeout_fires() {
    let app = PasApp::new(scenario(), NullSink).expect("valid");
    let clock = TestClock::new();
    let levels = Rc::new(Cell::new((false, false)));
    let mut sensor = app.sensor(ManualPins(levels.clone()), clock.clone());
    let mut tick = |lv: (bool, bool), ms: u64| {
        levels.set(lv);
        clock.advance(Duration::from_millis(ms));
        sensor.sample();
        sensor.inactivity_s()
    };
    let cycle = [(true, false), (false, false), (false, true)];

    tick((false, false), 1);
    tick((false, true), 1);
    assert_eq!(tick((true, true), 1), 0.0, "seed");
    for lv in cycle {
        tick(lv, 1);
    }
    // one 700 ms stall between samples: longer than max_pulse_period (0.6 s)
    // while the per-sample inactivity count is still tiny
    assert!(tick((false, true), 700) < 0.6);
    assert_eq!(tick((true, true), 1), 0.0);
    assert_eq!(app.cadence_rpm(), 0.0);

    for lv in cycle {
        tick(lv, 1);
    }
    tick((true, true), 72);
    let rpm = app.cadence_rpm();
    assert!((rpm - 200.0).abs() < 0.5, "rpm = {rpm}");
}

#[test]
fn reconfigure_keeps_decoder_state() {
    let mut rig = Rig::new(scenario());
    rig.pedal.set_rpm(200.0);
    rig.run_ms(1000);
    let period = rig.sensor.filtered_period();
    rig.app
        .configure(PasConfig {
            pedal_rpm_end: 110.0,
            ..scenario()
        })
        .expect("valid");
    assert_eq!(rig.sensor.filtered_period(), period);
    rig.run_ms(200);
    assert!(rig.sensor.cadence_rpm() > 190.0);
}
