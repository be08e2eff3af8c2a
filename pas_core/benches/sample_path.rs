use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use pas_core::mocks::NullSink;
use pas_core::{Arbiter, OutputMode, PasApp, PasConfig};
use pas_traits::PedalPins;
use pas_traits::clock::test_clock::TestClock;
use std::time::Duration;

/// Endless forward quadrature sequence, one state change per read.
struct Spinner {
    i: usize,
}

impl PedalPins for Spinner {
    fn read(&mut self) -> (bool, bool) {
        const SEQ: [(bool, bool); 4] = [(false, false), (false, true), (true, true), (true, false)];
        self.i = self.i.wrapping_add(1);
        SEQ[self.i % 4]
    }
}

pub fn bench_sample(c: &mut Criterion) {
    let cfg = PasConfig {
        magnets: 4,
        pedal_rpm_start: 30.0,
        pedal_rpm_end: 100.0,
        ..PasConfig::default()
    };
    let app = PasApp::new(cfg, NullSink).expect("valid config");
    let clock = TestClock::new();
    let mut sensor = app.sensor(Spinner { i: 0 }, clock.clone());

    c.bench_function("cadence_sensor_sample", |b| {
        b.iter(|| {
            clock.advance(Duration::from_millis(20));
            sensor.sample();
            black_box(sensor.cadence_rpm())
        });
    });
}

pub fn bench_arbiter(c: &mut Criterion) {
    c.bench_function("arbiter_tick_1000", |b| {
        b.iter_batched(
            || {
                let mut a = Arbiter::new(PasConfig {
                    min_ms_without_power: 0,
                    ..PasConfig::default()
                });
                a.start(OutputMode::Primary);
                a
            },
            |mut a| {
                for i in 0..1000u32 {
                    black_box(a.tick((i % 150) as f32));
                }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_sample, bench_arbiter);
criterion_main!(benches);
