#![no_main]
use libfuzzer_sys::fuzz_target;
use pas_core::mocks::NullSink;
use pas_core::{PasApp, PasConfig};
use pas_traits::PedalPins;
use pas_traits::clock::test_clock::TestClock;
use std::time::Duration;

/// Low two bits of each byte are the pin levels, the rest the delay in ms.
struct BytePins<'a> {
    data: &'a [u8],
    idx: usize,
}

impl PedalPins for BytePins<'_> {
    fn read(&mut self) -> (bool, bool) {
        let b = self.data.get(self.idx).copied().unwrap_or(0);
        self.idx += 1;
        (b & 1 != 0, b & 2 != 0)
    }
}

fuzz_target!(|data: &[u8]| {
    let cfg = PasConfig {
        magnets: 4,
        pedal_rpm_start: 30.0,
        pedal_rpm_end: 100.0,
        ..PasConfig::default()
    };
    let Ok(app) = PasApp::new(cfg, NullSink) else {
        return;
    };
    let clock = TestClock::new();
    let mut sensor = app.sensor(BytePins { data, idx: 0 }, clock.clone());
    let limit = 3.0 * cfg.pedal_rpm_end + 1e-2;
    for &b in data {
        clock.advance(Duration::from_millis(u64::from(b >> 2)));
        sensor.sample();
        let rpm = sensor.cadence_rpm();
        assert!(!rpm.is_nan() && rpm.abs() <= limit);
    }
});
