#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and validation may reject input but must never panic. Whatever
    // passes validation must also pass the core check; extreme cadences may
    // saturate a threshold to 0 or inf but never to NaN.
    let Ok(cfg) = toml::from_str::<pas_config::Config>(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }
    let core: pas_core::PasConfig = (&cfg).into();
    assert!(core.validate().is_ok());
    let t = core.thresholds();
    assert!(!t.max_pulse_period.is_nan());
    assert!(!t.min_pedal_period.is_nan());
});
