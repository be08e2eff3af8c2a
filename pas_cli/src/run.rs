//! Ride execution: config mapping, pin/motor assembly, the timed run loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use eyre::Result;
use pas_core::{OutputMode, PasApp, PasConfig, PasError, PedalSampler};
use pas_hardware::{CommandLog, RecordingMotor};
use pas_traits::{MonotonicClock, PedalPins};
use serde_json::json;

use crate::cli::RtLock;
use crate::rt::setup_rt_once;

/// Options of the `run` subcommand.
#[derive(Debug, Clone, Copy)]
pub struct RideOpts {
    pub seconds: u64,
    pub rpm: f32,
    pub reverse: bool,
    pub shared: bool,
    pub status_ms: u64,
    pub rt: bool,
    pub rt_prio: Option<i32>,
    pub rt_lock: RtLock,
}

/// What a finished ride reports.
#[derive(Debug, Clone)]
pub struct RideSummary {
    pub elapsed_ms: u128,
    pub peak_output: f32,
    pub last_cadence_rpm: f32,
    pub motor_commands: usize,
    pub last_command: Option<f32>,
    pub sink_failures: u64,
    /// Motor or loop fault seen during the ride; the CLI exits non-zero on it.
    pub fault: Option<PasError>,
    pub interrupted: bool,
}

/// Load and validate the TOML; every failure is reported as a config error.
pub fn load_config(path: &std::path::Path) -> Result<pas_config::Config> {
    let cfg = pas_config::load_file(path).map_err(|e| PasError::Config(e.to_string()))?;
    cfg.validate()
        .map_err(|e| PasError::Config(e.to_string()))?;
    Ok(cfg)
}

/// Pedal inputs: GPIO with the `hardware` feature, otherwise a simulated crank
/// turning at `rpm`.
#[cfg(all(feature = "hardware", target_os = "linux"))]
fn pedal_pins(cfg: &pas_config::Config, _rpm: f32) -> Result<impl PedalPins + Send + 'static> {
    let pins = pas_hardware::gpio::GpioPedal::new(cfg.pins.pas1, cfg.pins.pas2, cfg.pins.pull_up)?;
    Ok(pins)
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn pedal_pins(cfg: &pas_config::Config, rpm: f32) -> Result<impl PedalPins + Send + 'static> {
    let (pins, control) = pas_hardware::SimulatedPedal::new(MonotonicClock::new(), cfg.pas.magnets);
    control.set_rpm(rpm);
    tracing::info!(rpm, "using simulated pedal");
    Ok(pins)
}

pub fn run_ride(
    cfg: &pas_config::Config,
    opts: RideOpts,
    json_mode: bool,
    shutdown: &Arc<AtomicBool>,
) -> Result<RideSummary> {
    setup_rt_once(opts.rt, opts.rt_prio, opts.rt_lock);

    let core: PasConfig = cfg.into();
    let mode = if opts.shared {
        OutputMode::Shared
    } else {
        cfg.runner.output.into()
    };
    let rpm = if opts.reverse { -opts.rpm } else { opts.rpm };

    let pins = pedal_pins(cfg, rpm)?;
    // test hook: a sim motor that rejects every command
    let (motor, log) = if std::env::var_os("PAS_TEST_SIM_MOTOR_FAULT").is_some() {
        RecordingMotor::failing()
    } else {
        RecordingMotor::new()
    };
    let mut app = PasApp::new(core, motor)?;
    let sampler = PedalSampler::spawn(app.sensor(pins, MonotonicClock::new()), core.update_rate_hz);
    app.start(mode)?;

    let started = Instant::now();
    let duration = Duration::from_secs(opts.seconds);
    let status_every = Duration::from_millis(opts.status_ms.max(10));
    let mut next_status = started + status_every;
    let mut peak_output = 0.0f32;
    let mut interrupted = false;

    while started.elapsed() < duration {
        if shutdown.load(Ordering::Relaxed) {
            tracing::warn!("interrupted; stopping");
            interrupted = true;
            break;
        }
        peak_output = peak_output.max(app.output_fraction());
        let now = Instant::now();
        if now >= next_status {
            print_status(&app, started, json_mode);
            next_status += status_every;
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    let last_cadence_rpm = app.cadence_rpm();
    app.stop();
    let samples = sampler.sample_count();
    drop(sampler);
    tracing::info!(samples, "ride finished");

    let mut summary = summarize(&log, started, peak_output, last_cadence_rpm, interrupted);
    summary.sink_failures = app.sink_failures();
    summary.fault = app.last_fault().cloned();
    Ok(summary)
}

fn summarize(
    log: &CommandLog,
    started: Instant,
    peak_output: f32,
    last_cadence_rpm: f32,
    interrupted: bool,
) -> RideSummary {
    RideSummary {
        elapsed_ms: started.elapsed().as_millis(),
        peak_output,
        last_cadence_rpm,
        motor_commands: log.len(),
        last_command: log.last(),
        sink_failures: 0,
        fault: None,
        interrupted,
    }
}

fn print_status(app: &PasApp<RecordingMotor>, started: Instant, json_mode: bool) {
    let t_ms = started.elapsed().as_millis();
    if json_mode {
        println!(
            "{}",
            json!({
                "t_ms": t_ms,
                "cadence_rpm": app.cadence_rpm(),
                "output_fraction": app.output_fraction(),
                "running": app.is_running(),
            })
        );
    } else {
        println!(
            "t={:>6} ms  cadence={:>7.1} rpm  output={:.3}",
            t_ms,
            app.cadence_rpm(),
            app.output_fraction()
        );
    }
}

pub fn print_summary(s: &RideSummary, json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            json!({
                "status": if s.interrupted { "interrupted" } else { "complete" },
                "elapsed_ms": s.elapsed_ms,
                "peak_output": s.peak_output,
                "last_cadence_rpm": s.last_cadence_rpm,
                "motor_commands": s.motor_commands,
                "last_command": s.last_command,
                "sink_failures": s.sink_failures,
            })
        );
    } else {
        println!(
            "ride complete: {:.1} s, peak output {:.3}, {} motor commands",
            s.elapsed_ms as f64 / 1000.0,
            s.peak_output,
            s.motor_commands
        );
    }
}

/// Print the validated config and the thresholds derived from it.
pub fn check_config(cfg: &pas_config::Config, json_mode: bool) -> Result<()> {
    let core: PasConfig = cfg.into();
    core.validate()?;
    let t = core.thresholds();
    if json_mode {
        println!(
            "{}",
            json!({
                "magnets": core.magnets,
                "pedal_rpm_start": core.pedal_rpm_start,
                "pedal_rpm_end": core.pedal_rpm_end,
                "max_pulse_period": t.max_pulse_period,
                "min_pedal_period": t.min_pedal_period,
                "inactivity_step": t.inactivity_step,
                "loop_period_s": core.loop_period_s(),
            })
        );
    } else {
        println!("config ok");
        println!("  magnets            = {}", core.magnets);
        println!("  max_pulse_period   = {:.3} s", t.max_pulse_period);
        println!("  min_pedal_period   = {:.3} s", t.min_pedal_period);
        println!("  inactivity_step    = {:.6} s", t.inactivity_step);
        println!("  loop_period        = {:.3} s", core.loop_period_s());
    }
    Ok(())
}

/// Read the pins once and run one start/stop cycle against a recording sink.
pub fn self_check(cfg: &pas_config::Config, json_mode: bool) -> Result<()> {
    let core: PasConfig = cfg.into();
    let mut pins = pedal_pins(cfg, 0.0)?;
    let (a, b) = pins.read();

    let (motor, log) = RecordingMotor::new();
    let mut app = PasApp::new(core, motor)?;
    app.start(OutputMode::Primary)?;
    app.stop();
    if app.is_running() || log.commands() != [0.0] {
        return Err(PasError::State(
            "start/stop cycle did not end in a single zero command".into(),
        )
        .into());
    }

    if json_mode {
        println!("{}", json!({ "status": "ok", "pas1": a, "pas2": b }));
    } else {
        println!("self-check ok (pas1={a}, pas2={b})");
    }
    Ok(())
}
