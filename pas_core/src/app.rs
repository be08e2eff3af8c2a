//! Boundary of the pedal-assist core: configure, start, stop, observe.
//!
//! `PasApp` owns the supervisory thread. The thread owns the `Arbiter` and,
//! while running, the `CurrentSink`; both come back through the join handle
//! on stop, so no lock is ever taken around the motor.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;

use crossbeam_channel as xch;
use pas_traits::{Clock, CurrentSink, PedalPins};

use crate::arbiter::Arbiter;
use crate::config::{OutputMode, PasConfig, Thresholds};
use crate::error::{PasError, Result, map_sink_error};
use crate::sensor::CadenceSensor;
use crate::shared::Shared;
use crate::util::period;

enum Command {
    Reconfigure(PasConfig),
    Stop,
}

/// What the supervisory thread hands back when it ends.
struct Finished<M> {
    motor: M,
    fault: Option<PasError>,
}

struct Worker<M> {
    tx: xch::Sender<Command>,
    join: JoinHandle<Finished<M>>,
    mode: OutputMode,
}

pub struct PasApp<M: CurrentSink + Send + 'static> {
    shared: Arc<Shared>,
    config: PasConfig,
    motor: Option<M>,
    worker: Option<Worker<M>>,
    last_fault: Option<PasError>,
}

/// Cloneable, non-blocking view of the shared state for other threads.
#[derive(Debug, Clone)]
pub struct PasHandle {
    shared: Arc<Shared>,
}

impl PasHandle {
    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    pub fn output_fraction(&self) -> f32 {
        self.shared.output_fraction()
    }

    pub fn cadence_rpm(&self) -> f32 {
        self.shared.cadence_rpm()
    }

    /// Motor commands rejected by the sink since the app was created.
    pub fn sink_failures(&self) -> u64 {
        self.shared.sink_failures()
    }
}

impl<M: CurrentSink + Send + 'static> PasApp<M> {
    /// Validate `config` and build a stopped app around `motor`.
    pub fn new(config: PasConfig, motor: M) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared::new(&config.thresholds())),
            config,
            motor: Some(motor),
            worker: None,
            last_fault: None,
        })
    }

    /// Replace the configuration snapshot.
    ///
    /// Output and the safe-start timer are reset. Invalid input is rejected
    /// with nothing applied. Must not race an active sampling path.
    pub fn configure(&mut self, config: PasConfig) -> Result<()> {
        config.validate()?;
        let t = config.thresholds();
        self.shared.thresholds.store(&t);
        self.shared.output.store(0.0);
        self.config = config;
        if let Some(w) = &self.worker
            && w.tx.send(Command::Reconfigure(config)).is_err()
        {
            tracing::warn!("supervisor gone; new config applies on next start");
        }
        tracing::info!(
            magnets = config.magnets,
            max_pulse_period = t.max_pulse_period,
            min_pedal_period = t.min_pedal_period,
            "pas configured"
        );
        Ok(())
    }

    /// Spawn the supervisory loop.
    ///
    /// Starting an app that is already running is a caller error; it is
    /// reported as `PasError::State` and the running loop is left alone.
    pub fn start(&mut self, mode: OutputMode) -> Result<()> {
        if self.worker.is_some() {
            return Err(PasError::State("already running".into()));
        }
        let motor = self
            .motor
            .take()
            .ok_or_else(|| PasError::State("motor unavailable".into()))?;

        self.last_fault = None;
        let (tx, rx) = xch::unbounded();
        let mut arbiter = Arbiter::new(self.config);
        arbiter.start(mode);
        self.shared.output.store(0.0);
        self.shared.running.store(true, Ordering::Release);

        let shared = Arc::clone(&self.shared);
        let spawned = std::thread::Builder::new()
            .name("pas-supervisor".into())
            .spawn(move || supervise(arbiter, motor, &shared, &rx));
        match spawned {
            Ok(join) => {
                self.worker = Some(Worker { tx, join, mode });
                tracing::info!(?mode, loop_hz = self.config.loop_hz, "pas started");
                Ok(())
            }
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                Err(PasError::Io(e.to_string()))
            }
        }
    }

    /// Stop the loop and wait for it to acknowledge.
    ///
    /// In `Primary` mode the motor receives a final zero command before this
    /// returns, even when the loop died on a panic. Stopping a stopped app
    /// only clears the shared output.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            self.shared.output.store(0.0);
            return;
        };
        // a disconnected channel also ends the loop
        let _ = worker.tx.send(Command::Stop);
        match worker.join.join() {
            Ok(done) => {
                self.motor = Some(done.motor);
                self.last_fault = done.fault;
            }
            // only a panic in the shutdown sequence itself gets here; the motor
            // was dropped with the thread and later starts fail
            Err(e) => {
                tracing::error!(?e, "supervisor thread panicked");
                self.last_fault = Some(PasError::State("supervisor thread panicked".into()));
                self.shared.output.store(0.0);
                self.shared.running.store(false, Ordering::Release);
            }
        }
        tracing::info!(mode = ?worker.mode, "pas stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// Current arbitrated fraction in `[0, current_scaling]`.
    pub fn output_fraction(&self) -> f32 {
        self.shared.output_fraction()
    }

    pub fn cadence_rpm(&self) -> f32 {
        self.shared.cadence_rpm()
    }

    pub fn sink_failures(&self) -> u64 {
        self.shared.sink_failures()
    }

    /// The last sink error or loop panic of the current or most recent run.
    pub fn last_fault(&self) -> Option<&PasError> {
        self.last_fault.as_ref()
    }

    pub fn handle(&self) -> PasHandle {
        PasHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Build the sampling-path entry point bound to this app's shared state.
    /// Create one sensor per app.
    pub fn sensor<P: PedalPins, C: Clock>(&self, pins: P, clock: C) -> CadenceSensor<P, C> {
        CadenceSensor::new(pins, clock, Arc::clone(&self.shared))
    }

    pub fn config(&self) -> &PasConfig {
        &self.config
    }

    pub fn thresholds(&self) -> Thresholds {
        self.config.thresholds()
    }

    /// The sink, when the loop is not holding it.
    pub fn motor(&self) -> Option<&M> {
        self.motor.as_ref()
    }
}

impl<M: CurrentSink + Send + 'static> Drop for PasApp<M> {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.stop();
        }
    }
}

fn command<M: CurrentSink>(motor: &mut M, fraction: f32, shared: &Shared) -> Option<PasError> {
    let e = motor.set_current_rel(fraction).err()?;
    let err = map_sink_error(e.as_ref());
    shared.sink_failures.fetch_add(1, Ordering::Relaxed);
    tracing::warn!(error = %err, fraction, "current command failed");
    Some(err)
}

/// Supervisory thread body.
///
/// A panic in the loop (arbiter or sink) is caught so the shutdown sequence
/// still runs and the motor goes back to the app. Under `panic = "abort"`
/// the process ends instead.
fn supervise<M: CurrentSink>(
    mut arbiter: Arbiter,
    mut motor: M,
    shared: &Shared,
    rx: &xch::Receiver<Command>,
) -> Finished<M> {
    let mut fault = None;
    let looped = panic::catch_unwind(AssertUnwindSafe(|| {
        run_loop(&mut arbiter, &mut motor, shared, rx, &mut fault)
    }));
    if looped.is_err() {
        tracing::error!("supervisor loop panicked; shutting down");
        fault = Some(PasError::State("supervisor loop panicked".into()));
    }

    arbiter.request_stop();
    shared.output.store(0.0);
    if arbiter.mode() == OutputMode::Primary {
        match panic::catch_unwind(AssertUnwindSafe(|| command(&mut motor, 0.0, shared))) {
            Ok(None) => {}
            Ok(Some(e)) => fault = Some(e),
            Err(_) => {
                tracing::error!("final zero command panicked");
                fault = Some(PasError::Motor("final zero command panicked".into()));
            }
        }
    }
    arbiter.finish();
    shared.running.store(false, Ordering::Release);
    Finished { motor, fault }
}

/// The command channel doubles as the pacing timer so a stop request wakes
/// the loop immediately.
fn run_loop<M: CurrentSink>(
    arbiter: &mut Arbiter,
    motor: &mut M,
    shared: &Shared,
    rx: &xch::Receiver<Command>,
    fault: &mut Option<PasError>,
) {
    loop {
        match rx.recv_timeout(period(arbiter.config().loop_hz)) {
            Ok(Command::Reconfigure(cfg)) => {
                arbiter.reconfigure(cfg);
                shared.output.store(0.0);
                tracing::debug!("supervisor picked up new config");
                continue;
            }
            Ok(Command::Stop) | Err(xch::RecvTimeoutError::Disconnected) => return,
            Err(xch::RecvTimeoutError::Timeout) => {}
        }

        let before = arbiter.state();
        let out = arbiter.tick(shared.cadence_rpm());
        if arbiter.state() != before {
            tracing::debug!(
                from = before.as_str(),
                to = arbiter.state().as_str(),
                "arbiter transition"
            );
        }
        shared.output.store(out.unwrap_or(0.0));
        if let Some(fraction) = out
            && arbiter.mode() == OutputMode::Primary
            && let Some(e) = command(motor, fraction, shared)
        {
            *fault = Some(e);
        }
    }
}
