//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "pas", version, about = "Pedal-assist sensor and power arbiter")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/pas_config.toml")]
    pub config: PathBuf,

    /// Log and report as JSON lines instead of pretty text
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides `[logging].level`
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Memory locking mode for real-time operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum RtLock {
    /// Do not lock memory
    None,
    /// Lock currently resident pages
    Current,
    /// Lock current and future pages
    All,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sensor and arbiter for a fixed time, printing cadence and output
    Run {
        /// How long to ride
        #[arg(long, value_name = "SECS", default_value_t = 10)]
        seconds: u64,
        /// Simulated cadence in RPM (ignored with real GPIO pins)
        #[arg(long, value_name = "RPM", default_value_t = 60.0)]
        rpm: f32,
        /// Pedal the simulated crank backwards
        #[arg(long, action = ArgAction::SetTrue)]
        reverse: bool,
        /// Publish the output only; never command the motor
        #[arg(long, action = ArgAction::SetTrue)]
        shared: bool,
        /// Status print interval in milliseconds
        #[arg(long, value_name = "MS", default_value_t = 250)]
        status_ms: u64,
        /// Enable real-time mode (SCHED_FIFO, mlockall)
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Enable real-time mode on supported OSes.\n\nLinux: attempts SCHED_FIFO priority and mlockall so the sampling thread is not paged out or preempted by ordinary tasks. Usually needs CAP_SYS_NICE and CAP_IPC_LOCK (or root).\n\nmacOS: only mlockall is applied."
        )]
        rt: bool,
        /// Real-time priority for SCHED_FIFO on Linux (clamped to the system range)
        #[arg(long, value_name = "PRIO")]
        rt_prio: Option<i32>,
        /// Memory locking mode for --rt: none, current, or all
        #[arg(long, value_enum, value_name = "MODE", default_value = "current")]
        rt_lock: RtLock,
    },
    /// Load and validate the config, then print the derived thresholds
    CheckConfig,
    /// Quick health check (pins readable, start/stop cycle ok)
    SelfCheck,
}
