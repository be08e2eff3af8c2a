#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `pas` binary: ride the pedal-assist pipeline, check configs, self-check.

mod cli;
mod error_fmt;
mod rt;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::run::{RideOpts, load_config, print_summary, run_ride};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: Cli) -> Result<()> {
    // Config problems are reported before logging exists, so they always
    // reach stderr in the requested format.
    let cfg = load_config(&cli.config)?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::Run {
            seconds,
            rpm,
            reverse,
            shared,
            status_ms,
            rt,
            rt_prio,
            rt_lock,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&shutdown);
            if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                tracing::warn!(error = %e, "could not install Ctrl-C handler");
            }
            let opts = RideOpts {
                seconds,
                rpm,
                reverse,
                shared,
                status_ms,
                rt,
                rt_prio,
                rt_lock,
            };
            let summary = run_ride(&cfg, opts, cli.json, &shutdown)?;
            print_summary(&summary, cli.json);
            match summary.fault {
                Some(fault) => Err(fault.into()),
                None => Ok(()),
            }
        }
        Commands::CheckConfig => run::check_config(&cfg, cli.json),
        Commands::SelfCheck => run::self_check(&cfg, cli.json),
    }
}

/// `--log-level` beats `[logging].level`, which beats the `info` default.
fn effective_level<'a>(flag: Option<&'a str>, logging: &'a pas_config::Logging) -> &'a str {
    flag.or(logging.level.as_deref()).unwrap_or("info")
}

/// Console logging to stderr (pretty or JSON), plus an optional JSON-lines
/// file from `[logging]`. RUST_LOG overrides the level when set.
fn init_tracing(json: bool, flag: Option<&str>, logging: &pas_config::Logging) -> Result<()> {
    let level = effective_level(flag, logging);
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level)
            .wrap_err_with(|| format!("invalid log level {level:?}"))?,
    };

    let (json_layer, pretty_layer) = if json {
        (
            Some(fmt::layer().json().with_writer(std::io::stderr)),
            None,
        )
    } else {
        (
            None,
            Some(fmt::layer().with_target(false).with_writer(std::io::stderr)),
        )
    };

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path.file_name().unwrap_or(path.as_os_str());
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(file_layer)
        .try_init()
        .wrap_err("install tracing subscriber")
}
