//! Human-readable error descriptions and structured JSON error formatting.

use pas_core::PasError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(pe) = err.downcast_ref::<PasError>() {
        return match pe {
            PasError::Config(msg) if msg.starts_with("read config") => format!(
                "What happened: The config file could not be read ({msg}).\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Pass --config pointing at a readable TOML file (see etc/pas_config.toml)."
            ),
            PasError::Config(msg) if msg.starts_with("parse config") => format!(
                "What happened: The config file is not valid TOML for this schema ({msg}).\nLikely causes: Missing [pas] section, misspelled keys, or wrong value types.\nHow to fix: Compare against etc/pas_config.toml and rerun `pas check-config`."
            ),
            PasError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun `pas check-config`."
            ),
            PasError::State(msg) => format!(
                "What happened: The assist loop was used out of order ({msg}).\nLikely causes: A start while already running, or a lost motor handle.\nHow to fix: Stop before starting again; re-run with --log-level=debug for detail."
            ),
            PasError::Motor(msg) => format!(
                "What happened: The motor controller rejected a current command ({msg}).\nLikely causes: Controller offline or wiring fault.\nHow to fix: Check the controller link and power, then rerun."
            ),
            PasError::Io(msg) => format!(
                "What happened: An OS operation failed ({msg}).\nLikely causes: Thread or resource limits.\nHow to fix: Re-run with --log-level=debug for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from hardware init
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("gpio") {
        return format!(
            "What happened: Failed to initialize the pedal sensor pins ({msg}).\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix [pins] pas1/pas2 in the config; ensure the process may access /dev/gpiomem."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable short name for the JSON `reason` field.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<PasError>() {
        Some(PasError::Config(_)) => "Config",
        Some(PasError::State(_)) => "State",
        Some(PasError::Motor(_)) => "Motor",
        Some(PasError::Io(_)) => "Io",
        None => "Error",
    }
}

/// Map typed errors to stable exit codes; anything else returns 1.
///
/// 2 is left to clap for usage errors.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<PasError>() {
        Some(PasError::Config(_)) => 3,
        Some(PasError::State(_)) => 4,
        Some(PasError::Motor(_)) => 5,
        Some(PasError::Io(_)) => 6,
        None => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}
