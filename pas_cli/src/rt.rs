//! Real-time scheduling helpers (Linux SCHED_FIFO + mlockall; macOS mlockall).

use crate::cli::RtLock;

#[cfg(any(target_os = "linux", target_os = "macos"))]
fn try_apply_mem_lock(lock: RtLock) -> eyre::Result<()> {
    use libc::{MCL_CURRENT, MCL_FUTURE, mlockall};

    let flags = match lock {
        RtLock::None => return Ok(()),
        RtLock::Current => MCL_CURRENT,
        RtLock::All => MCL_CURRENT | MCL_FUTURE,
    };
    // SAFETY: mlockall takes only flags and touches no Rust-managed memory.
    let rc = unsafe { mlockall(flags) };
    if rc == 0 {
        return Ok(());
    }
    let err = std::io::Error::last_os_error();
    let mut msg = format!("mlockall({lock:?}) failed: {err}");
    if matches!(err.raw_os_error(), Some(code) if code == libc::EPERM || code == libc::ENOMEM) {
        msg.push_str("; hint: needs CAP_IPC_LOCK (or root) and sufficient 'ulimit -l'");
    }
    Err(eyre::eyre!(msg))
}

#[cfg(target_os = "linux")]
fn try_apply_fifo_priority(prio: Option<i32>) -> eyre::Result<i32> {
    use libc::{SCHED_FIFO, sched_get_priority_max, sched_get_priority_min, sched_param};

    // SAFETY: plain syscalls with a fully initialised parameter struct.
    let (min, max) = unsafe {
        (
            sched_get_priority_min(SCHED_FIFO),
            sched_get_priority_max(SCHED_FIFO),
        )
    };
    let (min, max) = if min < 0 || max < 0 { (1, 99) } else { (min, max) };
    let prio_val = prio.unwrap_or(max).clamp(min, max);
    let param = sched_param {
        sched_priority: prio_val,
    };
    let rc = unsafe { libc::sched_setscheduler(0, SCHED_FIFO, &param) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        eyre::bail!("{err}; hint: needs CAP_SYS_NICE or root");
    }
    Ok(prio_val)
}

/// Apply real-time settings once per process. Failures only warn; the ride
/// still runs with normal scheduling.
#[cfg(target_os = "linux")]
pub fn setup_rt_once(rt: bool, prio: Option<i32>, lock: RtLock) {
    use std::sync::OnceLock;
    static RT_ONCE: OnceLock<()> = OnceLock::new();
    if !rt {
        return;
    }
    RT_ONCE.get_or_init(|| {
        match try_apply_mem_lock(lock) {
            Ok(()) => tracing::info!(?lock, "rt: memory lock applied"),
            Err(err) => tracing::warn!(%err, "rt: memory lock failed"),
        }
        match try_apply_fifo_priority(prio) {
            Ok(p) => tracing::info!(prio = p, "rt: SCHED_FIFO enabled"),
            Err(err) => tracing::warn!(%err, "rt: sched_setscheduler(SCHED_FIFO) failed"),
        }
    });
}

#[cfg(target_os = "macos")]
pub fn setup_rt_once(rt: bool, _prio: Option<i32>, lock: RtLock) {
    use std::sync::OnceLock;
    static RT_ONCE: OnceLock<()> = OnceLock::new();
    if !rt {
        return;
    }
    RT_ONCE.get_or_init(|| {
        if let Err(err) = try_apply_mem_lock(lock) {
            tracing::warn!(%err, "rt: memory lock failed");
        }
        tracing::warn!("rt: macOS has no SCHED_FIFO; only mlockall applied");
    });
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn setup_rt_once(rt: bool, _prio: Option<i32>, _lock: RtLock) {
    if rt {
        tracing::warn!("rt: real-time mode is not supported on this OS");
    }
}
