//! Supervisory loop state.

/// Lifecycle of the power arbitrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArbiterState {
    /// No loop; output held at zero.
    #[default]
    Stopped,
    /// Safe-start delay in progress; output held at zero whatever the cadence.
    Starting,
    /// Output follows cadence through the assist curve and ramp limiter.
    Running,
    /// Stop requested; output forced to zero, awaiting acknowledgement.
    Stopping,
}

impl ArbiterState {
    pub fn as_str(self) -> &'static str {
        match self {
            ArbiterState::Stopped => "stopped",
            ArbiterState::Starting => "starting",
            ArbiterState::Running => "running",
            ArbiterState::Stopping => "stopping",
        }
    }
}
