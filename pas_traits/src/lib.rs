//! Collaborator seams for the pedal-assist core.
//!
//! The core never touches GPIO, timers or the motor controller directly; it
//! talks to them through these traits so that simulated and hardware backends
//! are interchangeable.

pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Two-channel quadrature pedal sensor.
pub trait PedalPins {
    /// Current logic levels of `(channel_a, channel_b)`.
    ///
    /// Called from the sampling path; implementations must not block.
    fn read(&mut self) -> (bool, bool);
}

/// Sink for the normalized motor-current command.
pub trait CurrentSink {
    /// Request a relative current in `[0.0, 1.0]` of the motor's configured maximum.
    fn set_current_rel(&mut self, fraction: f32)
    -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<P: PedalPins + ?Sized> PedalPins for Box<P> {
    fn read(&mut self) -> (bool, bool) {
        (**self).read()
    }
}

impl<M: CurrentSink + ?Sized> CurrentSink for Box<M> {
    fn set_current_rel(
        &mut self,
        fraction: f32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_current_rel(fraction)
    }
}
