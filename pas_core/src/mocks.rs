//! Test and helper mocks for pas_core

/// Pins frozen at fixed levels; a parked pedal.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPins(pub bool, pub bool);

impl pas_traits::PedalPins for FixedPins {
    fn read(&mut self) -> (bool, bool) {
        (self.0, self.1)
    }
}

/// A current sink that accepts and discards every command.
#[derive(Debug, Default)]
pub struct NullSink;

impl pas_traits::CurrentSink for NullSink {
    fn set_current_rel(
        &mut self,
        _fraction: f32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}
