//! Pedal sensor on two Raspberry Pi GPIO inputs.

use pas_traits::PedalPins;
use rppal::gpio::{Gpio, InputPin};

use crate::error::{HwError, Result};

pub struct GpioPedal {
    pas1: InputPin,
    pas2: InputPin,
}

impl GpioPedal {
    /// Claim the two BCM pins as inputs, optionally with pull-ups for
    /// open-collector hall sensors.
    pub fn new(pas1: u8, pas2: u8, pull_up: bool) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(format!("open gpio: {e}")))?;
        let claim = |pin: u8| -> Result<InputPin> {
            let p = gpio
                .get(pin)
                .map_err(|e| HwError::Gpio(format!("open pas pin {pin}: {e}")))?;
            Ok(if pull_up {
                p.into_input_pullup()
            } else {
                p.into_input()
            })
        };
        let pedal = Self {
            pas1: claim(pas1)?,
            pas2: claim(pas2)?,
        };
        tracing::info!(pas1, pas2, pull_up, "gpio pedal sensor ready");
        Ok(pedal)
    }
}

impl PedalPins for GpioPedal {
    #[inline]
    fn read(&mut self) -> (bool, bool) {
        (self.pas1.is_high(), self.pas2.is_high())
    }
}
