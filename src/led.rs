//! Active-low LED adapter.
//!
//! Both LEDs on the board sink current into the GPIO, so "on" is a low
//! level.  [`ActiveLow`] inverts an [`OutputPin`] so the rest of the
//! crate can say `set_high()` for "lit".

use embedded_hal::digital::{ErrorType, OutputPin};

pub struct ActiveLow<P>(pub P);

impl<P> ActiveLow<P> {
    pub fn into_inner(self) -> P {
        self.0
    }
}

impl<P: ErrorType> ErrorType for ActiveLow<P> {
    type Error = P::Error;
}

impl<P: OutputPin> OutputPin for ActiveLow<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_high()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_low()
    }
}
