//! Piezo buzzer driver.
//!
//! A beep is a blocking HIGH pulse of fixed duration.  Blocking is
//! deliberate: the audible confirmation is coupled to the cycle timing
//! (the loop pauses while the operator hears the heater engage).

use crate::drivers::hw_init;
use crate::error::ActuatorError;

pub struct BuzzerDriver {
    gpio: i32,
}

impl BuzzerDriver {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    /// Sound the buzzer for `duration_ms`, blocking the caller.
    pub fn beep(&mut self, duration_ms: u32) -> Result<(), ActuatorError> {
        if !hw_init::gpio_write(self.gpio, true) {
            return Err(ActuatorError::BuzzerWriteFailed);
        }
        hw_init::delay_ms(duration_ms);
        if !hw_init::gpio_write(self.gpio, false) {
            return Err(ActuatorError::BuzzerWriteFailed);
        }
        Ok(())
    }
}
