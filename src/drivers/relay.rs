//! Heating relay driver.
//!
//! One digital output: HIGH energizes the coil and switches the heating
//! element on.  This driver is a dumb actuator — the decision when to heat
//! lives in the threshold controller.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real GPIO via the hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::control::RelayState;
use crate::drivers::hw_init;
use crate::error::ActuatorError;

pub struct RelayDriver {
    gpio: i32,
    state: RelayState,
}

impl RelayDriver {
    /// The relay starts de-energized; callers must not assume any prior
    /// hardware state survived a reset.
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            state: RelayState::Idle,
        }
    }

    /// Drive the relay.  Idempotent — re-applying the current state rewrites
    /// the pin to the same level.
    pub fn set(&mut self, state: RelayState) -> Result<(), ActuatorError> {
        let high = matches!(state, RelayState::Heating);
        if !hw_init::gpio_write(self.gpio, high) {
            return Err(ActuatorError::RelayWriteFailed);
        }
        self.state = state;
        Ok(())
    }

    pub fn state(&self) -> RelayState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins;

    #[test]
    fn starts_idle() {
        let r = RelayDriver::new(pins::RELAY_GPIO);
        assert_eq!(r.state(), RelayState::Idle);
    }

    #[test]
    fn set_is_idempotent() {
        let mut r = RelayDriver::new(pins::RELAY_GPIO);
        r.set(RelayState::Heating).unwrap();
        r.set(RelayState::Heating).unwrap();
        assert_eq!(r.state(), RelayState::Heating);
        r.set(RelayState::Idle).unwrap();
        assert_eq!(r.state(), RelayState::Idle);
    }
}
