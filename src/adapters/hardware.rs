//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the DHT22 sensor and both actuator drivers, exposing them through
//! [`SensorPort`] and [`ActuatorPort`].  This is the only module in the
//! system that composes actual hardware.  On non-espidf targets the
//! underlying drivers use cfg-gated simulation stubs.

use crate::adapters::time::TimeAdapter;
use crate::app::ports::{ActuatorPort, SensorPort};
use crate::app::reading::Reading;
use crate::control::RelayState;
use crate::drivers::buzzer::BuzzerDriver;
use crate::drivers::hw_init;
use crate::drivers::relay::RelayDriver;
use crate::error::{ActuatorError, SensorError};
use crate::sensors::Dht22Sensor;

/// Settling time between self-test relay edges.
const SELF_TEST_SETTLE_MS: u32 = 500;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    sensor: Dht22Sensor,
    relay: RelayDriver,
    buzzer: BuzzerDriver,
    beep_duration_ms: u32,
    time: TimeAdapter,
}

impl HardwareAdapter {
    pub fn new(
        sensor: Dht22Sensor,
        relay: RelayDriver,
        buzzer: BuzzerDriver,
        beep_duration_ms: u32,
    ) -> Self {
        Self {
            sensor,
            relay,
            buzzer,
            beep_duration_ms,
            time: TimeAdapter::new(),
        }
    }

    pub fn relay_state(&self) -> RelayState {
        self.relay.state()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn acquire(&mut self) -> Result<Reading, SensorError> {
        let (temperature_c, humidity_pct) = self.sensor.read_retry()?;
        Ok(Reading::new(temperature_c, humidity_pct, self.time.now_utc()))
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    /// `Heating` closes the relay and sounds the confirmation beep;
    /// `Idle` opens it silently.  The beep blocks for its full duration.
    fn apply(&mut self, state: RelayState) -> Result<(), ActuatorError> {
        self.relay.set(state)?;
        if state == RelayState::Heating {
            self.buzzer.beep(self.beep_duration_ms)?;
        }
        Ok(())
    }

    fn self_test(&mut self, pulses: u8) -> Result<(), ActuatorError> {
        for _ in 0..pulses {
            self.relay.set(RelayState::Heating)?;
            hw_init::delay_ms(SELF_TEST_SETTLE_MS);
            self.buzzer.beep(self.beep_duration_ms)?;
            self.relay.set(RelayState::Idle)?;
            hw_init::delay_ms(SELF_TEST_SETTLE_MS);
        }
        Ok(())
    }
}
