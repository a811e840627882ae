//! System configuration parameters.
//!
//! Control parameters carry the reference values in `Default`; telemetry
//! credentials and WiFi credentials are burned in at build time via
//! `option_env!` (set `INCUBATOR_*` in the build environment).  A missing
//! required value refuses startup before any hardware is engaged.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Bang-bang control and cycle-timing parameters.  Immutable for the
/// process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Temperature setpoint (Celsius).  Relay energizes strictly below this.
    pub target_temperature_c: f32,
    /// Fixed end-of-cycle sleep (seconds).  Net cycle period is processing
    /// time plus this sleep.
    pub sampling_period_secs: u32,
    /// Buzzer pulse length on each heating activation (milliseconds).
    /// Blocks the loop for its duration — audible feedback is deliberately
    /// coupled to cycle timing.
    pub beep_duration_ms: u32,
    /// Relay-on / beep / relay-off pulses performed once before the loop
    /// starts, so an operator can confirm wiring.
    pub self_test_pulses: u8,
    /// Maximum physical read attempts per acquisition.
    pub sensor_max_attempts: u8,
    /// Delay between read attempts (milliseconds).  The DHT22 samples at
    /// most once every 2 s; polling faster returns garbage.
    pub sensor_retry_delay_ms: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            target_temperature_c: 37.7,
            sampling_period_secs: 6,
            beep_duration_ms: 500,
            self_test_pulses: 3,
            sensor_max_attempts: 15,
            sensor_retry_delay_ms: 2_000,
        }
    }
}

/// Destination and identity for the telemetry store (InfluxDB v2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Base URL, e.g. `http://influx.lan:8086`.
    pub host: String,
    pub org: String,
    pub token: String,
    pub bucket: String,
    /// Measurement name for every record.
    pub measurement: String,
    /// `location` tag value identifying this chamber.
    pub location: String,
}

/// WiFi station credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub wifi_ssid: String,
    pub wifi_password: String,
}

/// Everything the firmware needs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub control: ControlConfig,
    pub telemetry: TelemetryConfig,
    pub network: NetworkConfig,
}

const DEFAULT_MEASUREMENT: &str = "incubator_readings";
const DEFAULT_LOCATION: &str = "incubator";

fn required(value: Option<&'static str>, missing: &'static str) -> Result<String, Error> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::Config(missing)),
    }
}

impl Config {
    /// Load the full configuration.  Control parameters come from
    /// [`ControlConfig::default`]; credentials from the build environment.
    ///
    /// Fails with [`Error::Config`] naming the first missing variable —
    /// main logs it fatally and exits non-zero.
    pub fn load() -> Result<Self, Error> {
        let telemetry = TelemetryConfig {
            host: required(option_env!("INCUBATOR_INFLUX_HOST"), "INCUBATOR_INFLUX_HOST not set")?,
            org: required(option_env!("INCUBATOR_INFLUX_ORG"), "INCUBATOR_INFLUX_ORG not set")?,
            token: required(
                option_env!("INCUBATOR_INFLUX_TOKEN"),
                "INCUBATOR_INFLUX_TOKEN not set",
            )?,
            bucket: required(
                option_env!("INCUBATOR_INFLUX_BUCKET"),
                "INCUBATOR_INFLUX_BUCKET not set",
            )?,
            measurement: option_env!("INCUBATOR_MEASUREMENT")
                .unwrap_or(DEFAULT_MEASUREMENT)
                .to_string(),
            location: option_env!("INCUBATOR_LOCATION")
                .unwrap_or(DEFAULT_LOCATION)
                .to_string(),
        };
        let network = NetworkConfig {
            wifi_ssid: required(option_env!("INCUBATOR_WIFI_SSID"), "INCUBATOR_WIFI_SSID not set")?,
            wifi_password: option_env!("INCUBATOR_WIFI_PASS").unwrap_or("").to_string(),
        };
        let control = ControlConfig::default();
        control.validate()?;
        Ok(Self {
            control,
            telemetry,
            network,
        })
    }
}

impl ControlConfig {
    /// Range-check the control parameters.  Rejected, not clamped.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.target_temperature_c.is_finite() {
            return Err(Error::Config("target temperature must be finite"));
        }
        if self.sampling_period_secs == 0 {
            return Err(Error::Config("sampling period must be non-zero"));
        }
        if self.beep_duration_ms == 0 {
            return Err(Error::Config("beep duration must be non-zero"));
        }
        if self.sensor_max_attempts == 0 {
            return Err(Error::Config("sensor attempts must be non-zero"));
        }
        if self.sensor_retry_delay_ms < 2_000 {
            return Err(Error::Config("sensor retry delay below DHT22 minimum interval"));
        }
        Ok(())
    }
}
