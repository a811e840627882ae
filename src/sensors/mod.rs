//! Sensor subsystem.
//!
//! One physical sensor: the DHT22/AM2302 combined temperature + humidity
//! probe on a single-wire bus.  The driver owns the retry policy; the
//! hardware adapter wraps it behind [`SensorPort`](crate::app::ports::SensorPort).

pub mod dht22;

pub use dht22::Dht22Sensor;
