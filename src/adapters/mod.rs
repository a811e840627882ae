//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements    | Connects to                    |
//! |------------|---------------|--------------------------------|
//! | `hardware` | SensorPort    | DHT22 single-wire GPIO         |
//! |            | ActuatorPort  | Relay + buzzer GPIO            |
//! | `display`  | DisplayPort   | SSD1306 OLED over I2C          |
//! | `influx`   | TelemetryPort | InfluxDB v2 HTTP write API     |
//! | `log_sink` | EventSink     | Serial log output              |
//! | `time`     | —             | System timer / wall clock      |
//! | `wifi`     | —             | ESP-IDF WiFi STA               |

pub mod display;
pub mod hardware;
pub mod influx;
pub mod log_sink;
pub mod time;
pub mod wifi;
