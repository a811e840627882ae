//! Incubation chamber firmware — main entry point.
//!
//! Hexagonal architecture around a fixed-period control loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  HardwareAdapter    OledDisplay   InfluxReporter         │
//! │  (Sensor+Actuator)  (DisplayPort) (TelemetryPort)        │
//! │  LogEventSink       WifiAdapter                          │
//! │  (EventSink)        (STA + reconnect)                    │
//! │                                                          │
//! │  ───────────── Port Trait Boundary ─────────────         │
//! │                                                          │
//! │  ┌──────────────────────────────────────────────────┐    │
//! │  │          ControlService (pure logic)             │    │
//! │  │  threshold control · failure containment         │    │
//! │  └──────────────────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::sntp::EspSntp;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use incubator::adapters::display::OledDisplay;
use incubator::adapters::hardware::HardwareAdapter;
use incubator::adapters::influx::{EspHttpBackend, InfluxReporter};
use incubator::adapters::log_sink::LogEventSink;
use incubator::adapters::wifi::WifiAdapter;
use incubator::app::ports::DisplayPort;
use incubator::app::service::ControlService;
use incubator::config::Config;
use incubator::drivers::buzzer::BuzzerDriver;
use incubator::drivers::hw_init;
use incubator::drivers::relay::RelayDriver;
use incubator::drivers::watchdog::Watchdog;
use incubator::error::DisplayError;
use incubator::pins;
use incubator::sensors::Dht22Sensor;

/// Display that may have failed to initialise.  The panel is a convenience;
/// a dead bus must not stop incubation, so a missing panel swallows writes.
struct MaybeDisplay(Option<OledDisplay>);

impl DisplayPort for MaybeDisplay {
    fn show(&mut self, temperature_c: f32, humidity_pct: f32) -> Result<(), DisplayError> {
        match &mut self.0 {
            Some(d) => d.show(temperature_c, humidity_pct),
            None => Ok(()),
        }
    }

    fn show_startup(&mut self, line0: &str, line1: &str) -> Result<(), DisplayError> {
        match &mut self.0 {
            Some(d) => d.show_startup(line0, line1),
            None => Ok(()),
        }
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Incubator v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("configuration invalid: {e} — refusing to start");
            std::process::exit(1);
        }
    };

    // ── 3. Hardware peripherals ───────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("peripheral init failed: {e} — refusing to start");
        std::process::exit(1);
    }

    // The watchdog window must survive a full worst-case cycle: the whole
    // sensor retry budget plus the end-of-cycle sleep, with margin.
    let watchdog_ms = u32::from(config.control.sensor_max_attempts)
        * config.control.sensor_retry_delay_ms
        + config.control.sampling_period_secs * 1_000
        + 10_000;
    let watchdog = Watchdog::new(watchdog_ms);

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // ── 4. Network ────────────────────────────────────────────
    // Telemetry is best-effort: a failed connect degrades reporting, the
    // control loop starts regardless and poll() keeps retrying.
    let esp_wifi = EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs_partition))?;
    let mut wifi = WifiAdapter::new(BlockingWifi::wrap(esp_wifi, sysloop)?);
    if let Err(e) = wifi.set_credentials(&config.network.wifi_ssid, &config.network.wifi_password)
    {
        error!("WiFi credentials invalid: {e} — refusing to start");
        std::process::exit(1);
    }
    if let Err(e) = wifi.connect() {
        warn!("WiFi unavailable at boot ({e}), continuing without telemetry");
    }

    // Keep the SNTP service alive for the process lifetime so reading
    // timestamps are wall-clock accurate.
    let _sntp = EspSntp::new_default()?;

    // ── 5. Adapters ───────────────────────────────────────────
    // The HAL hands out I2C pins as typed peripherals, so they cannot be
    // selected by the pins.rs numbers at runtime; this assert keeps the
    // wiring below from drifting away from the documented assignment.
    const _: () = assert!(pins::I2C_SDA_GPIO == 14 && pins::I2C_SCL_GPIO == 15);
    let i2c_config = I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ));
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio14,
        peripherals.pins.gpio15,
        &i2c_config,
    )?;
    let mut display = MaybeDisplay(match OledDisplay::new(i2c) {
        Ok(d) => Some(d),
        Err(e) => {
            warn!("OLED init failed ({e}), running without a panel");
            None
        }
    });

    let mut hw = HardwareAdapter::new(
        Dht22Sensor::new(
            pins::DHT_GPIO,
            config.control.sensor_max_attempts,
            config.control.sensor_retry_delay_ms,
        ),
        RelayDriver::new(pins::RELAY_GPIO),
        BuzzerDriver::new(pins::BUZZER_GPIO),
        config.control.beep_duration_ms,
    );

    let (mut telemetry, _writer) =
        InfluxReporter::start(&config.telemetry, EspHttpBackend::new(&config.telemetry));
    let mut sink = LogEventSink::new();

    // ── 6. Control service ────────────────────────────────────
    let mut service = ControlService::new(config.control.clone());
    if let Err(e) = service.startup(&mut hw, &mut display, &mut sink) {
        error!("startup self-test failed: {e} — refusing to start");
        std::process::exit(1);
    }

    info!("System ready. Entering control loop.");

    // ── 7. Control loop ───────────────────────────────────────
    loop {
        if let Err(e) = service.run_cycle(&mut hw, &mut telemetry, &mut display, &mut sink) {
            error!("actuator fault: {e} — stopping");
            std::process::exit(1);
        }

        watchdog.feed();
        wifi.poll();

        std::thread::sleep(std::time::Duration::from_secs(u64::from(
            service.sampling_period_secs(),
        )));
    }
}
