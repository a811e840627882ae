//! DHT22 / AM2302 temperature and humidity sensor driver.
//!
//! Single-wire protocol: the MCU pulls the line low for >1 ms as a start
//! pulse, releases it, and the sensor answers with an 80 µs low / 80 µs high
//! preamble followed by 40 data bits.  Each bit starts with ~50 µs low; the
//! length of the following high pulse encodes the bit (~27 µs = 0, ~70 µs
//! = 1).  The 5th byte is the checksum (low byte of the sum of the first
//! four).
//!
//! The sensor's internal sampling interval is 2 s — polling faster returns
//! stale or corrupt frames, so the retry delay must never go below that.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs the line via the `hw_init` GPIO helpers with the
//! FreeRTOS scheduler suspended during the 40-bit frame.  ISRs still run
//! and can stretch a pulse; a stretched bit fails the checksum and the
//! attempt is retried.
//! On host/test: reads injected simulation values.

use log::debug;

use crate::error::SensorError;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

// ── Host-side simulation ──────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicBool, AtomicI32, Ordering};

    static TEMP_X100: AtomicI32 = AtomicI32::new(2_500);
    static HUM_X100: AtomicI32 = AtomicI32::new(5_000);
    static FAILING: AtomicBool = AtomicBool::new(false);

    /// The injected state above is process-global; tests that touch it hold
    /// this lock so parallel test threads do not interleave injections.
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    pub fn lock() -> std::sync::MutexGuard<'static, ()> {
        LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Inject the next reading (Celsius, percent).
    pub fn set_reading(temperature_c: f32, humidity_pct: f32) {
        TEMP_X100.store((temperature_c * 100.0) as i32, Ordering::Relaxed);
        HUM_X100.store((humidity_pct * 100.0) as i32, Ordering::Relaxed);
        FAILING.store(false, Ordering::Relaxed);
    }

    /// Make every subsequent read fail until a new reading is injected.
    pub fn set_failing() {
        FAILING.store(true, Ordering::Relaxed);
    }

    pub fn read() -> Option<(f32, f32)> {
        if FAILING.load(Ordering::Relaxed) {
            return None;
        }
        Some((
            TEMP_X100.load(Ordering::Relaxed) as f32 / 100.0,
            HUM_X100.load(Ordering::Relaxed) as f32 / 100.0,
        ))
    }
}

#[cfg(not(target_os = "espidf"))]
pub use sim::{lock as sim_lock, set_failing as sim_set_failing, set_reading as sim_set_reading};

// ── Frame decoding (pure) ─────────────────────────────────────

/// Decode a 5-byte DHT22 frame into (temperature °C, relative humidity %).
///
/// Returns both values or nothing — a frame with a bad checksum yields no
/// partial data.  Range filtering is deliberately NOT done here; the sensor
/// datasheet range is the operator's concern.
pub fn decode_frame(bytes: [u8; 5]) -> Result<(f32, f32), SensorError> {
    let sum = bytes[0]
        .wrapping_add(bytes[1])
        .wrapping_add(bytes[2])
        .wrapping_add(bytes[3]);
    if sum != bytes[4] {
        return Err(SensorError::ChecksumMismatch);
    }

    let humidity = u16::from_be_bytes([bytes[0], bytes[1]]) as f32 / 10.0;

    let raw_t = u16::from_be_bytes([bytes[2] & 0x7F, bytes[3]]) as f32 / 10.0;
    let temperature = if bytes[2] & 0x80 != 0 { -raw_t } else { raw_t };

    Ok((temperature, humidity))
}

// ── Driver ────────────────────────────────────────────────────

pub struct Dht22Sensor {
    gpio: i32,
    max_attempts: u8,
    retry_delay_ms: u32,
}

impl Dht22Sensor {
    pub fn new(gpio: i32, max_attempts: u8, retry_delay_ms: u32) -> Self {
        Self {
            gpio,
            max_attempts,
            retry_delay_ms,
        }
    }

    /// Read with bounded retry.
    ///
    /// Attempts the physical read up to `max_attempts` times with a fixed
    /// `retry_delay_ms` between attempts.  Individual attempt failures are
    /// logged at debug level; only exhaustion surfaces as an error.
    pub fn read_retry(&mut self) -> Result<(f32, f32), SensorError> {
        let mut last = SensorError::NoResponse;
        for attempt in 1..=self.max_attempts {
            match self.read_once() {
                Ok(pair) => return Ok(pair),
                Err(e) => {
                    debug!("DHT22 attempt {attempt}/{}: {e}", self.max_attempts);
                    last = e;
                }
            }
            if attempt < self.max_attempts {
                self.inter_attempt_delay();
            }
        }
        debug!("DHT22 gave up after {} attempts (last: {last})", self.max_attempts);
        Err(SensorError::RetriesExhausted)
    }

    // ── Platform-specific single read ─────────────────────────

    #[cfg(target_os = "espidf")]
    fn read_once(&mut self) -> Result<(f32, f32), SensorError> {
        let bytes = self.read_frame()?;
        decode_frame(bytes)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_once(&mut self) -> Result<(f32, f32), SensorError> {
        let _ = self.gpio;
        sim::read().ok_or(SensorError::NoResponse)
    }

    /// Bit-bang one 40-bit frame.  Timing-critical: runs with the scheduler
    /// suspended for the ~5 ms frame so no other task preempts mid-bit.
    #[cfg(target_os = "espidf")]
    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        // Start pulse: drive low >1 ms, release, switch to input.
        hw_init::gpio_set_output(self.gpio);
        hw_init::gpio_write(self.gpio, false);
        hw_init::delay_ms(2);
        hw_init::gpio_write(self.gpio, true);
        hw_init::gpio_set_input(self.gpio);

        let _guard = hw_init::SchedulerGuard::enter();

        // Sensor preamble: ~80 µs low then ~80 µs high.
        hw_init::wait_for_level(self.gpio, false, 100).ok_or(SensorError::NoResponse)?;
        hw_init::wait_for_level(self.gpio, true, 100).ok_or(SensorError::NoResponse)?;
        hw_init::wait_for_level(self.gpio, false, 100).ok_or(SensorError::NoResponse)?;

        let mut bytes = [0u8; 5];
        for i in 0..40 {
            // ~50 µs low separator before each bit.
            hw_init::wait_for_level(self.gpio, true, 80).ok_or(SensorError::Timeout)?;
            // High pulse width encodes the bit: ~27 µs = 0, ~70 µs = 1.
            let width = hw_init::wait_for_level(self.gpio, false, 100).ok_or(SensorError::Timeout)?;
            if width > 50 {
                bytes[i / 8] |= 1 << (7 - (i % 8));
            }
        }
        Ok(bytes)
    }

    #[cfg(target_os = "espidf")]
    fn inter_attempt_delay(&self) {
        hw_init::delay_ms(self.retry_delay_ms);
    }

    /// Host builds do not wait between simulated attempts.
    #[cfg(not(target_os = "espidf"))]
    fn inter_attempt_delay(&self) {
        let _ = self.retry_delay_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins;

    fn frame(b0: u8, b1: u8, b2: u8, b3: u8) -> [u8; 5] {
        [b0, b1, b2, b3, b0.wrapping_add(b1).wrapping_add(b2).wrapping_add(b3)]
    }

    #[test]
    fn decodes_positive_temperature() {
        // humidity 55.2 %, temperature 37.7 C
        let (t, h) = decode_frame(frame(0x02, 0x28, 0x01, 0x79)).unwrap();
        assert!((h - 55.2).abs() < 0.01);
        assert!((t - 37.7).abs() < 0.01);
    }

    #[test]
    fn decodes_negative_temperature() {
        // temperature -10.1 C (sign bit set in byte 2)
        let (t, _h) = decode_frame(frame(0x01, 0xF4, 0x80, 0x65)).unwrap();
        assert!((t + 10.1).abs() < 0.01);
    }

    #[test]
    fn rejects_bad_checksum() {
        let mut f = frame(0x02, 0x28, 0x01, 0x79);
        f[4] ^= 0xFF;
        assert_eq!(decode_frame(f), Err(SensorError::ChecksumMismatch));
    }

    #[test]
    fn retry_returns_injected_reading() {
        let _g = sim_lock();
        sim_set_reading(37.5, 55.0);
        let mut s = Dht22Sensor::new(pins::DHT_GPIO, 3, 2_000);
        assert_eq!(s.read_retry(), Ok((37.5, 55.0)));
    }

    #[test]
    fn retry_exhaustion_reports_failure() {
        let _g = sim_lock();
        sim_set_failing();
        let mut s = Dht22Sensor::new(pins::DHT_GPIO, 3, 2_000);
        assert_eq!(s.read_retry(), Err(SensorError::RetriesExhausted));
        sim_set_reading(25.0, 50.0); // leave the sim sane for other tests
    }
}
