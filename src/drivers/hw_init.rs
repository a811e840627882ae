//! One-shot hardware peripheral initialization and GPIO helpers.
//!
//! Configures GPIO directions using raw ESP-IDF sys calls.  Called once from
//! `main()` before the control loop starts.  The free-function helpers are
//! the only GPIO access path for the drivers and the DHT22 bit-bang.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

// ── Peripheral init ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the loop; single-threaded.
    unsafe {
        for pin in [pins::RELAY_GPIO, pins::BUZZER_GPIO] {
            let rc = gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_OUTPUT);
            if rc != ESP_OK {
                return Err(HwInitError::GpioConfigFailed(rc));
            }
            gpio_set_level(pin, 0);
        }

        // DHT22 line idles as input with the external pull-up; the driver
        // flips it to output only for the start pulse.
        let rc = gpio_set_direction(pins::DHT_GPIO, gpio_mode_t_GPIO_MODE_INPUT);
        if rc != ESP_OK {
            return Err(HwInitError::GpioConfigFailed(rc));
        }
        gpio_set_pull_mode(pins::DHT_GPIO, gpio_pull_mode_t_GPIO_PULLUP_ONLY);
    }
    log::info!("hw_init: relay, buzzer and DHT GPIOs configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO helpers ──────────────────────────────────────────────

/// Drive a digital output.  Returns `false` when the write was rejected —
/// the actuator drivers treat that as fatal.
#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) -> bool {
    unsafe { gpio_set_level(pin, u32::from(high)) == ESP_OK }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) -> bool {
    true
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    unsafe { gpio_get_level(pin) != 0 }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

#[cfg(target_os = "espidf")]
pub fn gpio_set_output(pin: i32) {
    unsafe {
        gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_OUTPUT);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_set_output(_pin: i32) {}

#[cfg(target_os = "espidf")]
pub fn gpio_set_input(pin: i32) {
    unsafe {
        gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_INPUT);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_set_input(_pin: i32) {}

// ── Delays ────────────────────────────────────────────────────

/// Blocking millisecond delay (FreeRTOS tick sleep — yields the CPU).
#[cfg(target_os = "espidf")]
pub fn delay_ms(ms: u32) {
    unsafe {
        vTaskDelay(ms * configTICK_RATE_HZ / 1_000);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn delay_ms(_ms: u32) {}

/// Busy-wait microsecond delay for timing-critical bit-banging.
#[cfg(target_os = "espidf")]
pub fn delay_us(us: u32) {
    unsafe {
        ets_delay_us(us);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn delay_us(_us: u32) {}

/// Busy-wait until `pin` reads `level`, polling every microsecond.
/// Returns the elapsed microseconds, or `None` after `timeout_us`.
#[cfg(target_os = "espidf")]
pub fn wait_for_level(pin: i32, level: bool, timeout_us: u32) -> Option<u32> {
    for elapsed in 0..timeout_us {
        if gpio_read(pin) == level {
            return Some(elapsed);
        }
        delay_us(1);
    }
    None
}

#[cfg(not(target_os = "espidf"))]
pub fn wait_for_level(_pin: i32, _level: bool, _timeout_us: u32) -> Option<u32> {
    Some(0)
}

// ── Scheduler suspension ──────────────────────────────────────

/// Suspends the FreeRTOS scheduler for the guard's lifetime.  Used only
/// around the ~5 ms DHT22 frame, where a task preemption would corrupt the
/// pulse-width measurement.  This is not an interrupt lock: ISRs still run,
/// and a stretched pulse is caught by the frame checksum downstream.
pub struct SchedulerGuard(());

impl SchedulerGuard {
    pub fn enter() -> Self {
        #[cfg(target_os = "espidf")]
        unsafe {
            vTaskSuspendAll();
        }
        Self(())
    }
}

impl Drop for SchedulerGuard {
    fn drop(&mut self) {
        #[cfg(target_os = "espidf")]
        unsafe {
            xTaskResumeAll();
        }
    }
}
