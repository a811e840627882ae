//! SSD1306 OLED readout adapter.
//!
//! Renders exactly two lines: temperature over humidity, one decimal, unit
//! suffixed.  Terminal mode keeps the whole pixel pipeline out of the
//! firmware — the panel's built-in font does the drawing.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real panel over I2C.
//! On host/test: records the last two lines in memory.

use core::fmt::Write as _;

use crate::app::ports::DisplayPort;
use crate::error::DisplayError;

// ── Line formatting (pure) ────────────────────────────────────

/// `"37.7 C"` — one decimal, space, unit.
pub fn format_temperature(temperature_c: f32) -> heapless::String<16> {
    let mut s = heapless::String::new();
    let _ = write!(s, "{:.1} C", temperature_c);
    s
}

/// `"55.0 %"` — one decimal, space, unit.
pub fn format_humidity(humidity_pct: f32) -> heapless::String<16> {
    let mut s = heapless::String::new();
    let _ = write!(s, "{:.1} %", humidity_pct);
    s
}

// ── Panel ─────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod panel {
    use esp_idf_hal::i2c::I2cDriver;
    use ssd1306::mode::TerminalMode;
    use ssd1306::prelude::*;
    use ssd1306::{I2CDisplayInterface, Ssd1306};

    use crate::error::DisplayError;
    use crate::pins;

    pub struct OledDisplay {
        panel: Ssd1306<I2CInterface<I2cDriver<'static>>, DisplaySize128x32, TerminalMode>,
    }

    impl OledDisplay {
        pub fn new(i2c: I2cDriver<'static>) -> Result<Self, DisplayError> {
            let interface = I2CDisplayInterface::new_custom_address(i2c, pins::OLED_I2C_ADDR);
            let mut panel = Ssd1306::new(interface, DisplaySize128x32, DisplayRotation::Rotate0)
                .into_terminal_mode();
            panel.init().map_err(|_| DisplayError::CommandFailed)?;
            panel.clear().map_err(|_| DisplayError::CommandFailed)?;
            Ok(Self { panel })
        }

        pub fn write_lines(&mut self, line0: &str, line1: &str) -> Result<(), DisplayError> {
            use core::fmt::Write as _;
            self.panel.clear().map_err(|_| DisplayError::CommandFailed)?;
            self.panel
                .set_position(0, 0)
                .map_err(|_| DisplayError::CommandFailed)?;
            self.panel
                .write_str(line0)
                .map_err(|_| DisplayError::BusError)?;
            self.panel
                .set_position(0, 2)
                .map_err(|_| DisplayError::CommandFailed)?;
            self.panel
                .write_str(line1)
                .map_err(|_| DisplayError::BusError)?;
            Ok(())
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod panel {
    use crate::error::DisplayError;

    pub struct OledDisplay {
        last: Option<(String, String)>,
    }

    impl OledDisplay {
        pub fn new_sim() -> Self {
            Self { last: None }
        }

        pub fn write_lines(&mut self, line0: &str, line1: &str) -> Result<(), DisplayError> {
            self.last = Some((line0.to_string(), line1.to_string()));
            Ok(())
        }

        pub fn last_lines(&self) -> Option<(&str, &str)> {
            self.last.as_ref().map(|(a, b)| (a.as_str(), b.as_str()))
        }
    }
}

pub use panel::OledDisplay;

impl DisplayPort for OledDisplay {
    fn show(&mut self, temperature_c: f32, humidity_pct: f32) -> Result<(), DisplayError> {
        self.write_lines(
            &format_temperature(temperature_c),
            &format_humidity(humidity_pct),
        )
    }

    fn show_startup(&mut self, line0: &str, line1: &str) -> Result<(), DisplayError> {
        self.write_lines(line0, line1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_one_decimal_with_units() {
        assert_eq!(format_temperature(37.7).as_str(), "37.7 C");
        assert_eq!(format_humidity(55.0).as_str(), "55.0 %");
    }

    #[test]
    fn formatting_truncates_second_decimal() {
        // Readings carry two decimals; the panel shows one.
        assert_eq!(format_temperature(37.67).as_str(), "37.7 C");
        assert_eq!(format_humidity(55.55).as_str(), "55.5 %");
    }

    #[test]
    fn negative_temperature_renders_sign() {
        assert_eq!(format_temperature(-10.1).as_str(), "-10.1 C");
    }

    #[test]
    fn show_renders_both_lines() {
        let mut d = OledDisplay::new_sim();
        d.show(37.7, 55.0).unwrap();
        assert_eq!(d.last_lines(), Some(("37.7 C", "55.0 %")));
    }
}
