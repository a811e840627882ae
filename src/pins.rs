//! GPIO / peripheral pin assignments for the incubator main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Heater relay
// ---------------------------------------------------------------------------

/// Digital output driving the relay coil transistor.  HIGH = energized =
/// heating element on.
pub const RELAY_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Buzzer
// ---------------------------------------------------------------------------

/// Digital output for the piezo buzzer.  HIGH = sounding.
pub const BUZZER_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// DHT22 / AM2302 sensor
// ---------------------------------------------------------------------------

/// Single-wire data line of the DHT22.  Open-drain with external 10 kΩ
/// pull-up; the driver switches it between output (start pulse) and input
/// (response frame).
pub const DHT_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// I²C bus (SSD1306 OLED, 128x32)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 15;

/// SSD1306 I²C address (0x3C for the common 0.91" 128x32 modules).
pub const OLED_I2C_ADDR: u8 = 0x3C;

/// I²C bus frequency.  400 kHz fast mode — the SSD1306 supports it and a
/// full two-line refresh stays well under a cycle.
pub const I2C_FREQ_HZ: u32 = 400_000;
