//! The `Reading` value type.

use chrono::{DateTime, Utc};

/// One validated sensor acquisition.
///
/// Exists only if both fields decoded — a failed sample produces no
/// `Reading`, never a `Reading` with placeholder fields.  Created once per
/// successful acquisition, handed to controller, telemetry and display in
/// the same cycle, then discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Temperature in Celsius, rounded to two decimals.
    pub temperature_c: f32,
    /// Relative humidity in percent, rounded to two decimals.
    pub humidity_pct: f32,
    /// UTC instant of the acquisition.
    pub taken_at: DateTime<Utc>,
}

impl Reading {
    /// Build a reading, normalizing both values to two decimal places so
    /// telemetry and display formatting agree with what was measured.
    pub fn new(temperature_c: f32, humidity_pct: f32, taken_at: DateTime<Utc>) -> Self {
        Self {
            temperature_c: round2(temperature_c),
            humidity_pct: round2(humidity_pct),
            taken_at,
        }
    }
}

/// Round to two decimal places.
pub fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round2(37.666), 37.67);
        assert_eq!(round2(37.664), 37.66);
        assert_eq!(round2(50.0), 50.0);
        assert_eq!(round2(12.3), 12.3);
    }

    #[test]
    fn construction_normalizes_fields() {
        let r = Reading::new(37.666, 55.555, Utc::now());
        assert_eq!(r.temperature_c, 37.67);
        assert_eq!(r.humidity_pct, 55.56);
    }
}
