//! Threshold (bang-bang) controller.
//!
//! Pure decision logic, no I/O.  The physical design switches a relay on and
//! off around a single setpoint — no proportional control, and deliberately
//! no hysteresis band: if the chamber sits exactly at the boundary the relay
//! may toggle every cycle.  That is a known characteristic of the rig, not a
//! bug; operators who find the chatter unacceptable should revisit the
//! setpoint, not this function.

use super::RelayState;

/// Map the latest temperature to a desired relay state.
///
/// `Heating` iff `temperature_c < target_c` — the boundary is exclusive, so
/// a reading exactly at the setpoint idles the heater.
pub fn decide(temperature_c: f32, target_c: f32) -> RelayState {
    if temperature_c < target_c {
        RelayState::Heating
    } else {
        RelayState::Idle
    }
}

/// Whether the relay state changed between two consecutive cycles.
///
/// Used for event logging only.  The buzzer does NOT key off this: it fires
/// on every `Heating` application, changed or not, so the operator hears
/// confirmation each time the heater engages.
pub fn transitioned(previous: RelayState, next: RelayState) -> bool {
    previous != next
}
