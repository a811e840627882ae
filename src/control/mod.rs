//! Bang-bang heater control.

pub mod threshold;

/// Desired state of the heating relay.
///
/// Owned exclusively by the control service: initialized to `Idle` at
/// process start, persists across cycles, only ever mutated by the outcome
/// of [`threshold::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Relay energized, heating element on.
    Heating,
    /// Relay de-energized, heating element off.
    Idle,
}
