//! Port traits — the hexagonal boundary between domain logic and the outside
//! world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlService (domain)
//! ```
//!
//! Driven adapters (sensor, actuators, display, telemetry store, event sinks)
//! implement these traits.  The
//! [`ControlService`](super::service::ControlService) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::app::reading::Reading;
use crate::control::RelayState;
use crate::error::{ActuatorError, DisplayError, ReportError, SensorError};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per cycle.
///
/// Implementations own the retry policy against the physical sensor (bounded
/// attempts, fixed inter-attempt delay) and return either a validated,
/// timestamped, two-decimal-rounded [`Reading`] or the reason no data came
/// back.  They must never invent a reading with missing fields.
pub trait SensorPort {
    fn acquire(&mut self) -> Result<Reading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command the heater.
///
/// Errors from this port are fatal — an unknown relay state is unsafe to
/// continue from, so callers propagate instead of containing.
pub trait ActuatorPort {
    /// Drive the relay to `state`.  `Heating` energizes the relay and then
    /// pulses the buzzer for the configured duration (blocking); `Idle`
    /// de-energizes and stays silent.  The beep fires on every `Heating`
    /// application, not only on transitions.
    fn apply(&mut self, state: RelayState) -> Result<(), ActuatorError>;

    /// One-time startup sequence: `pulses` relay-on / beep / relay-off
    /// cycles so the operator can audibly and visually confirm the wiring
    /// before unattended operation begins.
    fn self_test(&mut self, pulses: u8) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (driven adapter: domain → time-series store)
// ───────────────────────────────────────────────────────────────

/// Best-effort submission of one reading to the telemetry store.
///
/// Must be a non-blocking enqueue: batching, flushing and retry belong to
/// the implementation's own writer, on its own schedule.  A slow or
/// unreachable backend must never delay the control decision.  `relay` is
/// cycle context for the submission log; the stored record carries the
/// measurement, location tag, temperature, humidity and timestamp only.
pub trait TelemetryPort {
    fn submit(&mut self, reading: &Reading, relay: RelayState) -> Result<(), ReportError>;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → OLED)
// ───────────────────────────────────────────────────────────────

/// Two-line readout.  Purely a sink — no control logic, formatting to one
/// decimal with a unit suffix happens behind this trait.  Failures are
/// logged and never fatal; on failure the panel keeps whatever it last
/// showed.
pub trait DisplayPort {
    /// Render `"<temp> C"` over `"<humidity> %"`.
    fn show(&mut self, temperature_c: f32, humidity_pct: f32) -> Result<(), DisplayError>;

    /// Render the fixed two-line startup screen shown before the self-test.
    fn show_startup(&mut self, line0: &str, line1: &str) -> Result<(), DisplayError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
