//! Outbound application events.
//!
//! The [`ControlService`](super::service::ControlService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — the shipped firmware logs to serial.

use crate::app::reading::Reading;
use crate::control::RelayState;

/// Result of one loop iteration.  Transient — used for logging and
/// diagnostics, never retained across cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Reading acquired, relay applied, telemetry and display refreshed.
    Success,
    /// The sensor returned no data; all downstream steps were skipped and
    /// the relay and display keep their last state.
    SensorReadFailure,
    /// Control and display succeeded but the telemetry submission failed.
    ReportFailure,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service finished its startup sequence and is entering the loop.
    Started,

    /// One relay self-test pulse completed (1-based index).
    SelfTestPulse(u8),

    /// The relay was commanded this cycle.  `changed` marks a transition
    /// from the previous cycle's state.
    RelayApplied { state: RelayState, changed: bool },

    /// A validated reading was acquired this cycle.
    ReadingTaken(Reading),

    /// A cycle finished with the given outcome.
    CycleCompleted(CycleOutcome),
}
