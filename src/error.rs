//! Unified error types for the incubator firmware.
//!
//! Follows embedded best practice: a single `Error` enum that every subsystem
//! can convert into, keeping the top-level control loop's error handling
//! uniform.  All variants are `Copy` so they can be cheaply threaded through
//! the cycle orchestration without allocation.
//!
//! The taxonomy mirrors the failure policy of the control loop:
//! sensor/report/display errors are recoverable and contained within the
//! cycle that produced them; actuator and configuration errors are fatal.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The sensor returned no usable data this cycle (recoverable).
    Sensor(SensorError),
    /// The relay or buzzer could not be driven (fatal).
    Actuator(ActuatorError),
    /// A telemetry submission failed (recoverable, isolated).
    Report(ReportError),
    /// The display could not be refreshed (recoverable, isolated).
    Display(DisplayError),
    /// Peripheral initialisation failed (fatal, startup-only).
    Init(&'static str),
    /// Configuration is invalid or incomplete (fatal, startup-only).
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Report(e) => write!(f, "report: {e}"),
            Self::Display(e) => write!(f, "display: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// The only failure mode the sensor reader reports is "no data returned" —
/// the variants record *why* nothing came back, for the log stream.
/// Out-of-physical-range values are not filtered here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The sensor never pulled the line low in response to the start pulse.
    NoResponse,
    /// A bit-level timeout occurred mid-frame.
    Timeout,
    /// The 40-bit frame arrived but its checksum did not match.
    ChecksumMismatch,
    /// All retry attempts were exhausted without a valid frame.
    RetriesExhausted,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResponse => write!(f, "no response to start pulse"),
            Self::Timeout => write!(f, "frame timeout"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::RetriesExhausted => write!(f, "retries exhausted"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

/// An incubator that cannot drive its heater must not keep running with an
/// unknown relay state — every variant here terminates the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Relay GPIO write failed.
    RelayWriteFailed,
    /// Buzzer GPIO write failed.
    BuzzerWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RelayWriteFailed => write!(f, "relay GPIO write failed"),
            Self::BuzzerWriteFailed => write!(f, "buzzer GPIO write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Telemetry report errors
// ---------------------------------------------------------------------------

/// Telemetry is best-effort: these are logged and never affect the actuator
/// or the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportError {
    /// The reading carries a pre-SNTP timestamp; the record is withheld
    /// rather than stored with a near-epoch time.
    ClockNotSynced,
    /// The writer queue is full — the backend is wedged or unreachable and
    /// the bounded buffer has filled up.  The record is dropped.
    QueueFull,
    /// The writer thread has exited and the channel is closed.
    WriterGone,
    /// The HTTP request could not be performed.
    HttpFailed,
    /// The store answered with a non-success status code.
    BadStatus(u16),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClockNotSynced => write!(f, "wall clock not yet synced, record withheld"),
            Self::QueueFull => write!(f, "telemetry queue full, record dropped"),
            Self::WriterGone => write!(f, "telemetry writer gone"),
            Self::HttpFailed => write!(f, "HTTP request failed"),
            Self::BadStatus(code) => write!(f, "store returned HTTP {code}"),
        }
    }
}

impl From<ReportError> for Error {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// I²C transaction to the SSD1306 failed.
    BusError,
    /// The display rejected a command sequence.
    CommandFailed,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusError => write!(f, "I2C bus error"),
            Self::CommandFailed => write!(f, "display command failed"),
        }
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
