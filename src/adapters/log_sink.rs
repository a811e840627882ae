//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::info;

use crate::app::events::{AppEvent, CycleOutcome};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | control loop entering");
            }
            AppEvent::SelfTestPulse(i) => {
                info!("SELFTEST | pulse {}", i);
            }
            AppEvent::RelayApplied { state, changed } => {
                info!(
                    "RELAY | {:?}{}",
                    state,
                    if *changed { " (transition)" } else { "" }
                );
            }
            AppEvent::ReadingTaken(r) => {
                info!(
                    "READING | T={:.2}C H={:.2}% at={}",
                    r.temperature_c, r.humidity_pct, r.taken_at
                );
            }
            AppEvent::CycleCompleted(outcome) => match outcome {
                CycleOutcome::Success => info!("CYCLE | ok"),
                CycleOutcome::SensorReadFailure => info!("CYCLE | sensor dropout"),
                CycleOutcome::ReportFailure => info!("CYCLE | report failed"),
            },
        }
    }
}
