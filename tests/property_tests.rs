//! Property tests for the control law and the data plumbing around it.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32 targets.

#![cfg(not(target_os = "espidf"))]

use chrono::Utc;
use incubator::adapters::influx::escape_tag_value;
use incubator::app::ports::{ActuatorPort, DisplayPort, EventSink, SensorPort, TelemetryPort};
use incubator::app::reading::{Reading, round2};
use incubator::app::service::ControlService;
use incubator::config::ControlConfig;
use incubator::control::{RelayState, threshold};
use incubator::error::{ActuatorError, DisplayError, ReportError, SensorError};
use proptest::prelude::*;

// ── Control law ───────────────────────────────────────────────

proptest! {
    /// The relay heats exactly when the measurement is strictly below the
    /// target, for any finite pair of values.
    #[test]
    fn decide_is_strictly_below_target(
        t in -40.0f32..=80.0,
        target in 0.0f32..=60.0,
    ) {
        let state = threshold::decide(t, target);
        prop_assert_eq!(state == RelayState::Heating, t < target);
    }

    /// At the boundary the relay always idles.
    #[test]
    fn decide_at_target_is_idle(target in -40.0f32..=80.0) {
        prop_assert_eq!(threshold::decide(target, target), RelayState::Idle);
    }

    /// The decision depends only on the inputs — same inputs, same output.
    #[test]
    fn decide_is_pure(t in -40.0f32..=80.0, target in 0.0f32..=60.0) {
        prop_assert_eq!(threshold::decide(t, target), threshold::decide(t, target));
    }
}

// ── Rounding ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn round2_is_idempotent(v in -100.0f32..=100.0) {
        let once = round2(v);
        prop_assert_eq!(round2(once), once);
    }

    #[test]
    fn round2_stays_close(v in -100.0f32..=100.0) {
        prop_assert!((round2(v) - v).abs() <= 0.0051);
    }
}

// ── Line-protocol escaping ────────────────────────────────────

proptest! {
    /// Every special character in a tag value ends up backslash-prefixed.
    #[test]
    fn escaped_tags_have_no_bare_specials(s in ".{0,40}") {
        let escaped = escape_tag_value(&s);
        let chars: Vec<char> = escaped.chars().collect();
        for (i, c) in chars.iter().enumerate() {
            if matches!(c, ',' | '=' | ' ') {
                prop_assert_eq!(chars.get(i.wrapping_sub(1)), Some(&'\\'));
            }
        }
    }
}

// ── Failure containment under arbitrary schedules ─────────────

#[derive(Debug, Clone)]
enum CycleInput {
    Reading(f32),
    Dropout,
}

fn cycle_input() -> impl Strategy<Value = CycleInput> {
    prop_oneof![
        (20.0f32..=45.0).prop_map(CycleInput::Reading),
        Just(CycleInput::Dropout),
    ]
}

struct ScriptedHw {
    script: Vec<CycleInput>,
    cursor: usize,
    applied: Vec<RelayState>,
}

impl SensorPort for ScriptedHw {
    fn acquire(&mut self) -> Result<Reading, SensorError> {
        let input = self.script[self.cursor].clone();
        self.cursor += 1;
        match input {
            CycleInput::Reading(t) => Ok(Reading::new(t, 50.0, Utc::now())),
            CycleInput::Dropout => Err(SensorError::RetriesExhausted),
        }
    }
}

impl ActuatorPort for ScriptedHw {
    fn apply(&mut self, state: RelayState) -> Result<(), ActuatorError> {
        self.applied.push(state);
        Ok(())
    }
    fn self_test(&mut self, _pulses: u8) -> Result<(), ActuatorError> {
        Ok(())
    }
}

struct CountingTelemetry {
    count: usize,
}
impl TelemetryPort for CountingTelemetry {
    fn submit(&mut self, _reading: &Reading, _relay: RelayState) -> Result<(), ReportError> {
        self.count += 1;
        Ok(())
    }
}

struct NullDisplay;
impl DisplayPort for NullDisplay {
    fn show(&mut self, _t: f32, _h: f32) -> Result<(), DisplayError> {
        Ok(())
    }
    fn show_startup(&mut self, _l0: &str, _l1: &str) -> Result<(), DisplayError> {
        Ok(())
    }
}

struct NullSink;
impl EventSink for NullSink {
    fn emit(&mut self, _event: &incubator::app::events::AppEvent) {}
}

proptest! {
    /// For any interleaving of readings and dropouts:
    /// - relay commands happen exactly on reading cycles;
    /// - each command matches the threshold decision for that reading;
    /// - the service state always equals the last command (or stays Idle);
    /// - telemetry submissions equal reading cycles.
    #[test]
    fn relay_follows_readings_and_freezes_on_dropouts(
        script in proptest::collection::vec(cycle_input(), 1..30),
    ) {
        let config = ControlConfig::default();
        let target = config.target_temperature_c;
        let mut hw = ScriptedHw { script: script.clone(), cursor: 0, applied: Vec::new() };
        let mut telemetry = CountingTelemetry { count: 0 };
        let mut svc = ControlService::new(config);

        for _ in 0..script.len() {
            svc.run_cycle(&mut hw, &mut telemetry, &mut NullDisplay, &mut NullSink).unwrap();
        }

        let readings: Vec<f32> = script.iter().filter_map(|i| match i {
            CycleInput::Reading(t) => Some(round2(*t)),
            CycleInput::Dropout => None,
        }).collect();

        prop_assert_eq!(hw.applied.len(), readings.len());
        prop_assert_eq!(telemetry.count, readings.len());
        for (applied, t) in hw.applied.iter().zip(&readings) {
            prop_assert_eq!(*applied, threshold::decide(*t, target));
        }

        let expected_state = hw.applied.last().copied().unwrap_or(RelayState::Idle);
        prop_assert_eq!(svc.relay_state(), expected_state);
        prop_assert_eq!(svc.cycle_count(), script.len() as u64);
    }
}
