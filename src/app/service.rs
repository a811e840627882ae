//! Control service — the hexagonal core.
//!
//! [`ControlService`] owns the relay state and runs the cyclic
//! sample → decide → actuate → report algorithm.  All I/O flows through
//! port traits injected at call sites, making the entire service testable
//! with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────┐ ──▶ TelemetryPort
//!                  │      ControlService       │ ──▶ DisplayPort
//!  ActuatorPort ◀──│  threshold · containment  │ ──▶ EventSink
//!                  └──────────────────────────┘
//! ```
//!
//! Failure containment per cycle:
//! - sensor failure: skip everything downstream, relay and display frozen,
//!   retry on the next cycle — indefinitely, no backoff growth;
//! - report failure: logged, display still refreshed;
//! - display failure: logged, nothing else affected;
//! - actuator failure: propagated — fatal to the process.

use log::{debug, error, info, warn};

use crate::config::ControlConfig;
use crate::control::{RelayState, threshold};
use crate::error::Error;

use super::events::{AppEvent, CycleOutcome};
use super::ports::{ActuatorPort, DisplayPort, EventSink, SensorPort, TelemetryPort};

/// Two fixed lines shown on the panel before the self-test runs.
pub const STARTUP_LINE0: &str = "Incubator";
pub const STARTUP_LINE1: &str = "self-test...";

pub struct ControlService {
    config: ControlConfig,
    /// Owned solely by this service; never accessed concurrently.
    relay_state: RelayState,
    cycle_count: u64,
}

impl ControlService {
    /// Construct the service.  The relay starts `Idle` and stays that way
    /// until the first successful reading decides otherwise.
    pub fn new(config: ControlConfig) -> Self {
        Self {
            config,
            relay_state: RelayState::Idle,
            cycle_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// One-time startup sequence: startup screen, then the relay/buzzer
    /// self-test.  Runs before the first sensor read is attempted.
    ///
    /// A display failure here is logged and ignored — the panel is a
    /// convenience.  An actuator failure aborts startup.
    pub fn startup(
        &mut self,
        hw: &mut impl ActuatorPort,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        if let Err(e) = display.show_startup(STARTUP_LINE0, STARTUP_LINE1) {
            warn!("startup screen failed: {e}");
        }

        info!("Testing relay ({} pulses)", self.config.self_test_pulses);
        hw.self_test(self.config.self_test_pulses)?;
        for i in 1..=self.config.self_test_pulses {
            sink.emit(&AppEvent::SelfTestPulse(i));
        }

        sink.emit(&AppEvent::Started);
        info!("ControlService started (target={:.1}C)", self.config.target_temperature_c);
        Ok(())
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full control cycle.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`] — this avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    ///
    /// Returns `Err` only for actuator failures; every recoverable error is
    /// contained here and folded into the [`CycleOutcome`].  The caller owns
    /// the end-of-cycle sleep.
    pub fn run_cycle(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        telemetry: &mut impl TelemetryPort,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) -> Result<CycleOutcome, Error> {
        self.cycle_count += 1;

        // 1. Acquire.  No data means no downstream steps at all: the relay
        //    and the panel freeze in their last known state until a read
        //    succeeds.
        let reading = match hw.acquire() {
            Ok(r) => r,
            Err(e) => {
                error!("Cannot read the humidity or the temperature: {e}");
                sink.emit(&AppEvent::CycleCompleted(CycleOutcome::SensorReadFailure));
                return Ok(CycleOutcome::SensorReadFailure);
            }
        };
        sink.emit(&AppEvent::ReadingTaken(reading));

        // 2. Decide.
        let next = threshold::decide(reading.temperature_c, self.config.target_temperature_c);
        let changed = threshold::transitioned(self.relay_state, next);

        // 3. Actuate.  Exactly one apply per cycle; errors are fatal.
        match next {
            RelayState::Heating => info!("Enabling the relay"),
            RelayState::Idle => info!("Disabling the relay"),
        }
        hw.apply(next)?;
        self.relay_state = next;
        sink.emit(&AppEvent::RelayApplied { state: next, changed });

        // 4. Report and display, independently — a failure in one must not
        //    affect the other, and neither touches the relay.
        let report_ok = match telemetry.submit(&reading, next) {
            Ok(()) => true,
            Err(e) => {
                warn!("telemetry submission failed: {e}");
                false
            }
        };

        debug!(
            "T={:.1} C H={:.1} %",
            reading.temperature_c, reading.humidity_pct
        );
        if let Err(e) = display.show(reading.temperature_c, reading.humidity_pct) {
            warn!("display refresh failed: {e}");
        }

        let outcome = if report_ok {
            CycleOutcome::Success
        } else {
            CycleOutcome::ReportFailure
        };
        sink.emit(&AppEvent::CycleCompleted(outcome));
        Ok(outcome)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current relay state as last applied.
    pub fn relay_state(&self) -> RelayState {
        self.relay_state
    }

    /// Total cycles executed since startup, including failed ones.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Fixed end-of-cycle sleep the caller must honour.
    pub fn sampling_period_secs(&self) -> u32 {
        self.config.sampling_period_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::reading::Reading;
    use crate::error::{ActuatorError, DisplayError, ReportError, SensorError};
    use chrono::Utc;

    struct ScriptedHw {
        readings: Vec<Result<Reading, SensorError>>,
        applied: Vec<RelayState>,
    }

    impl ScriptedHw {
        fn new(script: Vec<Result<f32, SensorError>>) -> Self {
            let readings = script
                .into_iter()
                .rev() // pop() consumes from the back
                .map(|r| r.map(|t| Reading::new(t, 55.0, Utc::now())))
                .collect();
            Self {
                readings,
                applied: Vec::new(),
            }
        }
    }

    impl SensorPort for ScriptedHw {
        fn acquire(&mut self) -> Result<Reading, SensorError> {
            self.readings.pop().expect("script exhausted")
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

    #[derive(Default)]
    struct MockTelemetry {
        submissions: Vec<(f32, f32)>,
        fail_report: bool,
    }

    impl TelemetryPort for MockTelemetry {
        fn submit(&mut self, reading: &Reading, _relay: RelayState) -> Result<(), ReportError> {
            if self.fail_report {
                return Err(ReportError::QueueFull);
            }
            self.submissions.push((reading.temperature_c, reading.humidity_pct));
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockDisplay {
        shown: Vec<(f32, f32)>,
    }

    impl DisplayPort for MockDisplay {
        fn show(&mut self, t: f32, h: f32) -> Result<(), DisplayError> {
            self.shown.push((t, h));
            Ok(())
        }
        fn show_startup(&mut self, _l0: &str, _l1: &str) -> Result<(), DisplayError> {
            Ok(())
        }
    }

    struct NullSink;
    impl EventSink for NullSink {
        fn emit(&mut self, _event: &crate::app::events::AppEvent) {}
    }

    fn service() -> ControlService {
        ControlService::new(ControlConfig::default())
    }

    #[test]
    fn sensor_failure_freezes_relay_and_skips_sinks() {
        let mut hw = ScriptedHw::new(vec![Err(SensorError::RetriesExhausted)]);
        let mut telemetry = MockTelemetry::default();
        let mut display = MockDisplay::default();
        let mut svc = service();

        let outcome = svc
            .run_cycle(&mut hw, &mut telemetry, &mut display, &mut NullSink)
            .unwrap();

        assert_eq!(outcome, CycleOutcome::SensorReadFailure);
        assert_eq!(svc.relay_state(), RelayState::Idle);
        assert!(hw.applied.is_empty(), "no relay change on sensor dropout");
        assert!(telemetry.submissions.is_empty());
        assert!(display.shown.is_empty());
    }

    #[test]
    fn report_failure_does_not_block_display_or_relay() {
        let mut hw = ScriptedHw::new(vec![Ok(37.0)]);
        let mut telemetry = MockTelemetry {
            fail_report: true,
            ..MockTelemetry::default()
        };
        let mut display = MockDisplay::default();
        let mut svc = service();

        let outcome = svc
            .run_cycle(&mut hw, &mut telemetry, &mut display, &mut NullSink)
            .unwrap();

        assert_eq!(outcome, CycleOutcome::ReportFailure);
        assert_eq!(hw.applied, vec![RelayState::Heating]);
        assert_eq!(display.shown.len(), 1, "display refreshed despite report failure");
    }

    #[test]
    fn one_apply_one_submission_per_successful_cycle() {
        let mut hw = ScriptedHw::new(vec![Ok(36.0)]);
        let mut telemetry = MockTelemetry::default();
        let mut display = MockDisplay::default();
        let mut svc = service();

        svc.run_cycle(&mut hw, &mut telemetry, &mut display, &mut NullSink)
            .unwrap();

        assert_eq!(hw.applied.len(), 1);
        assert_eq!(telemetry.submissions.len(), 1);
    }

    #[test]
    fn actuator_failure_is_fatal() {
        struct BrokenHw;
        impl SensorPort for BrokenHw {
            fn acquire(&mut self) -> Result<Reading, SensorError> {
                Ok(Reading::new(30.0, 50.0, Utc::now()))
            }
        }
        impl ActuatorPort for BrokenHw {
            fn apply(&mut self, _s: RelayState) -> Result<(), ActuatorError> {
                Err(ActuatorError::RelayWriteFailed)
            }
            fn self_test(&mut self, _p: u8) -> Result<(), ActuatorError> {
                Ok(())
            }
        }

        let mut telemetry = MockTelemetry::default();
        let mut display = MockDisplay::default();
        let mut svc = service();
        let err = svc
            .run_cycle(&mut BrokenHw, &mut telemetry, &mut display, &mut NullSink)
            .unwrap_err();
        assert_eq!(err, Error::Actuator(ActuatorError::RelayWriteFailed));
    }
}
