//! InfluxDB v2 telemetry adapter.
//!
//! Split in two halves connected by a bounded channel:
//!
//! - [`InfluxReporter`] implements [`TelemetryPort`].  `submit` renders one
//!   line-protocol record and `try_send`s it — it never blocks, so a slow
//!   or unreachable store cannot delay the control decision.
//! - A background writer thread drains the channel, batches up to
//!   [`BATCH_MAX`] lines per request and POSTs them to
//!   `/api/v2/write?org=..&bucket=..&precision=ns`, retrying a bounded
//!   number of times before dropping the batch.
//!
//! The HTTP transport sits behind [`WriteBackend`] so the writer loop is
//! testable on the host without a store.

use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, warn};

use crate::app::ports::TelemetryPort;
use crate::app::reading::Reading;
use crate::config::TelemetryConfig;
use crate::control::RelayState;
use crate::error::ReportError;

/// Records buffered between the loop and the writer.  When the store is
/// wedged long enough to fill this, further records are dropped (newest
/// first) rather than stalling the loop.
const QUEUE_CAPACITY: usize = 16;

/// Lines coalesced into one write request.
const BATCH_MAX: usize = 8;

const WRITE_ATTEMPTS: u32 = 3;
const RETRY_DELAY_MS: u64 = 1_000;

// ── Line protocol (pure) ──────────────────────────────────────

/// Escape a tag value per the line-protocol rules (comma, equals, space).
pub fn escape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | '=' | ' ') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape a measurement name (comma and space only).
pub fn escape_measurement(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, ',' | ' ') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render one record:
/// `<measurement>,location=<tag> temperature=<t>,humidity=<h> <ns-epoch>`
pub fn line_protocol(measurement: &str, location: &str, reading: &Reading) -> String {
    let ts_ns = reading.taken_at.timestamp_nanos_opt().unwrap_or_default();
    format!(
        "{},location={} temperature={},humidity={} {}",
        escape_measurement(measurement),
        escape_tag_value(location),
        reading.temperature_c,
        reading.humidity_pct,
        ts_ns,
    )
}

// ── Write backend ─────────────────────────────────────────────

/// One write request to the store.  `body` is newline-joined line protocol.
pub trait WriteBackend {
    fn write(&mut self, body: &str) -> Result<(), ReportError>;
}

/// HTTP POST to the InfluxDB v2 write endpoint over the ESP-IDF client.
#[cfg(target_os = "espidf")]
pub struct EspHttpBackend {
    url: String,
    auth: String,
}

#[cfg(target_os = "espidf")]
impl EspHttpBackend {
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            url: format!(
                "{}/api/v2/write?org={}&bucket={}&precision=ns",
                config.host, config.org, config.bucket
            ),
            auth: format!("Token {}", config.token),
        }
    }
}

#[cfg(target_os = "espidf")]
impl WriteBackend for EspHttpBackend {
    fn write(&mut self, body: &str) -> Result<(), ReportError> {
        use embedded_svc::http::client::Client;
        use embedded_svc::io::Write as _;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let connection = EspHttpConnection::new(&Configuration::default())
            .map_err(|_| ReportError::HttpFailed)?;
        let mut client = Client::wrap(connection);

        let content_length = body.len().to_string();
        let headers = [
            ("Authorization", self.auth.as_str()),
            ("Content-Type", "text/plain; charset=utf-8"),
            ("Content-Length", content_length.as_str()),
        ];
        let mut request = client
            .post(&self.url, &headers)
            .map_err(|_| ReportError::HttpFailed)?;
        request
            .write_all(body.as_bytes())
            .map_err(|_| ReportError::HttpFailed)?;
        let response = request.submit().map_err(|_| ReportError::HttpFailed)?;

        match response.status() {
            204 => Ok(()),
            code => Err(ReportError::BadStatus(code)),
        }
    }
}

// ── Writer thread ─────────────────────────────────────────────

fn write_with_retry(backend: &mut impl WriteBackend, body: &str, lines: usize) {
    for attempt in 1..=WRITE_ATTEMPTS {
        match backend.write(body) {
            Ok(()) => {
                debug!("telemetry: wrote {lines} line(s)");
                return;
            }
            Err(e) => {
                warn!("telemetry write attempt {attempt}/{WRITE_ATTEMPTS} failed: {e}");
                if attempt < WRITE_ATTEMPTS {
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS));
                }
            }
        }
    }
    warn!("telemetry: dropping batch of {lines} line(s)");
}

fn writer_loop(rx: Receiver<String>, mut backend: impl WriteBackend) {
    while let Ok(first) = rx.recv() {
        let mut body = first;
        let mut lines = 1;
        while lines < BATCH_MAX {
            match rx.try_recv() {
                Ok(line) => {
                    body.push('\n');
                    body.push_str(&line);
                    lines += 1;
                }
                Err(_) => break,
            }
        }
        write_with_retry(&mut backend, &body, lines);
    }
    debug!("telemetry writer: channel closed, exiting");
}

// ── Reporter ──────────────────────────────────────────────────

pub struct InfluxReporter {
    tx: SyncSender<String>,
    measurement: String,
    location: String,
}

impl InfluxReporter {
    /// Spawn the writer thread and return the non-blocking front half.
    ///
    /// Dropping the reporter closes the channel; the writer flushes what it
    /// holds and exits, which the returned handle can be joined on.
    pub fn start(
        config: &TelemetryConfig,
        backend: impl WriteBackend + Send + 'static,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = sync_channel(QUEUE_CAPACITY);
        let handle = std::thread::Builder::new()
            .name("influx-writer".into())
            .spawn(move || writer_loop(rx, backend))
            .expect("spawning the telemetry writer cannot fail at startup");
        (
            Self {
                tx,
                measurement: config.measurement.clone(),
                location: config.location.clone(),
            },
            handle,
        )
    }

    #[cfg(test)]
    fn with_channel(tx: SyncSender<String>, measurement: &str, location: &str) -> Self {
        Self {
            tx,
            measurement: measurement.to_string(),
            location: location.to_string(),
        }
    }
}

impl TelemetryPort for InfluxReporter {
    /// Withholds the record until the wall clock is SNTP-synced — a
    /// near-epoch timestamp would land the point decades out of range.
    fn submit(&mut self, reading: &Reading, relay: RelayState) -> Result<(), ReportError> {
        if !crate::adapters::time::is_synced(reading.taken_at) {
            return Err(ReportError::ClockNotSynced);
        }
        let line = line_protocol(&self.measurement, &self.location, reading);
        debug!("telemetry enqueue (relay {relay:?}): {line}");
        self.tx.try_send(line).map_err(|e| match e {
            TrySendError::Full(_) => ReportError::QueueFull,
            TrySendError::Disconnected(_) => ReportError::WriterGone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MemoryBackend {
        bodies: Arc<Mutex<Vec<String>>>,
    }

    impl WriteBackend for MemoryBackend {
        fn write(&mut self, body: &str) -> Result<(), ReportError> {
            self.bodies.lock().unwrap().push(body.to_string());
            Ok(())
        }
    }

    fn reading() -> Reading {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Reading::new(37.7, 55.2, at)
    }

    #[test]
    fn renders_line_protocol() {
        let line = line_protocol("incubator_readings", "incubator", &reading());
        assert_eq!(
            line,
            "incubator_readings,location=incubator temperature=37.7,humidity=55.2 1709294400000000000"
        );
    }

    #[test]
    fn escapes_tag_values() {
        assert_eq!(escape_tag_value("barn 2,east=1"), "barn\\ 2\\,east\\=1");
        assert_eq!(escape_measurement("my readings"), "my\\ readings");
    }

    #[test]
    fn submitted_lines_reach_the_backend() {
        let backend = MemoryBackend::default();
        let bodies = backend.bodies.clone();
        let config = TelemetryConfig {
            host: "http://influx.lan:8086".into(),
            org: "farm".into(),
            token: "t0k3n".into(),
            bucket: "env".into(),
            measurement: "incubator_readings".into(),
            location: "incubator".into(),
        };
        let (mut reporter, handle) = InfluxReporter::start(&config, backend);
        reporter.submit(&reading(), RelayState::Heating).unwrap();
        drop(reporter); // close the channel so the writer flushes and exits
        handle.join().unwrap();

        let bodies = bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].starts_with("incubator_readings,location=incubator "));
    }

    #[test]
    fn withholds_records_until_clock_sync() {
        let (tx, rx) = sync_channel(4);
        let mut reporter = InfluxReporter::with_channel(tx, "m", "loc");
        let boot = Utc.timestamp_opt(42, 0).unwrap(); // pre-SNTP boot time
        let r = Reading::new(37.7, 55.0, boot);
        assert_eq!(
            reporter.submit(&r, RelayState::Heating),
            Err(ReportError::ClockNotSynced)
        );
        assert!(rx.try_recv().is_err(), "nothing may reach the writer");
    }

    #[test]
    fn full_queue_reports_and_drops() {
        // Capacity-1 channel with no writer draining it.
        let (tx, _rx) = sync_channel(1);
        let mut reporter = InfluxReporter::with_channel(tx, "m", "loc");
        assert!(reporter.submit(&reading(), RelayState::Idle).is_ok());
        assert_eq!(
            reporter.submit(&reading(), RelayState::Idle),
            Err(ReportError::QueueFull)
        );
    }

    #[test]
    fn dead_writer_reports_writer_gone() {
        let (tx, rx) = sync_channel(4);
        drop(rx);
        let mut reporter = InfluxReporter::with_channel(tx, "m", "loc");
        assert_eq!(
            reporter.submit(&reading(), RelayState::Idle),
            Err(ReportError::WriterGone)
        );
    }
}
