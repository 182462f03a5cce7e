/// End-to-end refresh cycle tests
///
/// Tests verify, against in-memory telemetry sources:
/// 1. A cycle classifies and pushes each district's values exactly once
/// 2. A failed quantity leaves its display target untouched
/// 3. Unknown districts are a no-op
/// 4. Districts are fetched in parallel, not one after another
///
/// Run with: cargo test --test refresh_cycle

use aqmon_service::classify::{classify_pm25, classify_temp};
use aqmon_service::config::DashboardConfig;
use aqmon_service::dashboard::{Dashboard, DisplayBoard};
use aqmon_service::districts::DistrictRegistry;
use aqmon_service::ingest::fake::FakeFieldSource;
use aqmon_service::ingest::{FieldSource, TelemetryClient};
use aqmon_service::model::{FieldAddress, TelemetryError};
use aqmon_service::refresh::run_cycle;

use std::collections::HashMap;
use std::thread;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Records every write so tests can count updates per target.
#[derive(Default)]
struct CountingBoard {
    pm25: HashMap<String, Vec<f64>>,
    temp: HashMap<String, Vec<f64>>,
    cycles: usize,
}

impl CountingBoard {
    fn pm25_writes(&self, district: &str) -> &[f64] {
        self.pm25.get(district).map(Vec::as_slice).unwrap_or(&[])
    }

    fn temp_writes(&self, district: &str) -> &[f64] {
        self.temp.get(district).map(Vec::as_slice).unwrap_or(&[])
    }

    fn total_writes(&self) -> usize {
        self.pm25.values().chain(self.temp.values()).map(Vec::len).sum()
    }
}

impl DisplayBoard for CountingBoard {
    fn set_pm25(&mut self, district: &str, value: f64) {
        self.pm25.entry(district.to_string()).or_default().push(value);
    }

    fn set_temp(&mut self, district: &str, value: f64) {
        self.temp.entry(district.to_string()).or_default().push(value);
    }

    fn cycle_finished(&mut self) {
        self.cycles += 1;
    }
}

fn reference_registry() -> DistrictRegistry {
    DashboardConfig::reference()
        .and_then(|c| c.registry())
        .expect("reference registry should be valid")
}

/// Healthy answers for every reference district.
fn healthy_source() -> FakeFieldSource {
    FakeFieldSource::new()
        .with_value("3027679", 1, 9.5) // klong pm25
        .with_value("3027679", 4, 22.0) // klong temp
        .with_value("3192372", 1, 18.0) // thon pm25
        .with_value("3192372", 2, 31.0) // thon temp
        .with_value("3192391", 1, 40.0) // bang pm25
        .with_value("3192391", 2, 28.0) // bang temp
}

// ---------------------------------------------------------------------------
// Classification through a full cycle
// ---------------------------------------------------------------------------

#[test]
fn test_bang_cycle_classifies_and_updates_each_target_once() {
    let client = TelemetryClient::new(reference_registry(), healthy_source());
    let ids = client.registry().ids();
    let mut board = CountingBoard::default();

    let summary = run_cycle(&client, &ids, &mut board);

    assert_eq!(board.pm25_writes("bang"), [40.0]);
    assert_eq!(board.temp_writes("bang"), [28.0]);
    assert_eq!(board.cycles, 1);
    assert_eq!(summary.requested, 3);
    assert_eq!(summary.readings, 3);
    assert_eq!(summary.missing_values, 0);

    let pm = classify_pm25(Some(board.pm25_writes("bang")[0]));
    assert_eq!(pm.status, "Unhealthy for Sensitive");
    assert!(pm.score > 100.0 && pm.score <= 150.0, "AQI score {}", pm.score);

    let temp = classify_temp(Some(board.temp_writes("bang")[0]));
    assert_eq!(temp.status_localized, "ปกติ");
    assert_eq!(temp.color, "#10b981");
}

// ---------------------------------------------------------------------------
// Partial failure
// ---------------------------------------------------------------------------

#[test]
fn test_thon_particulate_timeout_leaves_stale_value_in_place() {
    let source = healthy_source().with_error("3192372", 1, TelemetryError::Timeout);
    let client = TelemetryClient::new(reference_registry(), source);
    let ids = client.registry().ids();

    // Previous cycle left a value on thon's particulate card.
    let mut board = Dashboard::new(&ids);
    board.set_pm25("thon", 77.0);

    let summary = run_cycle(&client, &ids, &mut board);

    let thon = board.panel("thon").unwrap();
    assert_eq!(thon.pm25, Some(77.0), "stale value should persist, not be blanked");
    assert_eq!(thon.temp, Some(31.0));

    let klong = board.panel("klong").unwrap();
    assert_eq!((klong.pm25, klong.temp), (Some(9.5), Some(22.0)));
    let bang = board.panel("bang").unwrap();
    assert_eq!((bang.pm25, bang.temp), (Some(40.0), Some(28.0)));

    assert_eq!(summary.pm25_updates, 2);
    assert_eq!(summary.temp_updates, 3);
    assert_eq!(summary.missing_values, 1);
    assert!(!board.is_loading());
}

#[test]
fn test_thon_particulate_timeout_is_never_written() {
    let source = healthy_source().with_error("3192372", 1, TelemetryError::Timeout);
    let client = TelemetryClient::new(reference_registry(), source);
    let ids = client.registry().ids();
    let mut board = CountingBoard::default();

    run_cycle(&client, &ids, &mut board);

    assert!(board.pm25_writes("thon").is_empty());
    assert_eq!(board.temp_writes("thon"), [31.0]);
    assert_eq!(board.total_writes(), 5);
}

#[test]
fn test_total_outage_still_finishes_cycle() {
    let client = TelemetryClient::new(reference_registry(), FakeFieldSource::new());
    let ids = client.registry().ids();
    let mut board = CountingBoard::default();

    let summary = run_cycle(&client, &ids, &mut board);

    assert_eq!(board.total_writes(), 0);
    assert_eq!(board.cycles, 1);
    assert_eq!(summary.readings, 3);
    assert_eq!(summary.missing_values, 6);
}

// ---------------------------------------------------------------------------
// Unknown districts
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_district_touches_nothing() {
    let client = TelemetryClient::new(reference_registry(), healthy_source());
    let mut board = CountingBoard::default();

    let summary = run_cycle(&client, &["nowhere".to_string()], &mut board);

    assert_eq!(board.total_writes(), 0);
    assert_eq!(summary.readings, 0);
    assert!(client.source().requests().is_empty(), "no request should be made");
}

#[test]
fn test_unknown_district_mixed_with_known_ones() {
    let client = TelemetryClient::new(reference_registry(), healthy_source());
    let ids = vec!["klong".to_string(), "nowhere".to_string()];
    let mut board = CountingBoard::default();

    let summary = run_cycle(&client, &ids, &mut board);

    assert_eq!(board.pm25_writes("klong"), [9.5]);
    assert!(board.pm25_writes("nowhere").is_empty());
    assert_eq!(summary.requested, 2);
    assert_eq!(summary.readings, 1);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

/// Every read takes `delay`, then answers with the field index.
struct SlowSource {
    delay: Duration,
}

impl FieldSource for SlowSource {
    fn read_field(&self, address: &FieldAddress) -> Result<f64, TelemetryError> {
        thread::sleep(self.delay);
        Ok(address.field as f64)
    }
}

#[test]
fn test_districts_and_quantities_are_fetched_concurrently() {
    let delay = Duration::from_millis(300);
    let client = TelemetryClient::new(reference_registry(), SlowSource { delay });
    let ids = client.registry().ids();
    let mut board = CountingBoard::default();

    let started = Instant::now();
    run_cycle(&client, &ids, &mut board);
    let elapsed = started.elapsed();

    // Six reads one after another would take 1.8s.
    assert!(
        elapsed < delay * 4,
        "cycle took {:?}, reads do not appear to overlap",
        elapsed
    );
    assert_eq!(board.total_writes(), 6);
}
