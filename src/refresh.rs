//! One refresh cycle: fetch every district in parallel, then push whatever
//! arrived onto the display board.

use crate::dashboard::DisplayBoard;
use crate::ingest::{FieldSource, TelemetryClient};
use crate::logging::{self, DataSource};
use crate::model::Reading;
use std::thread;

/// What a cycle did, for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub requested: usize,
    pub readings: usize,
    pub pm25_updates: usize,
    pub temp_updates: usize,
    /// Quantities that came back empty in readings that did arrive.
    pub missing_values: usize,
}

/// Fetches all districts concurrently and waits for every one to settle.
///
/// Unknown districts produce no reading. A district whose worker panics is
/// logged and dropped; the others are unaffected.
pub fn fetch_all<S: FieldSource>(client: &TelemetryClient<S>, district_ids: &[String]) -> Vec<Reading> {
    thread::scope(|scope| {
        let workers: Vec<_> = district_ids
            .iter()
            .map(|id| (id, scope.spawn(move || client.fetch(id))))
            .collect();

        workers
            .into_iter()
            .filter_map(|(id, worker)| match worker.join() {
                Ok(reading) => reading,
                Err(_) => {
                    logging::error(DataSource::System, Some(id), "district fetch panicked");
                    None
                }
            })
            .collect()
    })
}

/// Pushes each reading's present values onto the board.
///
/// Absent values leave the corresponding target untouched, so the board
/// keeps showing the last good value.
pub fn apply_readings<B: DisplayBoard + ?Sized>(readings: &[Reading], board: &mut B) -> CycleSummary {
    let mut summary = CycleSummary {
        readings: readings.len(),
        ..CycleSummary::default()
    };

    for reading in readings {
        match reading.pm25 {
            Some(value) => {
                board.set_pm25(&reading.district, value);
                summary.pm25_updates += 1;
            }
            None => summary.missing_values += 1,
        }
        match reading.temp {
            Some(value) => {
                board.set_temp(&reading.district, value);
                summary.temp_updates += 1;
            }
            None => summary.missing_values += 1,
        }
    }

    summary
}

/// Applies a cycle's readings, marks the cycle finished and logs a summary.
pub fn complete_cycle<B: DisplayBoard + ?Sized>(
    requested: usize,
    readings: &[Reading],
    board: &mut B,
) -> CycleSummary {
    let summary = CycleSummary {
        requested,
        ..apply_readings(readings, board)
    };
    board.cycle_finished();
    logging::log_cycle_summary(&summary);
    summary
}

/// Runs one full refresh cycle against `board`.
pub fn run_cycle<S, B>(client: &TelemetryClient<S>, district_ids: &[String], board: &mut B) -> CycleSummary
where
    S: FieldSource,
    B: DisplayBoard + ?Sized,
{
    let readings = fetch_all(client, district_ids);
    complete_cycle(district_ids.len(), &readings, board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::model::{FieldAddress, TelemetryError};
    use chrono::Utc;

    #[derive(Default)]
    struct RecordingBoard {
        writes: Vec<(String, &'static str, f64)>,
        finished: usize,
    }

    impl DisplayBoard for RecordingBoard {
        fn set_pm25(&mut self, district: &str, value: f64) {
            self.writes.push((district.to_string(), "pm25", value));
        }
        fn set_temp(&mut self, district: &str, value: f64) {
            self.writes.push((district.to_string(), "temp", value));
        }
        fn cycle_finished(&mut self) {
            self.finished += 1;
        }
    }

    fn reading(district: &str, pm25: Option<f64>, temp: Option<f64>) -> Reading {
        Reading {
            district: district.to_string(),
            pm25,
            temp,
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_skips_absent_values() {
        let mut board = RecordingBoard::default();
        let summary = apply_readings(
            &[reading("klong", Some(10.0), None), reading("thon", None, Some(30.0))],
            &mut board,
        );
        assert_eq!(
            board.writes,
            [
                ("klong".to_string(), "pm25", 10.0),
                ("thon".to_string(), "temp", 30.0)
            ]
        );
        assert_eq!(summary.pm25_updates, 1);
        assert_eq!(summary.temp_updates, 1);
        assert_eq!(summary.missing_values, 2);
    }

    #[test]
    fn test_complete_cycle_signals_board_once() {
        let mut board = RecordingBoard::default();
        let summary = complete_cycle(3, &[reading("bang", Some(1.0), Some(2.0))], &mut board);
        assert_eq!(board.finished, 1);
        assert_eq!(summary.requested, 3);
        assert_eq!(summary.readings, 1);
    }

    #[test]
    fn test_empty_cycle_still_finishes() {
        let mut board = RecordingBoard::default();
        let summary = complete_cycle(0, &[], &mut board);
        assert_eq!(summary, CycleSummary::default());
        assert_eq!(board.finished, 1);
    }

    /// Panics for every read on one channel.
    struct PanicsOnChannel(&'static str);

    impl FieldSource for PanicsOnChannel {
        fn read_field(&self, address: &FieldAddress) -> Result<f64, TelemetryError> {
            if address.channel_id == self.0 {
                panic!("channel {} reader crashed", address.channel_id);
            }
            Ok(10.0 * address.field as f64)
        }
    }

    #[test]
    fn test_fetch_all_survives_a_panicking_district() {
        let registry = DashboardConfig::reference()
            .and_then(|c| c.registry())
            .expect("reference registry should be valid");
        let ids = registry.ids();
        // thon's channel.
        let client = TelemetryClient::new(registry, PanicsOnChannel("3192372"));

        let readings = fetch_all(&client, &ids);

        let klong = readings.iter().find(|r| r.district == "klong").expect("klong reading");
        assert_eq!((klong.pm25, klong.temp), (Some(10.0), Some(40.0)));
        let bang = readings.iter().find(|r| r.district == "bang").expect("bang reading");
        assert_eq!((bang.pm25, bang.temp), (Some(10.0), Some(20.0)));
        if let Some(thon) = readings.iter().find(|r| r.district == "thon") {
            assert_eq!((thon.pm25, thon.temp), (None, None));
        }
    }

    #[test]
    fn test_cycle_with_panicking_district_still_finishes() {
        let registry = DashboardConfig::reference()
            .and_then(|c| c.registry())
            .expect("reference registry should be valid");
        let ids = registry.ids();
        let client = TelemetryClient::new(registry, PanicsOnChannel("3192372"));
        let mut board = RecordingBoard::default();

        let summary = run_cycle(&client, &ids, &mut board);

        assert_eq!(board.finished, 1);
        assert_eq!(summary.pm25_updates, 2);
        assert_eq!(summary.temp_updates, 2);
        assert!(board.writes.iter().all(|(district, _, _)| district != "thon"));
    }
}
