//! Value classification.
//!
//! Maps a single numeric reading onto an ordered table of bands. Each band
//! covers values up to and including its `upper` bound; the last band is
//! open-ended. Both classifiers share the lookup and differ only in their
//! tables and in how they derive score and gauge level.

pub mod particulate;
pub mod temperature;

pub use particulate::classify_pm25;
pub use temperature::classify_temp;

use crate::model::CategoryResult;

/// Display attributes shared by every band of every table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandStyle {
    pub status: &'static str,
    pub status_localized: &'static str,
    pub color: &'static str,
    pub glow: &'static str,
}

/// One entry of a threshold table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band<T> {
    /// Inclusive upper bound; `f64::INFINITY` for the open-ended band.
    pub upper: f64,
    pub style: BandStyle,
    pub extra: T,
}

/// Style for readings that are absent or not a number.
pub const NO_DATA_COLOR: &str = "#94a3b8";
pub const NO_DATA_GLOW: &str = "rgba(148, 163, 184, 0.2)";

/// Finds the band containing `value`, returning its 1-based severity.
///
/// The first band whose upper bound is >= `value` wins, so a value exactly
/// on a breakpoint belongs to the lower band.
pub fn locate<T>(table: &[Band<T>], value: f64) -> Option<(u8, &Band<T>)> {
    table
        .iter()
        .enumerate()
        .find(|(_, band)| value <= band.upper)
        .map(|(i, band)| ((i + 1) as u8, band))
}

/// Lower bound of the band at `index` (the previous band's upper bound).
fn lower_bound<T>(table: &[Band<T>], index: usize) -> f64 {
    if index == 0 { 0.0 } else { table[index - 1].upper }
}

fn no_data(status: &'static str, status_localized: &'static str) -> CategoryResult {
    CategoryResult {
        severity: 0,
        score: 0.0,
        status,
        status_localized,
        color: NO_DATA_COLOR,
        glow: NO_DATA_GLOW,
        level: 0.0,
    }
}

fn from_band(severity: u8, style: &BandStyle, score: f64, level: f64) -> CategoryResult {
    CategoryResult {
        severity,
        score,
        status: style.status,
        status_localized: style.status_localized,
        color: style.color,
        glow: style.glow,
        level,
    }
}
