//! PM2.5 concentration → air-quality category.
//!
//! Breakpoints and index ranges follow the US EPA PM2.5 AQI table. Within
//! each band the index is linear from the previous breakpoint to the band's
//! own breakpoint, which keeps the score continuous across bands.

use super::{Band, BandStyle, from_band, locate, lower_bound, no_data};
use crate::model::CategoryResult;

/// Index range a band maps its concentration range onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexSpan {
    /// Concentration at which `index_hi` is reached. Equal to the band's
    /// upper bound except for the open-ended band.
    pub concentration_hi: f64,
    pub index_lo: f64,
    pub index_hi: f64,
}

/// Score at which the gauge is drawn full.
pub const GAUGE_FULL_SCORE: f64 = 300.0;

pub const PM25_BANDS: &[Band<IndexSpan>] = &[
    Band {
        upper: 12.0,
        style: BandStyle {
            status: "Good",
            status_localized: "ดีมาก",
            color: "#10b981",
            glow: "rgba(16, 185, 129, 0.25)",
        },
        extra: IndexSpan { concentration_hi: 12.0, index_lo: 0.0, index_hi: 50.0 },
    },
    Band {
        upper: 35.4,
        style: BandStyle {
            status: "Moderate",
            status_localized: "ปานกลาง",
            color: "#f59e0b",
            glow: "rgba(245, 158, 11, 0.25)",
        },
        extra: IndexSpan { concentration_hi: 35.4, index_lo: 50.0, index_hi: 100.0 },
    },
    Band {
        upper: 55.4,
        style: BandStyle {
            status: "Unhealthy for Sensitive",
            status_localized: "มีผลต่อกลุ่มเสี่ยง",
            color: "#f97316",
            glow: "rgba(249, 115, 22, 0.25)",
        },
        extra: IndexSpan { concentration_hi: 55.4, index_lo: 100.0, index_hi: 150.0 },
    },
    Band {
        upper: 150.4,
        style: BandStyle {
            status: "Unhealthy",
            status_localized: "ไม่ดีต่อสุขภาพ",
            color: "#ef4444",
            glow: "rgba(239, 68, 68, 0.25)",
        },
        extra: IndexSpan { concentration_hi: 150.4, index_lo: 150.0, index_hi: 200.0 },
    },
    Band {
        upper: 250.4,
        style: BandStyle {
            status: "Very Unhealthy",
            status_localized: "อันตราย",
            color: "#8b5cf6",
            glow: "rgba(139, 92, 246, 0.25)",
        },
        extra: IndexSpan { concentration_hi: 250.4, index_lo: 200.0, index_hi: 300.0 },
    },
    Band {
        upper: f64::INFINITY,
        style: BandStyle {
            status: "Hazardous",
            status_localized: "อันตรายมาก",
            color: "#dc2626",
            glow: "rgba(220, 38, 38, 0.25)",
        },
        // Extrapolated past 500.4; the index keeps growing.
        extra: IndexSpan { concentration_hi: 500.4, index_lo: 300.0, index_hi: 500.0 },
    },
];

/// Classifies a PM2.5 concentration in μg/m³.
///
/// `None` and NaN give the no-data sentinel. Negative concentrations are
/// treated as zero.
pub fn classify_pm25(value: Option<f64>) -> CategoryResult {
    let Some(value) = value.filter(|v| !v.is_nan()) else {
        return no_data("No Data", "ไม่มีข้อมูล");
    };
    let value = value.max(0.0);

    let Some((severity, band)) = locate(PM25_BANDS, value) else {
        return no_data("No Data", "ไม่มีข้อมูล");
    };

    let score = index_for(value, severity, &band.extra);
    from_band(severity, &band.style, score, gauge_level(score))
}

fn index_for(value: f64, severity: u8, span: &IndexSpan) -> f64 {
    let c_lo = lower_bound(PM25_BANDS, severity as usize - 1);
    let fraction = (value - c_lo) / (span.concentration_hi - c_lo);
    span.index_lo + (span.index_hi - span.index_lo) * fraction
}

/// Gauge fill for an index score: saturates at `GAUGE_FULL_SCORE`.
pub fn gauge_level(score: f64) -> f64 {
    (score / GAUGE_FULL_SCORE * 100.0).clamp(0.0, 100.0)
}

/// The whole-number AQI shown on the card, or `None` for no data.
pub fn aqi(category: &CategoryResult) -> Option<u32> {
    if category.is_no_data() {
        None
    } else {
        Some(category.score.round() as u32)
    }
}
