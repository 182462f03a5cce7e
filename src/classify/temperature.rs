//! Air temperature → comfort category.
//!
//! Flat bands: each band carries only a label and colors. There is no index
//! score; the gauge shows the raw reading across a fixed 0–50 °C scale.

use super::{Band, BandStyle, from_band, locate, no_data};
use crate::model::CategoryResult;

/// Gauge scale, in °C.
pub const GAUGE_MIN_C: f64 = 0.0;
pub const GAUGE_MAX_C: f64 = 50.0;

pub const TEMP_BANDS: &[Band<()>] = &[
    Band {
        upper: 20.0,
        style: BandStyle {
            status: "Cool",
            status_localized: "เย็น",
            color: "#06b6d4",
            glow: "rgba(6, 182, 212, 0.25)",
        },
        extra: (),
    },
    Band {
        upper: 25.0,
        style: BandStyle {
            status: "Comfortable",
            status_localized: "สบาย",
            color: "#3b82f6",
            glow: "rgba(59, 130, 246, 0.25)",
        },
        extra: (),
    },
    Band {
        upper: 30.0,
        style: BandStyle {
            status: "Normal",
            status_localized: "ปกติ",
            color: "#10b981",
            glow: "rgba(16, 185, 129, 0.25)",
        },
        extra: (),
    },
    Band {
        upper: 35.0,
        style: BandStyle {
            status: "Warm",
            status_localized: "อุ่น",
            color: "#f59e0b",
            glow: "rgba(245, 158, 11, 0.25)",
        },
        extra: (),
    },
    Band {
        upper: f64::INFINITY,
        style: BandStyle {
            status: "Hot",
            status_localized: "ร้อน",
            color: "#ef4444",
            glow: "rgba(239, 68, 68, 0.25)",
        },
        extra: (),
    },
];

/// Classifies a temperature in °C. `None` and NaN give the no-data sentinel.
pub fn classify_temp(value: Option<f64>) -> CategoryResult {
    let Some(value) = value.filter(|v| !v.is_nan()) else {
        return no_data("No Data", "--");
    };
    match locate(TEMP_BANDS, value) {
        Some((severity, band)) => from_band(severity, &band.style, 0.0, fill_percentage(value)),
        None => no_data("No Data", "--"),
    }
}

/// Thermometer fill for a reading, clamped to [0, 100].
pub fn fill_percentage(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    ((value - GAUGE_MIN_C) / (GAUGE_MAX_C - GAUGE_MIN_C) * 100.0).clamp(0.0, 100.0)
}
