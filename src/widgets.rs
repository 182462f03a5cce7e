//! Render-ready card view models.
//!
//! Pure functions from a district's last known value to everything a
//! presentation layer needs to draw its air-quality and temperature cards.
//! Nothing here knows about terminals, DOMs or any other UI toolkit.

use crate::classify::particulate::aqi;
use crate::classify::{classify_pm25, classify_temp};
use crate::model::CategoryResult;

/// Shown in place of any value that is not available.
pub const PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, PartialEq)]
pub struct AqiCardView {
    pub district: String,
    pub pm25_text: String,
    pub aqi_text: String,
    pub category: CategoryResult,
    pub aria_valuenow: u32,
    pub aria_valuetext: String,
}

impl AqiCardView {
    pub fn new(district: &str, pm25: Option<f64>) -> Self {
        let category = classify_pm25(pm25);
        let index = aqi(&category);
        AqiCardView {
            district: district.to_string(),
            pm25_text: format_value(pm25),
            aqi_text: index.map(|i| i.to_string()).unwrap_or_else(|| PLACEHOLDER.to_string()),
            aria_valuenow: index.unwrap_or(0),
            aria_valuetext: format!(
                "{}, AQI {}",
                category.status_localized,
                index.unwrap_or(0)
            ),
            category,
        }
    }

    pub fn gauge_percent(&self) -> f64 {
        self.category.level
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TempCardView {
    pub district: String,
    pub temp_text: String,
    pub category: CategoryResult,
    pub aria_valuenow: f64,
    pub aria_valuetext: String,
}

impl TempCardView {
    pub fn new(district: &str, temp: Option<f64>) -> Self {
        let category = classify_temp(temp);
        let temp_text = format_value(temp);
        TempCardView {
            district: district.to_string(),
            aria_valuenow: temp.filter(|t| !t.is_nan()).unwrap_or(0.0),
            aria_valuetext: format!("{}°C - {}", temp_text, category.status_localized),
            temp_text,
            category,
        }
    }

    pub fn fill_percent(&self) -> f64 {
        self.category.level
    }
}

/// One decimal place, or the placeholder.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{:.1}", v),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Text gauge such as `[######----]` for a percentage in [0, 100].
pub fn gauge_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
