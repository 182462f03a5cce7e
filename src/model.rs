/// Core data types for the district air-quality monitor.
///
/// This module defines the shared domain model imported by all other modules:
/// district addressing, readings, classifier output and the telemetry error
/// type. It contains no I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Quantities
// ---------------------------------------------------------------------------

/// The two quantities measured in every district.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    /// Fine particulate matter (PM2.5), in μg/m³.
    Particulate,
    /// Air temperature, in °C.
    Temperature,
}

impl Quantity {
    /// Name of the display attribute this quantity drives.
    pub fn attribute(&self) -> &'static str {
        match self {
            Quantity::Particulate => "pm25",
            Quantity::Temperature => "temp",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute())
    }
}

// ---------------------------------------------------------------------------
// District configuration
// ---------------------------------------------------------------------------

/// Location of one quantity on the telemetry API: a channel, the read key
/// for that channel, and the field index within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAddress {
    pub channel_id: String,
    pub api_key: String,
    /// 1-based field index (`field1` .. `field8`).
    pub field: u32,
}

/// Everything needed to fetch both quantities for a district.
///
/// Channel id and key may be identical for both quantities when a single
/// sensor box reports both on different fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictConfig {
    pub id: String,
    pub particulate: FieldAddress,
    pub temperature: FieldAddress,
}

impl DistrictConfig {
    pub fn address(&self, quantity: Quantity) -> &FieldAddress {
        match quantity {
            Quantity::Particulate => &self.particulate,
            Quantity::Temperature => &self.temperature,
        }
    }
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// The result of one refresh of one district.
///
/// Either value may be `None` if that quantity's read failed this cycle;
/// that is not an error for the cycle as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub district: String,
    pub pm25: Option<f64>,
    pub temp: Option<f64>,
    /// Taken once both reads have settled.
    pub captured_at: DateTime<Utc>,
}

impl Reading {
    pub fn value(&self, quantity: Quantity) -> Option<f64> {
        match quantity {
            Quantity::Particulate => self.pm25,
            Quantity::Temperature => self.temp,
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier output
// ---------------------------------------------------------------------------

/// Render-ready category for a single numeric reading.
///
/// `severity` 0 is the no-data sentinel; higher is worse. `level` is the
/// gauge fill in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryResult {
    pub severity: u8,
    /// Index value for scales that have one (AQI); zero otherwise.
    pub score: f64,
    pub status: &'static str,
    pub status_localized: &'static str,
    pub color: &'static str,
    pub glow: &'static str,
    pub level: f64,
}

impl CategoryResult {
    pub fn is_no_data(&self) -> bool {
        self.severity == 0
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when reading a single field from the telemetry API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TelemetryError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// Non-2xx HTTP response.
    #[error("HTTP error: {0}")]
    HttpStatus(u16),
    /// Connection, DNS or body transfer failure.
    #[error("network error: {0}")]
    Network(String),
    /// The body was not a JSON object.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The expected `fieldN` key was absent or null.
    #[error("missing {0} in response")]
    MissingField(String),
    /// The field was present but did not hold a finite number.
    #[error("non-numeric value for {field}: {raw}")]
    NonNumeric { field: String, raw: String },
}
