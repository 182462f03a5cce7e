//! Telemetry ingestion.
//!
//! Submodules:
//! - `thingspeak`: URL construction, response parsing and the HTTP source.
//! - `client`: per-district fetch combining both quantity reads.
//! - `fake`: in-memory source with canned answers.

pub mod client;
pub mod fake;
pub mod thingspeak;

pub use client::TelemetryClient;

use crate::model::{FieldAddress, TelemetryError};

/// A place single field values can be read from.
///
/// Implementations must bound each read in time themselves; callers never
/// retry.
pub trait FieldSource: Send + Sync {
    fn read_field(&self, address: &FieldAddress) -> Result<f64, TelemetryError>;
}

impl<T: FieldSource + ?Sized> FieldSource for std::sync::Arc<T> {
    fn read_field(&self, address: &FieldAddress) -> Result<f64, TelemetryError> {
        (**self).read_field(address)
    }
}
