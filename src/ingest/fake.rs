//! In-memory `FieldSource` for tests and offline runs.

use crate::ingest::FieldSource;
use crate::model::{FieldAddress, TelemetryError};
use std::collections::HashMap;
use std::sync::Mutex;

/// Answers each (channel, field) with a canned result and records every
/// request it receives. Unconfigured fields read as missing.
#[derive(Debug, Default)]
pub struct FakeFieldSource {
    answers: HashMap<(String, u32), Result<f64, TelemetryError>>,
    requests: Mutex<Vec<FieldAddress>>,
}

impl FakeFieldSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, channel_id: &str, field: u32, value: f64) -> Self {
        self.answers.insert((channel_id.to_string(), field), Ok(value));
        self
    }

    pub fn with_error(mut self, channel_id: &str, field: u32, err: TelemetryError) -> Self {
        self.answers.insert((channel_id.to_string(), field), Err(err));
        self
    }

    /// Every address read so far, in completion order.
    pub fn requests(&self) -> Vec<FieldAddress> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl FieldSource for FakeFieldSource {
    fn read_field(&self, address: &FieldAddress) -> Result<f64, TelemetryError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(address.clone());

        self.answers
            .get(&(address.channel_id.clone(), address.field))
            .cloned()
            .unwrap_or_else(|| Err(TelemetryError::MissingField(format!("field{}", address.field))))
    }
}
