/// ThingSpeak channel/field API client
///
/// Reads the most recent entry of a single channel field:
///
///   GET {host}/channels/{channel}/fields/{field}/last.json?api_key={key}
///
/// The body is a small JSON object carrying the value under `field{N}`,
/// usually as a string, e.g.
///
///   {"created_at":"2025-01-10T07:41:22Z","entry_id":8812,"field1":"35.20"}
///
/// API Documentation: https://www.mathworks.com/help/thingspeak/readlastfieldentry.html

use crate::ingest::FieldSource;
use crate::model::{FieldAddress, TelemetryError};
use serde_json::Value;
use std::time::Duration;

pub const THINGSPEAK_BASE_URL: &str = "https://api.thingspeak.com";

// ============================================================================
// URL construction
// ============================================================================

/// Builds the last-entry URL for one field.
pub fn build_field_url(host: &str, address: &FieldAddress) -> String {
    format!(
        "{}/channels/{}/fields/{}/last.json?api_key={}",
        host.trim_end_matches('/'),
        address.channel_id,
        address.field,
        address.api_key
    )
}

// ============================================================================
// Response parsing
// ============================================================================

/// Extracts `field{N}` from a last-entry response body.
///
/// The value may be a JSON string (the API's normal encoding) or a number.
/// Null, missing, unparseable and non-finite values are all failures.
pub fn parse_last_field(body: &str, field: u32) -> Result<f64, TelemetryError> {
    let json: Value =
        serde_json::from_str(body).map_err(|e| TelemetryError::Malformed(e.to_string()))?;

    let object = json
        .as_object()
        .ok_or_else(|| TelemetryError::Malformed(format!("expected a JSON object, got {}", json)))?;

    let key = format!("field{}", field);
    let parsed = match object.get(&key) {
        None | Some(Value::Null) => return Err(TelemetryError::MissingField(key)),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(TelemetryError::NonNumeric {
            raw: object.get(&key).map(|v| v.to_string()).unwrap_or_default(),
            field: key,
        }),
    }
}

// ============================================================================
// HTTP source
// ============================================================================

/// `FieldSource` backed by the live API.
///
/// Every request is bounded by the client-wide timeout; there are no retries.
pub struct HttpFieldSource {
    client: reqwest::blocking::Client,
    host: String,
}

impl HttpFieldSource {
    pub fn new(host: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(HttpFieldSource {
            client,
            host: host.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl FieldSource for HttpFieldSource {
    fn read_field(&self, address: &FieldAddress) -> Result<f64, TelemetryError> {
        let url = build_field_url(&self.host, address);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .map_err(from_reqwest)?;

        if !response.status().is_success() {
            return Err(TelemetryError::HttpStatus(response.status().as_u16()));
        }

        let body = response.text().map_err(from_reqwest)?;
        parse_last_field(&body, address.field)
    }
}

fn from_reqwest(err: reqwest::Error) -> TelemetryError {
    if err.is_timeout() {
        TelemetryError::Timeout
    } else {
        // Strip the URL so the read key never reaches the logs.
        TelemetryError::Network(err.without_url().to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
