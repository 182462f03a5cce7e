/// Structured logging for the air-quality monitor
///
/// Provides context-rich logging tagged with the data source and, where
/// relevant, the district. Events go through `tracing`; `init_logger`
/// installs a `tracing-subscriber` fmt subscriber writing to stderr or
/// appending to a file for daemon operation.

use crate::config::{ConfigError, LogSettings};
use crate::model::{Quantity, TelemetryError};
use crate::refresh::CycleSummary;
use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Telemetry,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Telemetry => write!(f, "TS"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - sensor offline or not yet reporting
    Expected,
    /// Unexpected failure - indicates service degradation or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classify a field read failure.
///
/// A null field is what the API returns for a channel whose sensor has not
/// posted that field yet, so it is expected. Auth and addressing errors
/// (4xx) and malformed bodies point at configuration or API changes.
pub fn classify_fetch_failure(err: &TelemetryError) -> FailureType {
    match err {
        TelemetryError::MissingField(_) => FailureType::Expected,
        TelemetryError::HttpStatus(code) if (400..500).contains(code) => FailureType::Unexpected,
        TelemetryError::Malformed(_) => FailureType::Unexpected,
        TelemetryError::Timeout
        | TelemetryError::HttpStatus(_)
        | TelemetryError::Network(_)
        | TelemetryError::NonNumeric { .. } => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Logger Initialization
// ---------------------------------------------------------------------------

/// Install the global subscriber.
///
/// Calling this more than once is harmless: later calls keep the first
/// subscriber.
pub fn init_logger(settings: &LogSettings) -> Result<(), ConfigError> {
    let writer = match &settings.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(settings.level.as_tracing())
        .with_ansi(settings.file.is_none())
        .with_target(false)
        .with_writer(writer);

    let installed = if settings.timestamps {
        builder.try_init()
    } else {
        builder.without_time().try_init()
    };

    // An already-installed subscriber is the only failure try_init reports.
    if let Err(e) = installed {
        tracing::debug!("logger already initialized: {}", e);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Log a general informational message
pub fn info(source: DataSource, district: Option<&str>, message: &str) {
    tracing::info!(source = %source, district = district.unwrap_or("-"), "{}", message);
}

/// Log a warning message
pub fn warn(source: DataSource, district: Option<&str>, message: &str) {
    tracing::warn!(source = %source, district = district.unwrap_or("-"), "{}", message);
}

/// Log an error message
pub fn error(source: DataSource, district: Option<&str>, message: &str) {
    tracing::error!(source = %source, district = district.unwrap_or("-"), "{}", message);
}

/// Log a debug message
pub fn debug(source: DataSource, district: Option<&str>, message: &str) {
    tracing::debug!(source = %source, district = district.unwrap_or("-"), "{}", message);
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Level a read failure is logged at. Every failed read is at least a
/// warning so it shows up at the default `info` level.
pub fn fetch_failure_level(failure_type: &FailureType) -> LogLevel {
    match failure_type {
        FailureType::Unexpected => LogLevel::Error,
        FailureType::Expected | FailureType::Unknown => LogLevel::Warning,
    }
}

/// Log a field read failure with automatic classification
pub fn log_fetch_failure(district: &str, quantity: Quantity, err: &TelemetryError) {
    let failure_type = classify_fetch_failure(err);
    let message = format!("{} read failed [{}]: {}", quantity, failure_type, err);

    match fetch_failure_level(&failure_type) {
        LogLevel::Error => error(DataSource::Telemetry, Some(district), &message),
        LogLevel::Warning => warn(DataSource::Telemetry, Some(district), &message),
        LogLevel::Info => info(DataSource::Telemetry, Some(district), &message),
        LogLevel::Debug => debug(DataSource::Telemetry, Some(district), &message),
    }
}

// ---------------------------------------------------------------------------
// Cycle Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of one refresh cycle
pub fn log_cycle_summary(summary: &CycleSummary) {
    let message = format!(
        "Refresh complete: {}/{} districts, {} pm25 + {} temp updates, {} values missing",
        summary.readings,
        summary.requested,
        summary.pm25_updates,
        summary.temp_updates,
        summary.missing_values
    );

    if summary.missing_values == 0 && summary.readings == summary.requested {
        info(DataSource::System, None, &message);
    } else if summary.pm25_updates + summary.temp_updates == 0 {
        error(DataSource::System, None, &message);
    } else {
        warn(DataSource::System, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_accepts_warn_alias() {
        #[derive(Deserialize)]
        struct Wrapper {
            level: LogLevel,
        }
        let w: Wrapper = toml::from_str("level = \"warn\"").expect("alias should parse");
        assert_eq!(w.level, LogLevel::Warning);
    }

    #[test]
    fn test_failure_classification() {
        assert_eq!(
            classify_fetch_failure(&TelemetryError::MissingField("field1".into())),
            FailureType::Expected
        );
        assert_eq!(
            classify_fetch_failure(&TelemetryError::HttpStatus(404)),
            FailureType::Unexpected
        );
        assert_eq!(
            classify_fetch_failure(&TelemetryError::HttpStatus(503)),
            FailureType::Unknown
        );
        assert_eq!(classify_fetch_failure(&TelemetryError::Timeout), FailureType::Unknown);
    }

    #[test]
    fn test_every_fetch_failure_is_visible_at_default_level() {
        let errors = [
            TelemetryError::Timeout,
            TelemetryError::HttpStatus(500),
            TelemetryError::HttpStatus(403),
            TelemetryError::Network("connection refused".into()),
            TelemetryError::Malformed("-1".into()),
            TelemetryError::MissingField("field1".into()),
            TelemetryError::NonNumeric { field: "field1".into(), raw: "\"abc\"".into() },
        ];
        for err in errors {
            let level = fetch_failure_level(&classify_fetch_failure(&err));
            assert!(level >= LogLevel::Warning, "{} logged at {:?}", err, level);
        }
    }

    #[test]
    fn test_missing_field_is_a_warning() {
        let failure = classify_fetch_failure(&TelemetryError::MissingField("field2".into()));
        assert_eq!(fetch_failure_level(&failure), LogLevel::Warning);
    }
}
