/// Per-district telemetry fetch.
///
/// Combines the particulate and temperature reads for one district into a
/// `Reading`. Both reads run concurrently and each failure degrades to a
/// `None` component; nothing here returns an error.

use crate::districts::DistrictRegistry;
use crate::ingest::FieldSource;
use crate::logging::{self, DataSource};
use crate::model::{DistrictConfig, Quantity, Reading};
use chrono::Utc;
use std::thread;

pub struct TelemetryClient<S> {
    registry: DistrictRegistry,
    source: S,
}

impl<S: FieldSource> TelemetryClient<S> {
    pub fn new(registry: DistrictRegistry, source: S) -> Self {
        TelemetryClient { registry, source }
    }

    pub fn registry(&self) -> &DistrictRegistry {
        &self.registry
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches both quantities for `district_id`.
    ///
    /// Returns `None` only for an unknown district. Otherwise returns a
    /// reading whose components are independently `None` on failure, stamped
    /// once both reads have settled.
    pub fn fetch(&self, district_id: &str) -> Option<Reading> {
        let Some(district) = self.registry.find(district_id) else {
            logging::debug(DataSource::Telemetry, Some(district_id), "unknown district, skipping");
            return None;
        };

        let (pm25, temp) = thread::scope(|scope| {
            let pm25 = scope.spawn(|| self.read(district, Quantity::Particulate));
            let temp = scope.spawn(|| self.read(district, Quantity::Temperature));
            (
                settle(district, Quantity::Particulate, pm25.join()),
                settle(district, Quantity::Temperature, temp.join()),
            )
        });

        Some(Reading {
            district: district.id.clone(),
            pm25,
            temp,
            captured_at: Utc::now(),
        })
    }

    fn read(&self, district: &DistrictConfig, quantity: Quantity) -> Option<f64> {
        match self.source.read_field(district.address(quantity)) {
            Ok(value) => Some(value),
            Err(err) => {
                logging::log_fetch_failure(&district.id, quantity, &err);
                None
            }
        }
    }
}

/// A read whose thread panicked counts as a failed read of that quantity.
fn settle(
    district: &DistrictConfig,
    quantity: Quantity,
    joined: thread::Result<Option<f64>>,
) -> Option<f64> {
    joined.unwrap_or_else(|_| {
        logging::error(
            DataSource::Telemetry,
            Some(&district.id),
            &format!("{} read panicked", quantity),
        );
        None
    })
}
