/// District registry for the air-quality monitor.
///
/// Holds the canonical, validated list of monitored districts and their
/// telemetry addresses. Built once from configuration and shared read-only;
/// all other modules look districts up here rather than hardcoding channel
/// ids.

use crate::config::ConfigError;
use crate::model::{DistrictConfig, Quantity};
use std::collections::HashSet;

/// Highest field index the telemetry API exposes per channel.
pub const MAX_FIELD_INDEX: u32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct DistrictRegistry {
    districts: Vec<DistrictConfig>,
}

impl DistrictRegistry {
    /// Validates and wraps a district table, preserving its order.
    pub fn new(districts: Vec<DistrictConfig>) -> Result<Self, ConfigError> {
        if districts.is_empty() {
            return Err(ConfigError::Invalid("no districts configured".into()));
        }

        let mut seen = HashSet::new();
        for district in &districts {
            if district.id.trim().is_empty() {
                return Err(ConfigError::Invalid("district id is empty".into()));
            }
            if !seen.insert(district.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate district id '{}'",
                    district.id
                )));
            }
            for quantity in [Quantity::Particulate, Quantity::Temperature] {
                let address = district.address(quantity);
                if address.field == 0 || address.field > MAX_FIELD_INDEX {
                    return Err(ConfigError::Invalid(format!(
                        "district '{}' {} field must be 1..={}, got {}",
                        district.id, quantity, MAX_FIELD_INDEX, address.field
                    )));
                }
                if address.channel_id.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "district '{}' {} channel id is empty",
                        district.id, quantity
                    )));
                }
            }
        }

        Ok(DistrictRegistry { districts })
    }

    /// Looks up a district by id. Returns `None` if not configured.
    pub fn find(&self, id: &str) -> Option<&DistrictConfig> {
        self.districts.iter().find(|d| d.id == id)
    }

    /// District ids in configuration order.
    pub fn ids(&self) -> Vec<String> {
        self.districts.iter().map(|d| d.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DistrictConfig> {
        self.districts.iter()
    }

    pub fn len(&self) -> usize {
        self.districts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }
}
