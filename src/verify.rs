//! Channel Verification Module
//!
//! Checks every configured district field against a live source to find
//! out which channels are reachable and reporting numeric data. Run it
//! after editing the district table, before trusting the dashboard.

use crate::districts::DistrictRegistry;
use crate::ingest::FieldSource;
use crate::model::{DistrictConfig, Quantity};
use chrono::Utc;
use serde::Serialize;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub districts: Vec<DistrictVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub partial: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistrictVerification {
    pub district: String,
    pub status: VerificationStatus,
    pub fields: Vec<FieldCheck>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldCheck {
    pub quantity: Quantity,
    pub channel_id: String,
    pub field: u32,
    pub value: Option<f64>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

// ============================================================================
// Verification
// ============================================================================

pub fn verify_district<S: FieldSource + ?Sized>(source: &S, district: &DistrictConfig) -> DistrictVerification {
    let fields: Vec<FieldCheck> = [Quantity::Particulate, Quantity::Temperature]
        .into_iter()
        .map(|quantity| {
            let address = district.address(quantity);
            let result = source.read_field(address);
            FieldCheck {
                quantity,
                channel_id: address.channel_id.clone(),
                field: address.field,
                value: result.as_ref().ok().copied(),
                error_message: result.err().map(|e| e.to_string()),
            }
        })
        .collect();

    let working = fields.iter().filter(|f| f.value.is_some()).count();
    let status = if working == fields.len() {
        VerificationStatus::Success
    } else if working > 0 {
        VerificationStatus::PartialSuccess
    } else {
        VerificationStatus::Failed
    };

    DistrictVerification {
        district: district.id.clone(),
        status,
        fields,
    }
}

pub fn run_verification<S: FieldSource + ?Sized>(source: &S, registry: &DistrictRegistry) -> VerificationReport {
    let mut summary = VerificationSummary {
        total: registry.len(),
        ..VerificationSummary::default()
    };

    let districts: Vec<DistrictVerification> = registry
        .iter()
        .map(|district| {
            let result = verify_district(source, district);
            match result.status {
                VerificationStatus::Success => summary.working += 1,
                VerificationStatus::PartialSuccess => summary.partial += 1,
                VerificationStatus::Failed => summary.failed += 1,
            }
            result
        })
        .collect();

    VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        districts,
        summary,
    }
}

pub fn print_summary(report: &VerificationReport) {
    println!("═══════════════════════════════════════════════════════");
    println!("CHANNEL VERIFICATION SUMMARY");
    println!("═══════════════════════════════════════════════════════");
    for district in &report.districts {
        println!("  {:<8} {:?}", district.district, district.status);
        for field in &district.fields {
            match (&field.value, &field.error_message) {
                (Some(v), _) => println!(
                    "      ✓ {} (channel {}, field{}) = {}",
                    field.quantity, field.channel_id, field.field, v
                ),
                (None, err) => println!(
                    "      ✗ {} (channel {}, field{}): {}",
                    field.quantity,
                    field.channel_id,
                    field.field,
                    err.as_deref().unwrap_or("Unknown")
                ),
            }
        }
    }
    println!();
    println!(
        "Districts: {}/{} fully working  ({} partial, {} failed)",
        report.summary.working, report.summary.total, report.summary.partial, report.summary.failed
    );
    println!("═══════════════════════════════════════════════════════");
}
