//! Checks every configured district channel against the live API and prints
//! a summary followed by the full report as JSON.

use aqmon_service::config::{DEFAULT_CONFIG_PATH, DashboardConfig};
use aqmon_service::ingest::thingspeak::HttpFieldSource;
use aqmon_service::logging;
use aqmon_service::verify::{print_summary, run_verification};
use std::process::ExitCode;

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = DashboardConfig::load_or_reference(DEFAULT_CONFIG_PATH)?;
    logging::init_logger(&config.logging)?;

    let registry = config.registry()?;
    let source = HttpFieldSource::new(&config.telemetry_host, config.request_timeout())?;

    println!("Verifying {} districts against {}...", registry.len(), source.host());
    let report = run_verification(&source, &registry);

    print_summary(&report);
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.summary.failed > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
