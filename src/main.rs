//! alscan-fixtures - Access-log fixture generator
//!
//! Populates the data directory with the cPanel and Plesk log trees and the
//! generated traffic fixtures the scanner's tests expect. Times are resolved
//! in the local time zone, so run it under the zone the tests assume.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `ALSCAN_FIXTURES_DATA_DIR`: Data directory (default: data)
//! - `ALSCAN_FIXTURES_LAYOUTS`: Layouts to build (default: cpanel,plesk)
//! - `ALSCAN_FIXTURES_LINES`: Lines in the numbered-lines fixtures (default: 10000)
//! - `ALSCAN_FIXTURES_REPORT`: Path for a JSON run report (default: none)
//! - `RUST_LOG`: Logging level filter (default: info)

use std::path::Path;

use chrono::Local;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use alscan_fixtures::config::Config;
use alscan_fixtures::layout::{ProvisionError, ProvisionReport, Provisioner};
use alscan_fixtures::sink::FsSink;

/// Exit status for configuration and hard provisioning failures
const FAILURE_EXIT_CODE: i32 = 1;

fn main() {
    init_tracing();

    info!("Starting fixture generation...");

    let config = match Config::from_env() {
        Ok(config) => {
            info!(
                data_dir = %config.data_dir.display(),
                layouts = ?config.layouts,
                line_count = config.line_count,
                "Configuration loaded"
            );
            config
        }
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(FAILURE_EXIT_CODE);
        }
    };

    let report = match Provisioner::new(FsSink::new(&config.data_dir), Local)
        .with_line_count(config.line_count)
        .run(&config.layouts)
    {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, data_dir = %config.data_dir.display(), "Provisioning failed");
            std::process::exit(FAILURE_EXIT_CODE);
        }
    };

    log_summary(&report);

    if let Err(e) = write_report(&report, config.report_path.as_deref()) {
        error!(error = %e, "Failed to write report");
        std::process::exit(FAILURE_EXIT_CODE);
    }

    info!("Fixture generation complete");
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn log_summary(report: &ProvisionReport) {
    info!(
        fixtures = report.fixtures.len(),
        records = report.total_records(),
        copied = report.copied,
        linked = report.linked,
        symlinked = report.symlinked,
        markers = report.markers_created,
        line_files = report.line_files,
        "Provisioning summary"
    );

    if !report.failures.is_empty() {
        warn!(count = report.failures.len(), "Some steps failed");
        for failure in &report.failures {
            warn!(failure = %failure, "Step failed");
        }
    }
}

/// Write the JSON report when a path is configured.
fn write_report(report: &ProvisionReport, path: Option<&Path>) -> Result<(), ProvisionError> {
    let Some(path) = path else {
        return Ok(());
    };
    report.write_json(path)?;
    info!(path = %path.display(), "Report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_report_without_path() {
        assert!(write_report(&ProvisionReport::default(), None).is_ok());
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let report = ProvisionReport {
            copied: 3,
            failures: vec!["copy: source does not exist: logs/x".to_string()],
            ..ProvisionReport::default()
        };

        write_report(&report, Some(&path)).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["copied"], 3);
        assert_eq!(json["failures"][0], "copy: source does not exist: logs/x");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_report_failure() {
        let err = write_report(&ProvisionReport::default(), Some(Path::new("/dev/full"))).unwrap_err();
        assert!(matches!(err, ProvisionError::Report { .. }));
    }
}
