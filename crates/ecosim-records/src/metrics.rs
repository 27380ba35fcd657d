//! Metric Records
//!
//! One immutable row per simulated step. The ordered sequence of records is
//! the only output a run produces.

use serde::{Deserialize, Serialize};

/// Column names of the CSV rendering, in order. The step index is implicit
/// in row order.
pub const CSV_COLUMNS: [&str; 10] = [
    "ActiveLeaders",
    "ActiveOperatives",
    "ActiveBrokers",
    "ActiveFacilitators",
    "TotalResources",
    "AverageDetectionExposure",
    "ArrestsThisStep",
    "ReportsThisStep",
    "NetworkDensity",
    "AverageClustering",
];

/// Aggregate indicators for a single step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricRecord {
    pub step: u64,
    pub active_leaders: u32,
    pub active_operatives: u32,
    pub active_brokers: u32,
    pub active_facilitators: u32,
    pub total_resources: f64,
    pub average_detection_exposure: f64,
    pub arrests_this_step: u32,
    pub reports_this_step: u32,
    pub network_density: f64,
    pub average_clustering: f64,
}

impl MetricRecord {
    /// Active agents across the four illicit roles
    pub fn active_illicit(&self) -> u32 {
        self.active_leaders + self.active_operatives + self.active_brokers + self.active_facilitators
    }

    /// One CSV line (no trailing newline).
    ///
    /// Floats use the shortest representation that round-trips, so equal
    /// records always render to equal bytes.
    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{}",
            self.active_leaders,
            self.active_operatives,
            self.active_brokers,
            self.active_facilitators,
            self.total_resources,
            self.average_detection_exposure,
            self.arrests_this_step,
            self.reports_this_step,
            self.network_density,
            self.average_clustering,
        )
    }
}

/// Render a full time series as CSV text, header included.
pub fn to_csv(records: &[MetricRecord]) -> String {
    let mut csv = String::new();
    csv.push_str(&CSV_COLUMNS.join(","));
    csv.push('\n');
    for record in records {
        csv.push_str(&record.csv_row());
        csv.push('\n');
    }
    csv
}
