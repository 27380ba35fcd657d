//! Run Summary
//!
//! End-of-run digest derived from a metric time series.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metrics::MetricRecord;

/// Headline figures for a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub steps: usize,
    pub final_active_leaders: u32,
    pub final_active_operatives: u32,
    pub final_active_brokers: u32,
    pub final_active_facilitators: u32,
    pub total_arrests: u64,
    pub total_reports: u64,
    pub final_network_density: f64,
    pub final_average_clustering: f64,
}

impl RunSummary {
    /// Summarise a time series; `None` for a zero-step run.
    pub fn from_records(records: &[MetricRecord]) -> Option<Self> {
        let last = records.last()?;
        Some(Self {
            steps: records.len(),
            final_active_leaders: last.active_leaders,
            final_active_operatives: last.active_operatives,
            final_active_brokers: last.active_brokers,
            final_active_facilitators: last.active_facilitators,
            total_arrests: records.iter().map(|r| r.arrests_this_step as u64).sum(),
            total_reports: records.iter().map(|r| r.reports_this_step as u64).sum(),
            final_network_density: last.network_density,
            final_average_clustering: last.average_clustering,
        })
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Steps run:                  {}", self.steps)?;
        writeln!(f, "Final active leaders:       {}", self.final_active_leaders)?;
        writeln!(f, "Final active operatives:    {}", self.final_active_operatives)?;
        writeln!(f, "Final active brokers:       {}", self.final_active_brokers)?;
        writeln!(f, "Final active facilitators:  {}", self.final_active_facilitators)?;
        writeln!(f, "Total arrests:              {}", self.total_arrests)?;
        writeln!(f, "Total reports:              {}", self.total_reports)?;
        writeln!(f, "Final network density:      {:.4}", self.final_network_density)?;
        write!(f, "Final average clustering:   {:.4}", self.final_average_clustering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(step: u64, arrests: u32, reports: u32) -> MetricRecord {
        MetricRecord {
            step,
            active_leaders: 1,
            active_operatives: 4 - step as u32,
            active_brokers: 0,
            active_facilitators: 0,
            total_resources: 3.0,
            average_detection_exposure: 0.5,
            arrests_this_step: arrests,
            reports_this_step: reports,
            network_density: 0.2,
            average_clustering: 0.1,
        }
    }

    #[test]
    fn test_summary_totals() {
        let records = vec![record(0, 0, 2), record(1, 1, 0), record(2, 2, 3)];
        let summary = RunSummary::from_records(&records).unwrap();
        assert_eq!(summary.steps, 3);
        assert_eq!(summary.total_arrests, 3);
        assert_eq!(summary.total_reports, 5);
        assert_eq!(summary.final_active_operatives, 2);
    }

    #[test]
    fn test_empty_series_has_no_summary() {
        assert!(RunSummary::from_records(&[]).is_none());
    }
}
