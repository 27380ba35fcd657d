//! Time-series Writer
//!
//! Writes a run's records to disk: CSV by default, pretty JSON when the
//! path ends in `.json`. Parent directories are created as needed.

use std::fs;
use std::path::{Path, PathBuf};

use ecosim_records::{to_csv, MetricRecord};

use crate::error::SimError;

/// Default output path
pub const DEFAULT_OUTPUT_PATH: &str = "output/metrics.csv";

/// Write `records` to `path`.
pub fn write_metrics(path: impl AsRef<Path>, records: &[MetricRecord]) -> Result<(), SimError> {
    let path = path.as_ref();
    let io_error = |source| SimError::Output {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
    }

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let body = if is_json {
        serde_json::to_string_pretty(records)?
    } else {
        to_csv(records)
    };

    fs::write(path, body).map_err(io_error)?;
    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// `output/metrics.csv` + seed 7 -> `output/metrics_seed7.csv`
pub fn replicate_path(base: impl AsRef<Path>, seed: u64) -> PathBuf {
    let base = base.as_ref();
    let stem = base
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "metrics".to_string());
    let file_name = match base.extension() {
        Some(ext) => format!("{}_seed{}.{}", stem, seed, ext.to_string_lossy()),
        None => format!("{}_seed{}", stem, seed),
    };
    base.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(step: u64) -> MetricRecord {
        MetricRecord {
            step,
            active_leaders: 2,
            active_operatives: 10,
            active_brokers: 1,
            active_facilitators: 3,
            total_resources: 12.5,
            average_detection_exposure: 0.25,
            arrests_this_step: 1,
            reports_this_step: 0,
            network_density: 0.1,
            average_clustering: 0.4,
        }
    }

    #[test]
    fn test_write_csv_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/metrics.csv");
        write_metrics(&path, &[record(0), record(1)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ActiveLeaders,"));
        assert_eq!(lines[1], "2,10,1,3,12.5,0.25,1,0,0.1,0.4");
    }

    #[test]
    fn test_write_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        write_metrics(&path, &[record(0), record(1)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: Vec<MetricRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, vec![record(0), record(1)]);
        assert!(content.contains("\"NetworkDensity\""));
    }

    #[test]
    fn test_replicate_path() {
        assert_eq!(
            replicate_path("output/metrics.csv", 43),
            PathBuf::from("output/metrics_seed43.csv")
        );
        assert_eq!(replicate_path("run", 1), PathBuf::from("run_seed1"));
    }
}
