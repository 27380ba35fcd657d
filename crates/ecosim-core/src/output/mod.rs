//! Metrics collection and time-series output.

pub mod metrics;
pub mod writer;

pub use metrics::{collect, record_metrics, MetricsLog};
pub use writer::{replicate_path, write_metrics, DEFAULT_OUTPUT_PATH};
