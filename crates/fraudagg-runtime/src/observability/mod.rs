//! Observability module
//!
//! In-process counters and histograms for the feature engine. Log output goes
//! through the `tracing` facade at the call sites.

pub mod metrics;

pub use metrics::{
    names, Counter, Histogram, HistogramSummary, Metrics, MetricsCollector, MetricsSnapshot,
};
