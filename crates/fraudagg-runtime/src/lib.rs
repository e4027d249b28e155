//! FRAUDAGG Runtime - Causal feature aggregation engine
//!
//! This crate computes leakage-safe per-entity features over a transaction
//! table: rolling window aggregates with label-delay correction, time since
//! the previous transaction, and calendar encodings.

pub mod error;
pub mod feature;
pub mod observability;

// Re-export main types
pub use error::{Result, RuntimeError};
pub use feature::{
    add_calendar_features, aggregate_feature, partition_by, time_since_previous,
    time_since_previous_cached, AssemblerOptions, CacheStats, DelayCorrector, FeatureAssembler,
    FeatureCache, GroupKey, GroupPartition, TimeOrderer, WindowedAggregator, TIME_SINCE_LAST_TX,
};
pub use observability::{Metrics, MetricsCollector, MetricsSnapshot};
