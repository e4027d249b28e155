//! FRAUDAGG Feature Pipeline SDK
//!
//! High-level API for configuring and running feature pipelines over
//! transaction tables.

pub mod builder;
pub mod config;
pub mod error;
pub mod pipeline;

// Re-export main types
pub use builder::FeaturePipelineBuilder;
pub use config::{FeatureJob, PipelineConfig};
pub use error::{Result, SdkError};
pub use pipeline::FeaturePipeline;

// Re-export commonly used types from dependencies
pub use fraudagg_core::types::{columns, ValidationError, Validator};
pub use fraudagg_core::{AggFunc, AggregationSpec, Column, Schema, Table, TimeUnit, Value};
pub use fraudagg_runtime::{CacheStats, MetricsCollector, MetricsSnapshot};
