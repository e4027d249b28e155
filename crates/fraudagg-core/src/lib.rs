//! FRAUDAGG Core - Core types for the causal feature aggregation engine
//!
//! This crate provides the fundamental types used across the FRAUDAGG workspace:
//! - Value types for table cells
//! - A columnar transaction table with a dense row index
//! - Schemas and validators for required columns
//! - Aggregation configuration (window sizes, time units, functions, delay)
//! - Error types

pub mod aggregation;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use aggregation::{AggFunc, AggregationSpec, TimeUnit};
pub use error::CoreError;
pub use types::{Column, FieldType, Schema, SchemaField, Table, Value};
