//! Stable time ordering of transaction rows

use crate::error::{Result, RuntimeError};
use chrono::{DateTime, Utc};
use fraudagg_core::{Table, Value};

/// Sorts rows by timestamp, ascending, keeping the relative order of ties
pub struct TimeOrderer;

impl TimeOrderer {
    /// Read a timestamp column.
    ///
    /// Every cell must be a `Timestamp`; anything else is a schema error.
    pub fn datetimes(table: &Table, datetime_col: &str) -> Result<Vec<DateTime<Utc>>> {
        let column = table.column(datetime_col)?;
        column
            .values
            .iter()
            .enumerate()
            .map(|(row, value)| match value {
                Value::Timestamp(ts) => Ok(*ts),
                other => Err(RuntimeError::SchemaError(format!(
                    "Column '{}' must hold timestamps, found {} at row {}",
                    datetime_col,
                    other.type_name(),
                    row
                ))),
            })
            .collect()
    }

    /// Read a timestamp column as microseconds since the Unix epoch
    pub fn timestamps(table: &Table, datetime_col: &str) -> Result<Vec<i64>> {
        Ok(Self::datetimes(table, datetime_col)?
            .iter()
            .map(DateTime::timestamp_micros)
            .collect())
    }

    /// Positions that visit `timestamps` in ascending order
    pub fn sort_order(timestamps: &[i64]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..timestamps.len()).collect();
        // sort_by_key is stable
        order.sort_by_key(|&i| timestamps[i]);
        order
    }
}
