//! Time since the entity's previous transaction

use super::assembler::FeatureAssembler;
use super::cache::FeatureCache;
use crate::error::Result;
use crate::observability::names;
use fraudagg_core::{Table, Value};
use std::time::Instant;
use tracing::info;

/// Output column of the recency feature
pub const TIME_SINCE_LAST_TX: &str = "time_since_last_tx";

const MICROS_PER_MINUTE: f64 = 60_000_000.0;

/// Gaps in minutes between consecutive sorted timestamps.
///
/// The first row takes the largest gap of the group. A lone row has no gap
/// and yields `None`.
pub fn gaps_in_minutes(timestamps: &[i64]) -> Vec<Option<f64>> {
    if timestamps.len() < 2 {
        return vec![None; timestamps.len()];
    }

    let mut gaps = Vec::with_capacity(timestamps.len());
    gaps.push(None);
    gaps.extend(
        timestamps
            .windows(2)
            .map(|pair| Some((pair[1] - pair[0]) as f64 / MICROS_PER_MINUTE)),
    );

    gaps[0] = gaps.iter().flatten().copied().reduce(f64::max);
    gaps
}

impl FeatureAssembler {
    /// Append `time_since_last_tx` per `grouping_key`, re-indexed densely.
    pub fn time_since_previous(&self, table: &Table, grouping_key: &str) -> Result<Table> {
        let start = Instant::now();
        self.validate_columns(table, grouping_key, None)?;

        let output_names = [TIME_SINCE_LAST_TX.to_string()];
        let (result, partitions) =
            self.map_partitions(table, grouping_key, &output_names, |partition| {
                let values: Vec<Value> = gaps_in_minutes(&partition.timestamps)
                    .into_iter()
                    .map(Value::from)
                    .collect();
                Ok(vec![values])
            })?;

        let elapsed = start.elapsed();
        info!(
            grouping_key,
            rows = result.num_rows(),
            partitions,
            elapsed_ms = elapsed.as_millis() as u64,
            "Computed time since previous transaction"
        );

        if let Some(metrics) = self.metrics() {
            metrics.counter(names::TIME_SINCE_PREVIOUS_CALLS).inc();
            metrics.counter(names::ROWS_PROCESSED).add(result.num_rows() as u64);
            metrics
                .counter(names::PARTITIONS_PROCESSED)
                .add(partitions as u64);
        }

        Ok(result)
    }
}

/// Append `time_since_last_tx` with default column roles
pub fn time_since_previous(table: &Table, grouping_key: &str) -> Result<Table> {
    FeatureAssembler::default().time_since_previous(table, grouping_key)
}

/// Memoized `time_since_previous`: identical input content and grouping key
/// return the stored table without recomputation.
pub fn time_since_previous_cached(
    table: &Table,
    grouping_key: &str,
    cache: &FeatureCache,
) -> Result<Table> {
    let key = FeatureCache::key(table, "time_since_previous", &grouping_key)?;
    cache.get_or_compute(&key, || time_since_previous(table, grouping_key))
}
