//! Feature assembly
//!
//! The assembler drives one feature computation end to end:
//!
//! 1. validate column roles and the aggregation config
//! 2. partition the table by grouping key (each partition sorted by time)
//! 3. compute the new columns per partition, optionally on the rayon pool
//! 4. concatenate the partitions in ascending key order
//! 5. replace the row index with a fresh dense `0..N-1` sequence
//!
//! The identifiers supplied on input are discarded by step 5.

use super::delay::DelayCorrector;
use super::partition::{partition_by, GroupPartition};
use super::window::WindowedAggregator;
use crate::error::{Result, RuntimeError};
use crate::observability::{names, Metrics};
use fraudagg_core::types::{columns, Validator, DEFAULT_INDEX_NAME};
use fraudagg_core::{
    AggregationSpec, Column, FieldType, Schema, SchemaField, Table, TimeUnit, Value,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Column roles and execution options of the assembler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblerOptions {
    /// Timestamp column
    #[serde(default = "default_datetime_col")]
    pub datetime_col: String,

    /// Name given to the dense output index
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Compute partitions on the rayon worker pool
    #[serde(default)]
    pub parallel: bool,
}

fn default_datetime_col() -> String {
    columns::TX_DATETIME.to_string()
}

fn default_index_name() -> String {
    DEFAULT_INDEX_NAME.to_string()
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            datetime_col: default_datetime_col(),
            index_name: default_index_name(),
            parallel: false,
        }
    }
}

impl AssemblerOptions {
    /// Set the timestamp column
    pub fn with_datetime_col(mut self, datetime_col: impl Into<String>) -> Self {
        self.datetime_col = datetime_col.into();
        self
    }

    /// Set the output index name
    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    /// Enable or disable parallel partition processing
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Partition, compute, merge and re-index
pub struct FeatureAssembler {
    options: AssemblerOptions,
    metrics: Option<Arc<dyn Metrics>>,
}

impl FeatureAssembler {
    /// Create an assembler with the given options
    pub fn new(options: AssemblerOptions) -> Self {
        Self {
            options,
            metrics: None,
        }
    }

    /// Record call counts, row counts and durations into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<dyn Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Assembler options
    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    /// Append rolling aggregates of `feature_name` per `grouping_key`.
    ///
    /// One column per (window, function) pair, window-major, named
    /// `<grouping_key>_<function>_<feature_name>_<window_size>_<unit>`. A
    /// column that already exists is overwritten in place.
    pub fn aggregate(
        &self,
        table: &Table,
        grouping_key: &str,
        feature_name: &str,
        spec: &AggregationSpec,
    ) -> Result<Table> {
        let start = Instant::now();
        spec.validate()?;
        self.validate_columns(table, grouping_key, Some(feature_name))?;

        let output_names = spec.column_names(grouping_key, feature_name);
        let corrector = DelayCorrector::new(spec.delay, spec.time_unit);

        let (result, partitions) =
            self.map_partitions(table, grouping_key, &output_names, |partition| {
                let feature = partition.table.column(feature_name)?;
                let aggregator =
                    WindowedAggregator::new(&partition.timestamps, feature_name, &feature.values)?;

                let mut columns: Vec<Vec<Value>> = Vec::with_capacity(spec.output_width());
                for &window in &spec.window_sizes {
                    for values in corrector.apply(&aggregator, window, &spec.functions) {
                        columns.push(values.into_iter().map(Value::from).collect());
                    }
                }
                Ok(columns)
            })?;

        let elapsed = start.elapsed();
        info!(
            grouping_key,
            feature_name,
            rows = result.num_rows(),
            partitions,
            columns = output_names.len(),
            delay = spec.delay,
            elapsed_ms = elapsed.as_millis() as u64,
            "Aggregated feature"
        );

        if let Some(metrics) = &self.metrics {
            metrics.counter(names::AGGREGATE_FEATURE_CALLS).inc();
            metrics.counter(names::ROWS_PROCESSED).add(result.num_rows() as u64);
            metrics
                .counter(names::PARTITIONS_PROCESSED)
                .add(partitions as u64);
            metrics.record_execution_time("aggregation", elapsed);
        }

        Ok(result)
    }

    /// Check that the timestamp, grouping and (optional) feature columns exist
    /// and carry the right semantic types.
    pub(crate) fn validate_columns(
        &self,
        table: &Table,
        grouping_key: &str,
        feature_name: Option<&str>,
    ) -> Result<()> {
        let mut schema = Schema::new("feature_input")
            .add_field(
                SchemaField::new(&self.options.datetime_col, FieldType::Timestamp)
                    .required()
                    .not_null(),
            )
            .add_field(
                SchemaField::new(grouping_key, FieldType::Any)
                    .required()
                    .not_null(),
            );
        if let Some(feature_name) = feature_name {
            schema =
                schema.add_field(SchemaField::new(feature_name, FieldType::Number).required());
        }

        Validator::new().validate(table, &schema).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            RuntimeError::SchemaError(messages.join("; "))
        })
    }

    /// Run `compute` on every partition and merge the results.
    ///
    /// `compute` returns one value vector per name in `output_names`, aligned
    /// with the partition's rows. Returns the merged table and the number of
    /// partitions processed.
    pub(crate) fn map_partitions<F>(
        &self,
        table: &Table,
        grouping_key: &str,
        output_names: &[String],
        compute: F,
    ) -> Result<(Table, usize)>
    where
        F: Fn(&GroupPartition) -> Result<Vec<Vec<Value>>> + Sync,
    {
        if table.is_empty() {
            warn!(grouping_key, "Empty input table, only adding empty feature columns");
            let mut result = table.clone();
            result.index_name = self.options.index_name.clone();
            for name in output_names {
                result.push_column(Column::new(name.clone(), Vec::new()))?;
            }
            return Ok((result, 0));
        }

        let partitions = partition_by(table, grouping_key, &self.options.datetime_col)?;
        let count = partitions.len();

        let process = |mut partition: GroupPartition| -> Result<Table> {
            let outputs = compute(&partition)?;
            debug_assert_eq!(outputs.len(), output_names.len());

            for (name, values) in output_names.iter().zip(outputs) {
                partition.table.push_column(Column::new(name.clone(), values))?;
            }
            debug!(key = %partition.key, rows = partition.len(), "Processed partition");
            Ok(partition.table)
        };

        let tables: Vec<Table> = if self.options.parallel {
            partitions.into_par_iter().map(&process).collect::<Result<_>>()?
        } else {
            partitions.into_iter().map(&process).collect::<Result<_>>()?
        };

        let mut result = Table::concat(self.options.index_name.clone(), tables)?;
        result.reindex_dense();
        Ok((result, count))
    }

    pub(crate) fn metrics(&self) -> Option<&Arc<dyn Metrics>> {
        self.metrics.as_ref()
    }
}

impl Default for FeatureAssembler {
    fn default() -> Self {
        Self::new(AssemblerOptions::default())
    }
}

/// Append rolling aggregates with default column roles (`tx_datetime`,
/// `transaction_id`).
///
/// `functions` are parsed by name; an unknown name or an empty
/// `window_sizes` is a `ConfigError`.
pub fn aggregate_feature(
    table: &Table,
    grouping_key: &str,
    feature_name: &str,
    window_sizes: &[u32],
    unit: TimeUnit,
    functions: &[&str],
    delay: u32,
) -> Result<Table> {
    let spec = AggregationSpec::from_names(window_sizes.to_vec(), unit, functions, delay)?;
    FeatureAssembler::default().aggregate(table, grouping_key, feature_name, &spec)
}
