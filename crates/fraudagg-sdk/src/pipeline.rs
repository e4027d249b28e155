//! FeaturePipeline - runs a configured sequence of feature jobs

use crate::config::{FeatureJob, PipelineConfig};
use crate::error::Result;
use fraudagg_core::Table;
use fraudagg_runtime::observability::{names, Metrics, MetricsCollector, MetricsSnapshot};
use fraudagg_runtime::{
    add_calendar_features, CacheStats, FeatureAssembler, FeatureCache, Result as RuntimeResult,
    RuntimeError,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Feature pipeline
///
/// Applies calendar encodings (when enabled) and then every job in order,
/// each job consuming the table produced by the previous one.
pub struct FeaturePipeline {
    config: PipelineConfig,
    assembler: FeatureAssembler,
    cache: Option<FeatureCache>,
    metrics: Arc<MetricsCollector>,
}

impl FeaturePipeline {
    /// Create a pipeline from a configuration, validating it first
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let metrics = Arc::new(MetricsCollector::new());
        let mut assembler = FeatureAssembler::new(config.assembler_options());
        if config.enable_metrics {
            assembler = assembler.with_metrics(metrics.clone());
        }
        let cache = config.enable_cache.then(FeatureCache::new);

        info!(
            jobs = config.jobs.len(),
            parallel = config.parallel,
            cache = config.enable_cache,
            "Feature pipeline initialized"
        );

        Ok(Self {
            config,
            assembler,
            cache,
            metrics,
        })
    }

    /// Run every job over `table` and return the augmented table
    pub fn run(&self, table: &Table) -> Result<Table> {
        let start = Instant::now();
        if table.is_empty() {
            warn!("Running feature pipeline on an empty table");
        }

        let mut current = if self.config.calendar_features {
            add_calendar_features(table, &self.config.datetime_col)
                .inspect_err(|e| self.record_error(e))?
        } else {
            table.clone()
        };

        for job in &self.config.jobs {
            current = self.run_job(&current, job).inspect_err(|e| self.record_error(e))?;
        }

        info!(
            rows = current.num_rows(),
            columns = current.columns.len(),
            jobs = self.config.jobs.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Feature pipeline completed"
        );
        Ok(current)
    }

    fn run_job(&self, table: &Table, job: &FeatureJob) -> RuntimeResult<Table> {
        debug!(
            operation = job.operation(),
            grouping_key = job.grouping_key(),
            "Running job"
        );

        let Some(cache) = &self.cache else {
            return self.compute(table, job);
        };

        let key = FeatureCache::key(table, job.operation(), job)?;
        if let Some(hit) = cache.get(&key) {
            self.count(names::CACHE_HITS);
            return Ok(hit);
        }

        self.count(names::CACHE_MISSES);
        let result = self.compute(table, job)?;
        cache.insert(key, result.clone());
        Ok(result)
    }

    fn compute(&self, table: &Table, job: &FeatureJob) -> RuntimeResult<Table> {
        match job {
            FeatureJob::Aggregate {
                grouping_key,
                feature,
                ..
            } => {
                let spec = job
                    .aggregation_spec()
                    .map_err(|e| RuntimeError::ConfigError(e.to_string()))?
                    .ok_or_else(|| {
                        RuntimeError::ConfigError("Aggregate job without a spec".to_string())
                    })?;
                self.assembler.aggregate(table, grouping_key, feature, &spec)
            }
            FeatureJob::TimeSincePrevious { grouping_key } => {
                self.assembler.time_since_previous(table, grouping_key)
            }
        }
    }

    fn count(&self, name: &str) {
        if self.config.enable_metrics {
            self.metrics.counter(name).inc();
        }
    }

    fn record_error(&self, error: &RuntimeError) {
        if !self.config.enable_metrics {
            return;
        }
        let kind = match error {
            RuntimeError::SchemaError(_) => "schema",
            RuntimeError::ConfigError(_) => "config",
            RuntimeError::EmptyPartitionError(_) => "empty_partition",
        };
        self.metrics.record_error(kind);
    }

    /// Pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Shared metrics collector
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Current metric values
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Cache statistics, `None` when caching is disabled
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(FeatureCache::stats)
    }

    /// Drop all memoized results
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.log_stats();
            cache.clear();
        }
    }
}
