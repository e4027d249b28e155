//! Builder pattern for FeaturePipeline

use crate::config::{FeatureJob, PipelineConfig};
use crate::error::Result;
use crate::pipeline::FeaturePipeline;
use fraudagg_core::{AggFunc, TimeUnit};
use std::path::PathBuf;

/// Builder for FeaturePipeline
///
/// # Example
///
/// ```rust,ignore
/// use fraudagg_sdk::{AggFunc, FeaturePipelineBuilder, TimeUnit};
///
/// // Programmatic configuration
/// let pipeline = FeaturePipelineBuilder::new()
///     .add_aggregate("customer_id", "tx_amount", vec![1, 7, 30], TimeUnit::Days, &[AggFunc::Mean], 0)
///     .add_time_since_previous("customer_id")
///     .parallel(true)
///     .build()?;
///
/// // From a YAML file, with extra jobs appended
/// let pipeline = FeaturePipelineBuilder::new()
///     .with_config_file("features.yaml")
///     .add_time_since_previous("terminal_id")
///     .build()?;
/// ```
pub struct FeaturePipelineBuilder {
    config: PipelineConfig,
    config_files: Vec<PathBuf>,
}

impl FeaturePipelineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::new(),
            config_files: Vec::new(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: PipelineConfig) -> Self {
        Self {
            config,
            config_files: Vec::new(),
        }
    }

    // ========== Configuration Sources ==========

    /// Load a YAML configuration file at build time.
    ///
    /// The file's settings replace the builder's; its jobs are placed before
    /// the jobs added on the builder.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_files.push(path.into());
        self
    }

    // ========== Jobs ==========

    /// Add any job
    pub fn add_job(mut self, job: FeatureJob) -> Self {
        self.config.jobs.push(job);
        self
    }

    /// Add a rolling aggregate job
    pub fn add_aggregate(
        self,
        grouping_key: impl Into<String>,
        feature: impl Into<String>,
        window_sizes: Vec<u32>,
        unit: TimeUnit,
        functions: &[AggFunc],
        delay: u32,
    ) -> Self {
        self.add_job(FeatureJob::aggregate(
            grouping_key,
            feature,
            window_sizes,
            unit,
            functions,
            delay,
        ))
    }

    /// Add a time-since-previous-transaction job
    pub fn add_time_since_previous(self, grouping_key: impl Into<String>) -> Self {
        self.add_job(FeatureJob::time_since_previous(grouping_key))
    }

    // ========== Options ==========

    /// Set the timestamp column
    pub fn with_datetime_col(mut self, datetime_col: impl Into<String>) -> Self {
        self.config.datetime_col = datetime_col.into();
        self
    }

    /// Set the output index name
    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.config.index_name = index_name.into();
        self
    }

    /// Compute partitions in parallel
    pub fn parallel(mut self, enable: bool) -> Self {
        self.config.parallel = enable;
        self
    }

    /// Enable memoization
    pub fn enable_cache(mut self, enable: bool) -> Self {
        self.config.enable_cache = enable;
        self
    }

    /// Enable metrics
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.config.enable_metrics = enable;
        self
    }

    /// Enable calendar features
    pub fn calendar_features(mut self, enable: bool) -> Self {
        self.config.calendar_features = enable;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<FeaturePipeline> {
        let mut config = self.config;

        for path in self.config_files.iter().rev() {
            tracing::debug!(path = %path.display(), "Loading pipeline config file");
            let mut loaded = PipelineConfig::from_file(path)?;
            loaded.jobs.append(&mut config.jobs);
            config = loaded;
        }

        FeaturePipeline::new(config)
    }
}

impl Default for FeaturePipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
