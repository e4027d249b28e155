//! Configuration types for FeaturePipeline
//!
//! A pipeline is described by a YAML document: column roles, execution flags
//! and an ordered list of feature jobs.
//!
//! ```yaml
//! datetime_col: tx_datetime
//! parallel: true
//! calendar_features: true
//! jobs:
//!   - type: aggregate
//!     grouping_key: customer_id
//!     feature: tx_amount
//!     window_sizes: [1, 7, 30]
//!     unit: days
//!     functions: [count, mean]
//!   - type: time_since_previous
//!     grouping_key: customer_id
//! ```

use crate::error::{Result, SdkError};
use fraudagg_core::types::{columns, DEFAULT_INDEX_NAME};
use fraudagg_core::{AggFunc, AggregationSpec, TimeUnit};
use fraudagg_runtime::AssemblerOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One feature computation in a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureJob {
    /// Rolling aggregates of `feature` per `grouping_key`
    Aggregate {
        grouping_key: String,
        feature: String,
        window_sizes: Vec<u32>,
        #[serde(default = "default_unit")]
        unit: TimeUnit,
        /// Function names, checked when the pipeline is validated
        functions: Vec<String>,
        #[serde(default)]
        delay: u32,
    },

    /// Minutes since the previous transaction of the same `grouping_key`
    TimeSincePrevious { grouping_key: String },
}

fn default_unit() -> TimeUnit {
    TimeUnit::Days
}

impl FeatureJob {
    /// Create an aggregate job
    pub fn aggregate(
        grouping_key: impl Into<String>,
        feature: impl Into<String>,
        window_sizes: Vec<u32>,
        unit: TimeUnit,
        functions: &[AggFunc],
        delay: u32,
    ) -> Self {
        FeatureJob::Aggregate {
            grouping_key: grouping_key.into(),
            feature: feature.into(),
            window_sizes,
            unit,
            functions: functions.iter().map(|f| f.as_str().to_string()).collect(),
            delay,
        }
    }

    /// Create a recency job
    pub fn time_since_previous(grouping_key: impl Into<String>) -> Self {
        FeatureJob::TimeSincePrevious {
            grouping_key: grouping_key.into(),
        }
    }

    /// Operation name, used in logs and cache keys
    pub fn operation(&self) -> &'static str {
        match self {
            FeatureJob::Aggregate { .. } => "aggregate",
            FeatureJob::TimeSincePrevious { .. } => "time_since_previous",
        }
    }

    /// Grouping column of the job
    pub fn grouping_key(&self) -> &str {
        match self {
            FeatureJob::Aggregate { grouping_key, .. } => grouping_key,
            FeatureJob::TimeSincePrevious { grouping_key } => grouping_key,
        }
    }

    /// Validated aggregation spec, `None` for jobs that do not aggregate
    pub fn aggregation_spec(&self) -> Result<Option<AggregationSpec>> {
        match self {
            FeatureJob::Aggregate {
                window_sizes,
                unit,
                functions,
                delay,
                ..
            } => {
                let names: Vec<&str> = functions.iter().map(String::as_str).collect();
                let spec = AggregationSpec::from_names(window_sizes.clone(), *unit, &names, *delay)
                    .and_then(|spec| spec.validate().map(|_| spec))
                    .map_err(|e| SdkError::ConfigError(e.to_string()))?;
                Ok(Some(spec))
            }
            FeatureJob::TimeSincePrevious { .. } => Ok(None),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Timestamp column
    #[serde(default = "default_datetime_col")]
    pub datetime_col: String,

    /// Name of the dense output index
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Compute partitions on the rayon worker pool
    #[serde(default)]
    pub parallel: bool,

    /// Memoize job results by input content
    #[serde(default)]
    pub enable_cache: bool,

    /// Enable metrics collection
    #[serde(default = "default_true")]
    pub enable_metrics: bool,

    /// Add weekday, night and time-of-day encodings before the jobs run
    #[serde(default)]
    pub calendar_features: bool,

    /// Feature jobs, applied in order
    #[serde(default)]
    pub jobs: Vec<FeatureJob>,
}

fn default_datetime_col() -> String {
    columns::TX_DATETIME.to_string()
}

fn default_index_name() -> String {
    DEFAULT_INDEX_NAME.to_string()
}

fn default_true() -> bool {
    true
}

impl PipelineConfig {
    /// Create a configuration with default column roles and no jobs
    pub fn new() -> Self {
        Self {
            datetime_col: default_datetime_col(),
            index_name: default_index_name(),
            parallel: false,
            enable_cache: false,
            enable_metrics: true,
            calendar_features: false,
            jobs: Vec::new(),
        }
    }

    /// Preprocessing used to train the fraud classifier: calendar
    /// encodings, the customer's mean amount over 5 days and the terminal's
    /// fraud rate over 5 days, excluding the last 7 days of unknown labels.
    pub fn fraud_default() -> Self {
        Self::new()
            .with_calendar_features(true)
            .with_job(FeatureJob::aggregate(
                columns::CUSTOMER_ID,
                columns::TX_AMOUNT,
                vec![5],
                TimeUnit::Days,
                &[AggFunc::Mean],
                0,
            ))
            .with_job(FeatureJob::aggregate(
                columns::TERMINAL_ID,
                columns::TX_FRAUD,
                vec![5],
                TimeUnit::Days,
                &[AggFunc::Mean],
                7,
            ))
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Append a job
    pub fn with_job(mut self, job: FeatureJob) -> Self {
        self.jobs.push(job);
        self
    }

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

    /// Enable parallel partition processing
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enable memoization
    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Enable metrics
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Enable calendar features
    pub fn with_calendar_features(mut self, enable: bool) -> Self {
        self.calendar_features = enable;
        self
    }

    /// Check column roles and every job's aggregation settings
    pub fn validate(&self) -> Result<()> {
        if self.datetime_col.is_empty() {
            return Err(SdkError::ConfigError(
                "datetime_col must not be empty".to_string(),
            ));
        }
        if self.index_name.is_empty() {
            return Err(SdkError::ConfigError(
                "index_name must not be empty".to_string(),
            ));
        }

        for (i, job) in self.jobs.iter().enumerate() {
            if job.grouping_key().is_empty() {
                return Err(SdkError::ConfigError(format!(
                    "Job {} ({}): grouping_key must not be empty",
                    i,
                    job.operation()
                )));
            }
            job.aggregation_spec().map_err(|e| match e {
                SdkError::ConfigError(msg) => {
                    SdkError::ConfigError(format!("Job {} ({}): {}", i, job.operation(), msg))
                }
                other => other,
            })?;
        }

        Ok(())
    }

    /// Assembler options derived from this configuration
    pub fn assembler_options(&self) -> AssemblerOptions {
        AssemblerOptions::default()
            .with_datetime_col(self.datetime_col.clone())
            .with_index_name(self.index_name.clone())
            .with_parallel(self.parallel)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_config_defaults() {
        let config = PipelineConfig::new();
        assert_eq!(config.datetime_col, "tx_datetime");
        assert_eq!(config.index_name, "transaction_id");
        assert!(!config.parallel);
        assert!(!config.enable_cache);
        assert!(config.enable_metrics);
        assert!(!config.calendar_features);
        assert!(config.jobs.is_empty());
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_builder_style_setters() {
        let config = PipelineConfig::new()
            .with_datetime_col("ts")
            .with_index_name("id")
            .with_parallel(true)
            .with_cache(true)
            .with_metrics(false)
            .with_job(FeatureJob::time_since_previous("terminal_id"));

        assert_eq!(config.datetime_col, "ts");
        assert_eq!(config.index_name, "id");
        assert!(config.parallel);
        assert!(config.enable_cache);
        assert!(!config.enable_metrics);
        assert_eq!(config.jobs.len(), 1);

        let options = config.assembler_options();
        assert_eq!(options.datetime_col, "ts");
        assert!(options.parallel);
    }

    #[test]
    fn test_fraud_default() {
        let config = PipelineConfig::fraud_default();
        assert!(config.calendar_features);
        assert_eq!(config.jobs.len(), 2);
        assert!(config.validate().is_ok());

        let spec = config.jobs[1].aggregation_spec().unwrap().unwrap();
        assert_eq!(spec.delay, 7);
        assert_eq!(spec.functions, vec![AggFunc::Mean]);
        assert_eq!(config.jobs[1].grouping_key(), "terminal_id");
    }

    #[test]
    fn test_from_yaml_str() {
        let yaml = r#"
parallel: true
jobs:
  - type: aggregate
    grouping_key: customer_id
    feature: tx_amount
    window_sizes: [1, 7]
    functions: [sum, mean]
  - type: time_since_previous
    grouping_key: customer_id
"#;
        let config = PipelineConfig::from_yaml_str(yaml).unwrap();
        assert!(config.parallel);
        assert!(config.enable_metrics);
        assert_eq!(config.datetime_col, "tx_datetime");
        assert_eq!(
            config.jobs[0],
            FeatureJob::aggregate(
                "customer_id",
                "tx_amount",
                vec![1, 7],
                TimeUnit::Days,
                &[AggFunc::Sum, AggFunc::Mean],
                0
            )
        );
        assert_eq!(config.jobs[1].operation(), "time_since_previous");
    }

    #[test]
    fn test_unknown_function_is_config_error() {
        let yaml = r#"
jobs:
  - type: aggregate
    grouping_key: customer_id
    feature: tx_amount
    window_sizes: [5]
    functions: [median]
"#;
        let err = PipelineConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, SdkError::ConfigError(ref msg) if msg.contains("median")));
    }

    #[test]
    fn test_empty_windows_is_config_error() {
        let config = PipelineConfig::new().with_job(FeatureJob::aggregate(
            "customer_id",
            "tx_amount",
            vec![],
            TimeUnit::Days,
            &[AggFunc::Sum],
            0,
        ));
        assert!(matches!(config.validate(), Err(SdkError::ConfigError(_))));
    }

    #[test]
    fn test_unknown_job_type_is_yaml_error() {
        let yaml = "jobs:\n  - type: forecast\n    grouping_key: customer_id\n";
        let err = PipelineConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, SdkError::YamlError(_)));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = PipelineConfig::fraud_default().with_parallel(true);
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("type: aggregate"));
        assert_eq!(PipelineConfig::from_yaml_str(&yaml).unwrap(), config);
    }
}
