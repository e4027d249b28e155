//! Aggregation configuration
//!
//! Describes which rolling aggregates to compute: the window sizes, the unit
//! they are expressed in, the aggregation functions and the label delay.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

const MICROS_PER_MINUTE: i64 = 60 * 1_000_000;
const MICROS_PER_DAY: i64 = 24 * 60 * MICROS_PER_MINUTE;

/// Unit of window sizes and delay periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Days,
    Minutes,
}

impl TimeUnit {
    /// Name used in output column names
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Days => "days",
            TimeUnit::Minutes => "minutes",
        }
    }

    /// Length of `amount` units in microseconds
    pub fn to_micros(&self, amount: u32) -> i64 {
        let unit = match self {
            TimeUnit::Days => MICROS_PER_DAY,
            TimeUnit::Minutes => MICROS_PER_MINUTE,
        };
        (amount as i64).saturating_mul(unit)
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "days" => Ok(TimeUnit::Days),
            "minutes" => Ok(TimeUnit::Minutes),
            other => Err(CoreError::Config(format!("Unknown time unit: {}", other))),
        }
    }
}

/// Rolling aggregation function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFunc {
    Sum,
    Count,
    Mean,
}

impl AggFunc {
    /// Name used in output column names
    pub fn as_str(&self) -> &'static str {
        match self {
            AggFunc::Sum => "sum",
            AggFunc::Count => "count",
            AggFunc::Mean => "mean",
        }
    }
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggFunc {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sum" => Ok(AggFunc::Sum),
            "count" => Ok(AggFunc::Count),
            "mean" => Ok(AggFunc::Mean),
            other => Err(CoreError::Config(format!(
                "Unknown aggregation function: {}",
                other
            ))),
        }
    }
}

/// Rolling aggregation configuration for one feature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregationSpec {
    /// Window sizes, in `time_unit`, in output order
    pub window_sizes: Vec<u32>,

    /// Unit of window sizes and delay
    pub time_unit: TimeUnit,

    /// Aggregation functions, in output order
    pub functions: Vec<AggFunc>,

    /// Trailing period excluded from each window because its labels are not
    /// yet known, in `time_unit`
    #[serde(default)]
    pub delay: u32,
}

impl AggregationSpec {
    /// Create a new spec with no delay
    pub fn new(window_sizes: Vec<u32>, time_unit: TimeUnit, functions: Vec<AggFunc>) -> Self {
        Self {
            window_sizes,
            time_unit,
            functions,
            delay: 0,
        }
    }

    /// Set the delay period
    pub fn with_delay(mut self, delay: u32) -> Self {
        self.delay = delay;
        self
    }

    /// Build a spec from function names, rejecting unknown names
    pub fn from_names(
        window_sizes: Vec<u32>,
        time_unit: TimeUnit,
        functions: &[&str],
        delay: u32,
    ) -> Result<Self> {
        let functions = functions
            .iter()
            .map(|name| name.parse::<AggFunc>())
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(window_sizes, time_unit, functions).with_delay(delay))
    }

    /// Validate window sizes and functions
    pub fn validate(&self) -> Result<()> {
        if self.window_sizes.is_empty() {
            return Err(CoreError::Config(
                "At least one window size is required".to_string(),
            ));
        }

        if let Some(zero) = self.window_sizes.iter().find(|&&w| w == 0) {
            return Err(CoreError::Config(format!(
                "Window sizes must be positive, got {}",
                zero
            )));
        }

        let mut seen = HashSet::new();
        for window in &self.window_sizes {
            if !seen.insert(window) {
                return Err(CoreError::Config(format!("Duplicate window size: {}", window)));
            }
        }

        if self.functions.is_empty() {
            return Err(CoreError::Config(
                "At least one aggregation function is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for func in &self.functions {
            if !seen.insert(func) {
                return Err(CoreError::Config(format!(
                    "Duplicate aggregation function: {}",
                    func
                )));
            }
        }

        Ok(())
    }

    /// Number of output columns (windows x functions)
    pub fn output_width(&self) -> usize {
        self.window_sizes.len() * self.functions.len()
    }

    /// Output column name for one (window, function) pair:
    /// `<grouping_key>_<function>_<feature_name>_<window_size>_<unit>`
    pub fn column_name(
        &self,
        grouping_key: &str,
        func: AggFunc,
        feature_name: &str,
        window_size: u32,
    ) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            grouping_key,
            func.as_str(),
            feature_name,
            window_size,
            self.time_unit.as_str()
        )
    }

    /// All output column names, window-major
    pub fn column_names(&self, grouping_key: &str, feature_name: &str) -> Vec<String> {
        self.window_sizes
            .iter()
            .flat_map(|&window| {
                self.functions
                    .iter()
                    .map(move |&func| self.column_name(grouping_key, func, feature_name, window))
            })
            .collect()
    }
}
