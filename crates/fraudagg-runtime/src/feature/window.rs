//! Rolling window aggregation over a time-sorted partition
//!
//! For every row the window is the half-open interval `(t - w, t]` ending at
//! the row's own timestamp. The row itself is always inside its window; rows
//! that share its timestamp but come later in partition order are not.
//!
//! One two-pointer pass per window size keeps the running sum and count, so a
//! partition of `n` rows costs O(n) per window.

use crate::error::{Result, RuntimeError};
use fraudagg_core::{AggFunc, Value};

/// Running sum with Kahan compensation
#[derive(Debug, Default)]
struct RunningSum {
    sum: f64,
    compensation: f64,
    count: usize,
}

impl RunningSum {
    fn add(&mut self, value: f64) {
        self.count += 1;
        self.accumulate(value);
    }

    fn remove(&mut self, value: f64) {
        self.count -= 1;
        if self.count == 0 {
            // Drop accumulated rounding error with the last observation
            self.sum = 0.0;
            self.compensation = 0.0;
        } else {
            self.accumulate(-value);
        }
    }

    /// Restart from an exact sum of the live observations
    fn resum<'v>(&mut self, values: impl Iterator<Item = &'v Option<f64>>) {
        self.sum = 0.0;
        self.compensation = 0.0;
        for value in values.flatten() {
            self.accumulate(*value);
        }
    }

    fn accumulate(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    fn result(&self, func: AggFunc) -> Option<f64> {
        match func {
            AggFunc::Sum => Some(self.sum),
            AggFunc::Count => Some(self.count as f64),
            AggFunc::Mean if self.count == 0 => None,
            AggFunc::Mean => Some(self.sum / self.count as f64),
        }
    }
}

/// Rolling aggregator over one time-sorted partition
///
/// Missing feature cells are not observations. `None` in an output is the
/// "no value" marker of an empty mean window.
#[derive(Debug)]
pub struct WindowedAggregator<'a> {
    timestamps: &'a [i64],
    values: Vec<Option<f64>>,
}

impl<'a> WindowedAggregator<'a> {
    /// Create an aggregator over `values`, aligned with non-decreasing
    /// `timestamps` (microseconds).
    ///
    /// Strings and timestamps in the feature column are a schema error.
    pub fn new(timestamps: &'a [i64], feature_name: &str, values: &[Value]) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(RuntimeError::SchemaError(format!(
                "Feature '{}' has {} values for {} timestamps",
                feature_name,
                values.len(),
                timestamps.len()
            )));
        }

        let values = values
            .iter()
            .enumerate()
            .map(|(row, value)| match value {
                Value::Null => Ok(None),
                // NaN and infinities are missing, not observations
                Value::Number(n) if !n.is_finite() => Ok(None),
                v => v.as_f64().map(Some).ok_or_else(|| {
                    RuntimeError::SchemaError(format!(
                        "Feature '{}' must be numeric, found {} at row {}",
                        feature_name,
                        v.type_name(),
                        row
                    ))
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { timestamps, values })
    }

    /// Create an aggregator from already numeric values.
    ///
    /// Values must be finite.
    pub fn from_numeric(timestamps: &'a [i64], values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(timestamps.len(), values.len());
        Self { timestamps, values }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the partition is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// One aggregate per row over `(t - window_micros, t]`
    pub fn aggregate(&self, window_micros: i64, func: AggFunc) -> Vec<Option<f64>> {
        self.aggregate_many(window_micros, &[func])
            .pop()
            .unwrap_or_default()
    }

    /// Several aggregates over the same window in a single pass.
    ///
    /// Returns one vector per function, in the order given.
    pub fn aggregate_many(&self, window_micros: i64, funcs: &[AggFunc]) -> Vec<Vec<Option<f64>>> {
        let n = self.values.len();
        let mut outputs: Vec<Vec<Option<f64>>> =
            funcs.iter().map(|_| Vec::with_capacity(n)).collect();

        // (t, t] holds nothing, not even the row itself
        if window_micros <= 0 {
            let empty = RunningSum::default();
            for (output, &func) in outputs.iter_mut().zip(funcs) {
                output.resize(n, empty.result(func));
            }
            return outputs;
        }

        let mut running = RunningSum::default();
        let mut left = 0;

        for right in 0..n {
            // Evict before adding so a drained window restarts from zero
            let lower = self.timestamps[right].saturating_sub(window_micros);
            let mut evicted_max = 0.0_f64;
            while left < right && self.timestamps[left] <= lower {
                if let Some(value) = self.values[left] {
                    running.remove(value);
                    evicted_max = evicted_max.max(value.abs());
                }
                left += 1;
            }

            // Subtracting a value larger than what remains leaves its rounding
            // error in the sum
            if running.count > 0 && evicted_max > running.sum.abs() {
                running.resum(self.values[left..right].iter());
            }

            if let Some(value) = self.values[right] {
                running.add(value);
            }

            for (output, &func) in outputs.iter_mut().zip(funcs) {
                output.push(running.result(func));
            }
        }

        outputs
    }
}
