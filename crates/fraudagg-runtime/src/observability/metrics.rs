//! In-process metrics for the feature engine
//!
//! Counters and histograms are shared behind `Arc` so that a pipeline and its
//! caller can hold the same handles.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Well-known metric names recorded by the engine
pub mod names {
    pub const AGGREGATE_FEATURE_CALLS: &str = "aggregate_feature_calls";
    pub const TIME_SINCE_PREVIOUS_CALLS: &str = "time_since_previous_calls";
    pub const ROWS_PROCESSED: &str = "rows_processed";
    pub const PARTITIONS_PROCESSED: &str = "partitions_processed";
    pub const CACHE_HITS: &str = "cache_hits";
    pub const CACHE_MISSES: &str = "cache_misses";
    pub const AGGREGATION_DURATION_MS: &str = "aggregation_duration_ms";
}

/// Monotonic counter
#[derive(Debug)]
pub struct Counter {
    name: String,
    value: AtomicU64,
}

impl Counter {
    /// Create a new counter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AtomicU64::new(0),
        }
    }

    /// Counter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Increment the counter
    pub fn inc(&self) {
        self.add(1);
    }

    /// Add a value to the counter
    pub fn add(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    /// Get the current value
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Reset the counter
    pub fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}

/// Histogram metric for tracking distributions
#[derive(Debug)]
pub struct Histogram {
    name: String,
    values: RwLock<Vec<f64>>,
}

impl Histogram {
    /// Create a new histogram
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: RwLock::new(Vec::new()),
        }
    }

    /// Histogram name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Observe a value
    pub fn observe(&self, value: f64) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value);
    }

    /// Observe a duration in milliseconds
    pub fn observe_duration(&self, duration: Duration) {
        self.observe(duration.as_secs_f64() * 1000.0);
    }

    /// Get count of observations
    pub fn count(&self) -> usize {
        self.values.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Get sum of all values
    pub fn sum(&self) -> f64 {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .sum()
    }

    /// Get average value, 0 when nothing was observed
    pub fn avg(&self) -> f64 {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }

    /// Get percentile (0-100), nearest rank
    pub fn percentile(&self, p: f64) -> f64 {
        let mut values = self
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if values.is_empty() {
            return 0.0;
        }

        values.sort_by(f64::total_cmp);
        let p = p.clamp(0.0, 100.0);
        let index = ((p / 100.0) * (values.len() - 1) as f64).round() as usize;
        values[index]
    }

    /// Reset the histogram
    pub fn reset(&self) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Summary of one histogram in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSummary {
    pub count: usize,
    pub sum: f64,
    pub avg: f64,
    pub p50: f64,
    pub p99: f64,
}

/// Point-in-time copy of every registered metric, sorted by name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, u64>,
    pub histograms: BTreeMap<String, HistogramSummary>,
}

impl MetricsSnapshot {
    /// Counter value, 0 for a counter never touched
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }
}

/// Metrics trait
pub trait Metrics: Send + Sync {
    /// Get or register a counter
    fn counter(&self, name: &str) -> Arc<Counter>;

    /// Get or register a histogram
    fn histogram(&self, name: &str) -> Arc<Histogram>;

    /// Record the duration of one engine operation
    fn record_execution_time(&self, operation: &str, duration: Duration);

    /// Record a failed operation by error kind
    fn record_error(&self, error_kind: &str);
}

/// Metrics collector
#[derive(Debug)]
pub struct MetricsCollector {
    counters: RwLock<HashMap<String, Arc<Counter>>>,
    histograms: RwLock<HashMap<String, Arc<Histogram>>>,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
            histograms: RwLock::new(HashMap::new()),
        }
    }

    /// Get all counter names
    pub fn counter_names(&self) -> Vec<String> {
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Get all histogram names
    pub fn histogram_names(&self) -> Vec<String> {
        self.histograms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Copy the current values of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, counter)| (name.clone(), counter.get()))
            .collect();

        let histograms = self
            .histograms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, histogram)| {
                let summary = HistogramSummary {
                    count: histogram.count(),
                    sum: histogram.sum(),
                    avg: histogram.avg(),
                    p50: histogram.percentile(50.0),
                    p99: histogram.percentile(99.0),
                };
                (name.clone(), summary)
            })
            .collect();

        MetricsSnapshot {
            counters,
            histograms,
        }
    }

    /// Reset all metrics
    pub fn reset_all(&self) {
        for counter in self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
        {
            counter.reset();
        }
        for histogram in self
            .histograms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
        {
            histogram.reset();
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics for MetricsCollector {
    fn counter(&self, name: &str) -> Arc<Counter> {
        self.counters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Counter::new(name)))
            .clone()
    }

    fn histogram(&self, name: &str) -> Arc<Histogram> {
        self.histograms
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Histogram::new(name)))
            .clone()
    }

    fn record_execution_time(&self, operation: &str, duration: Duration) {
        self.histogram(&format!("{}_duration_ms", operation))
            .observe_duration(duration);
    }

    fn record_error(&self, error_kind: &str) {
        self.counter(&format!("errors_{}", error_kind)).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        let counter = Counter::new(names::ROWS_PROCESSED);
        assert_eq!(counter.get(), 0);

        counter.inc();
        counter.add(41);
        assert_eq!(counter.get(), 42);
        assert_eq!(counter.name(), "rows_processed");

        counter.reset();
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_histogram() {
        let histogram = Histogram::new("latency");
        for value in [4.0, 1.0, 3.0, 2.0, 5.0] {
            histogram.observe(value);
        }

        assert_eq!(histogram.count(), 5);
        assert_eq!(histogram.sum(), 15.0);
        assert_eq!(histogram.avg(), 3.0);
        assert_eq!(histogram.percentile(0.0), 1.0);
        assert_eq!(histogram.percentile(50.0), 3.0);
        assert_eq!(histogram.percentile(100.0), 5.0);

        histogram.reset();
        assert_eq!(histogram.count(), 0);
        assert_eq!(histogram.avg(), 0.0);
        assert_eq!(histogram.percentile(50.0), 0.0);
    }

    #[test]
    fn test_observe_duration_in_millis() {
        let histogram = Histogram::new(names::AGGREGATION_DURATION_MS);
        histogram.observe_duration(Duration::from_millis(250));
        assert!((histogram.sum() - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_collector_shares_handles() {
        let collector = MetricsCollector::new();
        collector.counter(names::CACHE_HITS).inc();
        collector.counter(names::CACHE_HITS).inc();

        assert_eq!(collector.counter(names::CACHE_HITS).get(), 2);
        assert_eq!(collector.counter_names(), vec!["cache_hits".to_string()]);
    }

    #[test]
    fn test_record_execution_time_and_error() {
        let collector = MetricsCollector::new();
        collector.record_execution_time("aggregation", Duration::from_millis(10));
        collector.record_error("schema");

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.counter("errors_schema"), 1);
        assert_eq!(snapshot.histograms[names::AGGREGATION_DURATION_MS].count, 1);
        assert_eq!(snapshot.counter("never_touched"), 0);
    }

    #[test]
    fn test_reset_all() {
        let collector = MetricsCollector::new();
        collector.counter(names::ROWS_PROCESSED).add(100);
        collector.histogram("latency").observe(1.0);

        collector.reset_all();

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.counter(names::ROWS_PROCESSED), 0);
        assert_eq!(snapshot.histograms["latency"].count, 0);
    }
}
