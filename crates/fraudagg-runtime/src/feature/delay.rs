//! Label-delay correction
//!
//! Labels of the most recent transactions are not yet known at prediction
//! time. For window `w` and delay `d` the corrected aggregate at `t` is the
//! aggregate over `(t - (w + d), t]` minus the aggregate over `(t - d, t]`,
//! which leaves the causal window `(t - (w + d), t - d]`.

use super::window::WindowedAggregator;
use fraudagg_core::{AggFunc, TimeUnit};

/// Subtracts the trailing delay window from a widened window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayCorrector {
    delay: u32,
    unit: TimeUnit,
}

impl DelayCorrector {
    /// Create a corrector for a delay expressed in `unit`
    pub fn new(delay: u32, unit: TimeUnit) -> Self {
        Self { delay, unit }
    }

    /// Whether any correction is applied
    pub fn is_active(&self) -> bool {
        self.delay > 0
    }

    /// Corrected aggregates for one window size, one vector per function.
    ///
    /// A "no value" on either side of the subtraction stays "no value".
    /// Means of differently sized windows are subtracted as they are.
    pub fn apply(
        &self,
        aggregator: &WindowedAggregator<'_>,
        window: u32,
        funcs: &[AggFunc],
    ) -> Vec<Vec<Option<f64>>> {
        if !self.is_active() {
            return aggregator.aggregate_many(self.unit.to_micros(window), funcs);
        }

        let widened_micros = self.unit.to_micros(window.saturating_add(self.delay));
        let widened = aggregator.aggregate_many(widened_micros, funcs);
        let trailing = aggregator.aggregate_many(self.unit.to_micros(self.delay), funcs);

        widened
            .into_iter()
            .zip(trailing)
            .map(|(a, b)| {
                a.into_iter()
                    .zip(b)
                    .map(|(a, b)| match (a, b) {
                        (Some(a), Some(b)) => Some(a - b),
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400_000_000;

    #[test]
    fn test_zero_delay_is_plain_window() {
        let ts = [0, 2 * DAY, 6 * DAY];
        let agg = WindowedAggregator::from_numeric(&ts, vec![Some(10.0), Some(20.0), Some(30.0)]);

        let out = DelayCorrector::new(0, TimeUnit::Days).apply(&agg, 5, &[AggFunc::Mean]);
        assert_eq!(out, vec![vec![Some(10.0), Some(15.0), Some(25.0)]]);
    }

    #[test]
    fn test_one_day_delay_mean() {
        let ts = [0, 2 * DAY, 6 * DAY];
        let agg = WindowedAggregator::from_numeric(&ts, vec![Some(10.0), Some(20.0), Some(30.0)]);

        let out = DelayCorrector::new(1, TimeUnit::Days).apply(&agg, 5, &[AggFunc::Mean]);
        assert_eq!(out, vec![vec![Some(0.0), Some(-5.0), Some(-5.0)]]);
    }

    #[test]
    fn test_delay_matches_window_difference_for_sum_and_count() {
        let ts = [0, DAY, 3 * DAY, 4 * DAY, 9 * DAY, 9 * DAY];
        let values = vec![Some(1.0), None, Some(4.0), Some(2.0), Some(8.0), Some(3.0)];
        let agg = WindowedAggregator::from_numeric(&ts, values);
        let funcs = [AggFunc::Sum, AggFunc::Count];

        let out = DelayCorrector::new(2, TimeUnit::Days).apply(&agg, 3, &funcs);
        let a = agg.aggregate_many(5 * DAY, &funcs);
        let b = agg.aggregate_many(2 * DAY, &funcs);

        for f in 0..funcs.len() {
            for row in 0..ts.len() {
                let expected = a[f][row].unwrap() - b[f][row].unwrap();
                assert_eq!(out[f][row], Some(expected));
            }
        }
    }

    #[test]
    fn test_no_value_propagates() {
        let ts = [0, DAY];
        let agg = WindowedAggregator::from_numeric(&ts, vec![None, Some(1.0)]);
        let out = DelayCorrector::new(1, TimeUnit::Days).apply(&agg, 1, &[AggFunc::Mean]);
        assert_eq!(out, vec![vec![None, Some(0.0)]]);
    }

    #[test]
    fn test_minutes_unit() {
        let min = 60_000_000;
        let ts = [0, 10 * min];
        let agg = WindowedAggregator::from_numeric(&ts, vec![Some(1.0), Some(1.0)]);
        let out = DelayCorrector::new(5, TimeUnit::Minutes).apply(&agg, 10, &[AggFunc::Count]);
        assert_eq!(out, vec![vec![Some(0.0), Some(1.0)]]);
    }
}
