//! Common test utilities for SDK integration tests

use chrono::{DateTime, Duration, TimeZone, Utc};
use fraudagg_sdk::{Column, Table, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Test helper to build transaction tables row by row
pub struct TestTransactions {
    start: DateTime<Utc>,
    rows: Vec<(i64, i64, i64, f64, i64)>,
}

impl TestTransactions {
    /// Start an empty table; offsets are counted from 2023-09-01 00:00 UTC,
    /// a Friday
    pub fn new() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2023, 9, 1, 0, 0, 0).unwrap(),
            rows: Vec::new(),
        }
    }

    /// Add a transaction `minutes` after the start
    pub fn with_tx(
        mut self,
        minutes: i64,
        customer: i64,
        terminal: i64,
        amount: f64,
        fraud: i64,
    ) -> Self {
        self.rows.push((minutes, customer, terminal, amount, fraud));
        self
    }

    /// Add `n` random transactions over `days` days from a fixed seed
    pub fn with_random(mut self, seed: u64, n: usize, days: i64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..n {
            let minutes = rng.gen_range(0..days * 24 * 60);
            let customer = rng.gen_range(0..5);
            let terminal = rng.gen_range(0..8);
            let amount = f64::from(rng.gen_range(1..200u32));
            let fraud = i64::from(rng.gen_bool(0.05));
            self.rows.push((minutes, customer, terminal, amount, fraud));
        }
        self
    }

    /// Build the table with the standard transaction columns
    pub fn build(self) -> Table {
        let start = self.start;
        let rows = self.rows;
        Table::from_columns(
            "transaction_id",
            vec![
                Column::new(
                    "tx_datetime",
                    rows.iter()
                        .map(|r| Value::Timestamp(start + Duration::minutes(r.0)))
                        .collect(),
                ),
                Column::new("customer_id", rows.iter().map(|r| Value::Integer(r.1)).collect()),
                Column::new("terminal_id", rows.iter().map(|r| Value::Integer(r.2)).collect()),
                Column::new("tx_amount", rows.iter().map(|r| Value::Number(r.3)).collect()),
                Column::new("tx_fraud", rows.iter().map(|r| Value::Integer(r.4)).collect()),
            ],
        )
        .unwrap()
    }
}

/// Numeric view of a column
pub fn column_f64(table: &Table, name: &str) -> Vec<Option<f64>> {
    table
        .column(name)
        .unwrap()
        .values
        .iter()
        .map(Value::as_f64)
        .collect()
}
