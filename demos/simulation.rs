//! Synthetic card transactions for the FRAUDAGG demos
//!
//! Customers spend around a personal mean amount at random terminals. Two
//! fraud patterns are injected: any amount above 220 is fraudulent, and each
//! day one terminal is compromised for the next 28 days.

use anyhow::anyhow;
use chrono::{DateTime, Duration, TimeZone, Utc};
use fraudagg_sdk::{columns, Schema, Table, Validator, Value};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Simulation settings
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub n_customers: i64,
    pub n_terminals: i64,
    pub n_days: i64,
    pub start: DateTime<Utc>,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_customers: 50,
            n_terminals: 100,
            n_days: 60,
            start: Utc
                .with_ymd_and_hms(2023, 9, 1, 0, 0, 0)
                .single()
                .unwrap_or_default(),
            seed: 42,
        }
    }
}

const HIGH_AMOUNT_THRESHOLD: f64 = 220.0;
const COMPROMISED_DAYS: i64 = 28;

/// Generate a shuffled transaction table with the standard columns
pub fn simulate_transactions(config: &SimulationConfig) -> anyhow::Result<Table> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mean_amounts: Vec<f64> = (0..config.n_customers)
        .map(|_| rng.gen_range(5.0..100.0))
        .collect();

    // terminal -> last day (exclusive) of its compromise
    let mut compromised: HashMap<i64, i64> = HashMap::new();
    let mut rows: Vec<HashMap<String, Value>> = Vec::new();

    for day in 0..config.n_days {
        let terminal = rng.gen_range(0..config.n_terminals);
        compromised.insert(terminal, day + COMPROMISED_DAYS);

        for customer in 0..config.n_customers {
            for _ in 0..rng.gen_range(0..4) {
                let seconds = rng.gen_range(6 * 3600..24 * 3600);
                let ts = config.start + Duration::days(day) + Duration::seconds(seconds);
                let terminal = rng.gen_range(0..config.n_terminals);

                let mean = mean_amounts[customer as usize];
                let mut amount = (mean + rng.gen_range(-mean / 2.0..mean / 2.0)).max(0.5);
                if rng.gen_bool(0.002) {
                    amount *= 5.0;
                }
                let amount = (amount * 100.0).round() / 100.0;

                let hacked = compromised.get(&terminal).is_some_and(|&until| day < until);
                let fraud = i64::from(amount > HIGH_AMOUNT_THRESHOLD || hacked);

                rows.push(HashMap::from([
                    (columns::TX_DATETIME.to_string(), Value::Timestamp(ts)),
                    (columns::CUSTOMER_ID.to_string(), Value::Integer(customer)),
                    (columns::TERMINAL_ID.to_string(), Value::Integer(terminal)),
                    (columns::TX_AMOUNT.to_string(), Value::Number(amount)),
                    (columns::TX_FRAUD.to_string(), Value::Integer(fraud)),
                ]));
            }
        }
    }

    // Arrival order is arbitrary
    rows.shuffle(&mut rng);

    let table = Table::from_rows(
        "transaction_id",
        &[
            columns::TX_DATETIME,
            columns::CUSTOMER_ID,
            columns::TERMINAL_ID,
            columns::TX_AMOUNT,
            columns::TX_FRAUD,
        ],
        rows,
    )?;

    Validator::new()
        .validate(&table, &Schema::transactions())
        .map_err(|errors| anyhow!("simulated table is invalid: {:?}", errors))?;
    Ok(table)
}

/// Print the first `n` rows of selected columns
pub fn print_head(table: &Table, columns: &[&str], n: usize) {
    println!("{}", columns.join(" | "));
    for row in 0..n.min(table.num_rows()) {
        let Some(cells) = table.row(row) else {
            break;
        };
        let line: Vec<String> = columns
            .iter()
            .map(|&c| match cells.get(c) {
                _ if c == table.index_name => table.index[row].to_string(),
                Some(Value::Number(x)) => format!("{:.3}", x),
                Some(v) => v.to_string(),
                None => "-".to_string(),
            })
            .collect();
        println!("{}", line.join(" | "));
    }
}
