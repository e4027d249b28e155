//! YAML pipeline example
//!
//! Loads `demos/pipelines/fraud_features.yaml` and runs it twice over the same
//! simulated table; the second run is answered from the feature cache.

use anyhow::Context;
use fraudagg_demos::{print_head, simulate_transactions, SimulationConfig};
use fraudagg_sdk::FeaturePipelineBuilder;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== YAML Pipeline Example ===\n");

    let pipeline = FeaturePipelineBuilder::new()
        .with_config_file("demos/pipelines/fraud_features.yaml")
        .build()
        .context("Failed to load demos/pipelines/fraud_features.yaml")?;
    println!("Loaded {} jobs\n", pipeline.config().jobs.len());

    let config = SimulationConfig {
        n_customers: 20,
        n_days: 45,
        ..SimulationConfig::default()
    };
    let transactions = simulate_transactions(&config)?;

    let features = pipeline.run(&transactions)?;
    let again = pipeline.run(&transactions)?;
    assert_eq!(features, again);

    print_head(
        &features,
        &[
            "customer_id",
            "tx_amount",
            "is_night",
            "customer_id_count_tx_amount_7_days",
            "customer_id_mean_tx_amount_30_days",
            "terminal_id_mean_tx_fraud_7_days",
        ],
        10,
    );

    if let Some(stats) = pipeline.cache_stats() {
        println!(
            "\nCache: {} hits, {} misses, {} entries",
            stats.hits, stats.misses, stats.entries
        );
    }

    Ok(())
}
