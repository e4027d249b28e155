//! Simulate and aggregate example
//!
//! This example demonstrates:
//! - Generating a synthetic transaction table
//! - Running the default fraud preprocessing preset
//! - Adding a recency feature and reading the pipeline metrics

use anyhow::Context;
use fraudagg_demos::{print_head, simulate_transactions, SimulationConfig};
use fraudagg_sdk::{FeatureJob, FeaturePipeline, PipelineConfig};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fraudagg_runtime=info".parse()?)
                .add_directive("fraudagg_sdk=info".parse()?),
        )
        .init();

    println!("=== Simulate and Aggregate Example ===\n");

    let transactions = simulate_transactions(&SimulationConfig::default())
        .context("Failed to simulate transactions")?;
    println!("Simulated {} transactions\n", transactions.num_rows());

    let config = PipelineConfig::fraud_default()
        .with_parallel(true)
        .with_job(FeatureJob::time_since_previous("customer_id"));
    let pipeline = FeaturePipeline::new(config).context("Invalid pipeline configuration")?;

    let features = pipeline
        .run(&transactions)
        .context("Feature pipeline failed")?;

    print_head(
        &features,
        &[
            "transaction_id",
            "tx_datetime",
            "customer_id",
            "tx_amount",
            "customer_id_mean_tx_amount_5_days",
            "terminal_id_mean_tx_fraud_5_days",
            "time_since_last_tx",
        ],
        10,
    );

    let snapshot = pipeline.metrics_snapshot();
    println!("\nMetrics:");
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
