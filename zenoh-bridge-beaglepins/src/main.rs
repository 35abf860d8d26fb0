//! Zenoh bridge for BeagleBone header pins.
//!
//! Samples GPIO inputs, ADC channels and SPI device availability on a
//! fixed interval and publishes one snapshot per cycle to Zenoh.

use anyhow::{Context, Result};
use clap::Parser;

use zenoh_bridge_beaglepins::BeaglepinsBridgeConfig;
use zenoh_bridge_beaglepins::args::BridgeArgs;
use zenoh_bridge_beaglepins::runner::{self, RunMode};

#[tokio::main]
async fn main() -> Result<()> {
    let args = BridgeArgs::parse();

    let config = match &args.config {
        Some(path) => BeaglepinsBridgeConfig::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => BeaglepinsBridgeConfig::default(),
    };

    let logging = runner::logging_config(&config, args.log_level.as_deref());
    pinsight_common::init_tracing(&logging).context("Failed to init tracing")?;

    match &args.config {
        Some(path) => tracing::info!("Loaded configuration from {:?}", path),
        None => tracing::info!("No configuration file given, using built-in defaults"),
    }

    let mode = if args.once {
        RunMode::Once
    } else {
        RunMode::Continuous
    };

    let stats = runner::run(config, mode).await?;

    tracing::info!(
        cycles = stats.cycles,
        published = stats.published,
        publish_failures = stats.publish_failures,
        "Bridge stopped"
    );

    Ok(())
}
