//! Wiring the configured board drivers to a Zenoh-backed scheduler.

use std::sync::Arc;

use tracing::{info, warn};

use pinsight_common::LoggingConfig;

use crate::aggregator::Aggregator;
use crate::board::{DevNodeProbe, IioAdc, SysfsGpio};
use crate::config::BeaglepinsBridgeConfig;
use crate::error::{BridgeError, Result};
use crate::publisher::{Publisher, SnapshotSink, ZenohSink};
use crate::readers::{AnalogReader, BusProber, DigitalReader};
use crate::scheduler::{CycleStats, Scheduler};
use crate::status::StatusReporter;

/// Bridge name used in logs and status records.
pub const BRIDGE_NAME: &str = "beaglepins";

/// Scheduler over the Linux sysfs/IIO/devnode drivers.
pub type BoardScheduler<S> = Scheduler<SysfsGpio, IioAdc, DevNodeProbe, S>;

/// Whether to loop until interrupted or stop after one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Continuous,
    Once,
}

/// Logging settings with an optional CLI level override applied.
pub fn logging_config(config: &BeaglepinsBridgeConfig, level: Option<&str>) -> LoggingConfig {
    let mut logging = config.logging.clone();
    if let Some(level) = level {
        logging.level = level.to_string();
    }
    logging
}

/// Build a scheduler in the `Initializing` state publishing to `sink`.
///
/// Fails on a catalog with duplicate identifiers.
pub fn build_scheduler<S: SnapshotSink>(
    config: &BeaglepinsBridgeConfig,
    sink: S,
) -> Result<BoardScheduler<S>> {
    let pins = &config.pins;

    let aggregator = Aggregator::new(
        pins.catalog.clone(),
        DigitalReader::new(SysfsGpio::new(&pins.gpio.sysfs_root)),
        AnalogReader::new(
            IioAdc::new(&pins.adc.device, f64::from(pins.adc.full_scale)),
            pins.adc.scale_factor,
        ),
        BusProber::new(DevNodeProbe),
    )?;

    let publisher = Publisher::new(
        sink,
        pins.key_prefix.clone(),
        pins.format,
        pins.publish_timeout(),
    );

    let scheduler = Scheduler::new(aggregator, publisher, pins.poll_interval(), pins.schedule);

    if config.status.enabled {
        let metadata = serde_json::json!({
            "poll_interval_secs": pins.poll_interval_secs,
            "format": pins.format,
            "sources": {
                "digital": pins.catalog.digital.len(),
                "analog": pins.catalog.analog.len(),
                "bus": pins.catalog.bus.len(),
            },
        });
        Ok(scheduler.with_status(
            StatusReporter::new(BRIDGE_NAME, env!("CARGO_PKG_VERSION")).with_metadata(metadata),
        ))
    } else {
        Ok(scheduler)
    }
}

/// Drive an already-built scheduler from `Initializing` to `Stopped`.
pub async fn drive<S, F>(
    scheduler: &mut BoardScheduler<S>,
    mode: RunMode,
    shutdown: F,
) -> Result<CycleStats>
where
    S: SnapshotSink,
    F: std::future::Future<Output = ()>,
{
    scheduler.initialize().await?;

    match mode {
        RunMode::Once => {
            scheduler.run_cycle().await?;
            scheduler.stop().await;
            Ok(scheduler.stats())
        }
        RunMode::Continuous => scheduler.run(shutdown).await,
    }
}

/// Connect to Zenoh and run the bridge until interrupted.
///
/// A Zenoh connection failure here is fatal: no cycle runs.
pub async fn run(config: BeaglepinsBridgeConfig, mode: RunMode) -> Result<CycleStats> {
    info!(
        bridge = BRIDGE_NAME,
        version = env!("CARGO_PKG_VERSION"),
        digital = config.pins.catalog.digital.len(),
        analog = config.pins.catalog.analog.len(),
        bus = config.pins.catalog.bus.len(),
        "Starting bridge"
    );

    let session = Arc::new(
        pinsight_common::connect(&config.zenoh)
            .await
            .map_err(|e| BridgeError::ZenohConnection(e.to_string()))?,
    );

    let stats = match build_scheduler(&config, ZenohSink::new(session.clone())) {
        Ok(mut scheduler) => drive(&mut scheduler, mode, shutdown_signal()).await,
        Err(e) => Err(e),
    };

    if let Err(e) = session.close().await {
        warn!(error = %e, "Error closing Zenoh session");
    }

    info!(bridge = BRIDGE_NAME, "Goodbye!");
    stats
}

/// Completes on Ctrl+C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
