use std::time::Duration;

use zenoh::Session;

use crate::config::ZenohConfig;
use crate::error::{Error, Result};

/// Translate [`ZenohConfig`] into a native `zenoh::Config`.
pub fn zenoh_config(config: &ZenohConfig) -> Result<zenoh::Config> {
    config.validate()?;

    let mut zenoh_config = zenoh::Config::default();

    zenoh_config
        .insert_json5("mode", &format!("\"{}\"", config.mode))
        .map_err(|e| Error::Config(format!("Failed to set mode: {}", e)))?;

    for (key, endpoints) in [
        ("connect/endpoints", &config.connect),
        ("listen/endpoints", &config.listen),
    ] {
        if endpoints.is_empty() {
            continue;
        }
        let json = serde_json::to_string(endpoints)?;
        zenoh_config
            .insert_json5(key, &json)
            .map_err(|e| Error::Config(format!("Failed to set {}: {}", key, e)))?;
    }

    Ok(zenoh_config)
}

/// Open a Zenoh session, giving up after `connect_timeout_ms`.
pub async fn connect(config: &ZenohConfig) -> Result<Session> {
    let zenoh_config = zenoh_config(config)?;

    tracing::info!(
        mode = %config.mode,
        connect = ?config.connect,
        listen = ?config.listen,
        "Connecting to Zenoh"
    );

    let timeout = Duration::from_millis(config.connect_timeout_ms);
    let session = tokio::time::timeout(timeout, zenoh::open(zenoh_config))
        .await
        .map_err(|_| Error::ConnectTimeout(config.connect_timeout_ms))??;

    tracing::info!(zid = %session.zid(), "Connected to Zenoh");

    Ok(session)
}
