//! Configuration for the BeagleBone pins bridge.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use pinsight_common::config::{LoggingConfig, ZenohConfig};

use crate::catalog::SourceCatalog;
use crate::error::{BridgeError, Result};
use crate::publisher::PayloadFormat;
use crate::scheduler::ScheduleMode;

/// Complete bridge configuration.
///
/// Every section has defaults, so an empty file (or no file at all)
/// gives a bridge that samples the stock BeagleBone header every 30
/// seconds and publishes on `beaglebone/pins`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeaglepinsBridgeConfig {
    #[serde(default)]
    pub zenoh: ZenohConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub pins: PinsConfig,

    #[serde(default)]
    pub status: StatusConfig,
}

/// Sampling and publishing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinsConfig {
    /// Key expression snapshots are published on.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default)]
    pub schedule: ScheduleMode,

    #[serde(default)]
    pub format: PayloadFormat,

    /// Longest a single put may take before the snapshot is dropped.
    #[serde(default = "default_publish_timeout_ms")]
    pub publish_timeout_ms: u64,

    #[serde(default)]
    pub gpio: GpioConfig,

    #[serde(default)]
    pub adc: AdcConfig,

    #[serde(default)]
    pub catalog: SourceCatalog,
}

fn default_key_prefix() -> String {
    "beaglebone/pins".to_string()
}

fn default_poll_interval() -> u64 {
    30
}

fn default_publish_timeout_ms() -> u64 {
    5_000
}

impl Default for PinsConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            poll_interval_secs: default_poll_interval(),
            schedule: ScheduleMode::default(),
            format: PayloadFormat::default(),
            publish_timeout_ms: default_publish_timeout_ms(),
            gpio: GpioConfig::default(),
            adc: AdcConfig::default(),
            catalog: SourceCatalog::default(),
        }
    }
}

impl PinsConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }
}

/// Sysfs GPIO location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpioConfig {
    #[serde(default = "default_gpio_root")]
    pub sysfs_root: String,
}

fn default_gpio_root() -> String {
    "/sys/class/gpio".to_string()
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            sysfs_root: default_gpio_root(),
        }
    }
}

/// IIO ADC location and calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdcConfig {
    #[serde(default = "default_adc_device")]
    pub device: String,

    /// Raw count of a full-scale sample (12-bit ADC).
    #[serde(default = "default_full_scale")]
    pub full_scale: u32,

    /// Volts per unit of normalized sample (the ADC reference).
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
}

fn default_adc_device() -> String {
    "/sys/bus/iio/devices/iio:device0".to_string()
}

fn default_full_scale() -> u32 {
    4095
}

fn default_scale_factor() -> f64 {
    1.8
}

impl Default for AdcConfig {
    fn default() -> Self {
        Self {
            device: default_adc_device(),
            full_scale: default_full_scale(),
            scale_factor: default_scale_factor(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Publish running/offline records on `<key_prefix>/@/status`.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl BeaglepinsBridgeConfig {
    /// Load and validate a JSON5 configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BridgeError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.zenoh
            .validate()
            .map_err(|e| BridgeError::validation(e.to_string()))?;

        let pins = &self.pins;

        if pins.key_prefix.trim().is_empty() {
            return Err(BridgeError::validation("key_prefix must not be empty"));
        }

        if pins.poll_interval_secs == 0 {
            return Err(BridgeError::validation("poll_interval_secs must be > 0"));
        }

        if pins.publish_timeout_ms == 0 {
            return Err(BridgeError::validation("publish_timeout_ms must be > 0"));
        }

        if pins.adc.full_scale == 0 {
            return Err(BridgeError::validation("adc.full_scale must be > 0"));
        }

        if !pins.adc.scale_factor.is_finite() || pins.adc.scale_factor <= 0.0 {
            return Err(BridgeError::validation(
                "adc.scale_factor must be a positive number",
            ));
        }

        if pins.catalog.is_empty() {
            return Err(BridgeError::validation(
                "catalog must list at least one source",
            ));
        }

        let dupes = pins.catalog.duplicates();
        if !dupes.is_empty() {
            return Err(BridgeError::validation(format!(
                "catalog lists these sources more than once: {}",
                dupes.join(", ")
            )));
        }

        Ok(())
    }
}
