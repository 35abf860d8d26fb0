//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Publishes BeagleBone GPIO, ADC and SPI activity snapshots to Zenoh.
#[derive(Parser, Debug, Clone)]
#[command(name = "zenoh-bridge-beaglepins")]
#[command(version)]
pub struct BridgeArgs {
    /// Path to configuration file (JSON5). Built-in defaults when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Run a single capture-and-publish cycle, then exit.
    #[arg(long)]
    pub once: bool,
}
