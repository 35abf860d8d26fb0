//! PinSight common library
//!
//! Shared plumbing for the board telemetry bridges:
//!
//! - [`config`] - Zenoh and logging settings, JSON5 loading
//! - [`session`] - Zenoh session setup
//! - [`serialization`] - JSON/CBOR payload encoding
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod serialization;
pub mod session;

pub use config::{LogFormat, LoggingConfig, ZenohConfig, load_config, parse_config};
pub use error::{Error, Result};
pub use serialization::{Format, decode, encode};
pub use session::connect;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides `config.level` when present.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .try_init(),
    };

    installed.map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))
}
