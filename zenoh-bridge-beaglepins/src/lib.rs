//! Zenoh bridge for BeagleBone header pins.
//!
//! Every cycle the bridge reads the configured digital inputs, converts
//! the ADC channels to volts and checks which SPI device nodes can be
//! opened, then publishes the whole capture as one message.
//!
//! # Key Expressions
//!
//! ```text
//! beaglebone/pins            one snapshot per cycle
//! beaglebone/pins/@/status   running / offline records
//! ```
//!
//! # Payload
//!
//! ```text
//! {"P8_3": true, "P9_33": 0.900, "/dev/spidev0.0": "Active", "P8_4": "ERROR"}
//! ```

pub mod aggregator;
pub mod args;
pub mod board;
pub mod catalog;
pub mod config;
pub mod error;
pub mod publisher;
pub mod readers;
pub mod runner;
pub mod sample;
pub mod scheduler;
pub mod snapshot;
pub mod status;

pub use aggregator::{Aggregator, SetupReport};
pub use catalog::{SourceCatalog, SourceKind};
pub use config::BeaglepinsBridgeConfig;
pub use error::{BridgeError, ReadError, Result};
pub use publisher::{PayloadFormat, Publisher, SnapshotSink, ZenohSink};
pub use sample::{Liveness, SampleValue};
pub use scheduler::{CycleStats, ScheduleMode, Scheduler, SchedulerState};
pub use snapshot::Snapshot;
