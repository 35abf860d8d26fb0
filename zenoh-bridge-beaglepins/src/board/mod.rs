//! Board I/O capabilities.
//!
//! The sampling core only sees these three traits; the Linux
//! implementations live in the submodules and tests substitute fakes.

pub mod adc;
pub mod gpio;
pub mod header;
pub mod probe;

use std::io;

use crate::error::ReadError;

pub use adc::IioAdc;
pub use gpio::SysfsGpio;
pub use probe::DevNodeProbe;

/// Claim and read digital input lines by identifier.
pub trait DigitalLines {
    /// Configure the line as an input.
    fn claim(&mut self, id: &str) -> Result<(), ReadError>;

    /// Current level of a claimed line.
    fn read(&mut self, id: &str) -> Result<bool, ReadError>;

    /// Give the line back. Releasing an unclaimed line is a no-op.
    fn release(&mut self, id: &str) -> Result<(), ReadError>;
}

/// Read analog channels as a fraction of full scale.
pub trait AnalogInputs {
    /// One-time subsystem bring-up before the first read.
    fn init(&mut self) -> Result<(), ReadError>;

    /// Raw sample normalized to `[0, 1]`.
    fn read_normalized(&mut self, id: &str) -> Result<f64, ReadError>;
}

/// Check whether a device node can be opened.
pub trait DeviceProbe {
    /// Open and immediately close `path`. Must not leave a handle behind.
    fn probe(&self, path: &str) -> io::Result<()>;
}
