//! Peripheral bus liveness by opening the device node.

use std::fs::OpenOptions;
use std::io;

use super::DeviceProbe;

/// Opens device nodes read-only and closes them immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct DevNodeProbe;

impl DeviceProbe for DevNodeProbe {
    fn probe(&self, path: &str) -> io::Result<()> {
        // The handle is dropped, and the descriptor closed, before returning.
        let _file = OpenOptions::new().read(true).open(path)?;
        Ok(())
    }
}
