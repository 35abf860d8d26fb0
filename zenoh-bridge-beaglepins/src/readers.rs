//! The three source readers.
//!
//! Each reader wraps one board capability and turns its results into
//! values the aggregator can drop into a snapshot. Faults come back as
//! `Err` and are never fatal.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::board::{AnalogInputs, DeviceProbe, DigitalLines};
use crate::error::ReadError;
use crate::sample::{Liveness, to_voltage};

/// Outcome of configuring the digital lines at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimReport {
    pub claimed: Vec<String>,
    pub failed: Vec<String>,
}

/// Reads digital input levels.
///
/// Lines that fail to claim at startup are never read; their snapshot
/// entry stays the error marker for the life of the process.
#[derive(Debug)]
pub struct DigitalReader<L> {
    lines: L,
    claimed: HashSet<String>,
}

impl<L: DigitalLines> DigitalReader<L> {
    pub fn new(lines: L) -> Self {
        Self {
            lines,
            claimed: HashSet::new(),
        }
    }

    /// Claim every identifier as an input, carrying on past failures.
    pub fn configure<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) -> ClaimReport {
        let mut report = ClaimReport::default();
        for id in ids {
            match self.lines.claim(id) {
                Ok(()) => {
                    self.claimed.insert(id.to_string());
                    report.claimed.push(id.to_string());
                }
                Err(e) => {
                    warn!(pin = id, op = "claim", error = %e, "Failed to configure digital input");
                    report.failed.push(id.to_string());
                }
            }
        }
        report
    }

    pub fn claimed_count(&self) -> usize {
        self.claimed.len()
    }

    pub fn read(&mut self, id: &str) -> Result<bool, ReadError> {
        if !self.claimed.contains(id) {
            return Err(ReadError::NotClaimed { id: id.to_string() });
        }
        self.lines.read(id)
    }

    /// Release every claimed line, best effort. Returns how many released cleanly.
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        for id in std::mem::take(&mut self.claimed) {
            match self.lines.release(&id) {
                Ok(()) => released += 1,
                Err(e) => warn!(pin = %id, op = "release", error = %e, "Failed to release digital input"),
            }
        }
        debug!(released, "Released digital inputs");
        released
    }

    pub fn lines(&self) -> &L {
        &self.lines
    }
}

/// Reads analog inputs and converts them to volts.
#[derive(Debug)]
pub struct AnalogReader<A> {
    inputs: A,
    scale_factor: f64,
}

impl<A: AnalogInputs> AnalogReader<A> {
    /// `scale_factor` is the reference voltage of a full-scale sample.
    pub fn new(inputs: A, scale_factor: f64) -> Self {
        Self {
            inputs,
            scale_factor,
        }
    }

    pub fn init(&mut self) -> Result<(), ReadError> {
        self.inputs.init()
    }

    /// Voltage rounded to three decimals.
    pub fn read(&mut self, id: &str) -> Result<f64, ReadError> {
        let normalized = self.inputs.read_normalized(id)?;
        Ok(to_voltage(normalized, self.scale_factor))
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }
}

/// Probes bus device nodes for availability.
#[derive(Debug)]
pub struct BusProber<P> {
    probe: P,
}

impl<P: DeviceProbe> BusProber<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    /// A node that opens is active; busy, absent or forbidden is inactive.
    pub fn probe(&self, path: &str) -> Liveness {
        match self.probe.probe(path) {
            Ok(()) => Liveness::Active,
            Err(e) => {
                debug!(device = path, error = %e, "Bus device not available");
                Liveness::Inactive
            }
        }
    }
}
