//! Snapshot assembly.

use tracing::{info, warn};

use crate::board::{AnalogInputs, DeviceProbe, DigitalLines};
use crate::catalog::{SourceCatalog, SourceKind};
use crate::error::{BridgeError, Result};
use crate::readers::{AnalogReader, BusProber, ClaimReport, DigitalReader};
use crate::sample::SampleValue;
use crate::snapshot::Snapshot;

/// What one-time setup managed to bring up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupReport {
    pub analog_ready: bool,
    pub digital: ClaimReport,
}

/// Reads every catalog source, in catalog order, into one [`Snapshot`].
///
/// Capturing never fails: a source whose read faults gets
/// [`SampleValue::Error`] and the rest of the snapshot is unaffected.
#[derive(Debug)]
pub struct Aggregator<L, A, P> {
    catalog: SourceCatalog,
    digital: DigitalReader<L>,
    analog: AnalogReader<A>,
    prober: BusProber<P>,
}

impl<L, A, P> Aggregator<L, A, P>
where
    L: DigitalLines,
    A: AnalogInputs,
    P: DeviceProbe,
{
    /// Fails if an identifier appears more than once across the catalog.
    pub fn new(
        catalog: SourceCatalog,
        digital: DigitalReader<L>,
        analog: AnalogReader<A>,
        prober: BusProber<P>,
    ) -> Result<Self> {
        let dupes = catalog.duplicates();
        if !dupes.is_empty() {
            return Err(BridgeError::validation(format!(
                "duplicate source identifiers: {}",
                dupes.join(", ")
            )));
        }

        Ok(Self {
            catalog,
            digital,
            analog,
            prober,
        })
    }

    pub fn catalog(&self) -> &SourceCatalog {
        &self.catalog
    }

    /// Bring up the ADC and claim every digital line.
    ///
    /// Individual failures are logged and tolerated.
    pub fn setup(&mut self) -> SetupReport {
        let analog_ready = match self.analog.init() {
            Ok(()) => true,
            Err(e) => {
                warn!(op = "adc init", error = %e, "Analog subsystem unavailable; analog inputs will report errors");
                false
            }
        };

        let digital = self
            .digital
            .configure(self.catalog.digital.iter().map(String::as_str));

        info!(
            claimed = digital.claimed.len(),
            failed = digital.failed.len(),
            analog_ready,
            "Configured inputs"
        );

        SetupReport {
            analog_ready,
            digital,
        }
    }

    /// Sample every source once.
    pub fn capture(&mut self) -> Snapshot {
        let mut snapshot = Snapshot::new(self.catalog.len());

        for (kind, id) in self.catalog.iter() {
            let value = match kind {
                SourceKind::Digital => match self.digital.read(id) {
                    Ok(level) => SampleValue::Level(level),
                    Err(e) => {
                        warn!(pin = id, op = "digital read", error = %e, "Read failed");
                        SampleValue::Error
                    }
                },
                SourceKind::Analog => match self.analog.read(id) {
                    Ok(volts) => SampleValue::Voltage(volts),
                    Err(e) => {
                        warn!(pin = id, op = "analog read", error = %e, "Read failed");
                        SampleValue::Error
                    }
                },
                SourceKind::Bus => SampleValue::Liveness(self.prober.probe(id)),
            };
            snapshot.push(id, value);
        }

        snapshot
    }

    /// Release every claimed digital line. Returns how many released cleanly.
    pub fn release(&mut self) -> usize {
        self.digital.release_all()
    }
}
