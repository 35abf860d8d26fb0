//! The fixed set of sources sampled every cycle.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Which reader handles a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Digital,
    Analog,
    Bus,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Digital => "digital",
            SourceKind::Analog => "analog",
            SourceKind::Bus => "bus",
        }
    }
}

/// BeagleBone header pins usable as digital inputs.
pub const DEFAULT_DIGITAL_PINS: &[&str] = &[
    "P8_3", "P8_4", "P8_5", "P8_6", "P8_7", "P8_8", "P8_9", "P8_10", "P8_11", "P8_12", "P8_13",
    "P8_14", "P8_15", "P8_16", "P8_17", "P8_18", "P8_19", "P8_20", "P8_21", "P8_22", "P8_23",
    "P8_24", "P8_25", "P8_26", "P9_11", "P9_12", "P9_13", "P9_14", "P9_15", "P9_16", "P9_17",
    "P9_18", "P9_19", "P9_20", "P9_21", "P9_22", "P9_23", "P9_25", "P9_27", "P9_28", "P9_29",
    "P9_30", "P9_31", "P9_41", "P9_42",
];

/// BeagleBone header pins wired to the ADC.
pub const DEFAULT_ANALOG_PINS: &[&str] = &[
    "P9_33", "P9_35", "P9_36", "P9_37", "P9_38", "P9_39", "P9_40",
];

/// SPI device nodes probed for activity.
pub const DEFAULT_BUS_DEVICES: &[&str] = &[
    "/dev/spidev0.0",
    "/dev/spidev0.1",
    "/dev/spidev1.0",
    "/dev/spidev1.1",
];

/// Ordered source identifiers, one list per reader.
///
/// Built once at startup and never changed afterwards. Snapshot keys
/// follow the order digital, analog, bus, and within each list the
/// configured order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCatalog {
    #[serde(default = "default_digital")]
    pub digital: Vec<String>,

    #[serde(default = "default_analog")]
    pub analog: Vec<String>,

    #[serde(default = "default_bus")]
    pub bus: Vec<String>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn default_digital() -> Vec<String> {
    owned(DEFAULT_DIGITAL_PINS)
}

fn default_analog() -> Vec<String> {
    owned(DEFAULT_ANALOG_PINS)
}

fn default_bus() -> Vec<String> {
    owned(DEFAULT_BUS_DEVICES)
}

impl Default for SourceCatalog {
    fn default() -> Self {
        Self {
            digital: default_digital(),
            analog: default_analog(),
            bus: default_bus(),
        }
    }
}

impl SourceCatalog {
    pub fn new(digital: Vec<String>, analog: Vec<String>, bus: Vec<String>) -> Self {
        Self {
            digital,
            analog,
            bus,
        }
    }

    /// Total number of sources, which is also the size of every snapshot.
    pub fn len(&self) -> usize {
        self.digital.len() + self.analog.len() + self.bus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All sources in snapshot order.
    pub fn iter(&self) -> impl Iterator<Item = (SourceKind, &str)> {
        let digital = self.digital.iter().map(|id| (SourceKind::Digital, id.as_str()));
        let analog = self.analog.iter().map(|id| (SourceKind::Analog, id.as_str()));
        let bus = self.bus.iter().map(|id| (SourceKind::Bus, id.as_str()));
        digital.chain(analog).chain(bus)
    }

    /// Identifiers appearing more than once anywhere in the catalog.
    pub fn duplicates(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut dupes = Vec::new();
        for (_, id) in self.iter() {
            if !seen.insert(id) && !dupes.iter().any(|d| d == id) {
                dupes.push(id.to_string());
            }
        }
        dupes
    }
}
