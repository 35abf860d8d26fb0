//! In-memory board and sink shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use zenoh_bridge_beaglepins::board::{AnalogInputs, DeviceProbe, DigitalLines};
use zenoh_bridge_beaglepins::readers::{AnalogReader, BusProber, DigitalReader};
use zenoh_bridge_beaglepins::{
    Aggregator, BridgeError, PayloadFormat, Publisher, ReadError, ScheduleMode, Scheduler,
    SnapshotSink, SourceCatalog,
};

#[derive(Debug, Default)]
pub struct BoardState {
    pub levels: HashMap<String, bool>,
    pub refuse_claim: HashSet<String>,
    pub fail_read: HashSet<String>,
    pub analog: HashMap<String, f64>,
    pub adc_down: bool,
    pub devices: HashSet<String>,
    pub claimed: HashSet<String>,
    pub released: Vec<String>,
    pub open_handles: usize,
    pub probes: usize,
}

/// Shared handle; clones see the same state.
#[derive(Debug, Clone, Default)]
pub struct FakeBoard(pub Arc<Mutex<BoardState>>);

impl FakeBoard {
    pub fn with<R>(&self, f: impl FnOnce(&mut BoardState) -> R) -> R {
        f(&mut self.0.lock().unwrap())
    }
}

pub struct FakeLines(pub FakeBoard);
pub struct FakeAdc(pub FakeBoard);
pub struct FakeProbe(pub FakeBoard);

impl DigitalLines for FakeLines {
    fn claim(&mut self, id: &str) -> Result<(), ReadError> {
        self.0.with(|s| {
            if s.refuse_claim.contains(id) {
                return Err(ReadError::UnknownPin { id: id.to_string() });
            }
            s.claimed.insert(id.to_string());
            Ok(())
        })
    }

    fn read(&mut self, id: &str) -> Result<bool, ReadError> {
        self.0.with(|s| {
            if s.fail_read.contains(id) {
                return Err(ReadError::io(
                    id,
                    "read value",
                    io::Error::other("bus glitch"),
                ));
            }
            Ok(s.levels.get(id).copied().unwrap_or(false))
        })
    }

    fn release(&mut self, id: &str) -> Result<(), ReadError> {
        self.0.with(|s| {
            s.claimed.remove(id);
            s.released.push(id.to_string());
        });
        Ok(())
    }
}

impl AnalogInputs for FakeAdc {
    fn init(&mut self) -> Result<(), ReadError> {
        self.0.with(|s| {
            if s.adc_down {
                Err(ReadError::AdcUnavailable {
                    reason: "no iio device".to_string(),
                })
            } else {
                Ok(())
            }
        })
    }

    fn read_normalized(&mut self, id: &str) -> Result<f64, ReadError> {
        self.0.with(|s| {
            if s.adc_down {
                return Err(ReadError::AdcUnavailable {
                    reason: "not initialized".to_string(),
                });
            }
            s.analog
                .get(id)
                .copied()
                .ok_or_else(|| ReadError::UnknownPin { id: id.to_string() })
        })
    }
}

impl DeviceProbe for FakeProbe {
    fn probe(&self, path: &str) -> io::Result<()> {
        self.0.with(|s| {
            s.probes += 1;
            if s.devices.contains(path) {
                s.open_handles += 1;
                // closed again before returning
                s.open_handles -= 1;
                Ok(())
            } else {
                Err(io::Error::new(io::ErrorKind::NotFound, "no such device"))
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct Put {
    pub key: String,
    pub payload: Vec<u8>,
    pub at: Instant,
}

impl Put {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.payload).expect("payload is JSON")
    }
}

/// Records every put; call numbers listed in `fail_calls` are rejected
/// and those in `stalls` take the given time to complete.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub puts: Arc<Mutex<Vec<Put>>>,
    pub attempts: Arc<Mutex<usize>>,
    pub fail_calls: Arc<Mutex<HashSet<usize>>>,
    pub stalls: Arc<Mutex<HashMap<usize, Duration>>>,
}

impl RecordingSink {
    pub fn failing_on(calls: &[usize]) -> Self {
        let sink = Self::default();
        sink.fail_calls.lock().unwrap().extend(calls.iter().copied());
        sink
    }

    pub fn stalling_on(call: usize, delay: Duration) -> Self {
        let sink = Self::default();
        sink.stalls.lock().unwrap().insert(call, delay);
        sink
    }

    pub fn puts(&self) -> Vec<Put> {
        self.puts.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl SnapshotSink for RecordingSink {
    async fn put(&self, key: &str, payload: Vec<u8>) -> zenoh_bridge_beaglepins::Result<()> {
        let call = {
            let mut attempts = self.attempts.lock().unwrap();
            let call = *attempts;
            *attempts += 1;
            call
        };

        let stall = self.stalls.lock().unwrap().get(&call).copied();
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }

        if self.fail_calls.lock().unwrap().contains(&call) {
            return Err(BridgeError::Publish {
                key: key.to_string(),
                message: "router unreachable".to_string(),
            });
        }

        self.puts.lock().unwrap().push(Put {
            key: key.to_string(),
            payload,
            at: Instant::now(),
        });
        Ok(())
    }
}

/// A small board: three digital pins, two analog pins, two SPI nodes.
pub fn small_catalog() -> SourceCatalog {
    SourceCatalog::new(
        vec!["P8_3".into(), "P8_4".into(), "P8_5".into()],
        vec!["P9_33".into(), "P9_35".into()],
        vec!["/dev/spidev0.0".into(), "/dev/spidev1.0".into()],
    )
}

pub fn small_board() -> FakeBoard {
    let board = FakeBoard::default();
    board.with(|s| {
        s.levels.insert("P8_3".into(), true);
        s.levels.insert("P8_4".into(), false);
        s.levels.insert("P8_5".into(), true);
        s.analog.insert("P9_33".into(), 0.5);
        s.analog.insert("P9_35".into(), 0.25);
        s.devices.insert("/dev/spidev0.0".into());
    });
    board
}

pub type FakeAggregator = Aggregator<FakeLines, FakeAdc, FakeProbe>;
pub type FakeScheduler = Scheduler<FakeLines, FakeAdc, FakeProbe, RecordingSink>;

pub fn aggregator(board: &FakeBoard, catalog: SourceCatalog) -> FakeAggregator {
    Aggregator::new(
        catalog,
        DigitalReader::new(FakeLines(board.clone())),
        AnalogReader::new(FakeAdc(board.clone()), 1.8),
        BusProber::new(FakeProbe(board.clone())),
    )
    .expect("catalog ids are unique")
}

pub fn scheduler(
    board: &FakeBoard,
    sink: RecordingSink,
    period: Duration,
    mode: ScheduleMode,
) -> FakeScheduler {
    let publisher = Publisher::new(
        sink,
        "beaglebone/pins",
        PayloadFormat::Json,
        Duration::from_secs(60),
    );
    Scheduler::new(aggregator(board, small_catalog()), publisher, period, mode)
}
