//! One complete capture of every catalog source.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::sample::SampleValue;

/// Ordered mapping from source identifier to sample value.
///
/// The aggregator fills one entry per catalog source, so the key order is
/// the catalog order and no key repeats.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    captured_at: DateTime<Utc>,
    entries: Vec<(String, SampleValue)>,
}

impl Snapshot {
    /// Start an empty snapshot stamped with the current time.
    pub fn new(capacity: usize) -> Self {
        Self::with_timestamp(Utc::now(), capacity)
    }

    pub fn with_timestamp(captured_at: DateTime<Utc>, capacity: usize) -> Self {
        Self {
            captured_at,
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, id: impl Into<String>, value: SampleValue) {
        let id = id.into();
        debug_assert!(self.get(&id).is_none(), "duplicate snapshot key {id}");
        self.entries.push((id, value));
    }

    /// Capture time as Unix epoch milliseconds.
    pub fn timestamp_millis(&self) -> i64 {
        self.captured_at.timestamp_millis()
    }

    pub fn get(&self, id: &str) -> Option<SampleValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, value)| *value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SampleValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), *value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Number of sources that produced the error marker.
    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|(_, v)| v.is_error()).count()
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Deterministic text rendering, e.g. `{"P8_3": true, "P9_33": 0.900}`.
impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let key = serde_json::to_string(key).map_err(|_| fmt::Error)?;
            write!(f, "{}: {}", key, value)?;
        }
        f.write_str("}")
    }
}
