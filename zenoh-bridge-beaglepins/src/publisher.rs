//! Snapshot publishing to the message bus.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use pinsight_common::{Format, encode};

use crate::error::{BridgeError, Result};
use crate::snapshot::Snapshot;

/// Where encoded payloads go. The bridge only ever calls `put`.
pub trait SnapshotSink {
    fn put(&self, key: &str, payload: Vec<u8>) -> impl Future<Output = Result<()>> + Send;
}

/// [`SnapshotSink`] over an open Zenoh session.
#[derive(Clone, Debug)]
pub struct ZenohSink {
    session: Arc<zenoh::Session>,
}

impl ZenohSink {
    pub fn new(session: Arc<zenoh::Session>) -> Self {
        Self { session }
    }
}

impl SnapshotSink for ZenohSink {
    async fn put(&self, key: &str, payload: Vec<u8>) -> Result<()> {
        self.session
            .put(key, payload)
            .await
            .map_err(|e| BridgeError::Publish {
                key: key.to_string(),
                message: e.to_string(),
            })
    }
}

/// Snapshot wire encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    /// JSON object, keys in catalog order.
    #[default]
    Json,
    /// The same map as CBOR.
    Cbor,
    /// Fixed text rendering with three-decimal voltages.
    Text,
}

impl PayloadFormat {
    pub fn encode(&self, snapshot: &Snapshot) -> Result<Vec<u8>> {
        match self {
            PayloadFormat::Json => Ok(encode(snapshot, Format::Json)?),
            PayloadFormat::Cbor => Ok(encode(snapshot, Format::Cbor)?),
            PayloadFormat::Text => Ok(snapshot.to_string().into_bytes()),
        }
    }
}

/// A snapshot with its encoded form, alive for a single publish.
#[derive(Debug)]
pub struct PublishRecord<'a> {
    pub snapshot: &'a Snapshot,
    pub payload: Vec<u8>,
    /// Unix epoch milliseconds of the capture.
    pub captured_at: i64,
}

impl<'a> PublishRecord<'a> {
    pub fn new(snapshot: &'a Snapshot, format: PayloadFormat) -> Result<Self> {
        Ok(Self {
            snapshot,
            payload: format.encode(snapshot)?,
            captured_at: snapshot.timestamp_millis(),
        })
    }
}

/// Publishes one snapshot per call to a fixed key.
///
/// No retries and no queue: if a put fails or times out the snapshot is
/// dropped and the error handed back to the caller.
#[derive(Debug)]
pub struct Publisher<S> {
    sink: S,
    key: String,
    format: PayloadFormat,
    timeout: Duration,
}

impl<S: SnapshotSink> Publisher<S> {
    pub fn new(sink: S, key: impl Into<String>, format: PayloadFormat, timeout: Duration) -> Self {
        Self {
            sink,
            key: key.into(),
            format,
            timeout,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Encode and put a snapshot. Returns the payload size in bytes.
    pub async fn publish(&self, snapshot: &Snapshot) -> Result<usize> {
        let record = PublishRecord::new(snapshot, self.format)?;
        let size = record.payload.len();
        tracing::trace!(
            key = %self.key,
            captured_at = record.captured_at,
            bytes = size,
            "Publishing snapshot"
        );
        self.put(&self.key, record.payload).await?;
        Ok(size)
    }

    /// Put any serializable value as JSON on an arbitrary key.
    pub async fn publish_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let payload = serde_json::to_vec(value)?;
        self.put(key, payload).await
    }

    async fn put(&self, key: &str, payload: Vec<u8>) -> Result<()> {
        match tokio::time::timeout(self.timeout, self.sink.put(key, payload)).await {
            Ok(result) => result,
            Err(_) => Err(BridgeError::PublishTimeout {
                key: key.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}
