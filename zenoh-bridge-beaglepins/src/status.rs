//! Bridge status records on `<topic>/@/status`.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::publisher::{Publisher, SnapshotSink};

/// Status record published when the bridge starts and stops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeStatus {
    pub bridge: String,
    pub version: String,
    /// "running" or "offline".
    pub status: String,
    #[serde(flatten)]
    pub metadata: serde_json::Value,
}

impl BridgeStatus {
    pub fn running(bridge: impl Into<String>, version: impl Into<String>) -> Self {
        Self::with_state(bridge, version, "running")
    }

    pub fn offline(bridge: impl Into<String>, version: impl Into<String>) -> Self {
        Self::with_state(bridge, version, "offline")
    }

    fn with_state(
        bridge: impl Into<String>,
        version: impl Into<String>,
        status: &str,
    ) -> Self {
        Self {
            bridge: bridge.into(),
            version: version.into(),
            status: status.to_string(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Status key for a snapshot topic.
pub fn status_key(topic: &str) -> String {
    format!("{}/@/status", topic)
}

/// Publishes running/offline records next to the snapshot topic.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    bridge: String,
    version: String,
    metadata: serde_json::Value,
}

impl StatusReporter {
    pub fn new(bridge: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            bridge: bridge.into(),
            version: version.into(),
            metadata: serde_json::Value::Null,
        }
    }

    /// Extra fields merged into the "running" record.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub async fn publish_running<S: SnapshotSink>(&self, publisher: &Publisher<S>) -> Result<()> {
        let status =
            BridgeStatus::running(&self.bridge, &self.version).with_metadata(self.metadata.clone());
        publisher
            .publish_json(&status_key(publisher.key()), &status)
            .await
    }

    pub async fn publish_offline<S: SnapshotSink>(&self, publisher: &Publisher<S>) -> Result<()> {
        let status = BridgeStatus::offline(&self.bridge, &self.version);
        publisher
            .publish_json(&status_key(publisher.key()), &status)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_key() {
        assert_eq!(status_key("beaglebone/pins"), "beaglebone/pins/@/status");
    }

    #[test]
    fn test_status_serialization_flattens_metadata() {
        let status = BridgeStatus::running("beaglepins", "0.1.0").with_metadata(
            serde_json::json!({ "sources": 56, "poll_interval_secs": 30 }),
        );

        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"bridge\":\"beaglepins\""));
        assert!(json.contains("\"status\":\"running\""));
        assert!(json.contains("\"sources\":56"));
    }

    #[derive(Default)]
    struct MemorySink {
        puts: std::sync::Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl SnapshotSink for MemorySink {
        async fn put(&self, key: &str, payload: Vec<u8>) -> Result<()> {
            self.puts.lock().unwrap().push((key.to_string(), payload));
            Ok(())
        }
    }

    #[test]
    fn test_reporter_publishes_next_to_topic() {
        let publisher = Publisher::new(
            MemorySink::default(),
            "beaglebone/pins",
            crate::publisher::PayloadFormat::Json,
            std::time::Duration::from_secs(1),
        );
        let reporter = StatusReporter::new("beaglepins", "0.1.0")
            .with_metadata(serde_json::json!({ "poll_interval_secs": 30 }));

        tokio_test::block_on(async {
            reporter.publish_running(&publisher).await.unwrap();
            reporter.publish_offline(&publisher).await.unwrap();
        });

        let puts = publisher.sink().puts.lock().unwrap();
        assert_eq!(puts.len(), 2);
        assert!(puts.iter().all(|(key, _)| key == "beaglebone/pins/@/status"));

        let running: serde_json::Value = serde_json::from_slice(&puts[0].1).unwrap();
        assert_eq!(running["status"], "running");
        assert_eq!(running["poll_interval_secs"], 30);
        let offline: serde_json::Value = serde_json::from_slice(&puts[1].1).unwrap();
        assert_eq!(offline["status"], "offline");
    }

    #[test]
    fn test_offline_has_no_metadata() {
        let json = serde_json::to_value(BridgeStatus::offline("beaglepins", "0.1.0")).unwrap();
        assert_eq!(json["status"], "offline");
        assert!(json.get("sources").is_none());
    }
}
