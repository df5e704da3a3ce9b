//! Common types shared across the ingester

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message type that triggers a configuration cache refresh instead of a write
pub const CONTROL_MESSAGE_TYPE: &str = "rtdl_205";

/// Message type used when neither the config, the message nor the payload name one
pub const DEFAULT_MESSAGE_TYPE: &str = "rtdl_default";

/// Topic every acknowledgement is published to
pub const EGRESS_TOPIC: &str = "egress";

/// Key every acknowledgement is published under
pub const EGRESS_KEY: &str = "message";

/// The ingress record handed over by the host runtime
///
/// `stream_alt_id` identifies the stream when it is fed from an external
/// system and takes precedence over `stream_id` during routing. At least one
/// of the two must be non-empty for the message to be routable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Opaque stream identifier
    #[serde(default)]
    pub stream_id: String,
    /// External-system stream identifier, preferred over `stream_id`
    #[serde(default)]
    pub stream_alt_id: String,
    /// Logical type label; `rtdl_205` marks a control message
    #[serde(default)]
    pub message_type: String,
    /// Arbitrarily nested event payload
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl IncomingMessage {
    /// Whether this is the internal cache-refresh control message
    pub fn is_control(&self) -> bool {
        self.message_type == CONTROL_MESSAGE_TYPE
    }
}

/// Acknowledgement record handed back to the host for publication
#[derive(Debug, Clone)]
pub struct EgressRecord {
    /// Destination topic
    pub topic: &'static str,
    /// Record key
    pub key: &'static str,
    /// The message payload re-serialized to JSON bytes
    pub value: Bytes,
}

impl EgressRecord {
    /// Build the standard acknowledgement for a payload
    pub fn acknowledgement(value: Bytes) -> Self {
        Self {
            topic: EGRESS_TOPIC,
            key: EGRESS_KEY,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_partial_message() {
        let msg: IncomingMessage =
            serde_json::from_value(json!({ "stream_id": "s1", "payload": { "a": 1 } })).unwrap();
        assert_eq!(msg.stream_id, "s1");
        assert!(msg.stream_alt_id.is_empty());
        assert!(msg.message_type.is_empty());
        assert_eq!(msg.payload.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_control_detection() {
        let msg: IncomingMessage =
            serde_json::from_value(json!({ "message_type": "rtdl_205", "payload": {} })).unwrap();
        assert!(msg.is_control());

        let msg: IncomingMessage =
            serde_json::from_value(json!({ "message_type": "order", "payload": {} })).unwrap();
        assert!(!msg.is_control());
    }
}
