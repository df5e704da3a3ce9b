//! Stream routing and message-type resolution

use crate::config::{ConfigSnapshot, StreamConfig};
use crate::types::{IncomingMessage, DEFAULT_MESSAGE_TYPE};
use serde_json::Value;

/// Find the destination configuration for a message
///
/// `stream_alt_id` takes precedence over `stream_id`; a message carrying
/// neither, or naming an unknown stream, matches nothing and is dropped by
/// the caller without error.
pub fn match_config<'a>(
    snapshot: &'a ConfigSnapshot,
    message: &IncomingMessage,
) -> Option<&'a StreamConfig> {
    if !message.stream_alt_id.is_empty() {
        snapshot
            .streams
            .iter()
            .find(|config| config.stream_alt_id() == message.stream_alt_id)
    } else if !message.stream_id.is_empty() {
        snapshot
            .streams
            .iter()
            .find(|config| config.stream_id() == message.stream_id)
    } else {
        None
    }
}

/// Resolve the effective message type
///
/// Precedence, later wins: the `rtdl_default` literal, the config record's
/// fallback label, the message's own label, and finally a string `type`
/// inside the payload.
pub fn effective_message_type(message: &IncomingMessage, config: &StreamConfig) -> String {
    let mut message_type = DEFAULT_MESSAGE_TYPE;

    if !config.message_type().is_empty() {
        message_type = config.message_type();
    }

    if !message.message_type.is_empty() {
        message_type = &message.message_type;
    }

    if let Some(Value::String(payload_type)) = message.payload.get("type") {
        message_type = payload_type;
    }

    message_type.to_string()
}
