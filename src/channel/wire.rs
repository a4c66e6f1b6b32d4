//! Wire format
//!
//! Frames are JSON objects `{"event": <name>, "data": {...}}`. Incoming
//! chat payloads go through a validated parse that tolerates either a
//! `content` or a `message` field and fails closed: anything unparseable or
//! empty yields nothing to display and nothing to speak.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub const EVENT_START_INTERVIEW: &str = "start-interview";
pub const EVENT_SEND_MESSAGE: &str = "send-message";
pub const EVENT_MESSAGE: &str = "message";

#[derive(Serialize)]
struct Frame<'a, T: Serialize> {
    event: &'a str,
    data: T,
}

#[derive(Serialize)]
struct StartInterviewData<'a> {
    name: &'a str,
    role: &'a str,
    #[serde(rename = "sessionId")]
    session_id: &'a str,
}

#[derive(Serialize)]
struct SendMessageData<'a> {
    content: &'a str,
}

/// A validated incoming chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Encode the start-interview handshake frame.
pub fn encode_start_interview(name: &str, role: &str, session_id: &str) -> String {
    encode(
        EVENT_START_INTERVIEW,
        StartInterviewData {
            name,
            role,
            session_id,
        },
    )
}

/// Encode a user answer frame.
pub fn encode_send_message(content: &str) -> String {
    encode(EVENT_SEND_MESSAGE, SendMessageData { content })
}

fn encode<T: Serialize>(event: &str, data: T) -> String {
    // Serialization of these flat structs cannot fail.
    serde_json::to_string(&Frame { event, data }).unwrap_or_default()
}

/// Decode a server frame into a chat message.
///
/// Returns None for unknown events, malformed JSON, or payloads with neither
/// a `content` nor a `message` string (fail closed, drop silently).
pub fn decode(frame: &str) -> Option<IncomingMessage> {
    let value: Value = match serde_json::from_str(frame) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "dropping malformed frame");
            return None;
        }
    };

    let event = value.get("event").and_then(Value::as_str)?;
    if event != EVENT_MESSAGE {
        debug!(event, "ignoring unhandled event");
        return None;
    }

    parse_message_payload(value.get("data")?)
}

/// Tolerant-reader parse of a `message` payload.
fn parse_message_payload(data: &Value) -> Option<IncomingMessage> {
    let content = data
        .get("content")
        .or_else(|| data.get("message"))
        .and_then(Value::as_str)?;

    if content.trim().is_empty() {
        return None;
    }

    let timestamp = data
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Some(IncomingMessage {
        content: content.to_string(),
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_start_interview() {
        let frame = encode_start_interview("Ada", "Frontend Dev", "abc");
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "start-interview");
        assert_eq!(value["data"]["name"], "Ada");
        assert_eq!(value["data"]["role"], "Frontend Dev");
        assert_eq!(value["data"]["sessionId"], "abc");
    }

    #[test]
    fn test_encode_send_message() {
        let frame = encode_send_message("my answer");
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "send-message");
        assert_eq!(value["data"]["content"], "my answer");
    }

    #[test]
    fn test_decode_content_field() {
        let msg = decode(r#"{"event":"message","data":{"content":"Hello"}}"#).unwrap();
        assert_eq!(msg.content, "Hello");
        assert!(msg.timestamp.is_none());
    }

    #[test]
    fn test_decode_tolerates_message_field() {
        let msg = decode(r#"{"event":"message","data":{"message":"Hi there"}}"#).unwrap();
        assert_eq!(msg.content, "Hi there");
    }

    #[test]
    fn test_decode_prefers_content_over_message() {
        let msg =
            decode(r#"{"event":"message","data":{"content":"A","message":"B"}}"#).unwrap();
        assert_eq!(msg.content, "A");
    }

    #[test]
    fn test_decode_fails_closed_on_missing_fields() {
        assert!(decode(r#"{"event":"message","data":{"other":1}}"#).is_none());
        assert!(decode(r#"{"event":"message","data":{}}"#).is_none());
        assert!(decode(r#"{"event":"message"}"#).is_none());
    }

    #[test]
    fn test_decode_fails_closed_on_empty_content() {
        assert!(decode(r#"{"event":"message","data":{"content":"  "}}"#).is_none());
    }

    #[test]
    fn test_decode_drops_malformed_json() {
        assert!(decode("not json").is_none());
        assert!(decode("").is_none());
    }

    #[test]
    fn test_decode_ignores_unknown_events() {
        assert!(decode(r#"{"event":"history","data":{"content":"x"}}"#).is_none());
    }

    #[test]
    fn test_decode_parses_timestamp() {
        let msg = decode(
            r#"{"event":"message","data":{"content":"Hi","timestamp":"2026-01-02T03:04:05Z"}}"#,
        )
        .unwrap();
        let ts = msg.timestamp.unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-01-02T03:04:05+00:00");
    }

    #[test]
    fn test_decode_tolerates_bad_timestamp() {
        let msg =
            decode(r#"{"event":"message","data":{"content":"Hi","timestamp":"noon"}}"#).unwrap();
        assert!(msg.timestamp.is_none());
    }
}
