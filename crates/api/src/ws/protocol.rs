//! JSON frames exchanged over the chat WebSocket.
//!
//! Inbound: `{"type": "send_message", "sender_name": ..., "content": ...}`.
//! Outbound: `{"event": <tag>, "data": <payload>}`.

use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};

/// Event tag for errors answered to a single connection.
pub const EVENT_ERROR: &str = "error";

/// A frame sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    SendMessage {
        #[serde(default)]
        sender_name: String,
        #[serde(default)]
        content: String,
    },
}

/// A frame sent to clients.
#[derive(Debug, Serialize)]
pub struct ServerFrame<'a> {
    pub event: &'a str,
    pub data: &'a serde_json::Value,
}

impl<'a> ServerFrame<'a> {
    pub fn new(event: &'a str, data: &'a serde_json::Value) -> Self {
        Self { event, data }
    }

    pub fn to_message(&self) -> Result<Message, serde_json::Error> {
        Ok(Message::Text(serde_json::to_string(self)?.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_message() {
        let frame: ClientFrame = serde_json::from_str(
            r#"{"type":"send_message","sender_name":"Alice","content":"hi"}"#,
        )
        .unwrap();
        assert_eq!(
            frame,
            ClientFrame::SendMessage {
                sender_name: "Alice".to_string(),
                content: "hi".to_string(),
            }
        );
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(serde_json::from_str::<ClientFrame>(r#"{"type":"shout"}"#).is_err());
    }

    #[test]
    fn server_frame_wraps_event_and_data() {
        let data = serde_json::json!({"id": 1});
        let message = ServerFrame::new("message.received", &data)
            .to_message()
            .unwrap();
        let Message::Text(text) = message else {
            panic!("expected a text frame");
        };
        let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(value["event"], "message.received");
        assert_eq!(value["data"]["id"], 1);
    }
}
