//! Envelope — the wire message for the websocketd protocol.
//!
//! DESIGN
//! ======
//! Every message in either direction is `{op, data?}`. `op` stays a plain
//! string so unknown inbound ops are representable (the run loop ignores
//! them); `data` stays a flexible `serde_json::Value` because event payloads
//! are server-defined. Constructors below are the only places outbound
//! envelopes are built.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Server is ready to accept subscriptions (inbound).
pub const OP_INIT: &str = "init";

/// Handshake-complete signal (outbound) and its acknowledgment (inbound).
pub const OP_START: &str = "start";

/// Register interest in an event stream (outbound).
pub const OP_SUBSCRIBE: &str = "subscribe";

/// Rotate the auth credential on a live connection (outbound).
pub const OP_TOKEN: &str = "token";

/// Liveness probe (outbound).
pub const OP_PING: &str = "ping";

/// An event occurred; `data.name` selects the handler (inbound).
pub const OP_EVENT: &str = "event";

/// A single message on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    /// Build a `subscribe` envelope for one event name.
    #[must_use]
    pub fn subscribe(event_name: &str) -> Self {
        Self {
            op: OP_SUBSCRIBE.to_owned(),
            data: Some(json!({ "event_name": event_name })),
        }
    }

    /// Build the `start` envelope. Carries no data.
    #[must_use]
    pub fn start() -> Self {
        Self { op: OP_START.to_owned(), data: None }
    }

    /// Build a `token` envelope carrying a replacement credential.
    #[must_use]
    pub fn token(token: &str) -> Self {
        Self {
            op: OP_TOKEN.to_owned(),
            data: Some(json!({ "token": token })),
        }
    }

    /// Build a `ping` envelope with an opaque payload.
    #[must_use]
    pub fn ping(payload: &str) -> Self {
        Self {
            op: OP_PING.to_owned(),
            data: Some(json!({ "payload": payload })),
        }
    }

    /// Serialize to the wire representation.
    ///
    /// # Errors
    ///
    /// Returns the underlying serializer error; envelopes built by the
    /// constructors above always serialize.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse an inbound frame.
    ///
    /// # Errors
    ///
    /// Returns the decode error for anything that is not a JSON object with
    /// a string `op`.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The `data.name` of an `event` envelope, when present.
    #[must_use]
    pub fn event_name(&self) -> Option<&str> {
        self.data.as_ref()?.get("name")?.as_str()
    }
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;
