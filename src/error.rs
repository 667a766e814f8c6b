//! Error type for client operations and the run loop.

use tokio_tungstenite::tungstenite;

/// Everything that can go wrong while connecting, running, or issuing
/// live-connection operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A connection is active; the operation only makes sense between runs.
    #[error("client already has an active connection")]
    AlreadyConnected,
    /// The operation needs a live connection and none exists.
    #[error("no active connection")]
    NotRunning,
    /// The websocket connection could not be established.
    #[error("websocket connect failed: {0}")]
    Connect(Box<tungstenite::Error>),
    /// The live connection failed; terminal for the current run.
    #[error("websocket transport failed: {0}")]
    Transport(Box<tungstenite::Error>),
    /// The certificate-verification-disabled TLS connector could not be built.
    #[error("tls configuration failed: {0}")]
    Tls(#[from] native_tls::Error),
    /// The auth token cannot be carried in the `X-Auth-Token` header.
    #[error("auth token is not a valid header value: {0}")]
    InvalidToken(#[from] tungstenite::http::header::InvalidHeaderValue),
    /// An inbound frame was not a valid JSON envelope.
    #[error("malformed frame: {0}")]
    Decode(#[from] serde_json::Error),
    /// An inbound envelope lacked a field the protocol requires.
    #[error("missing expected field `{0}`")]
    MissingField(&'static str),
}
