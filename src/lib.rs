//! Client library for the websocketd event-notification interface.
//!
//! ARCHITECTURE
//! ============
//! One component: [`Client`]. It owns a registry of event-name → handler,
//! a small handshake state, and (while connected) an outbound command
//! channel into the run loop. The wire protocol is JSON envelopes
//! (`{op, data}`) over a websocket; the handshake is
//! `init → subscribe×N → start → start-ack`, after which `event` envelopes
//! flow and are dispatched to the registered handlers.
//!
//! The protocol state machine is independent of the network: [`Client::run`]
//! connects over `tokio-tungstenite`, while [`Client::run_with`] drives the
//! same loop over any [`transport::TransportSink`]/[`transport::TransportStream`]
//! pair, which is how the tests exercise it in memory.
//!
//! ```no_run
//! use websocketd_client::{Client, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), websocketd_client::ClientError> {
//!     let config = Config::new("wsd.example.com").with_token("my-token");
//!     let client = Client::new(config);
//!     client.on("call_created", |payload: &serde_json::Value| {
//!         println!("{payload}");
//!     });
//!     client.run().await
//! }
//! ```

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod transport;

pub use client::{Client, ConnectionState};
pub use config::{Config, DEFAULT_PREFIX};
pub use envelope::Envelope;
pub use error::ClientError;
pub use handler::{EventHandler, WILDCARD};
