//! Transport seam between the protocol state machine and the network.
//!
//! DESIGN
//! ======
//! The run loop only ever sees text frames: a [`TransportSink`] it writes
//! to and a [`TransportStream`] it reads [`TransportEvent`]s from. The
//! tokio-tungstenite halves below are the production implementation; tests
//! drive the same loop with in-memory halves. Ping/pong and frame-level
//! concerns stay inside the websocket layer.

use std::future::Future;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream, connect_async_tls_with_config};

use crate::config::Config;
use crate::error::ClientError;

/// Header carrying the auth token, `X-Auth-Token`.
pub const AUTH_HEADER: &str = "x-auth-token";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What a transport delivers to the run loop.
#[derive(Debug)]
pub enum TransportEvent {
    /// A complete text frame from the server.
    Frame(String),
    /// The transport failed; terminal for the current run.
    Error(ClientError),
    /// The peer closed the connection or the stream ended.
    Closed,
}

/// Sending half of a connection.
pub trait TransportSink: Send {
    /// Send one text frame.
    fn send(&mut self, text: String) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Begin the close handshake.
    fn close(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Receiving half of a connection.
pub trait TransportStream: Send {
    /// Wait for the next transport event.
    fn next_event(&mut self) -> impl Future<Output = TransportEvent> + Send;
}

/// Open a websocket connection to the configured server.
///
/// # Errors
///
/// Fails when the URL is not a valid request, the token is not a valid
/// header value, the TLS connector cannot be built, or the websocket
/// handshake is rejected.
pub async fn connect(
    config: &Config,
    token: Option<&str>,
) -> Result<(WsSink, WsStream), ClientError> {
    let url = config.url();
    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(|error| ClientError::Connect(Box::new(error)))?;
    if let Some(token) = token {
        request.headers_mut().insert(AUTH_HEADER, HeaderValue::from_str(token)?);
    }

    let (socket, _response) = connect_async_tls_with_config(request, None, false, tls_connector(config)?)
        .await
        .map_err(|error| ClientError::Connect(Box::new(error)))?;
    tracing::info!(%url, "websocket connected");

    let (sink, stream) = socket.split();
    Ok((WsSink { inner: sink }, WsStream { inner: stream }))
}

/// TLS connector override. `None` keeps tungstenite's default (verifying)
/// connector; disabling verification swaps in a native-tls connector that
/// accepts self-signed certificates.
fn tls_connector(config: &Config) -> Result<Option<Connector>, ClientError> {
    if config.verify_certificate {
        return Ok(None);
    }
    let tls = native_tls::TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .build()?;
    Ok(Some(Connector::NativeTls(tls)))
}

/// Sending half of a tokio-tungstenite connection.
pub struct WsSink {
    inner: SplitSink<Socket, Message>,
}

impl TransportSink for WsSink {
    async fn send(&mut self, text: String) -> Result<(), ClientError> {
        self.inner
            .send(Message::Text(text.into()))
            .await
            .map_err(|error| ClientError::Transport(Box::new(error)))
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.inner
            .close()
            .await
            .map_err(|error| ClientError::Transport(Box::new(error)))
    }
}

/// Receiving half of a tokio-tungstenite connection.
pub struct WsStream {
    inner: SplitStream<Socket>,
}

impl TransportStream for WsStream {
    async fn next_event(&mut self) -> TransportEvent {
        loop {
            let Some(message) = self.inner.next().await else {
                return TransportEvent::Closed;
            };
            match message {
                Ok(Message::Text(text)) => return TransportEvent::Frame(text.to_string()),
                Ok(Message::Close(_)) => return TransportEvent::Closed,
                // Binary frames are not part of the protocol; ping/pong are
                // answered by the websocket layer.
                Ok(_) => {}
                Err(error) => {
                    return TransportEvent::Error(ClientError::Transport(Box::new(error)));
                }
            }
        }
    }
}
