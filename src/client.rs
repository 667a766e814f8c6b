//! Client — handshake state machine, run loop, and event dispatch.
//!
//! DESIGN
//! ======
//! One logical connection per client. `run` is a single future; callers
//! wanting concurrent `stop`/`ping` share the client behind an `Arc` and
//! spawn `run` on its own task. While connected, live operations enqueue
//! commands on an unbounded channel and the run loop forwards them to the
//! transport, so all socket I/O stays on the run task.
//!
//! LIFECYCLE
//! =========
//! 1. `run` connects and installs the outbound handle (state Idle)
//! 2. Server sends `init` → one `subscribe` per registered name, then
//!    `start` (state Handshaking)
//! 3. Server acks `start` → state Running, `event` envelopes dispatch to
//!    handlers
//! 4. Close or error → state Closed, outbound handle released, `run` returns

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::envelope::{Envelope, OP_EVENT, OP_INIT, OP_START};
use crate::error::ClientError;
use crate::handler::{EventHandler, Registry};
use crate::transport::{self, TransportEvent, TransportSink, TransportStream};

/// How often `stop` re-checks whether the run loop has drained.
const STOP_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Where a client is in the connection lifecycle.
///
/// Transitions are driven solely by inbound envelopes and explicit stop
/// calls; see the state machine in the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// No connection, or connected but nothing received yet.
    Idle = 0,
    /// `init` seen; subscriptions and `start` sent, awaiting the ack.
    Handshaking = 1,
    /// `start` acked; events are flowing.
    Running = 2,
    /// The connection ended.
    Closed = 3,
}

/// Lock-free cell for the shared connection state.
struct StateCell(AtomicU8);

impl StateCell {
    fn new() -> Self {
        Self(AtomicU8::new(ConnectionState::Idle as u8))
    }

    fn load(&self) -> ConnectionState {
        match self.0.load(Ordering::Relaxed) {
            0 => ConnectionState::Idle,
            1 => ConnectionState::Handshaking,
            2 => ConnectionState::Running,
            _ => ConnectionState::Closed,
        }
    }

    fn store(&self, state: ConnectionState) {
        self.0.store(state as u8, Ordering::Relaxed);
    }
}

/// Instruction from a live operation to the run loop.
enum Command {
    Send(Envelope),
    Close,
}

/// A client for one websocketd session: registry of event handlers, the
/// handshake state, and (while connected) the outbound command handle.
pub struct Client {
    config: Config,
    token: Mutex<Option<String>>,
    handlers: Mutex<Registry>,
    state: StateCell,
    outbound: Mutex<Option<mpsc::UnboundedSender<Command>>>,
}

impl Client {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let token = config.token.clone();
        Self {
            config,
            token: Mutex::new(token),
            handlers: Mutex::new(Registry::new()),
            state: StateCell::new(),
            outbound: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current position in the connection lifecycle.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state.load()
    }

    /// Replace the token used for subsequent connections.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::AlreadyConnected`] while a connection is
    /// active; the connect-time header cannot be changed retroactively. Use
    /// [`Client::update_token`] to rotate the credential on a live
    /// connection.
    pub fn set_token(&self, token: impl Into<String>) -> Result<(), ClientError> {
        if lock(&self.outbound).is_some() {
            return Err(ClientError::AlreadyConnected);
        }
        *lock(&self.token) = Some(token.into());
        Ok(())
    }

    /// Register or replace the handler for `event_name`.
    ///
    /// May be called at any time; registrations made before the handshake
    /// are subscribed during it, in registration order. Registering under
    /// [`WILDCARD`](crate::WILDCARD) routes every event to that handler and
    /// suppresses name-specific ones.
    pub fn on(&self, event_name: impl Into<String>, handler: impl EventHandler + 'static) {
        lock(&self.handlers).insert(event_name, Arc::new(handler));
    }

    /// Connect to the configured server and process envelopes until the
    /// connection ends.
    ///
    /// Resolves `Ok(())` on clean close (including one requested via
    /// [`Client::stop`]). Handlers run on the task driving this future.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::AlreadyConnected`] when a connection is
    /// already active, otherwise propagates connect, transport, and decode
    /// failures. The library never reconnects; call `run` again to retry.
    pub async fn run(&self) -> Result<(), ClientError> {
        if lock(&self.outbound).is_some() {
            return Err(ClientError::AlreadyConnected);
        }
        let token = lock(&self.token).clone();
        let (sink, stream) = transport::connect(&self.config, token.as_deref()).await?;
        self.run_with(sink, stream).await
    }

    /// The run loop over caller-supplied transport halves.
    ///
    /// This is the seam for exercising the protocol state machine without a
    /// network; [`Client::run`] is this plus a tokio-tungstenite connect.
    ///
    /// # Errors
    ///
    /// Same contract as [`Client::run`], minus the connect step.
    pub async fn run_with<S, R>(&self, mut sink: S, mut stream: R) -> Result<(), ClientError>
    where
        S: TransportSink,
        R: TransportStream,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        {
            let mut outbound = lock(&self.outbound);
            if outbound.is_some() {
                return Err(ClientError::AlreadyConnected);
            }
            *outbound = Some(tx);
        }
        self.state.store(ConnectionState::Idle);
        debug!("starting connection");

        let result = self.drive(&mut sink, &mut stream, &mut rx).await;

        *lock(&self.outbound) = None;
        self.state.store(ConnectionState::Closed);
        match &result {
            Ok(()) => debug!("stopping connection"),
            Err(error) => warn!(%error, "connection failed"),
        }
        result
    }

    /// Send a `subscribe` envelope for `event_name` on the live connection.
    ///
    /// Invoked internally for every registered name when the server signals
    /// `init`; also usable afterwards to add a subscription mid-session.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::NotRunning`] when no connection is active.
    pub fn subscribe(&self, event_name: &str) -> Result<(), ClientError> {
        self.send(Envelope::subscribe(event_name))
    }

    /// Rotate the auth credential on the live connection.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::NotRunning`] when no connection is active.
    pub fn update_token(&self, token: &str) -> Result<(), ClientError> {
        self.send(Envelope::token(token))
    }

    /// Send a liveness probe with an opaque payload.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::NotRunning`] when no connection is active.
    pub fn ping(&self, payload: &str) -> Result<(), ClientError> {
        self.send(Envelope::ping(payload))
    }

    /// Request a clean close, wait for the run loop to drain, then clear the
    /// handler registry.
    ///
    /// Safe to call from any task. Idempotent: with no connection this only
    /// clears the registry. Polls once per second until [`Client::run`] has
    /// returned control of the connection.
    pub async fn stop(&self) {
        let sender = lock(&self.outbound).clone();
        if let Some(sender) = sender {
            let _ = sender.send(Command::Close);
            while lock(&self.outbound).is_some() {
                tokio::time::sleep(STOP_POLL_INTERVAL).await;
            }
        }
        lock(&self.handlers).clear();
    }

    /// Enqueue an envelope for the run loop to send.
    fn send(&self, envelope: Envelope) -> Result<(), ClientError> {
        let outbound = lock(&self.outbound);
        let Some(tx) = outbound.as_ref() else {
            return Err(ClientError::NotRunning);
        };
        tx.send(Command::Send(envelope)).map_err(|_| ClientError::NotRunning)
    }

    async fn drive<S, R>(
        &self,
        sink: &mut S,
        stream: &mut R,
        rx: &mut mpsc::UnboundedReceiver<Command>,
    ) -> Result<(), ClientError>
    where
        S: TransportSink,
        R: TransportStream,
    {
        let mut closing = false;
        loop {
            tokio::select! {
                // Biased so queued sends drain before the next inbound frame;
                // handshake replies must keep protocol order.
                biased;

                command = rx.recv(), if !closing => match command {
                    Some(Command::Send(envelope)) => {
                        let text = envelope.to_json()?;
                        if self.config.debug {
                            debug!(frame = %text, "send");
                        }
                        sink.send(text).await?;
                    }
                    Some(Command::Close) | None => {
                        closing = true;
                        sink.close().await?;
                    }
                },
                event = stream.next_event() => match event {
                    TransportEvent::Frame(text) => self.handle_frame(&text)?,
                    TransportEvent::Error(error) => return Err(error),
                    TransportEvent::Closed => return Ok(()),
                },
            }
        }
    }

    /// Decode one inbound frame and advance the state machine.
    fn handle_frame(&self, text: &str) -> Result<(), ClientError> {
        if self.config.debug {
            debug!(frame = %text, "recv");
        }
        let envelope = Envelope::from_json(text)?;

        if self.state.load() == ConnectionState::Running {
            if envelope.op == OP_EVENT {
                let payload = envelope.data.unwrap_or(Value::Null);
                let Some(name) = payload.get("name").and_then(Value::as_str).map(ToOwned::to_owned)
                else {
                    return Err(ClientError::MissingField("name"));
                };
                self.dispatch(&name, &payload);
            }
            return Ok(());
        }

        match envelope.op.as_str() {
            OP_INIT => {
                let names: Vec<String> =
                    lock(&self.handlers).names().map(ToOwned::to_owned).collect();
                debug!(subscriptions = names.len(), "handshake init");
                for name in &names {
                    self.subscribe(name)?;
                }
                self.send(Envelope::start())?;
                self.state.store(ConnectionState::Handshaking);
            }
            OP_START => {
                self.state.store(ConnectionState::Running);
                info!("session running");
            }
            _ => {}
        }
        Ok(())
    }

    /// Route an event payload per the wildcard-precedence rule. Events with
    /// no matching registration are dropped.
    fn dispatch(&self, name: &str, payload: &Value) {
        let handler = lock(&self.handlers).handler_for(name);
        match handler {
            Some(handler) => handler.handle(payload),
            None => debug!(event = %name, "no handler registered, dropping event"),
        }
    }
}

/// Lock a mutex, recovering the guard if a handler panicked while holding it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
