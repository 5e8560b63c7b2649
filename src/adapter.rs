//! Socket adapter: binds application ports to one WebSocket connection.
//!
//! # Event Loop
//!
//! [`SocketAdapter::bind`] spawns a tokio task that handles, one at a time:
//!
//! - Values from the `toSocket` port (sent only while the socket is open)
//! - Frames read from the socket (turned into envelopes)
//! - Commands from the [`Binding`] handle
//!
//! Every transport event yields exactly one envelope on the `fromSocket`
//! port, in the order the transport reported it. A failure that ends the
//! connection yields `Error` followed by `Closed`.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::StreamExt;
use parking_lot::Mutex;
use serde_json::{Value, to_string};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::config::SocketConfig;
use crate::ports::App;
use crate::protocol::{ConnectionInfo, Envelope, ErrorEvent};
use crate::transport::{Connection, ReadyState, WsReader};

// ============================================================================
// Types
// ============================================================================

/// State shared between the event loop and the [`Binding`].
struct Shared {
    /// Latest connection metadata.
    info: Mutex<ConnectionInfo>,
    /// Buffered-amount counter handed to the connection.
    buffered: Arc<AtomicU64>,
}

/// Commands from the [`Binding`] to the event loop.
enum AdapterCommand {
    /// Start the closing handshake.
    Close,
}

// ============================================================================
// SocketAdapter
// ============================================================================

/// Binds applications to a WebSocket endpoint.
#[derive(Debug, Clone, Default)]
pub struct SocketAdapter {
    config: SocketConfig,
}

impl SocketAdapter {
    /// Creates an adapter for the given configuration.
    #[inline]
    #[must_use]
    pub fn new(config: SocketConfig) -> Self {
        Self { config }
    }

    /// Returns the adapter configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SocketConfig {
        &self.config
    }

    /// Binds the application's ports to a new connection.
    ///
    /// If the application is missing either port, logs it and returns `None`
    /// without subscribing or connecting. Otherwise spawns the event loop,
    /// which starts connecting immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(&self, app: App) -> Option<Binding> {
        if let Some(port) = app.missing_port() {
            warn!(port, "Port missing on app, adapter disabled (it may not be in use yet)");
            return None;
        }
        let (outbound, inbound) = app.take_ports()?;

        let shared = Arc::new(Shared {
            info: Mutex::new(ConnectionInfo::pending(
                self.config.url(),
                self.config.binary_type(),
            )),
            buffered: Arc::default(),
        });
        let (state_tx, state_rx) = watch::channel(ReadyState::Connecting);
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let event_loop = EventLoop {
            config: self.config.clone(),
            outbound,
            outbound_open: true,
            inbound,
            commands: command_rx,
            commands_open: true,
            state_tx,
            shared: Arc::clone(&shared),
        };

        tokio::spawn(event_loop.run());

        Some(Binding {
            state_rx,
            shared,
            command_tx,
        })
    }
}

/// Binds the application to the default endpoint.
///
/// Shorthand for `SocketAdapter::default().bind(app)`.
pub fn bind(app: App) -> Option<Binding> {
    SocketAdapter::default().bind(app)
}

// ============================================================================
// Binding
// ============================================================================

/// Handle to a bound adapter.
///
/// Dropping the handle alone does not close the connection. Once the
/// application has also dropped both of its ports, the adapter closes the
/// connection itself.
pub struct Binding {
    state_rx: watch::Receiver<ReadyState>,
    shared: Arc<Shared>,
    command_tx: mpsc::UnboundedSender<AdapterCommand>,
}

impl Binding {
    /// Returns the current ready state.
    #[inline]
    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        *self.state_rx.borrow()
    }

    /// Returns the connection metadata.
    ///
    /// Before the handshake completes, `extensions` and `protocol` are empty.
    #[must_use]
    pub fn connection_info(&self) -> ConnectionInfo {
        self.shared.info.lock().clone()
    }

    /// Returns the bytes queued for sending but not yet written.
    #[inline]
    #[must_use]
    pub fn buffered_amount(&self) -> u64 {
        self.shared.buffered.load(Ordering::SeqCst)
    }

    /// Starts closing the connection.
    ///
    /// The `Closed` envelope follows once the transport finishes. Closing
    /// while still connecting abandons the attempt. No effect once closed.
    pub fn close(&self) {
        let _ = self.command_tx.send(AdapterCommand::Close);
    }

    /// Waits until the connection reaches [`ReadyState::Closed`].
    pub async fn closed(&self) {
        let mut state_rx = self.state_rx.clone();
        let _ = state_rx.wait_for(|state| state.is_terminal()).await;
    }
}

// ============================================================================
// EventLoop
// ============================================================================

/// Everything the spawned task owns.
struct EventLoop {
    config: SocketConfig,
    outbound: mpsc::UnboundedReceiver<Value>,
    outbound_open: bool,
    inbound: mpsc::UnboundedSender<Envelope>,
    commands: mpsc::UnboundedReceiver<AdapterCommand>,
    commands_open: bool,
    state_tx: watch::Sender<ReadyState>,
    shared: Arc<Shared>,
}

impl EventLoop {
    async fn run(mut self) {
        if let Some((connection, reader)) = self.connect().await {
            self.on_open(&connection);
            self.pump(&connection, reader).await;
        }

        // Closed for good; keep serving the outbound port so sends get logged.
        while self.outbound_open {
            let message = self.outbound.recv().await;
            self.on_outbound(message, None);
        }

        debug!("Adapter terminated");
    }

    /// Connecting phase. Returns `None` if the attempt failed or was abandoned.
    async fn connect(&mut self) -> Option<(Connection, WsReader)> {
        let config = self.config.clone();
        let buffered = Arc::clone(&self.shared.buffered);
        let open = Connection::open(&config, buffered);
        tokio::pin!(open);

        loop {
            tokio::select! {
                result = &mut open => {
                    return match result {
                        Ok(opened) => Some(opened),
                        Err(e) => {
                            if e.is_config_error() {
                                error!(url = %config.url(), error = %e, "Invalid connection request");
                            } else {
                                warn!(url = %config.url(), error = %e, "Connection failed");
                            }
                            self.fail(ErrorEvent::new(e.to_string()));
                            None
                        }
                    };
                }

                message = self.outbound.recv(), if self.outbound_open => {
                    self.on_outbound(message, None);
                }

                command = self.commands.recv(), if self.commands_open => match command {
                    Some(AdapterCommand::Close) => {
                        debug!("Close requested while connecting");
                        self.fail(ErrorEvent::new(
                            "WebSocket is closed before the connection is established.",
                        ));
                        return None;
                    }
                    None => self.commands_open = false,
                },
            }
        }
    }

    /// Open phase: runs until the transport reports the connection gone.
    async fn pump(&mut self, connection: &Connection, mut reader: WsReader) {
        loop {
            tokio::select! {
                frame = reader.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.on_text(connection, text.as_str()),

                    Some(Ok(Message::Binary(data))) => {
                        warn!(bytes = data.len(), "No binary message handling implemented");
                    }

                    Some(Ok(Message::Close(frame))) => {
                        // Keep reading: the stream ends once the handshake completes.
                        debug!(?frame, "Close frame received");
                        self.set_state(ReadyState::Closing);
                    }

                    // Ping, Pong and raw frames are handled by tungstenite
                    Some(Ok(_)) => {}

                    Some(Err(e)) => {
                        error!(error = %e, "WebSocket error");
                        self.deliver(Envelope::Error {
                            info: connection.info().clone(),
                            event: ErrorEvent::new(e.to_string()),
                        });
                        self.on_close(connection);
                        return;
                    }

                    None => {
                        debug!("WebSocket stream ended");
                        self.on_close(connection);
                        return;
                    }
                },

                message = self.outbound.recv(), if self.outbound_open => {
                    self.on_outbound(message, Some(connection));
                }

                command = self.commands.recv(), if self.commands_open => match command {
                    Some(AdapterCommand::Close) => {
                        if self.state() == ReadyState::Open {
                            debug!("Close requested");
                            self.set_state(ReadyState::Closing);
                            connection.close();
                        }
                    }
                    None => self.commands_open = false,
                },

                () = self.inbound.closed(), if !self.outbound_open && self.state() == ReadyState::Open => {
                    debug!("Application ports dropped, closing");
                    self.set_state(ReadyState::Closing);
                    connection.close();
                }
            }
        }
    }

    // ========================================================================
    // Event Handlers
    // ========================================================================

    fn on_open(&mut self, connection: &Connection) {
        let info = connection.info().clone();
        *self.shared.info.lock() = info.clone();
        self.set_state(ReadyState::Open);

        info!(
            url = %info.url,
            binary_type = info.binary_type.as_str(),
            protocol = %info.protocol,
            "WebSocket connection established"
        );

        self.deliver(Envelope::Connected(info));
    }

    fn on_text(&mut self, connection: &Connection, text: &str) {
        let envelope = Envelope::from_text(connection.info(), text);

        if let Envelope::DecodeError { error, .. } = &envelope {
            warn!(error = %error, bytes = text.len(), "Failed to decode inbound text");
        } else {
            debug!(bytes = text.len(), "Message received");
        }

        self.deliver(envelope);
    }

    fn on_close(&mut self, connection: &Connection) {
        let unsent_bytes = connection.buffered_amount();
        self.set_state(ReadyState::Closed);

        info!(unsent_bytes, "WebSocket connection closed");

        self.deliver(Envelope::Closed {
            info: connection.info().clone(),
            unsent_bytes,
        });
    }

    /// A connection that never opened: `Error` then `Closed`.
    fn fail(&mut self, event: ErrorEvent) {
        let info = self.shared.info.lock().clone();
        let unsent_bytes = self.shared.buffered.load(Ordering::SeqCst);
        self.set_state(ReadyState::Closed);

        self.deliver(Envelope::Error {
            info: info.clone(),
            event,
        });
        self.deliver(Envelope::Closed { info, unsent_bytes });
    }

    fn on_outbound(&mut self, message: Option<Value>, connection: Option<&Connection>) {
        let Some(message) = message else {
            debug!("toSocket port closed");
            self.outbound_open = false;
            return;
        };

        let connection = match connection {
            Some(connection) if self.state() == ReadyState::Open => connection,
            _ => {
                warn!(state = ?self.state(), payload = %message, "No open socket, message dropped");
                return;
            }
        };

        match to_string(&message) {
            Ok(text) => {
                debug!(bytes = text.len(), "Sending message");
                if let Err(e) = connection.send(text) {
                    warn!(error = %e, "Message dropped");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize outbound message"),
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn deliver(&self, envelope: Envelope) {
        if self.inbound.send(envelope).is_err() {
            debug!("fromSocket port closed, envelope dropped");
        }
    }

    fn state(&self) -> ReadyState {
        *self.state_tx.borrow()
    }

    fn set_state(&self, state: ReadyState) {
        self.state_tx.send_replace(state);
    }
}

// ============================================================================
// Tests
// ============================================================================
