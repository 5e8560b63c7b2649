//! WebSocket client connection.
//!
//! The connection splits the stream: the read half goes back to the caller,
//! the write half is owned by a spawned writer task fed through an unbounded
//! queue. Bytes sit in the buffered-amount counter from the moment they are
//! queued until the frame has been written.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Response;
use tokio_tungstenite::tungstenite::http::header::{
    HeaderName, HeaderValue, SEC_WEBSOCKET_EXTENSIONS, SEC_WEBSOCKET_PROTOCOL,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace, warn};

use crate::config::SocketConfig;
use crate::error::{Error, Result};
use crate::protocol::ConnectionInfo;

// ============================================================================
// Types
// ============================================================================

/// Client stream as returned by the handshake.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half owned by the writer task.
type WsWriter = SplitSink<WsStream, Message>;

/// Read half handed back to the caller of [`Connection::open`].
pub type WsReader = SplitStream<WsStream>;

// ============================================================================
// ReadyState
// ============================================================================

/// Connection lifecycle, numbered as in the browser API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReadyState {
    /// Handshake in progress.
    #[default]
    Connecting = 0,
    /// Frames can be sent.
    Open = 1,
    /// Close frame queued, waiting for the peer.
    Closing = 2,
    /// Terminal.
    Closed = 3,
}

impl ReadyState {
    /// Returns `true` once the connection can no longer be used.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

// ============================================================================
// WriterCommand
// ============================================================================

/// Internal commands for the writer task.
enum WriterCommand {
    /// Write a text frame.
    Text(String),
    /// Send a close frame and stop.
    Close,
}

// ============================================================================
// Connection
// ============================================================================

/// One open WebSocket client connection.
pub struct Connection {
    /// Metadata negotiated during the handshake.
    info: ConnectionInfo,
    /// Queue feeding the writer task.
    writer_tx: mpsc::UnboundedSender<WriterCommand>,
    /// Bytes queued but not yet written (shared with observers).
    buffered: Arc<AtomicU64>,
}

impl Connection {
    /// Performs the client handshake against the configured endpoint.
    ///
    /// `buffered` becomes the connection's buffered-amount counter.
    ///
    /// # Errors
    ///
    /// - [`Error::WebSocket`] if the TCP connect or handshake fails
    /// - [`Error::Config`] if the subprotocol header cannot be built
    pub async fn open(
        config: &SocketConfig,
        buffered: Arc<AtomicU64>,
    ) -> Result<(Self, WsReader)> {
        let mut request = config.url().into_client_request()?;

        if !config.protocols().is_empty() {
            let value = HeaderValue::from_str(&config.protocols().join(", "))
                .map_err(|e| Error::config(format!("invalid subprotocol header: {e}")))?;
            request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, value);
        }

        debug!(url = %config.url(), "Connecting");

        let (ws_stream, response) = connect_async(request).await?;

        let info = ConnectionInfo {
            url: config.url().to_string(),
            binary_type: config.binary_type(),
            extensions: header_str(&response, SEC_WEBSOCKET_EXTENSIONS),
            protocol: header_str(&response, SEC_WEBSOCKET_PROTOCOL),
        };

        debug!(
            status = %response.status(),
            protocol = %info.protocol,
            extensions = %info.extensions,
            "Handshake completed"
        );

        let (ws_write, ws_read) = ws_stream.split();
        let (writer_tx, writer_rx) = mpsc::unbounded_channel();

        tokio::spawn(Self::run_writer(ws_write, writer_rx, Arc::clone(&buffered)));

        Ok((
            Self {
                info,
                writer_tx,
                buffered,
            },
            ws_read,
        ))
    }

    /// Returns the negotiated metadata.
    #[inline]
    #[must_use]
    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }

    /// Returns the bytes queued but not yet written.
    #[inline]
    #[must_use]
    pub fn buffered_amount(&self) -> u64 {
        self.buffered.load(Ordering::SeqCst)
    }

    /// Queues a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the writer task has stopped.
    pub fn send(&self, text: String) -> Result<()> {
        let len = text.len() as u64;
        self.buffered.fetch_add(len, Ordering::SeqCst);

        if self.writer_tx.send(WriterCommand::Text(text)).is_err() {
            self.buffered.fetch_sub(len, Ordering::SeqCst);
            return Err(Error::ConnectionClosed);
        }

        trace!(bytes = len, "Frame queued");
        Ok(())
    }

    /// Queues a close frame behind any pending text.
    pub fn close(&self) {
        let _ = self.writer_tx.send(WriterCommand::Close);
    }

    /// Writer loop: drains the queue in order, one frame at a time.
    async fn run_writer(
        mut ws_write: WsWriter,
        mut writer_rx: mpsc::UnboundedReceiver<WriterCommand>,
        buffered: Arc<AtomicU64>,
    ) {
        while let Some(command) = writer_rx.recv().await {
            match command {
                WriterCommand::Text(text) => {
                    let len = text.len() as u64;

                    if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                        warn!(error = %e, "Failed to write frame");
                        break;
                    }

                    buffered.fetch_sub(len, Ordering::SeqCst);
                    trace!(bytes = len, "Frame written");
                }

                WriterCommand::Close => {
                    if let Err(e) = ws_write.close().await {
                        debug!(error = %e, "Close frame not sent");
                    }
                    break;
                }
            }
        }

        debug!("Writer terminated");
    }
}

/// Reads a handshake response header, empty when absent or not UTF-8.
fn header_str(response: &Response, name: HeaderName) -> String {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    #[test]
    fn test_ready_state_numbering() {
        assert_eq!(ReadyState::Connecting as u8, 0);
        assert_eq!(ReadyState::Open as u8, 1);
        assert_eq!(ReadyState::Closing as u8, 2);
        assert_eq!(ReadyState::Closed as u8, 3);
        assert_eq!(ReadyState::default(), ReadyState::Connecting);
        assert!(ReadyState::Closed.is_terminal());
        assert!(!ReadyState::Closing.is_terminal());
    }

    #[tokio::test]
    async fn test_open_fails_when_nothing_listens() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = SocketConfig::builder()
            .url(format!("ws://127.0.0.1:{port}"))
            .build()
            .unwrap();

        let result = Connection::open(&config, Arc::default()).await;
        assert!(matches!(result, Err(Error::WebSocket(_))));
    }

    #[tokio::test]
    async fn test_send_drains_buffered_amount() -> anyhow::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await?;
            let mut ws = accept_async(stream).await?;
            let frame = ws.next().await.transpose()?;
            anyhow::Ok(frame)
        });

        let config = SocketConfig::builder()
            .url(format!("ws://127.0.0.1:{port}"))
            .build()?;
        let (connection, _reader) = Connection::open(&config, Arc::default()).await?;

        assert_eq!(connection.info().url, format!("ws://127.0.0.1:{port}"));
        assert_eq!(connection.info().protocol, "");
        assert_eq!(connection.info().extensions, "");

        connection.send(r#"{"a":1}"#.to_string())?;

        let frame = server.await??;
        assert_eq!(frame, Some(Message::Text(String::from(r#"{"a":1}"#).into())));
        assert_eq!(connection.buffered_amount(), 0);
        Ok(())
    }
}
