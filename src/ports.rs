//! Application message ports.
//!
//! An application talks to the adapter through two ports:
//!
//! | Port | Direction | Carries |
//! |------|-----------|---------|
//! | `toSocket` | application → adapter | arbitrary JSON values to send |
//! | `fromSocket` | adapter → application | [`Envelope`]s |
//!
//! [`App`] is what the adapter binds to. Either port may be missing, in which
//! case binding is a logged no-op. [`AppEnd`] is the application's half.
//!
//! # Example
//!
//! ```no_run
//! use serde_json::json;
//!
//! # async fn example() -> socket_port::Result<()> {
//! let (app, mut end) = socket_port::App::new();
//! let _binding = socket_port::bind(app);
//!
//! end.send(&json!({ "a": 1 }))?;
//! while let Some(envelope) = end.recv().await {
//!     println!("{}", serde_json::to_string(&envelope)?);
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::{Value, to_value};
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::protocol::Envelope;

// ============================================================================
// Constants
// ============================================================================

/// Name of the outbound port.
pub const TO_SOCKET: &str = "toSocket";

/// Name of the inbound port.
pub const FROM_SOCKET: &str = "fromSocket";

// ============================================================================
// Ports
// ============================================================================

/// The adapter-facing ends of both ports.
#[derive(Debug, Default)]
pub struct Ports {
    /// Values the application wants sent.
    pub to_socket: Option<mpsc::UnboundedReceiver<Value>>,
    /// Where envelopes are delivered.
    pub from_socket: Option<mpsc::UnboundedSender<Envelope>>,
}

// ============================================================================
// App
// ============================================================================

/// Application handle the adapter binds to.
#[derive(Debug, Default)]
pub struct App {
    /// Declared ports, if any.
    pub ports: Option<Ports>,
}

impl App {
    /// Creates an application with both ports wired, plus its own end.
    #[must_use]
    pub fn new() -> (Self, AppEnd) {
        let (to_socket_tx, to_socket_rx) = mpsc::unbounded_channel();
        let (from_socket_tx, from_socket_rx) = mpsc::unbounded_channel();

        let app = Self {
            ports: Some(Ports {
                to_socket: Some(to_socket_rx),
                from_socket: Some(from_socket_tx),
            }),
        };

        let end = AppEnd {
            to_socket: to_socket_tx,
            from_socket: from_socket_rx,
        };

        (app, end)
    }

    /// Creates an application that declared no ports.
    #[inline]
    #[must_use]
    pub fn without_ports() -> Self {
        Self { ports: None }
    }

    /// Names the first missing port, if any.
    #[must_use]
    pub fn missing_port(&self) -> Option<&'static str> {
        match &self.ports {
            None => Some(TO_SOCKET),
            Some(ports) if ports.to_socket.is_none() => Some(TO_SOCKET),
            Some(ports) if ports.from_socket.is_none() => Some(FROM_SOCKET),
            Some(_) => None,
        }
    }

    /// Takes both port ends, or `None` if either is missing.
    pub(crate) fn take_ports(
        self,
    ) -> Option<(mpsc::UnboundedReceiver<Value>, mpsc::UnboundedSender<Envelope>)> {
        let ports = self.ports?;
        Some((ports.to_socket?, ports.from_socket?))
    }
}

// ============================================================================
// AppEnd
// ============================================================================

/// The application's halves of both ports.
#[derive(Debug)]
pub struct AppEnd {
    to_socket: mpsc::UnboundedSender<Value>,
    from_socket: mpsc::UnboundedReceiver<Envelope>,
}

impl AppEnd {
    /// Hands a message to the adapter.
    ///
    /// Whether it reaches the socket depends on the connection being open;
    /// the adapter drops it otherwise.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the message cannot be represented as JSON
    /// - [`Error::PortClosed`] if the adapter is gone
    pub fn send<T: Serialize + ?Sized>(&self, message: &T) -> Result<()> {
        let value = to_value(message)?;
        self.to_socket
            .send(value)
            .map_err(|_| Error::port_closed(TO_SOCKET))
    }

    /// Receives the next envelope, `None` once the adapter is gone.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.from_socket.recv().await
    }

    /// Splits into the raw channel ends.
    #[must_use]
    pub fn into_inner(
        self,
    ) -> (mpsc::UnboundedSender<Value>, mpsc::UnboundedReceiver<Envelope>) {
        (self.to_socket, self.from_socket)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_wired_app_has_no_missing_port() {
        let (app, _end) = App::new();
        assert_eq!(app.missing_port(), None);
        assert!(app.take_ports().is_some());
    }

    #[test]
    fn test_missing_ports_reported() {
        assert_eq!(App::without_ports().missing_port(), Some(TO_SOCKET));

        let (_tx, rx) = mpsc::unbounded_channel();
        let only_outbound = App {
            ports: Some(Ports {
                to_socket: Some(rx),
                from_socket: None,
            }),
        };
        assert_eq!(only_outbound.missing_port(), Some(FROM_SOCKET));
        assert!(only_outbound.take_ports().is_none());

        let empty = App {
            ports: Some(Ports::default()),
        };
        assert_eq!(empty.missing_port(), Some(TO_SOCKET));
    }

    #[tokio::test]
    async fn test_send_converts_to_value() {
        let (app, end) = App::new();
        let (mut to_socket, _from_socket) = app.take_ports().unwrap();

        end.send(&json!({ "a": 1 })).unwrap();
        assert_eq!(to_socket.recv().await, Some(json!({ "a": 1 })));
    }

    #[test]
    fn test_send_after_adapter_dropped() {
        let (app, end) = App::new();
        drop(app);

        let err = end.send(&json!(null)).unwrap_err();
        assert!(matches!(err, Error::PortClosed { port: TO_SOCKET }));
    }

    #[test]
    fn test_send_rejects_non_json_keys() {
        use std::collections::HashMap;

        let (_app, end) = App::new();
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);

        assert!(matches!(end.send(&map), Err(Error::Json(_))));
    }
}
