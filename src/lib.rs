//! socket-port - Bridges application message ports to one WebSocket.
//!
//! An application exposes two ports: `toSocket` (values it wants sent) and
//! `fromSocket` (envelopes it receives). Binding the application opens a
//! single WebSocket connection and forwards in both directions:
//!
//! - **Outbound**: each value is serialized to JSON text and sent, only while
//!   the socket is open; otherwise it is logged and dropped
//! - **Inbound**: each transport event becomes exactly one [`Envelope`]
//!
//! There is no reconnection, no queuing while disconnected and no binary
//! payload handling. One binding, one connection.
//!
//! # Quick Start
//!
//! ```no_run
//! use serde_json::json;
//! use socket_port::{App, Envelope};
//!
//! #[tokio::main]
//! async fn main() -> socket_port::Result<()> {
//!     let (app, mut end) = App::new();
//!     let Some(binding) = socket_port::bind(app) else {
//!         return Ok(());
//!     };
//!
//!     while let Some(envelope) = end.recv().await {
//!         match envelope {
//!             Envelope::Connected(_) => end.send(&json!({ "hello": "world" }))?,
//!             Envelope::Closed { .. } => break,
//!             other => println!("{}", serde_json::to_string(&other)?),
//!         }
//!     }
//!
//!     binding.closed().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapter`] | [`bind`], [`SocketAdapter`], [`Binding`] |
//! | [`config`] | [`SocketConfig`] and builder |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`ports`] | [`App`], [`Ports`], [`AppEnd`] |
//! | [`protocol`] | [`Envelope`] and connection metadata |
//! | [`transport`] | WebSocket client connection (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Binding and the event loop.
pub mod adapter;

/// Endpoint configuration.
pub mod config;

/// Error types and result aliases.
pub mod error;

/// Application message ports.
pub mod ports;

/// Envelopes delivered to the application.
pub mod protocol;

/// WebSocket transport layer.
///
/// Internal module owning the single client connection.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Adapter types
pub use adapter::{Binding, SocketAdapter, bind};

// Configuration
pub use config::{DEFAULT_URL, SocketConfig, SocketConfigBuilder};

// Error types
pub use error::{Error, Result};

// Port types
pub use ports::{App, AppEnd, Ports};

// Envelope types
pub use protocol::{BinaryType, ConnectionInfo, Envelope, ErrorEvent};

// Transport state
pub use transport::ReadyState;
