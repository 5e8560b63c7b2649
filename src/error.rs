//! Error types for socket-port.
//!
//! Transport events (failed handshakes, read errors, closes) are not errors
//! from the crate's point of view: they are forwarded to the application as
//! envelopes. The [`Error`] type here covers the few operations that can
//! fail on the caller's side.
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::ConnectionClosed`], [`Error::WebSocket`] |
//! | Application | [`Error::PortClosed`] |
//! | External | [`Error::Json`], [`Error::Url`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when the socket configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// The connection's writer is gone.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Application Errors
    // ========================================================================
    /// The adapter side of a port has been dropped.
    #[error("Port closed: {port}")]
    PortClosed {
        /// Name of the port.
        port: &'static str,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// URL parse error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a port closed error.
    #[inline]
    pub fn port_closed(port: &'static str) -> Self {
        Self::PortClosed { port }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error concerns the transport connection.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectionClosed | Self::WebSocket(_))
    }

    /// Returns `true` if this error comes from invalid input rather than the
    /// network.
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Url(_))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::ConnectionClosed.to_string(), "Connection closed");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("unsupported scheme: http");
        assert_eq!(
            err.to_string(),
            "Configuration error: unsupported scheme: http"
        );
        assert!(err.is_config_error());
        assert!(!err.is_connection_error());
    }

    #[test]
    fn test_port_closed_display() {
        let err = Error::port_closed("toSocket");
        assert_eq!(err.to_string(), "Port closed: toSocket");
        assert!(!err.is_connection_error());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(Error::WebSocket(WsError::ConnectionClosed).is_connection_error());
        assert!(!Error::config("test").is_connection_error());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_from_url_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: Error = url_err.into();
        assert!(matches!(err, Error::Url(_)));
        assert!(err.is_config_error());
    }
}
