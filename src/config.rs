//! Socket configuration and builder.
//!
//! The adapter talks to one fixed endpoint. [`SocketConfig::default()`]
//! targets [`DEFAULT_URL`] with no subprotocols; the builder exists for
//! embedding the adapter against another endpoint.
//!
//! # Example
//!
//! ```no_run
//! use socket_port::{BinaryType, SocketConfig};
//!
//! # fn example() -> socket_port::Result<()> {
//! let config = SocketConfig::builder()
//!     .url("ws://127.0.0.1:9001")
//!     .protocol("chat")
//!     .binary_type(BinaryType::ArrayBuffer)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use tokio_tungstenite::tungstenite::http::HeaderValue;
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::BinaryType;

// ============================================================================
// Constants
// ============================================================================

/// Endpoint the adapter connects to unless configured otherwise.
pub const DEFAULT_URL: &str = "ws://localhost:8887";

// ============================================================================
// SocketConfig
// ============================================================================

/// Validated connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketConfig {
    /// Target URL, kept verbatim for envelope metadata.
    url: String,
    /// Subprotocols requested during the handshake.
    protocols: Vec<String>,
    /// Binary type reported in envelope metadata.
    binary_type: BinaryType,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            protocols: Vec::new(),
            binary_type: BinaryType::default(),
        }
    }
}

impl SocketConfig {
    /// Creates a builder starting from the default endpoint.
    #[inline]
    #[must_use]
    pub fn builder() -> SocketConfigBuilder {
        SocketConfigBuilder::new()
    }

    /// Returns the target URL as configured.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the requested subprotocols.
    #[inline]
    #[must_use]
    pub fn protocols(&self) -> &[String] {
        &self.protocols
    }

    /// Returns the reported binary type.
    #[inline]
    #[must_use]
    pub const fn binary_type(&self) -> BinaryType {
        self.binary_type
    }
}

// ============================================================================
// SocketConfigBuilder
// ============================================================================

/// Builder for [`SocketConfig`].
#[derive(Debug, Clone)]
pub struct SocketConfigBuilder {
    url: String,
    protocols: Vec<String>,
    binary_type: BinaryType,
}

impl Default for SocketConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SocketConfigBuilder {
    /// Creates a builder for the default endpoint.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            protocols: Vec::new(),
            binary_type: BinaryType::default(),
        }
    }

    /// Sets the WebSocket URL (`ws://` or `wss://`).
    #[inline]
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Adds a subprotocol to request during the handshake.
    #[inline]
    #[must_use]
    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocols.push(protocol.into());
        self
    }

    /// Sets the binary type reported in connection metadata.
    #[inline]
    #[must_use]
    pub fn binary_type(mut self, binary_type: BinaryType) -> Self {
        self.binary_type = binary_type;
        self
    }

    /// Builds the configuration with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Url`] if the URL does not parse
    /// - [`Error::Config`] if the scheme is not `ws`/`wss`
    /// - [`Error::Config`] if a subprotocol is empty or not a valid header value
    pub fn build(self) -> Result<SocketConfig> {
        self.validate_url()?;
        self.validate_protocols()?;

        Ok(SocketConfig {
            url: self.url,
            protocols: self.protocols,
            binary_type: self.binary_type,
        })
    }

    fn validate_url(&self) -> Result<()> {
        let parsed = Url::parse(&self.url)?;

        match parsed.scheme() {
            "ws" | "wss" => {}
            other => return Err(Error::config(format!("unsupported scheme: {other}"))),
        }

        if parsed.host_str().is_none() {
            return Err(Error::config(format!("missing host in {}", self.url)));
        }

        Ok(())
    }

    fn validate_protocols(&self) -> Result<()> {
        for protocol in &self.protocols {
            if protocol.is_empty()
                || protocol.contains(',')
                || protocol.chars().any(char::is_whitespace)
                || HeaderValue::from_str(protocol).is_err()
            {
                return Err(Error::config(format!("invalid subprotocol: {protocol:?}")));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_default_targets_fixed_endpoint() {
        let config = SocketConfig::default();
        assert_eq!(config.url(), "ws://localhost:8887");
        assert!(config.protocols().is_empty());
        assert_eq!(config.binary_type(), BinaryType::Blob);
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let config = assert_ok!(SocketConfig::builder().build());
        assert_eq!(config, SocketConfig::default());
    }

    #[test]
    fn test_builder_overrides() {
        let config = assert_ok!(
            SocketConfig::builder()
                .url("wss://example.com/socket")
                .protocol("chat")
                .protocol("superchat")
                .binary_type(BinaryType::ArrayBuffer)
                .build()
        );

        assert_eq!(config.url(), "wss://example.com/socket");
        assert_eq!(config.protocols(), ["chat", "superchat"]);
        assert_eq!(config.binary_type(), BinaryType::ArrayBuffer);
    }

    #[test]
    fn test_rejects_http_scheme() {
        let err = assert_err!(SocketConfig::builder().url("http://localhost:8887").build());
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_rejects_unparseable_url() {
        let err = assert_err!(SocketConfig::builder().url("not a url").build());
        assert!(matches!(err, Error::Url(_)));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_bare_host_port_is_scheme_error() {
        // Parses as scheme "localhost", so the scheme check rejects it
        let err = assert_err!(SocketConfig::builder().url("localhost:8887").build());
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_rejects_bad_protocol() {
        assert_err!(SocketConfig::builder().protocol("").build());
        assert_err!(SocketConfig::builder().protocol("a b").build());
        assert_err!(SocketConfig::builder().protocol("a,b").build());
    }
}
