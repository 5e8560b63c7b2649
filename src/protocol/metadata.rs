//! Connection metadata carried by control envelopes.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// BinaryType
// ============================================================================

/// How binary payloads would be surfaced, as reported to the application.
///
/// Binary payloads are dropped either way; the value is metadata only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryType {
    /// `"blob"`, the browser default.
    #[default]
    Blob,
    /// `"arraybuffer"`.
    ArrayBuffer,
}

impl BinaryType {
    /// Returns the string form used on the wire.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::ArrayBuffer => "arraybuffer",
        }
    }
}

// ============================================================================
// ConnectionInfo
// ============================================================================

/// Metadata about the connection as negotiated by the transport.
///
/// `extensions` and `protocol` are empty until the handshake completes, and
/// stay empty when the server did not select any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    /// Target URL as configured.
    pub url: String,

    /// Reported binary type.
    pub binary_type: BinaryType,

    /// `Sec-WebSocket-Extensions` from the handshake response.
    pub extensions: String,

    /// `Sec-WebSocket-Protocol` from the handshake response.
    pub protocol: String,
}

impl ConnectionInfo {
    /// Creates metadata for a connection that has not negotiated anything yet.
    #[must_use]
    pub fn pending(url: impl Into<String>, binary_type: BinaryType) -> Self {
        Self {
            url: url.into(),
            binary_type,
            extensions: String::new(),
            protocol: String::new(),
        }
    }
}

// ============================================================================
// ErrorEvent
// ============================================================================

/// A transport error, shaped like the browser's error event.
///
/// # Format
///
/// ```json
/// { "type": "error", "message": "Connection refused (os error 111)" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEvent {
    /// Event type marker (always "error").
    #[serde(rename = "type")]
    pub event_type: &'static str,

    /// Human-readable description from the transport.
    pub message: String,
}

impl ErrorEvent {
    /// Creates an error event with the given message.
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            event_type: "error",
            message: message.into(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{json, to_value};

    #[test]
    fn test_binary_type_wire_names() {
        assert_eq!(to_value(BinaryType::Blob).unwrap(), json!("blob"));
        assert_eq!(to_value(BinaryType::ArrayBuffer).unwrap(), json!("arraybuffer"));
        assert_eq!(BinaryType::ArrayBuffer.as_str(), "arraybuffer");
    }

    #[test]
    fn test_connection_info_camel_case() {
        let info = ConnectionInfo::pending("ws://localhost:8887", BinaryType::Blob);
        assert_eq!(
            to_value(&info).unwrap(),
            json!({
                "url": "ws://localhost:8887",
                "binaryType": "blob",
                "extensions": "",
                "protocol": ""
            })
        );
    }

    #[test]
    fn test_error_event_shape() {
        let event = ErrorEvent::new("boom");
        assert_eq!(event.event_type, "error");
        assert_eq!(
            to_value(&event).unwrap(),
            json!({ "type": "error", "message": "boom" })
        );
    }
}
