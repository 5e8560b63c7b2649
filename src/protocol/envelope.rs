//! Envelope enum and text payload classification.
//!
//! Control envelopes serialize as `{"msgType": ..., "msg": {...}}`. A
//! forwarded message serializes as the decoded payload itself, so the
//! application sees exactly what the server sent.

// ============================================================================
// Imports
// ============================================================================

use serde::{Serialize, Serializer};
use serde_json::{Value, from_str};

use super::metadata::{ConnectionInfo, ErrorEvent};

// ============================================================================
// Envelope
// ============================================================================

/// One notification delivered to the application per transport event.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// The connection opened.
    Connected(ConnectionInfo),

    /// A text payload decoded as JSON.
    Message(Value),

    /// The transport reported an error.
    Error {
        /// Connection metadata at the time of the error.
        info: ConnectionInfo,
        /// The transport error.
        event: ErrorEvent,
    },

    /// The connection closed.
    Closed {
        /// Connection metadata at close time.
        info: ConnectionInfo,
        /// Bytes queued for sending but not yet written.
        unsent_bytes: u64,
    },

    /// A text payload that was not valid JSON.
    DecodeError {
        /// Connection metadata.
        info: ConnectionInfo,
        /// The raw payload.
        data: String,
        /// Parser error description.
        error: String,
    },
}

impl Envelope {
    /// Classifies an inbound text payload.
    ///
    /// Valid JSON becomes [`Envelope::Message`] holding the decoded value;
    /// anything else becomes [`Envelope::DecodeError`].
    #[must_use]
    pub fn from_text(info: &ConnectionInfo, text: &str) -> Self {
        match from_str::<Value>(text) {
            Ok(value) => Self::Message(value),
            Err(e) => Self::DecodeError {
                info: info.clone(),
                data: text.to_string(),
                error: e.to_string(),
            },
        }
    }

    /// Returns the `msgType` discriminator, or `None` for forwarded messages.
    #[inline]
    #[must_use]
    pub const fn msg_type(&self) -> Option<&'static str> {
        match self {
            Self::Connected(_) => Some("Connected"),
            Self::Message(_) => None,
            Self::Error { .. } => Some("Error"),
            Self::Closed { .. } => Some("Closed"),
            Self::DecodeError { .. } => Some("DecodeError"),
        }
    }

    /// Returns `true` for [`Envelope::Closed`].
    #[inline]
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }
}

// ============================================================================
// Serialization
// ============================================================================

/// Borrowed, adjacently tagged view of the control envelopes.
#[derive(Serialize)]
#[serde(tag = "msgType", content = "msg")]
enum Tagged<'a> {
    Connected(&'a ConnectionInfo),
    Error(ErrorMsg<'a>),
    Closed(ClosedMsg<'a>),
    DecodeError(DecodeErrorMsg<'a>),
}

#[derive(Serialize)]
struct ErrorMsg<'a> {
    #[serde(flatten)]
    info: &'a ConnectionInfo,
    event: &'a ErrorEvent,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClosedMsg<'a> {
    #[serde(flatten)]
    info: &'a ConnectionInfo,
    unsent_bytes: u64,
}

#[derive(Serialize)]
struct DecodeErrorMsg<'a> {
    #[serde(flatten)]
    info: &'a ConnectionInfo,
    data: &'a str,
    error: &'a str,
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tagged = match self {
            Self::Message(value) => return value.serialize(serializer),
            Self::Connected(info) => Tagged::Connected(info),
            Self::Error { info, event } => Tagged::Error(ErrorMsg { info, event }),
            Self::Closed { info, unsent_bytes } => Tagged::Closed(ClosedMsg {
                info,
                unsent_bytes: *unsent_bytes,
            }),
            Self::DecodeError { info, data, error } => {
                Tagged::DecodeError(DecodeErrorMsg { info, data, error })
            }
        };
        tagged.serialize(serializer)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use serde_json::{json, to_string, to_value};

    use crate::protocol::BinaryType;

    fn info() -> ConnectionInfo {
        ConnectionInfo::pending("ws://localhost:8887", BinaryType::Blob)
    }

    #[test]
    fn test_connected_shape() {
        let envelope = Envelope::Connected(info());
        assert_eq!(
            to_value(&envelope).unwrap(),
            json!({
                "msgType": "Connected",
                "msg": {
                    "url": "ws://localhost:8887",
                    "binaryType": "blob",
                    "extensions": "",
                    "protocol": ""
                }
            })
        );
    }

    #[test]
    fn test_message_is_untagged() {
        let envelope = Envelope::from_text(&info(), r#"{"x":2}"#);
        assert_eq!(envelope, Envelope::Message(json!({ "x": 2 })));
        assert_eq!(envelope.msg_type(), None);
        assert_eq!(to_string(&envelope).unwrap(), r#"{"x":2}"#);
    }

    #[test]
    fn test_closed_reports_unsent_bytes() {
        let envelope = Envelope::Closed {
            info: info(),
            unsent_bytes: 12,
        };
        assert!(envelope.is_closed());
        assert_eq!(
            to_value(&envelope).unwrap(),
            json!({
                "msgType": "Closed",
                "msg": {
                    "url": "ws://localhost:8887",
                    "binaryType": "blob",
                    "extensions": "",
                    "protocol": "",
                    "unsentBytes": 12
                }
            })
        );
    }

    #[test]
    fn test_error_carries_event() {
        let envelope = Envelope::Error {
            info: info(),
            event: ErrorEvent::new("Connection refused"),
        };
        let value = to_value(&envelope).unwrap();
        assert_eq!(value["msgType"], "Error");
        assert_eq!(value["msg"]["url"], "ws://localhost:8887");
        assert_eq!(
            value["msg"]["event"],
            json!({ "type": "error", "message": "Connection refused" })
        );
    }

    #[test]
    fn test_malformed_text_is_decode_error() {
        let envelope = Envelope::from_text(&info(), "{not json");
        assert_eq!(envelope.msg_type(), Some("DecodeError"));

        let value = to_value(&envelope).unwrap();
        assert_eq!(value["msg"]["data"], "{not json");
        assert!(value["msg"]["error"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[test]
    fn test_scalar_payloads_forwarded() {
        assert_eq!(
            Envelope::from_text(&info(), "42"),
            Envelope::Message(json!(42))
        );
        assert_eq!(
            Envelope::from_text(&info(), "\"hi\""),
            Envelope::Message(json!("hi"))
        );
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            ".{0,12}".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-zA-Z]{1,6}", inner, 0..6)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_text_payload_forwards_decoded_value(value in arb_json()) {
            let text = to_string(&value).unwrap();
            let envelope = Envelope::from_text(&info(), &text);
            prop_assert_eq!(&envelope, &Envelope::Message(value.clone()));
            prop_assert_eq!(to_value(&envelope).unwrap(), value);
        }
    }
}
