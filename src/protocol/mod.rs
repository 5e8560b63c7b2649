//! Envelope types delivered to the application.
//!
//! # Wire Shape
//!
//! | Envelope | JSON |
//! |----------|------|
//! | `Connected` | `{"msgType": "Connected", "msg": {url, binaryType, extensions, protocol}}` |
//! | `Error` | `{"msgType": "Error", "msg": {url, ..., event}}` |
//! | `Closed` | `{"msgType": "Closed", "msg": {url, ..., unsentBytes}}` |
//! | `DecodeError` | `{"msgType": "DecodeError", "msg": {url, ..., data, error}}` |
//! | `Message` | the decoded payload, untagged |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `envelope` | Envelope enum and text payload classification |
//! | `metadata` | Connection metadata and error events |

// ============================================================================
// Submodules
// ============================================================================

/// Envelope enum and text payload classification.
pub mod envelope;

/// Connection metadata reported with control envelopes.
pub mod metadata;

// ============================================================================
// Re-exports
// ============================================================================

pub use envelope::Envelope;
pub use metadata::{BinaryType, ConnectionInfo, ErrorEvent};
