//! WebSocket transport layer.
//!
//! Owns the single client connection the adapter drives.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Adapter loop   │         WebSocket            │  Remote         │
//! │                 │                              │  endpoint       │
//! │  Connection ────┼──► writer task ─────────────►│                 │
//! │  WsReader  ◄────┼──────────────────────────────│                 │
//! └─────────────────┘    ws://localhost:8887       └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Connection::open` - Client handshake, metadata from the response
//! 2. `Connection::send` - Queue text frames, tracked as buffered bytes
//! 3. `Connection::close` - Queue a close frame behind pending text
//! 4. Reader yields the peer's close, then ends
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Client connection, writer task, ready state |

// ============================================================================
// Submodules
// ============================================================================

/// Client connection, writer task and ready state.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, ReadyState, WsReader};
