//! WebSocket transport layer.
//!
//! This module handles communication between the agent (Rust) and the
//! browser extension shim via WebSocket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Agent (Rust)   │                              │  Extension      │
//! │                 │         WebSocket            │  (Background)   │
//! │  AgentServer    │◄────────────────────────────►│                 │
//! │  → Connection   │      127.0.0.1:8765          │  WebSocket      │
//! │                 │                              │  Client         │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `AgentServer::bind` - Bind to the configured listen address
//! 2. `AgentServer::accept` - Take the next TCP connection
//! 3. `Incoming::handshake` - WebSocket upgrade and READY, under a deadline
//! 4. `Connection` - Send commands, receive responses/events
//! 5. `Connection::closed` - Resolves when the extension goes away
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and event loop |
//! | `server` | WebSocket server binding and acceptance |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// WebSocket server for extension sessions.
pub mod server;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, EventHandler, ReadyData};
pub use server::{AgentServer, Incoming};
