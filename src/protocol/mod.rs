//! WebSocket protocol message types.
//!
//! This module defines the message format for communication between the
//! agent (Rust) and the browser extension shim.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Agent → Extension | Badge, navigation, tab lookup |
//! | `Response` | Extension → Agent | Command result |
//! | `Event` | Extension → Agent | Tab lifecycle, popup messages |
//! | `EventReply` | Agent → Extension | Answer to a popup message |
//!
//! # Command Naming
//!
//! Commands follow `module.methodName` format:
//!
//! - `tabs.queryActive`
//! - `tabs.update`
//! - `action.setBadgeText`
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command definitions by module |
//! | `event` | Event and EventReply types |
//! | `message` | Popup request/reply contract |
//! | `request` | Request and Response types |

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions organized by module.
pub mod command;

/// Event message types.
pub mod event;

/// Popup request/reply contract.
pub mod message;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{ActionCommand, Command, TabsCommand};
pub use event::{Event, EventReply, ParsedEvent, RUNTIME_MESSAGE};
pub use message::{PopupReply, PopupRequest, SERVICE_HINT};
pub use request::{Request, Response, ResponseType};
