//! Event message types.
//!
//! Events are notifications sent from the extension to the agent when tab
//! activity occurs or the popup sends a message.
//!
//! # Event Types
//!
//! | Module | Events |
//! |--------|--------|
//! | `tabs` | `activated`, `updated`, `removed` |
//! | `runtime` | `message` (popup `scan` / `getResult`) |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::browser::TabEvent;
use crate::identifiers::{RequestId, TabId};

use super::PopupRequest;

// ============================================================================
// Constants
// ============================================================================

/// Method name of popup messages, also the `replyTo` of their answers.
pub const RUNTIME_MESSAGE: &str = "runtime.message";

// ============================================================================
// Event
// ============================================================================

/// An event notification from the extension to the agent.
///
/// # Format
///
/// ```json
/// {
///   "id": "event-uuid",
///   "type": "event",
///   "method": "module.eventName",
///   "params": { ... }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Unique identifier for EventReply correlation.
    pub id: RequestId,

    /// Event type marker (always "event").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Event name in `module.eventName` format.
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,
}

impl Event {
    /// Parses the event into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ParsedEvent {
        self.parse_internal()
    }
}

// ============================================================================
// EventReply
// ============================================================================

/// A reply from the agent to the extension for events that expect an
/// answer.
///
/// # Format
///
/// ```json
/// {
///   "id": "event-uuid",
///   "replyTo": "runtime.message",
///   "result": { "risk_percent": 12, ... }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct EventReply {
    /// Matches the event's ID.
    pub id: RequestId,

    /// Event method being replied to.
    #[serde(rename = "replyTo")]
    pub reply_to: String,

    /// Reply payload.
    pub result: Value,
}

impl EventReply {
    /// Creates a new event reply.
    #[inline]
    #[must_use]
    pub fn new(id: RequestId, reply_to: impl Into<String>, result: Value) -> Self {
        Self {
            id,
            reply_to: reply_to.into(),
            result,
        }
    }
}

// ============================================================================
// ParsedEvent
// ============================================================================

/// Parsed event types for type-safe handling.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEvent {
    /// The user switched to a tab.
    TabsActivated {
        /// Tab ID, if the extension sent one.
        tab_id: Option<TabId>,
    },

    /// A tab's state changed.
    TabsUpdated {
        /// Tab ID.
        tab_id: Option<TabId>,
        /// Loading status (`"loading"`, `"complete"`).
        status: String,
        /// Current URL, when known.
        url: Option<String>,
        /// Whether the tab is the active one.
        active: bool,
    },

    /// A tab was closed.
    TabsRemoved {
        /// Tab ID.
        tab_id: Option<TabId>,
    },

    /// Message from the popup.
    RuntimeMessage {
        /// Parsed request.
        request: PopupRequest,
    },

    /// Unknown event type.
    Unknown {
        /// Event method.
        method: String,
        /// Event params.
        params: Value,
    },
}

impl ParsedEvent {
    /// Converts tab lifecycle events into a [`TabEvent`].
    ///
    /// Returns `None` for popup messages, unknown events, and tab events
    /// that lack a usable tab ID where one is required.
    #[must_use]
    pub fn into_tab_event(self) -> Option<TabEvent> {
        match self {
            Self::TabsActivated { tab_id } => Some(TabEvent::Activated { tab_id }),
            Self::TabsUpdated {
                tab_id,
                status,
                url,
                active,
            } => Some(TabEvent::Updated {
                tab_id: tab_id?,
                status,
                url,
                active,
            }),
            Self::TabsRemoved { tab_id } => Some(TabEvent::Removed { tab_id: tab_id? }),
            Self::RuntimeMessage { .. } | Self::Unknown { .. } => None,
        }
    }
}

// ============================================================================
// Event Parsing Implementation
// ============================================================================

impl Event {
    /// Internal parsing implementation.
    fn parse_internal(&self) -> ParsedEvent {
        match self.method.as_str() {
            "tabs.activated" => ParsedEvent::TabsActivated {
                tab_id: self.get_tab_id("tabId"),
            },

            "tabs.updated" => ParsedEvent::TabsUpdated {
                tab_id: self.get_tab_id("tabId"),
                status: self.get_string("status"),
                url: self.get_optional_string("url"),
                active: self.get_bool("active"),
            },

            "tabs.removed" => ParsedEvent::TabsRemoved {
                tab_id: self.get_tab_id("tabId"),
            },

            RUNTIME_MESSAGE => ParsedEvent::RuntimeMessage {
                request: PopupRequest::from_value(&self.params),
            },

            _ => ParsedEvent::Unknown {
                method: self.method.clone(),
                params: self.params.clone(),
            },
        }
    }

    /// Gets a string from params.
    #[inline]
    fn get_string(&self, key: &str) -> String {
        self.params
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }

    /// Gets a non-empty string from params.
    #[inline]
    fn get_optional_string(&self, key: &str) -> Option<String> {
        self.params
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    }

    /// Gets a boolean from params.
    #[inline]
    fn get_bool(&self, key: &str) -> bool {
        self.params
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or_default()
    }

    /// Gets a tab ID from params.
    #[inline]
    fn get_tab_id(&self, key: &str) -> Option<TabId> {
        self.params
            .get(key)
            .and_then(|v| v.as_u64())
            .and_then(TabId::from_u64)
    }
}

// ============================================================================
// Tests
// ============================================================================
