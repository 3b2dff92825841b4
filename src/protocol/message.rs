//! Popup request/response contract.
//!
//! The popup asks the coordinator for either a fresh scan or the cached
//! result of the active tab. Every request gets exactly one
//! [`PopupReply`]; failures travel as an error object, never as a dropped
//! reply.
//!
//! | Request | Reply |
//! |---------|-------|
//! | `{"type": "scan"}` | outcome, or `{"error": ...}` |
//! | `{"type": "getResult"}` | cached outcome, or `{}` |

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Map, Value};

use crate::error::Error;
use crate::scan::{ScanOutcome, ScanStatus};

// ============================================================================
// Constants
// ============================================================================

/// Hint shown when the classifier is down or there is nothing to scan.
pub const SERVICE_HINT: &str = "Start the local API server on http://127.0.0.1:5000";

// ============================================================================
// PopupRequest
// ============================================================================

/// A message from the popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupRequest {
    /// Force a fresh scan of the active tab.
    Scan,
    /// Return the cached outcome of the active tab.
    GetResult,
    /// Any other message type.
    Unknown(String),
}

impl PopupRequest {
    /// Parses the message `type` field.
    #[must_use]
    pub fn from_type(kind: &str) -> Self {
        match kind {
            "scan" => Self::Scan,
            "getResult" => Self::GetResult,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Parses a message object such as `{"type": "scan"}`.
    #[must_use]
    pub fn from_value(message: &Value) -> Self {
        Self::from_type(
            message
                .get("type")
                .and_then(|v| v.as_str())
                .unwrap_or_default(),
        )
    }
}

// ============================================================================
// PopupReply
// ============================================================================

/// Answer to a [`PopupRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum PopupReply {
    /// A scan outcome (fresh or cached).
    Outcome(ScanOutcome),
    /// The request could not produce an outcome.
    Error {
        /// User-facing message.
        message: String,
        /// Whether to show [`SERVICE_HINT`].
        hint: bool,
    },
    /// Nothing cached for the active tab.
    Empty,
}

impl PopupReply {
    /// Builds an error reply from a crate error.
    #[must_use]
    pub fn from_error(err: &Error) -> Self {
        Self::Error {
            message: err.to_string(),
            hint: err.wants_service_hint(),
        }
    }

    /// Builds an error reply for an unrecognized message type.
    #[must_use]
    pub fn unknown_type() -> Self {
        Self::Error {
            message: "Unknown message type".to_string(),
            hint: false,
        }
    }

    /// Returns the hint to display, if any.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        let show = match self {
            Self::Outcome(outcome) => outcome.status == ScanStatus::Unreachable,
            Self::Error { hint, .. } => *hint,
            Self::Empty => false,
        };
        show.then_some(SERVICE_HINT)
    }

    /// Serializes to the JSON object the popup reads.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut object = match self {
            Self::Outcome(outcome) => match outcome.to_value() {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            Self::Error { message, .. } => {
                let mut map = Map::new();
                map.insert("error".to_string(), Value::String(message.clone()));
                map
            }
            Self::Empty => Map::new(),
        };

        if let Some(hint) = self.hint() {
            object.insert("hint".to_string(), Value::String(hint.to_string()));
        }

        Value::Object(object)
    }
}

impl From<ScanOutcome> for PopupReply {
    fn from(outcome: ScanOutcome) -> Self {
        Self::Outcome(outcome)
    }
}

// ============================================================================
// Tests
// ============================================================================
