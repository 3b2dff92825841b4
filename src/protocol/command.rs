//! Command definitions organized by module.
//!
//! Commands follow `module.methodName` format and map one-to-one onto the
//! browser extension APIs the shim calls.
//!
//! # Command Modules
//!
//! | Module | Commands |
//! |--------|----------|
//! | `tabs` | Active tab lookup, navigation |
//! | `action` | Toolbar badge text and color |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// Command Wrapper
// ============================================================================

/// All protocol commands organized by module.
///
/// This enum wraps module-specific command enums for unified serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// Tabs module commands.
    Tabs(TabsCommand),
    /// Action (toolbar button) module commands.
    Action(ActionCommand),
}

impl Command {
    /// Returns the `module.methodName` of the command.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Tabs(TabsCommand::QueryActive) => "tabs.queryActive",
            Self::Tabs(TabsCommand::Update { .. }) => "tabs.update",
            Self::Action(ActionCommand::SetBadgeText { .. }) => "action.setBadgeText",
            Self::Action(ActionCommand::SetBadgeBackgroundColor { .. }) => {
                "action.setBadgeBackgroundColor"
            }
        }
    }
}

// ============================================================================
// Tabs Commands
// ============================================================================

/// Tabs module commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum TabsCommand {
    /// Look up the active tab of the current window.
    ///
    /// Result: `{"tab": {"id", "url", "active", "status"} | null}`.
    #[serde(rename = "tabs.queryActive")]
    QueryActive,

    /// Navigate the request's tab to a URL.
    ///
    /// Relative URLs are resolved against the extension's own origin.
    #[serde(rename = "tabs.update")]
    Update {
        /// Target URL.
        url: String,
    },
}

// ============================================================================
// Action Commands
// ============================================================================

/// Action module commands for the toolbar badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum ActionCommand {
    /// Set the badge text for the request's tab.
    #[serde(rename = "action.setBadgeText")]
    SetBadgeText {
        /// Badge text, empty clears it.
        text: String,
    },

    /// Set the badge background for the request's tab.
    #[serde(rename = "action.setBadgeBackgroundColor")]
    SetBadgeBackgroundColor {
        /// CSS color, `#rrggbb`.
        color: String,
    },
}

// ============================================================================
// Tests
// ============================================================================
