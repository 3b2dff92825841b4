//! Browser-side collaborators.
//!
//! The coordinator never talks to the browser directly. It goes through
//! [`TabHost`], which answers three questions: which tab is active, what
//! badge a tab shows, and where a tab navigates to.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TabHost`] | Active-tab lookup, badge and redirect seam |
//! | [`TabInfo`] | Snapshot of a tab as reported by the extension |
//! | [`TabEvent`] | Tab lifecycle notification |
//! | [`ExtensionHost`] | [`TabHost`] over the extension WebSocket |

// ============================================================================
// Submodules
// ============================================================================

/// Extension-backed tab host and event bridge.
pub mod extension;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::identifiers::TabId;
use crate::scan::Badge;

// ============================================================================
// Re-exports
// ============================================================================

pub use extension::{ExtensionHost, attach_bridge};

// ============================================================================
// TabInfo
// ============================================================================

/// A browser tab as reported by `tabs.queryActive`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TabInfo {
    /// Tab ID.
    pub id: TabId,

    /// Current URL; absent for tabs the extension cannot read.
    #[serde(default)]
    pub url: Option<String>,

    /// Whether the tab is active in its window.
    #[serde(default)]
    pub active: bool,

    /// Loading status.
    #[serde(default)]
    pub status: Option<String>,
}

impl TabInfo {
    /// Returns the URL if it is present and non-empty.
    #[inline]
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

// ============================================================================
// TabEvent
// ============================================================================

/// Tab lifecycle notification routed to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEvent {
    /// The user switched tabs.
    Activated {
        /// Newly active tab, when reported.
        tab_id: Option<TabId>,
    },

    /// A tab changed state.
    Updated {
        /// Tab ID.
        tab_id: TabId,
        /// Loading status.
        status: String,
        /// Current URL.
        url: Option<String>,
        /// Whether the tab is active.
        active: bool,
    },

    /// A tab was closed.
    Removed {
        /// Tab ID.
        tab_id: TabId,
    },
}

impl TabEvent {
    /// Returns the URL to scan if this is a finished navigation of the
    /// active tab.
    #[must_use]
    pub fn completed_navigation(&self) -> Option<(TabId, &str)> {
        match self {
            Self::Updated {
                tab_id,
                status,
                url: Some(url),
                active: true,
            } if status == "complete" && !url.is_empty() => Some((*tab_id, url.as_str())),
            _ => None,
        }
    }
}

// ============================================================================
// TabHost
// ============================================================================

/// Browser operations the coordinator depends on.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// Returns the active tab of the current window, if any.
    async fn active_tab(&self) -> Result<Option<TabInfo>>;

    /// Shows `badge` on the toolbar icon for `tab_id`.
    async fn set_badge(&self, tab_id: TabId, badge: &Badge) -> Result<()>;

    /// Navigates `tab_id` to `url`.
    async fn redirect(&self, tab_id: TabId, url: &str) -> Result<()>;
}

// ============================================================================
// Tests
// ============================================================================
