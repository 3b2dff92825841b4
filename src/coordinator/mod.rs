//! Tab scan coordinator.
//!
//! Decides when a tab is scanned, which URLs are exempt, and what happens
//! with the result.
//!
//! # Scan Flow
//!
//! ```text
//! ScanRequest ─► scheme check ─► search page check ─► classifier
//!                    │                  │                 │
//!             UnsupportedScheme       Exempt     Classified / Unreachable
//!                    └──────────────────┴────────┬────────┘
//!                                                ▼
//!                               cache ─► badge ─► auto-block
//! ```
//!
//! # Triggers
//!
//! | Trigger | Action |
//! |---------|--------|
//! | `tabs.activated` | Scan the active tab |
//! | `tabs.updated` (complete, active, with URL) | Scan that tab |
//! | `tabs.removed` | Evict the tab's cache entry |
//! | popup `scan` | Scan the active tab, reply with the outcome |
//! | popup `getResult` | Reply with the active tab's cached outcome |
//!
//! Concurrent scans of the same tab are not fenced: whichever resolves last
//! owns the cache entry and the badge.

// ============================================================================
// Submodules
// ============================================================================

mod autoblock;
mod core;
mod handle;

// ============================================================================
// Imports
// ============================================================================

use crate::identifiers::TabId;

// ============================================================================
// Re-exports
// ============================================================================

pub use autoblock::AutoBlockPolicy;
pub use core::Coordinator;
pub use handle::CoordinatorHandle;

// ============================================================================
// ScanRequest
// ============================================================================

/// A URL to scan and the tab it belongs to.
///
/// The tab ID is captured when the request is made; the outcome is cached
/// under it even if the tab has navigated elsewhere since.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// URL to evaluate.
    pub url: String,
    /// Tab the outcome belongs to.
    pub tab_id: TabId,
}

impl ScanRequest {
    /// Creates a scan request.
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>, tab_id: TabId) -> Self {
        Self {
            url: url.into(),
            tab_id,
        }
    }
}
