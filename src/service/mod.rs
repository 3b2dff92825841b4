//! Remote risk service client.
//!
//! The classifier is an opaque HTTP service. [`RiskService`] is the seam the
//! coordinator depends on; [`RiskClient`] is the HTTP implementation that
//! walks an ordered list of redundant endpoints once.
//!
//! # Failover
//!
//! ```text
//! endpoint[0] ──fail──► endpoint[1] ──fail──► ... ──fail──► None
//!      │                     │
//!     2xx                   2xx
//!      ▼                     ▼
//!  Classification        Classification
//! ```
//!
//! One pass, no retries, no backoff. A `None` result means "unreachable",
//! never "safe".

// ============================================================================
// Submodules
// ============================================================================

/// HTTP client with single-pass endpoint failover.
pub mod client;

/// Classifier response types.
pub mod response;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::RiskClient;
pub use response::{Classification, HealthReport};

// ============================================================================
// RiskService
// ============================================================================

/// A remote URL classifier.
#[async_trait]
pub trait RiskService: Send + Sync {
    /// Classifies `url`.
    ///
    /// Returns `None` when no endpoint produced a usable response.
    async fn classify(&self, url: &str) -> Option<Classification>;

    /// Number of endpoints a single [`classify`](Self::classify) call may try.
    fn endpoint_count(&self) -> usize {
        1
    }
}
