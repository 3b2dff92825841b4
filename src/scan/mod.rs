//! Scan outcomes, their badge rendering, and the per-tab cache.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `outcome` | [`ScanOutcome`], [`ScanStatus`], [`clamp_risk`] |
//! | `badge` | [`Badge`] and [`Severity`] color bands |
//! | `cache` | [`ScanCache`] keyed by tab, written through a [`ScanTicket`] |

// ============================================================================
// Submodules
// ============================================================================

mod badge;
mod cache;
mod outcome;

// ============================================================================
// Re-exports
// ============================================================================

pub use badge::{Badge, NEUTRAL_COLOR, NEUTRAL_TEXT, Severity};
pub use cache::{ScanCache, ScanTicket};
pub use outcome::{EXEMPT_LABEL, EXEMPT_NOTE, EXEMPT_RISK, ScanOutcome, ScanStatus, clamp_risk};
