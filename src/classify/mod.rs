//! URL heuristics deciding whether a navigation is worth scanning.
//!
//! Everything here is pure: no state, no I/O, and malformed input never
//! panics.
//!
//! | Function | Decides |
//! |----------|---------|
//! | [`is_scannable_scheme`] | Only `http`/`https` reach the classifier |
//! | [`is_search_results_page`] | Search-engine result pages are exempt |
//!
//! # Example
//!
//! ```
//! use phishshield::classify::{is_scannable_scheme, is_search_results_page};
//!
//! assert!(is_scannable_scheme("https://example.com/login"));
//! assert!(!is_scannable_scheme("chrome://settings"));
//! assert!(is_search_results_page("https://www.google.com/search?q=rust"));
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod scheme;
mod search;

// ============================================================================
// Re-exports
// ============================================================================

pub use scheme::is_scannable_scheme;
pub use search::{SearchEngine, is_search_results_page};
