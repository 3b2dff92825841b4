//! Scheme gate.

use url::Url;

/// Returns `true` only for `http` and `https` URLs.
///
/// Unparsable input is treated as not scannable.
#[must_use]
pub fn is_scannable_scheme(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}

// ============================================================================
// Tests
// ============================================================================
