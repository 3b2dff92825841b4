//! Search-results page exemption.
//!
//! A results page is not where the user ends up acting, so scanning it only
//! burns a classifier call and shows a misleading score. The destination
//! gets scanned once the user opens a result.
//!
//! This is an allowlist-style heuristic, not a security boundary: a miss
//! costs one redundant remote call, a false hit skips one real scan.

use std::fmt;

use url::Url;

// ============================================================================
// SearchEngine
// ============================================================================

/// Search engines whose result pages are exempt from scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEngine {
    /// `google.*`, results under `/search` or `/webhp`.
    Google,
    /// `bing.*`, results under `/search`.
    Bing,
    /// `yahoo.*`, results under `/search`.
    Yahoo,
    /// `duckduckgo.*`, results carry a `q=` query parameter.
    DuckDuckGo,
    /// `ecosia.*`, results under `/search`.
    Ecosia,
}

impl SearchEngine {
    /// All engines, in match order.
    pub const ALL: [Self; 5] = [
        Self::Google,
        Self::Bing,
        Self::Yahoo,
        Self::DuckDuckGo,
        Self::Ecosia,
    ];

    /// Host fragment identifying the engine.
    #[inline]
    #[must_use]
    pub const fn host_marker(self) -> &'static str {
        match self {
            Self::Google => "google.",
            Self::Bing => "bing.",
            Self::Yahoo => "yahoo.",
            Self::DuckDuckGo => "duckduckgo.",
            Self::Ecosia => "ecosia.",
        }
    }

    /// Returns the engine whose results page `url` is, if any.
    ///
    /// Host, path and query are compared lowercased. Malformed URLs match
    /// nothing.
    #[must_use]
    pub fn detect(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_ascii_lowercase();
        let path = parsed.path().to_ascii_lowercase();
        let query = parsed.query().unwrap_or_default().to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|engine| host.contains(engine.host_marker()) && engine.is_results(&path, &query))
    }

    /// Checks the lowercased path and query against the engine's results
    /// pattern.
    fn is_results(self, path: &str, query: &str) -> bool {
        match self {
            Self::Google => path.starts_with("/search") || path.starts_with("/webhp"),
            Self::Bing | Self::Yahoo | Self::Ecosia => path.starts_with("/search"),
            Self::DuckDuckGo => query.starts_with("q=") || query.contains("&q="),
        }
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Google => "google",
            Self::Bing => "bing",
            Self::Yahoo => "yahoo",
            Self::DuckDuckGo => "duckduckgo",
            Self::Ecosia => "ecosia",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Returns `true` when `url` is a known search engine's results page.
#[inline]
#[must_use]
pub fn is_search_results_page(url: &str) -> bool {
    SearchEngine::detect(url).is_some()
}

// ============================================================================
// Tests
// ============================================================================
