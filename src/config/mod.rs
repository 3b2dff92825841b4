//! Scanner configuration.
//!
//! Configuration is static for the lifetime of the agent: it is loaded once
//! (JSON file, CLI flags or [`ScannerConfig::builder()`]) and never edited at
//! runtime.
//!
//! # Example
//!
//! ```
//! use phishshield::ScannerConfig;
//!
//! let config = ScannerConfig::builder()
//!     .endpoint("http://127.0.0.1:5000/predict")
//!     .auto_block_threshold(90)
//!     .auto_block_label("phishing")
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.auto_block.threshold, 90);
//! ```
//!
//! # File Format
//!
//! ```json
//! {
//!   "endpoints": ["http://127.0.0.1:5000/predict"],
//!   "request_timeout_ms": 10000,
//!   "auto_block": { "enabled": true, "threshold": 80, "label": "phishing" },
//!   "block_page": "blocked.html",
//!   "listen": "127.0.0.1:8765"
//! }
//! ```
//!
//! Every field is optional; missing fields take the defaults below.

// ============================================================================
// Submodules
// ============================================================================

mod builder;

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

pub use builder::ConfigBuilder;

// ============================================================================
// Constants
// ============================================================================

/// Classifier endpoints tried in order when none are configured.
pub const DEFAULT_ENDPOINTS: [&str; 2] = [
    "http://127.0.0.1:5000/predict",
    "http://localhost:5000/predict",
];

/// Default per-endpoint request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default auto-block threshold (percent).
pub const DEFAULT_THRESHOLD: u8 = 80;

/// Default auto-block label filter.
pub const DEFAULT_BLOCK_LABEL: &str = "phishing";

/// Default warning page, resolved by the extension against its own origin.
pub const DEFAULT_BLOCK_PAGE: &str = "blocked.html";

/// Default address the agent listens on for the extension.
pub const DEFAULT_LISTEN: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8765);

// ============================================================================
// AutoBlock
// ============================================================================

/// Auto-block settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AutoBlock {
    /// Redirect risky tabs to the warning page.
    pub enabled: bool,

    /// Minimum clamped risk (0–100) that triggers a redirect.
    pub threshold: u8,

    /// Only block when the classifier label equals this (case-insensitive).
    ///
    /// Empty disables label filtering.
    pub label: String,
}

impl Default for AutoBlock {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_THRESHOLD,
            label: DEFAULT_BLOCK_LABEL.to_string(),
        }
    }
}

impl AutoBlock {
    /// Returns the label filter, or `None` when filtering is disabled.
    #[inline]
    #[must_use]
    pub fn label_filter(&self) -> Option<&str> {
        let label = self.label.trim();
        (!label.is_empty()).then_some(label)
    }
}

// ============================================================================
// ScannerConfig
// ============================================================================

/// Complete agent configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Classifier endpoints, tried in order.
    pub endpoints: Vec<String>,

    /// Per-endpoint request timeout in milliseconds.
    pub request_timeout_ms: u64,

    /// Auto-block settings.
    pub auto_block: AutoBlock,

    /// Warning page the extension opens for blocked tabs.
    pub block_page: String,

    /// Address the agent listens on.
    pub listen: SocketAddr,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            auto_block: AutoBlock::default(),
            block_page: DEFAULT_BLOCK_PAGE.to_string(),
            listen: DEFAULT_LISTEN,
        }
    }
}

// ============================================================================
// ScannerConfig - Constructors
// ============================================================================

impl ScannerConfig {
    /// Creates a configuration builder starting from defaults.
    #[inline]
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the document does not parse
    /// - [`Error::Config`] if validation fails
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file cannot be read
    /// - [`Error::Json`] / [`Error::Config`] as for [`from_json`](Self::from_json)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading configuration");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

// ============================================================================
// ScannerConfig - Accessors
// ============================================================================

impl ScannerConfig {
    /// Returns the per-endpoint request timeout.
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(Error::config("At least one classifier endpoint is required"));
        }

        for endpoint in &self.endpoints {
            let parsed = Url::parse(endpoint)
                .map_err(|e| Error::config(format!("Invalid endpoint '{endpoint}': {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::config(format!(
                    "Endpoint '{endpoint}' must use http or https"
                )));
            }
        }

        if self.request_timeout_ms == 0 {
            return Err(Error::config("request_timeout_ms must be greater than zero"));
        }

        if self.auto_block.threshold > 100 {
            return Err(Error::config(format!(
                "auto_block.threshold must be within 0-100, got {}",
                self.auto_block.threshold
            )));
        }

        if self.block_page.trim().is_empty() {
            return Err(Error::config("block_page must not be empty"));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
