//! Builder pattern for scanner configuration.
//!
//! Provides a fluent API for creating validated [`ScannerConfig`] values.
//!
//! # Example
//!
//! ```
//! use phishshield::ScannerConfig;
//!
//! let config = ScannerConfig::builder()
//!     .endpoints(["http://10.0.0.2:5000/predict", "http://10.0.0.3:5000/predict"])
//!     .disable_auto_block()
//!     .build()
//!     .expect("valid config");
//!
//! assert!(!config.auto_block.enabled);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::Result;

use super::ScannerConfig;

// ============================================================================
// ConfigBuilder
// ============================================================================

/// Builder for a [`ScannerConfig`].
///
/// Use [`ScannerConfig::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct ConfigBuilder {
    /// Configuration being assembled, starts at defaults.
    config: ScannerConfig,
    /// Endpoints added through [`endpoint`](Self::endpoint), replacing the
    /// defaults once any is set.
    endpoints: Option<Vec<String>>,
}

// ============================================================================
// ConfigBuilder Implementation
// ============================================================================

impl ConfigBuilder {
    /// Creates a builder holding the default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration, e.g. one loaded from a file.
    #[inline]
    #[must_use]
    pub fn from_config(config: ScannerConfig) -> Self {
        Self {
            config,
            endpoints: None,
        }
    }

    /// Appends a classifier endpoint.
    ///
    /// The first call replaces the default endpoint list.
    #[inline]
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoints
            .get_or_insert_with(Vec::new)
            .push(endpoint.into());
        self
    }

    /// Replaces the classifier endpoint list.
    #[inline]
    #[must_use]
    pub fn endpoints(mut self, endpoints: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.endpoints = Some(endpoints.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the per-endpoint request timeout.
    #[inline]
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Enables auto-block.
    #[inline]
    #[must_use]
    pub fn enable_auto_block(mut self) -> Self {
        self.config.auto_block.enabled = true;
        self
    }

    /// Disables auto-block.
    #[inline]
    #[must_use]
    pub fn disable_auto_block(mut self) -> Self {
        self.config.auto_block.enabled = false;
        self
    }

    /// Sets the auto-block threshold (0–100, checked in [`build`](Self::build)).
    #[inline]
    #[must_use]
    pub fn auto_block_threshold(mut self, threshold: u8) -> Self {
        self.config.auto_block.threshold = threshold;
        self
    }

    /// Sets the auto-block label filter. Empty disables filtering.
    #[inline]
    #[must_use]
    pub fn auto_block_label(mut self, label: impl Into<String>) -> Self {
        self.config.auto_block.label = label.into();
        self
    }

    /// Sets the warning page.
    #[inline]
    #[must_use]
    pub fn block_page(mut self, page: impl Into<String>) -> Self {
        self.config.block_page = page.into();
        self
    }

    /// Sets the listen address.
    #[inline]
    #[must_use]
    pub fn listen(mut self, addr: SocketAddr) -> Self {
        self.config.listen = addr;
        self
    }

    /// Builds the configuration with validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if any field is invalid.
    pub fn build(self) -> Result<ScannerConfig> {
        let mut config = self.config;
        if let Some(endpoints) = self.endpoints {
            config.endpoints = endpoints;
        }

        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================
