//! Auto-block decision.

// ============================================================================
// Imports
// ============================================================================

use crate::config::AutoBlock;
use crate::scan::ScanOutcome;

// ============================================================================
// AutoBlockPolicy
// ============================================================================

/// Decides whether a classified tab is redirected to the warning page.
///
/// A tab is blocked when blocking is enabled, the outcome came from the
/// classifier, its clamped risk reaches the threshold, and its label matches
/// the filter (case-insensitive) if one is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoBlockPolicy {
    enabled: bool,
    threshold: u8,
    /// Lowercased label filter.
    label: Option<String>,
}

impl AutoBlockPolicy {
    /// Builds the policy from configuration.
    #[must_use]
    pub fn from_config(auto_block: &AutoBlock) -> Self {
        Self {
            enabled: auto_block.enabled,
            threshold: auto_block.threshold,
            label: auto_block.label_filter().map(str::to_lowercase),
        }
    }

    /// Returns `true` if auto-blocking is on.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns `true` if `outcome` should trigger a redirect.
    #[must_use]
    pub fn should_block(&self, outcome: &ScanOutcome) -> bool {
        if !self.enabled || !outcome.is_classified() {
            return false;
        }

        let Some(risk) = outcome.risk_percent else {
            return false;
        };
        if risk < self.threshold {
            return false;
        }

        match &self.label {
            None => true,
            Some(filter) => outcome.label().to_lowercase() == *filter,
        }
    }
}

impl Default for AutoBlockPolicy {
    fn default() -> Self {
        Self::from_config(&AutoBlock::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
