//! Scan outcome and risk clamping.

// ============================================================================
// Imports
// ============================================================================

use std::time::{SystemTime, UNIX_EPOCH};

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::service::Classification;

// ============================================================================
// Constants
// ============================================================================

/// Fixed score given to exempt search-results pages.
pub const EXEMPT_RISK: u8 = 5;

/// Fixed label given to exempt search-results pages.
pub const EXEMPT_LABEL: &str = "safe";

/// Note attached to exempt search-results pages.
pub const EXEMPT_NOTE: &str = "Search results page; open a result to scan";

// ============================================================================
// Functions
// ============================================================================

/// Clamps a raw classifier score into `0..=100`.
///
/// Missing, NaN and infinite scores read as 0. Fractional scores are rounded
/// to the nearest integer before clamping.
#[must_use]
pub fn clamp_risk(raw: Option<f64>) -> u8 {
    let value = raw.filter(|v| v.is_finite()).unwrap_or(0.0).round();
    value.clamp(0.0, 100.0) as u8
}

/// Milliseconds since the UNIX epoch.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

// ============================================================================
// ScanStatus
// ============================================================================

/// How a scan resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// Search-results page, fixed low score, no remote call.
    Exempt,
    /// The classifier answered.
    Classified,
    /// No classifier endpoint answered.
    Unreachable,
    /// The URL is not http(s).
    UnsupportedScheme,
}

impl ScanStatus {
    /// Returns `true` for outcomes carrying no trustworthy score.
    #[inline]
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Unreachable | Self::UnsupportedScheme)
    }
}

// ============================================================================
// ScanOutcome
// ============================================================================

/// Result of evaluating one URL for one tab.
///
/// Error outcomes ([`ScanStatus::Unreachable`],
/// [`ScanStatus::UnsupportedScheme`]) carry an `error` and no score or label.
///
/// # Format
///
/// Serializes to the shape the popup reads; classifier passthrough fields sit
/// at the top level next to the fixed ones:
///
/// ```json
/// {
///   "status": "classified",
///   "risk_percent": 93,
///   "pct": 93,
///   "label_pred": "phishing",
///   "scanned_url": "http://paypal-verify.example/",
///   "scanned_at": 1760000000000,
///   "prob_phish": 0.93
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    /// How the scan resolved.
    pub status: ScanStatus,
    /// Clamped score, absent for error outcomes.
    pub risk_percent: Option<u8>,
    /// Classifier label, absent for error outcomes.
    pub label: Option<String>,
    /// Free-form note.
    pub note: Option<String>,
    /// URL that was evaluated.
    pub scanned_url: String,
    /// Milliseconds since the UNIX epoch.
    pub scanned_at: u64,
    /// Error message for error outcomes.
    pub error: Option<String>,
    /// Classifier fields passed through unchanged.
    pub extra: Map<String, Value>,
}

// ============================================================================
// ScanOutcome - Constructors
// ============================================================================

impl ScanOutcome {
    /// Base outcome with only the URL and timestamp filled in.
    fn base(status: ScanStatus, url: &str) -> Self {
        Self {
            status,
            risk_percent: None,
            label: None,
            note: None,
            scanned_url: url.to_string(),
            scanned_at: now_millis(),
            error: None,
            extra: Map::new(),
        }
    }

    /// Fixed low-risk outcome for an exempt search-results page.
    #[must_use]
    pub fn exempt(url: &str) -> Self {
        Self {
            risk_percent: Some(EXEMPT_RISK),
            label: Some(EXEMPT_LABEL.to_string()),
            note: Some(EXEMPT_NOTE.to_string()),
            ..Self::base(ScanStatus::Exempt, url)
        }
    }

    /// Outcome built from a classifier response, score clamped.
    #[must_use]
    pub fn classified(url: &str, classification: Classification) -> Self {
        let risk = clamp_risk(classification.raw_risk());
        let label = classification.label();
        let mut extra = classification.extra;

        let note = match extra.remove("note") {
            Some(Value::String(note)) => Some(note),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };

        Self {
            risk_percent: Some(risk),
            label: Some(label),
            note,
            extra,
            ..Self::base(ScanStatus::Classified, url)
        }
    }

    /// Outcome for a classifier that could not be reached.
    #[must_use]
    pub fn unreachable(url: &str, attempted: usize) -> Self {
        Self {
            error: Some(Error::service_unreachable(attempted).to_string()),
            ..Self::base(ScanStatus::Unreachable, url)
        }
    }

    /// Outcome for a URL that is not http(s).
    #[must_use]
    pub fn unsupported_scheme(url: &str) -> Self {
        Self {
            error: Some(Error::unsupported_scheme(url).to_string()),
            ..Self::base(ScanStatus::UnsupportedScheme, url)
        }
    }
}

// ============================================================================
// ScanOutcome - Accessors
// ============================================================================

impl ScanOutcome {
    /// Returns `true` if the classifier produced this outcome.
    #[inline]
    #[must_use]
    pub fn is_classified(&self) -> bool {
        self.status == ScanStatus::Classified
    }

    /// Returns `true` for error outcomes.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status.is_error()
    }

    /// Returns the label, empty when absent.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or_default()
    }

    /// Serializes to a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

// ============================================================================
// Serialization
// ============================================================================

impl Serialize for ScanOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        // Passthrough first, skipping names the fixed fields own.
        for (key, value) in &self.extra {
            if !OWNED_KEYS.contains(&key.as_str()) {
                map.serialize_entry(key, value)?;
            }
        }

        map.serialize_entry("status", &self.status)?;
        if let Some(risk) = self.risk_percent {
            map.serialize_entry("risk_percent", &risk)?;
            map.serialize_entry("pct", &risk)?;
        }
        if let Some(label) = &self.label {
            map.serialize_entry("label_pred", label)?;
        }
        if let Some(note) = &self.note {
            map.serialize_entry("note", note)?;
        }
        map.serialize_entry("scanned_url", &self.scanned_url)?;
        map.serialize_entry("scanned_at", &self.scanned_at)?;
        if let Some(error) = &self.error {
            map.serialize_entry("error", error)?;
        }

        map.end()
    }
}

/// Keys written by [`ScanOutcome`] itself.
const OWNED_KEYS: [&str; 8] = [
    "status",
    "risk_percent",
    "pct",
    "label_pred",
    "note",
    "scanned_url",
    "scanned_at",
    "error",
];

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_clamp_edges() {
        assert_eq!(clamp_risk(None), 0);
        assert_eq!(clamp_risk(Some(-12.0)), 0);
        assert_eq!(clamp_risk(Some(250.0)), 100);
        assert_eq!(clamp_risk(Some(f64::NAN)), 0);
        assert_eq!(clamp_risk(Some(f64::INFINITY)), 0);
        assert_eq!(clamp_risk(Some(79.5)), 80);
        assert_eq!(clamp_risk(Some(79.4)), 79);
    }

    #[test]
    fn test_exempt_outcome() {
        let outcome = ScanOutcome::exempt("https://www.google.com/search?q=x");
        assert_eq!(outcome.status, ScanStatus::Exempt);
        assert_eq!(outcome.risk_percent, Some(5));
        assert_eq!(outcome.label(), "safe");
        assert!(outcome.note.is_some());
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_classified_outcome_clamps_and_passes_through() {
        let classification: Classification = serde_json::from_value(json!({
            "risk_percent": 140,
            "label_pred": "phishing",
            "prob_phish": 0.99,
            "note": "model v2"
        }))
        .expect("parse");

        let outcome = ScanOutcome::classified("http://bad.example/", classification);
        assert!(outcome.is_classified());
        assert_eq!(outcome.risk_percent, Some(100));
        assert_eq!(outcome.label(), "phishing");
        assert_eq!(outcome.note.as_deref(), Some("model v2"));
        assert_eq!(outcome.extra.get("prob_phish"), Some(&json!(0.99)));
    }

    #[test]
    fn test_error_outcomes_carry_no_score() {
        let unreachable = ScanOutcome::unreachable("https://example.com", 2);
        assert!(unreachable.is_error());
        assert_eq!(unreachable.risk_percent, None);
        assert_eq!(unreachable.label, None);
        assert_eq!(
            unreachable.error.as_deref(),
            Some("API not reachable. Start the local server.")
        );

        let unsupported = ScanOutcome::unsupported_scheme("chrome://newtab");
        assert!(unsupported.is_error());
        assert_eq!(unsupported.risk_percent, None);
        assert_eq!(unsupported.error.as_deref(), Some("Unsupported URL scheme"));
    }

    #[test]
    fn test_serialization_shape() {
        let mut classification = Classification::new(42.0, "safe");
        classification.extra.insert("prob_phish".into(), json!(0.42));
        classification.extra.insert("scanned_url".into(), json!("spoofed"));

        let value = ScanOutcome::classified("https://example.com/", classification).to_value();

        assert_eq!(value["status"], "classified");
        assert_eq!(value["risk_percent"], 42);
        assert_eq!(value["pct"], 42);
        assert_eq!(value["label_pred"], "safe");
        assert_eq!(value["prob_phish"], 0.42);
        assert_eq!(value["scanned_url"], "https://example.com/");
        assert!(value.get("error").is_none());
        assert!(value.get("note").is_none());
    }

    #[test]
    fn test_error_serialization_omits_score() {
        let value = ScanOutcome::unreachable("https://example.com/", 2).to_value();
        assert_eq!(value["status"], "unreachable");
        assert!(value.get("risk_percent").is_none());
        assert!(value.get("pct").is_none());
        assert!(value.get("label_pred").is_none());
        assert!(value["error"].is_string());
    }

    proptest! {
        #[test]
        fn prop_clamp_in_range(raw in proptest::option::of(any::<f64>())) {
            let clamped = clamp_risk(raw);
            prop_assert!(clamped <= 100);
        }

        #[test]
        fn prop_clamp_idempotent(raw in proptest::option::of(-1_000.0f64..1_000.0)) {
            let once = clamp_risk(raw);
            prop_assert_eq!(clamp_risk(Some(f64::from(once))), once);
        }

        #[test]
        fn prop_in_range_integers_unchanged(raw in 0u8..=100) {
            prop_assert_eq!(clamp_risk(Some(f64::from(raw))), raw);
        }
    }
}
