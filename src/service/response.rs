//! Classifier response types.
//!
//! Parsing is lenient: a 2xx body with a missing or garbage score still
//! yields a [`Classification`], its score simply reads as absent and the
//! coordinator clamps that to 0.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::{Map, Value};

// ============================================================================
// Classification
// ============================================================================

/// Body of a successful `POST /predict` response.
///
/// # Format
///
/// ```json
/// {
///   "risk_percent": 92,
///   "label_pred": "phishing",
///   "prob_phish": 0.92,
///   "features": { ... }
/// }
/// ```
///
/// Fields other than the score and label are kept in [`extra`](Self::extra)
/// and passed through to the cached outcome unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Classification {
    /// Primary risk score field.
    #[serde(default)]
    pub risk_percent: Option<Value>,

    /// Alternate risk score field, used when `risk_percent` is unusable.
    #[serde(default)]
    pub pct: Option<Value>,

    /// Classifier-assigned category.
    #[serde(default)]
    pub label_pred: Option<Value>,

    /// Every other field in the response.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Classification {
    /// Creates a classification from a score and label.
    #[must_use]
    pub fn new(risk_percent: f64, label: impl Into<String>) -> Self {
        Self {
            risk_percent: Some(Value::from(risk_percent)),
            pct: None,
            label_pred: Some(Value::String(label.into())),
            extra: Map::new(),
        }
    }

    /// Returns the raw score: `risk_percent` if numeric, else `pct`.
    ///
    /// Numeric strings count as numbers. `None` if neither field is usable.
    #[must_use]
    pub fn raw_risk(&self) -> Option<f64> {
        self.risk_percent
            .as_ref()
            .and_then(as_number)
            .or_else(|| self.pct.as_ref().and_then(as_number))
    }

    /// Returns the label as a string, empty when absent or null.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.label_pred {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Reads a JSON number or numeric string as a finite `f64`.
fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

// ============================================================================
// HealthReport
// ============================================================================

/// Body of the classifier's `GET /health` response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HealthReport {
    /// `"ok"` when the model artifacts are present.
    #[serde(default)]
    pub status: String,

    /// Other reported fields (model file names and the like).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HealthReport {
    /// Returns `true` if the service reports itself ready.
    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

// ============================================================================
// Tests
// ============================================================================
