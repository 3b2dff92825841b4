//! Badge state derived from a scan outcome.

use super::{ScanOutcome, ScanStatus};

// ============================================================================
// Constants
// ============================================================================

/// Neutral glyph for exempt and unreachable outcomes.
pub const NEUTRAL_TEXT: &str = "—";

/// Neutral background color.
pub const NEUTRAL_COLOR: &str = "#95a5a6";

// ============================================================================
// Severity
// ============================================================================

/// Severity band of a clamped risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Below 25.
    Low,
    /// 25 to 49.
    Moderate,
    /// 50 to 74.
    Elevated,
    /// 75 and above.
    High,
}

impl Severity {
    /// Band for a clamped score.
    #[must_use]
    pub const fn from_risk(risk: u8) -> Self {
        match risk {
            0..25 => Self::Low,
            25..50 => Self::Moderate,
            50..75 => Self::Elevated,
            _ => Self::High,
        }
    }

    /// Badge background color.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Low => "#2ecc71",
            Self::Moderate => "#f1c40f",
            Self::Elevated => "#e67e22",
            Self::High => "#e74c3c",
        }
    }
}

// ============================================================================
// Badge
// ============================================================================

/// Text and background color shown on the toolbar icon for a tab.
///
/// `color` is `None` when only the text is set (cleared badge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    /// Badge text.
    pub text: String,
    /// Background color as `#rrggbb`.
    pub color: Option<&'static str>,
}

impl Badge {
    /// Empty badge, used for unsupported schemes.
    #[must_use]
    pub fn cleared() -> Self {
        Self {
            text: String::new(),
            color: None,
        }
    }

    /// Gray glyph for exempt and unreachable outcomes.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            text: NEUTRAL_TEXT.to_string(),
            color: Some(NEUTRAL_COLOR),
        }
    }

    /// Numeric score on its severity color.
    #[must_use]
    pub fn score(risk: u8) -> Self {
        Self {
            text: risk.to_string(),
            color: Some(Severity::from_risk(risk).color()),
        }
    }

    /// Badge for an outcome.
    #[must_use]
    pub fn for_outcome(outcome: &ScanOutcome) -> Self {
        match (outcome.status, outcome.risk_percent) {
            (ScanStatus::UnsupportedScheme, _) => Self::cleared(),
            (ScanStatus::Exempt | ScanStatus::Unreachable, _) => Self::neutral(),
            (ScanStatus::Classified, Some(risk)) => Self::score(risk),
            (ScanStatus::Classified, None) => Self::score(0),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::service::Classification;

    #[test]
    fn test_severity_bands() {
        assert_eq!(Severity::from_risk(0), Severity::Low);
        assert_eq!(Severity::from_risk(24), Severity::Low);
        assert_eq!(Severity::from_risk(25), Severity::Moderate);
        assert_eq!(Severity::from_risk(49), Severity::Moderate);
        assert_eq!(Severity::from_risk(50), Severity::Elevated);
        assert_eq!(Severity::from_risk(74), Severity::Elevated);
        assert_eq!(Severity::from_risk(75), Severity::High);
        assert_eq!(Severity::from_risk(100), Severity::High);
    }

    #[test]
    fn test_score_badge() {
        let badge = Badge::score(88);
        assert_eq!(badge.text, "88");
        assert_eq!(badge.color, Some("#e74c3c"));

        assert_eq!(Badge::score(10).color, Some("#2ecc71"));
    }

    #[test]
    fn test_badge_for_outcomes() {
        let url = "https://example.com/";

        assert_eq!(
            Badge::for_outcome(&ScanOutcome::unsupported_scheme("about:blank")),
            Badge::cleared()
        );
        assert_eq!(Badge::for_outcome(&ScanOutcome::exempt(url)), Badge::neutral());
        assert_eq!(
            Badge::for_outcome(&ScanOutcome::unreachable(url, 2)),
            Badge::neutral()
        );

        let classified = ScanOutcome::classified(url, Classification::new(60.0, "phishing"));
        let badge = Badge::for_outcome(&classified);
        assert_eq!(badge.text, "60");
        assert_eq!(badge.color, Some("#e67e22"));
    }
}
