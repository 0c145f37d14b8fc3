//! Maps a regional score to a discrete risk level.

use sargassum_scoring_models::{RiskLevel, RiskThresholds};

/// Classifies `regional_score` against `thresholds`.
///
/// Each bound is inclusive: a score equal to `thresholds.medium` is
/// [`RiskLevel::Medium`]. Monotone non-decreasing in the score for ordered
/// thresholds; NaN classifies as [`RiskLevel::None`].
#[must_use]
pub fn classify(regional_score: f64, thresholds: &RiskThresholds) -> RiskLevel {
    if regional_score >= thresholds.high {
        RiskLevel::High
    } else if regional_score >= thresholds.medium {
        RiskLevel::Medium
    } else if regional_score >= thresholds.low {
        RiskLevel::Low
    } else {
        RiskLevel::None
    }
}

/// Classifies `regional_score` against the default thresholds.
#[must_use]
pub fn risk_level(regional_score: f64) -> RiskLevel {
    classify(regional_score, &RiskThresholds::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_boundaries() {
        assert_eq!(risk_level(4.999), RiskLevel::None);
        assert_eq!(risk_level(5.0), RiskLevel::Low);
        assert_eq!(risk_level(24.999), RiskLevel::Low);
        assert_eq!(risk_level(25.0), RiskLevel::Medium);
        assert_eq!(risk_level(74.999), RiskLevel::Medium);
        assert_eq!(risk_level(75.0), RiskLevel::High);
    }

    #[test]
    fn extremes() {
        assert_eq!(risk_level(0.0), RiskLevel::None);
        assert_eq!(risk_level(-1.0), RiskLevel::None);
        assert_eq!(risk_level(f64::NAN), RiskLevel::None);
        assert_eq!(risk_level(f64::INFINITY), RiskLevel::High);
    }

    #[test]
    fn monotone_in_score() {
        let mut previous = RiskLevel::None;
        for i in 0..=1000 {
            let level = risk_level(f64::from(i) * 0.1);
            assert!(level >= previous, "{level} < {previous} at {i}");
            previous = level;
        }
        assert_eq!(previous, RiskLevel::High);
    }

    #[test]
    fn custom_thresholds() {
        let thresholds = RiskThresholds {
            low: 1.0,
            medium: 2.0,
            high: 3.0,
        };
        assert_eq!(classify(0.5, &thresholds), RiskLevel::None);
        assert_eq!(classify(1.5, &thresholds), RiskLevel::Low);
        assert_eq!(classify(2.0, &thresholds), RiskLevel::Medium);
        assert_eq!(classify(30.0, &thresholds), RiskLevel::High);
    }
}
