//! Per-beach Gaussian risk scorer.
//!
//! Every sample particle contributes to two kernel sums: one with the
//! beach's own catchment radius as bandwidth (near-field, "is it here
//! now") and one with a fixed regional bandwidth ("is a mass approaching").
//! The regional sum is what drives the risk level, so levels stay
//! comparable between beaches with different catchment radii.
//!
//! Sums are multiplied by the extrapolation ratio `n_active / n_sample` so
//! that scores estimate the full active population, not the stored sample.

use std::f64::consts::PI;

use geo::Point;
use sargassum_scoring_models::Beach;

use crate::geodesy::distance_km;

/// Decimal places kept for extrapolated counts and distances.
pub const COUNT_PRECISION: i32 = 2;

/// Decimal places kept for kernel scores.
pub const SCORE_PRECISION: i32 = 3;

/// Decimal places kept for densities.
pub const DENSITY_PRECISION: i32 = 6;

/// Risk indicators for one beach at one forecast day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeachScore {
    /// Sample particles within `radius_km` of the centroid (unscaled).
    pub sample_count: u32,
    /// `sample_count * ratio`.
    pub est_count: f64,
    /// Extrapolated Gaussian mass with bandwidth `radius_km`.
    pub local_score: f64,
    /// Extrapolated Gaussian mass with the regional bandwidth.
    pub regional_score: f64,
    /// Distance to the nearest sample particle, `None` for an empty sample.
    pub closest_km: Option<f64>,
    /// `est_count / (pi * radius_km^2)`, zero for a zero-area catchment.
    pub density_km2: f64,
}

impl BeachScore {
    /// Returns the score at storage precision.
    ///
    /// Counts and distances keep 2 decimals, scores 3 and density 6. The
    /// density is recomputed from the rounded `est_count` so stored rows
    /// are reproducible from each other.
    #[must_use]
    pub fn rounded(&self, radius_km: f64) -> Self {
        let est_count = round_to(self.est_count, COUNT_PRECISION);
        Self {
            sample_count: self.sample_count,
            est_count,
            local_score: round_to(self.local_score, SCORE_PRECISION),
            regional_score: round_to(self.regional_score, SCORE_PRECISION),
            closest_km: self.closest_km.map(|d| round_to(d, COUNT_PRECISION)),
            density_km2: round_to(density_km2(est_count, radius_km), DENSITY_PRECISION),
        }
    }
}

/// Scores one beach against one sample of particle positions.
///
/// `positions` are `(lon, lat)` points; `ratio` is the extrapolation factor
/// `n_active / n_sample`. Never fails: an empty sample yields zero scores
/// and no closest distance, and a zero radius yields zero density.
#[must_use]
pub fn score_beach(
    positions: &[Point<f64>],
    beach: &Beach,
    ratio: f64,
    regional_sigma_km: f64,
) -> BeachScore {
    let mut sample_count: u32 = 0;
    let mut local_sum = 0.0;
    let mut regional_sum = 0.0;
    let mut min_dist = f64::INFINITY;

    for point in positions {
        let d = distance_km(beach.lat, beach.lon, point.y(), point.x());

        if d < min_dist {
            min_dist = d;
        }
        if d <= beach.radius_km {
            sample_count += 1;
        }

        local_sum += gaussian(d, beach.radius_km);
        regional_sum += gaussian(d, regional_sigma_km);
    }

    let est_count = f64::from(sample_count) * ratio;

    BeachScore {
        sample_count,
        est_count,
        local_score: local_sum * ratio,
        regional_score: regional_sum * ratio,
        closest_km: min_dist.is_finite().then_some(min_dist),
        density_km2: density_km2(est_count, beach.radius_km),
    }
}

/// Unnormalized Gaussian kernel `exp(-d^2 / (2 sigma^2))`.
///
/// A non-positive bandwidth is treated as the limit of the kernel: full
/// weight at zero distance and none elsewhere.
#[must_use]
pub fn gaussian(distance_km: f64, sigma_km: f64) -> f64 {
    if sigma_km > 0.0 {
        (-0.5 * (distance_km / sigma_km).powi(2)).exp()
    } else if distance_km == 0.0 {
        1.0
    } else {
        0.0
    }
}

fn density_km2(est_count: f64, radius_km: f64) -> f64 {
    let area = PI * radius_km.powi(2);
    if area > 0.0 { est_count / area } else { 0.0 }
}

/// Rounds `value` half away from zero to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use sargassum_scoring_models::DEFAULT_REGIONAL_SIGMA_KM;

    fn beach() -> Beach {
        Beach::new("Test", 17.90, -62.85, 3.0)
    }

    #[test]
    fn empty_sample_scores_zero() {
        let score = score_beach(&[], &beach(), 10.0, DEFAULT_REGIONAL_SIGMA_KM);
        assert_eq!(score.sample_count, 0);
        assert!(score.est_count.abs() < f64::EPSILON);
        assert!(score.local_score.abs() < f64::EPSILON);
        assert!(score.regional_score.abs() < f64::EPSILON);
        assert_eq!(score.closest_km, None);
        assert!(score.density_km2.abs() < f64::EPSILON);

        let rounded = score.rounded(3.0);
        assert_eq!(rounded, score);
    }

    #[test]
    fn centroid_and_nearby_particle() {
        let sample = [Point::new(-62.85, 17.90), Point::new(-62.90, 17.95)];
        let score = score_beach(&sample, &beach(), 10.0, DEFAULT_REGIONAL_SIGMA_KM).rounded(3.0);

        assert_eq!(score.sample_count, 1);
        assert!((score.est_count - 10.0).abs() < f64::EPSILON);
        assert_eq!(score.closest_km, Some(0.0));
        // The centroid particle contributes the full ratio; the other one
        // is ~7.6 km out, beyond two local bandwidths.
        assert!((10.0..10.6).contains(&score.local_score), "{}", score.local_score);
        assert!(
            (19.8..20.0).contains(&score.regional_score),
            "{}",
            score.regional_score
        );
        let expected_density = round_to(10.0 / (PI * 9.0), DENSITY_PRECISION);
        assert!((score.density_km2 - expected_density).abs() < f64::EPSILON);
    }

    #[test]
    fn moving_a_particle_away_never_increases_scores() {
        let b = beach();
        let mut previous = score_beach(&[Point::new(b.lon, b.lat)], &b, 3.0, 50.0);
        for step in 1..=60 {
            let lat = b.lat + f64::from(step) * 0.02;
            let current = score_beach(&[Point::new(b.lon, lat)], &b, 3.0, 50.0);
            assert!(current.local_score <= previous.local_score);
            assert!(current.regional_score <= previous.regional_score);
            previous = current;
        }
    }

    #[test]
    fn doubling_ratio_doubles_extrapolated_values() {
        let b = beach();
        let sample = [
            Point::new(-62.85, 17.90),
            Point::new(-62.86, 17.91),
            Point::new(-62.70, 18.10),
            Point::new(-63.40, 17.20),
        ];
        for ratio in [0.5, 1.0, 3.7, 12.25] {
            let single = score_beach(&sample, &b, ratio, 50.0);
            let double = score_beach(&sample, &b, ratio * 2.0, 50.0);
            assert_eq!(double.sample_count, single.sample_count);
            assert_eq!(double.est_count, single.est_count * 2.0);
            assert_eq!(double.local_score, single.local_score * 2.0);
            assert_eq!(double.regional_score, single.regional_score * 2.0);
            assert_eq!(double.closest_km, single.closest_km);
        }
    }

    #[test]
    fn sample_count_never_exceeds_sample_size() {
        let b = Beach::new("Wide", 17.90, -62.85, 500.0);
        let sample = [
            Point::new(-62.85, 17.90),
            Point::new(-62.00, 17.00),
            Point::new(-60.00, 15.00),
        ];
        let score = score_beach(&sample, &b, 1.0, 50.0);
        assert_eq!(score.sample_count, 3);
    }

    #[test]
    fn zero_radius_is_degenerate_not_fatal() {
        let b = Beach::new("Point", 17.90, -62.85, 0.0);
        let sample = [Point::new(-62.85, 17.90), Point::new(-62.86, 17.90)];
        let score = score_beach(&sample, &b, 2.0, 50.0);
        assert_eq!(score.sample_count, 1);
        assert!((score.local_score - 2.0).abs() < f64::EPSILON);
        assert!(score.density_km2.abs() < f64::EPSILON);
        assert!(score.rounded(0.0).density_km2.abs() < f64::EPSILON);
    }

    #[test]
    fn zero_ratio_zeroes_extrapolated_values() {
        let sample = [Point::new(-62.85, 17.90)];
        let score = score_beach(&sample, &beach(), 0.0, 50.0);
        assert_eq!(score.sample_count, 1);
        assert!(score.est_count.abs() < f64::EPSILON);
        assert!(score.regional_score.abs() < f64::EPSILON);
        assert_eq!(score.closest_km, Some(0.0));
    }

    #[test]
    fn rounding_precisions() {
        assert!((round_to(1.234_567, COUNT_PRECISION) - 1.23).abs() < f64::EPSILON);
        assert!((round_to(1.234_567, SCORE_PRECISION) - 1.235).abs() < f64::EPSILON);
        assert!((round_to(0.000_123_456_7, DENSITY_PRECISION) - 0.000_123).abs() < f64::EPSILON);
    }
}
