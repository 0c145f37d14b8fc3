#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Beach, drift snapshot, and risk score types.
//!
//! These types are shared by the scoring engine, the `SQLite` store, and
//! the CLI. Beaches and thresholds are static reference data loaded from a
//! catalog; drift snapshots are written by the external drift simulation;
//! score rows are produced by the batch score computer and never updated.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Default bandwidth of the regional Gaussian kernel, in kilometers.
pub const DEFAULT_REGIONAL_SIGMA_KM: f64 = 50.0;

/// Default forecast horizons scored by each batch, in days.
pub const DEFAULT_DAY_OFFSETS: &[u32] = &[0, 1, 2, 3];

/// Default `regional_score` at or above which the risk is [`RiskLevel::Low`].
///
/// Calibration: one particle at 50 km scores about 8.7 once extrapolated.
pub const DEFAULT_LOW_THRESHOLD: f64 = 5.0;

/// Default `regional_score` at or above which the risk is
/// [`RiskLevel::Medium`].
///
/// Calibration: five particles at 50 km score about 43.
pub const DEFAULT_MEDIUM_THRESHOLD: f64 = 25.0;

/// Default `regional_score` at or above which the risk is [`RiskLevel::High`].
///
/// Calibration: ten particles at 50 km score about 87.
pub const DEFAULT_HIGH_THRESHOLD: f64 = 75.0;

/// A coastal site with a circular catchment around its centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beach {
    /// Unique beach name.
    pub name: String,
    /// Centroid latitude (WGS84).
    pub lat: f64,
    /// Centroid longitude (WGS84).
    pub lon: f64,
    /// Radius within which a particle is considered likely to strand.
    pub radius_km: f64,
}

impl Beach {
    /// Creates a new beach definition.
    #[must_use]
    pub fn new(name: impl Into<String>, lat: f64, lon: f64, radius_km: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
            radius_km,
        }
    }
}

/// Ordinal stranding risk, derived from the regional score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskLevel {
    /// No approaching mass worth reporting
    None,
    /// A thin or distant mass
    Low,
    /// A sizeable mass within regional range
    Medium,
    /// A dense mass close to the coast
    High,
}

impl RiskLevel {
    /// Returns the colored marker shown in reports.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::None => "🟢",
            Self::Low => "🟡",
            Self::Medium => "🟠",
            Self::High => "🔴",
        }
    }

    /// Returns all variants of this enum, lowest risk first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::None, Self::Low, Self::Medium, Self::High]
    }
}

/// Lower bounds of each non-`none` risk level on the regional score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Lower bound of [`RiskLevel::Low`].
    pub low: f64,
    /// Lower bound of [`RiskLevel::Medium`].
    pub medium: f64,
    /// Lower bound of [`RiskLevel::High`].
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW_THRESHOLD,
            medium: DEFAULT_MEDIUM_THRESHOLD,
            high: DEFAULT_HIGH_THRESHOLD,
        }
    }
}

impl RiskThresholds {
    /// Whether the bounds are finite and non-decreasing (`low <= medium <= high`).
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        [self.low, self.medium, self.high]
            .iter()
            .all(|v| v.is_finite())
            && self.low <= self.medium
            && self.medium <= self.high
    }
}

fn default_day_offsets() -> Vec<u32> {
    DEFAULT_DAY_OFFSETS.to_vec()
}

const fn default_regional_sigma_km() -> f64 {
    DEFAULT_REGIONAL_SIGMA_KM
}

/// Everything a scoring run needs besides the data itself.
///
/// Passed into the batch score computer at construction time so several
/// catalogs can be scored in the same process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Display name of the catalog (e.g. the island).
    pub name: String,
    /// Forecast horizons to score, in days.
    #[serde(default = "default_day_offsets")]
    pub day_offsets: Vec<u32>,
    /// Bandwidth of the regional kernel, in kilometers.
    #[serde(default = "default_regional_sigma_km")]
    pub regional_sigma_km: f64,
    /// Risk level boundaries on the regional score.
    #[serde(default)]
    pub thresholds: RiskThresholds,
    /// Beaches to score.
    pub beaches: Vec<Beach>,
}

impl ScoringConfig {
    /// Creates a configuration with the default horizons, bandwidth, and
    /// thresholds.
    #[must_use]
    pub fn new(name: impl Into<String>, beaches: Vec<Beach>) -> Self {
        Self {
            name: name.into(),
            day_offsets: default_day_offsets(),
            regional_sigma_km: DEFAULT_REGIONAL_SIGMA_KM,
            thresholds: RiskThresholds::default(),
            beaches,
        }
    }
}

/// One daily snapshot of a drift simulation, as written by the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftSnapshot {
    /// Batch key of the physical simulation.
    pub simulated_at: String,
    /// Forecast horizon in days.
    pub day_offset: u32,
    /// Particles seeded at t0.
    pub n_particles: i64,
    /// Fraction of seeded particles still active at this offset.
    pub active_fraction: f64,
    /// JSON array of `[lon, lat]` pairs (at most 500 entries).
    pub positions_json: Option<String>,
}

impl DriftSnapshot {
    /// Estimated number of particles still active at this offset.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn n_active(&self) -> i64 {
        (self.n_particles as f64 * self.active_fraction).round() as i64
    }
}

/// A computed score row, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeachRiskScore {
    /// Batch key (UTC, `%Y-%m-%dT%H:%M:%SZ`).
    pub computed_at: String,
    /// Simulation the scores were computed from.
    pub simulated_at: String,
    /// Beach name.
    pub beach_name: String,
    /// Beach centroid latitude.
    pub beach_lat: f64,
    /// Beach centroid longitude.
    pub beach_lon: f64,
    /// Beach catchment radius.
    pub radius_km: f64,
    /// Forecast horizon in days.
    pub day_offset: u32,
    /// Sample particles within the catchment (unscaled).
    pub sample_count: u32,
    /// Size of the stored position sample.
    pub n_sample: u32,
    /// Estimated active particles at this offset.
    pub n_active: i64,
    /// Particles seeded at t0.
    pub n_particles: i64,
    /// `sample_count` extrapolated to the active population.
    pub est_count: f64,
    /// Extrapolated Gaussian mass with bandwidth `radius_km`.
    pub local_score: f64,
    /// Extrapolated Gaussian mass with the regional bandwidth.
    pub regional_score: f64,
    /// Distance to the nearest sample particle, `None` for an empty sample.
    pub closest_km: Option<f64>,
    /// Estimated particles per square kilometer of catchment.
    pub density_km2: f64,
    /// Risk level derived from `regional_score`.
    pub risk_level: RiskLevel,
}

/// A score row as read back from storage.
///
/// Columns that were added after the first schema version are optional so
/// that batches written by older versions remain readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBeachScore {
    /// Batch key.
    pub computed_at: String,
    /// Simulation the scores were computed from.
    pub simulated_at: String,
    /// Beach name.
    pub beach_name: String,
    /// Beach catchment radius.
    pub radius_km: f64,
    /// Forecast horizon in days.
    pub day_offset: u32,
    /// Sample particles within the catchment.
    pub sample_count: u32,
    /// Size of the stored position sample.
    pub n_sample: Option<u32>,
    /// Estimated active particles.
    pub n_active: Option<i64>,
    /// Particles seeded at t0.
    pub n_particles: Option<i64>,
    /// Extrapolated catchment count.
    pub est_count: Option<f64>,
    /// Near-field score.
    pub local_score: Option<f64>,
    /// Regional score.
    pub regional_score: Option<f64>,
    /// Distance to the nearest sample particle.
    pub closest_km: Option<f64>,
    /// Particles per square kilometer.
    pub density_km2: Option<f64>,
    /// Risk level, `None` if the stored label is not recognized.
    pub risk_level: Option<RiskLevel>,
}

impl From<BeachRiskScore> for StoredBeachScore {
    fn from(row: BeachRiskScore) -> Self {
        Self {
            computed_at: row.computed_at,
            simulated_at: row.simulated_at,
            beach_name: row.beach_name,
            radius_km: row.radius_km,
            day_offset: row.day_offset,
            sample_count: row.sample_count,
            n_sample: Some(row.n_sample),
            n_active: Some(row.n_active),
            n_particles: Some(row.n_particles),
            est_count: Some(row.est_count),
            local_score: Some(row.local_score),
            regional_score: Some(row.regional_score),
            closest_km: row.closest_km,
            density_km2: Some(row.density_km2),
            risk_level: Some(row.risk_level),
        }
    }
}
