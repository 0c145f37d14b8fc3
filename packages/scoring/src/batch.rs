//! Batch score computer.
//!
//! One invocation scores the latest drift simulation for every configured
//! beach and day offset, and stores the result as a single batch keyed by a
//! fresh `computed_at` timestamp. Missing inputs are not errors: no
//! simulation, or no snapshot for any configured offset, inserts nothing
//! and returns zero.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use sargassum_scoring_models::{BeachRiskScore, DriftSnapshot, ScoringConfig};

use crate::classify::classify;
use crate::positions::parse_positions;
use crate::repository::ScoreRepository;
use crate::scorer::score_beach;

/// Format of `computed_at` batch keys (UTC, ISO-8601 with a trailing `Z`).
pub const COMPUTED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Scores drift simulations into beach risk batches.
pub struct ScoreComputer<R> {
    repository: R,
    config: ScoringConfig,
}

impl<R: ScoreRepository> ScoreComputer<R> {
    /// Creates a computer over `repository` for the beaches and horizons in
    /// `config`.
    #[must_use]
    pub const fn new(repository: R, config: ScoringConfig) -> Self {
        Self { repository, config }
    }

    /// The configuration this computer scores with.
    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// The underlying repository.
    #[must_use]
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    /// Scores the latest simulation and stores the batch.
    ///
    /// Returns the number of rows inserted; zero means there was nothing to
    /// score.
    ///
    /// # Errors
    ///
    /// Returns the repository's error if reading snapshots or writing the
    /// batch fails. A failed write leaves no partial batch behind.
    pub async fn compute_scores(&self) -> Result<usize, R::Error> {
        self.compute_scores_at(Utc::now()).await
    }

    /// Same as [`Self::compute_scores`] with an explicit clock reading.
    ///
    /// # Errors
    ///
    /// See [`Self::compute_scores`].
    pub async fn compute_scores_at(&self, now: DateTime<Utc>) -> Result<usize, R::Error> {
        let Some(simulated_at) = self.repository.latest_simulation().await? else {
            log::info!("No drift simulation stored yet, nothing to score");
            return Ok(0);
        };

        let snapshots = self
            .repository
            .snapshots_for(&simulated_at, &self.config.day_offsets)
            .await?;

        if snapshots.is_empty() {
            log::info!(
                "Simulation {simulated_at} has no snapshot for day offsets {:?}",
                self.config.day_offsets
            );
            return Ok(0);
        }

        let latest = self.repository.latest_computed_at().await?;
        let computed_at = next_computed_at(now, latest.as_deref());

        let rows: Vec<BeachRiskScore> = snapshots
            .iter()
            .flat_map(|snapshot| score_snapshot(snapshot, &self.config, &computed_at))
            .collect();

        log::debug!(
            "Scored {} beaches x {} snapshots from simulation {simulated_at}",
            self.config.beaches.len(),
            snapshots.len()
        );

        let inserted = self.repository.insert_batch(&rows).await?;
        log::info!("Inserted {inserted} beach risk scores (computed_at {computed_at})");

        Ok(inserted)
    }
}

/// Scores every configured beach against one snapshot.
///
/// Pure: the rows carry the given `computed_at` and the snapshot's
/// provenance, at storage precision.
#[must_use]
pub fn score_snapshot(
    snapshot: &DriftSnapshot,
    config: &ScoringConfig,
    computed_at: &str,
) -> Vec<BeachRiskScore> {
    let positions = parse_positions(snapshot.positions_json.as_deref());
    let n_active = snapshot.n_active().max(0);
    let n_sample = u32::try_from(positions.len()).unwrap_or(u32::MAX);
    let ratio = extrapolation_ratio(n_active, n_sample);

    log::debug!(
        "Day +{}: {} particles, {n_active} active, sample of {n_sample} (x{ratio:.2})",
        snapshot.day_offset,
        snapshot.n_particles
    );

    config
        .beaches
        .iter()
        .map(|beach| {
            let score = score_beach(&positions, beach, ratio, config.regional_sigma_km)
                .rounded(beach.radius_km);

            BeachRiskScore {
                computed_at: computed_at.to_string(),
                simulated_at: snapshot.simulated_at.clone(),
                beach_name: beach.name.clone(),
                beach_lat: beach.lat,
                beach_lon: beach.lon,
                radius_km: beach.radius_km,
                day_offset: snapshot.day_offset,
                sample_count: score.sample_count,
                n_sample,
                n_active,
                n_particles: snapshot.n_particles,
                est_count: score.est_count,
                local_score: score.local_score,
                regional_score: score.regional_score,
                closest_km: score.closest_km,
                density_km2: score.density_km2,
                risk_level: classify(score.regional_score, &config.thresholds),
            }
        })
        .collect()
}

/// `n_active / n_sample`, or zero for an empty sample.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn extrapolation_ratio(n_active: i64, n_sample: u32) -> f64 {
    if n_sample == 0 {
        0.0
    } else {
        n_active as f64 / f64::from(n_sample)
    }
}

/// Formats a timestamp as a `computed_at` batch key.
#[must_use]
pub fn format_computed_at(at: DateTime<Utc>) -> String {
    at.format(COMPUTED_AT_FORMAT).to_string()
}

/// Picks the key for a new batch: `now`, unless a stored batch already has
/// that key or a later one, in which case one second past the latest.
fn next_computed_at(now: DateTime<Utc>, latest: Option<&str>) -> String {
    let latest = latest.and_then(|s| match NaiveDateTime::parse_from_str(s, COMPUTED_AT_FORMAT) {
        Ok(dt) => Some(dt.and_utc()),
        Err(e) => {
            log::warn!("Ignoring unparseable computed_at '{s}': {e}");
            None
        }
    });

    match latest {
        Some(latest) if latest.timestamp() >= now.timestamp() => {
            format_computed_at(latest + Duration::seconds(1))
        }
        _ => format_computed_at(now),
    }
}
