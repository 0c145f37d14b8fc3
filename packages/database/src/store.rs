//! `SQLite`-backed [`ScoreRepository`].
//!
//! Score batches are written in a single transaction, and the latest batch
//! is read with a single statement, so a reader never observes a partially
//! written `computed_at` group.

use std::path::Path;

use async_trait::async_trait;
use moosicbox_json_utils::database::ToValue as _;
use sargassum_scoring::ScoreRepository;
use sargassum_scoring_models::{BeachRiskScore, DriftSnapshot, StoredBeachScore};
use switchy_database::{Database, DatabaseValue, Row};

use crate::{DbError, db};

const INSERT_SCORE_SQL: &str = "INSERT INTO beach_risk_scores (
        computed_at, simulated_at, beach_name, beach_lat, beach_lon,
        radius_km, day_offset, sample_count, n_sample, n_active,
        n_particles, est_count, local_score, regional_score,
        closest_km, density_km2, risk_level
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)";

/// Score repository over a `switchy_database` `SQLite` connection.
pub struct SqliteScoreStore {
    db: Box<dyn Database>,
}

impl SqliteScoreStore {
    /// Opens (or creates) the store at `path` and migrates it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    pub async fn open(path: &Path) -> Result<Self, DbError> {
        Ok(Self {
            db: db::open(path).await?,
        })
    }

    /// Wraps an already migrated connection.
    #[must_use]
    pub fn from_database(db: Box<dyn Database>) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub fn database(&self) -> &dyn Database {
        self.db.as_ref()
    }

    /// Stores one drift snapshot.
    ///
    /// The drift collector owns this table in production; this seeds test
    /// databases and local fixtures with snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the insert fails.
    pub async fn insert_snapshot(&self, snapshot: &DriftSnapshot) -> Result<(), DbError> {
        self.db
            .exec_raw_params(
                "INSERT INTO drift_predictions
                    (simulated_at, n_particles, day_offset, active_fraction, positions_json)
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    DatabaseValue::String(snapshot.simulated_at.clone()),
                    DatabaseValue::Int64(snapshot.n_particles),
                    DatabaseValue::Int64(i64::from(snapshot.day_offset)),
                    DatabaseValue::Real64(snapshot.active_fraction),
                    snapshot
                        .positions_json
                        .as_ref()
                        .map_or(DatabaseValue::Null, |p| DatabaseValue::String(p.clone())),
                ],
            )
            .await?;
        Ok(())
    }

    /// Returns the number of score rows stored under `computed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    pub async fn batch_size(&self, computed_at: &str) -> Result<u64, DbError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT COUNT(*) AS n FROM beach_risk_scores WHERE computed_at = $1",
                &[DatabaseValue::String(computed_at.to_string())],
            )
            .await?;
        let n: i64 = rows
            .first()
            .map_or(Ok(0), |row| row.to_value("n"))
            .map_err(|e| DbError::Conversion {
                message: format!("Failed to parse batch size: {e}"),
            })?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn max_text(&self, sql: &str, column: &str) -> Result<Option<String>, DbError> {
        let rows = self.db.query_raw_params(sql, &[]).await?;
        Ok(rows
            .first()
            .and_then(|row| row.to_value::<Option<String>>(column).unwrap_or(None))
            .filter(|s| !s.is_empty()))
    }
}

#[async_trait]
impl ScoreRepository for SqliteScoreStore {
    type Error = DbError;

    async fn latest_simulation(&self) -> Result<Option<String>, DbError> {
        self.max_text(
            "SELECT MAX(simulated_at) AS max_sim FROM drift_predictions",
            "max_sim",
        )
        .await
    }

    async fn snapshots_for(
        &self,
        simulated_at: &str,
        offsets: &[u32],
    ) -> Result<Vec<DriftSnapshot>, DbError> {
        if offsets.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (0..offsets.len())
            .map(|i| format!("${}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT id, simulated_at, day_offset, n_particles, active_fraction, positions_json
             FROM drift_predictions
             WHERE simulated_at = $1 AND day_offset IN ({placeholders})
             ORDER BY day_offset, id"
        );

        let mut params = vec![DatabaseValue::String(simulated_at.to_string())];
        params.extend(offsets.iter().map(|d| DatabaseValue::Int64(i64::from(*d))));

        let rows = self.db.query_raw_params(&sql, &params).await?;

        let mut snapshots: Vec<DriftSnapshot> = Vec::with_capacity(rows.len());
        for row in &rows {
            let Some(snapshot) = snapshot_from_row(row) else {
                continue;
            };
            // Keep the first snapshot written for a day offset.
            if snapshots
                .last()
                .is_some_and(|prev| prev.day_offset == snapshot.day_offset)
            {
                log::warn!(
                    "Duplicate snapshot for {simulated_at} day +{}, keeping the first",
                    snapshot.day_offset
                );
                continue;
            }
            snapshots.push(snapshot);
        }

        Ok(snapshots)
    }

    async fn latest_computed_at(&self) -> Result<Option<String>, DbError> {
        self.max_text(
            "SELECT MAX(computed_at) AS last FROM beach_risk_scores",
            "last",
        )
        .await
    }

    async fn insert_batch(&self, rows: &[BeachRiskScore]) -> Result<usize, DbError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin_transaction().await?;

        for row in rows {
            if let Err(e) = txn.exec_raw_params(INSERT_SCORE_SQL, &score_params(row)).await {
                log::error!(
                    "Failed to insert score for {} day +{}, rolling back batch {}: {e}",
                    row.beach_name,
                    row.day_offset,
                    row.computed_at
                );
                if let Err(rollback_err) = txn.rollback().await {
                    log::error!("Rollback failed: {rollback_err}");
                }
                return Err(e.into());
            }
        }

        txn.commit().await?;

        Ok(rows.len())
    }

    async fn latest_batch(&self) -> Result<Vec<StoredBeachScore>, DbError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT * FROM beach_risk_scores
                 WHERE computed_at = (SELECT MAX(computed_at) FROM beach_risk_scores)
                 ORDER BY beach_name, day_offset",
                &[],
            )
            .await?;

        rows.iter().map(stored_score_from_row).collect()
    }
}

fn score_params(row: &BeachRiskScore) -> Vec<DatabaseValue> {
    vec![
        DatabaseValue::String(row.computed_at.clone()),
        DatabaseValue::String(row.simulated_at.clone()),
        DatabaseValue::String(row.beach_name.clone()),
        DatabaseValue::Real64(row.beach_lat),
        DatabaseValue::Real64(row.beach_lon),
        DatabaseValue::Real64(row.radius_km),
        DatabaseValue::Int64(i64::from(row.day_offset)),
        DatabaseValue::Int64(i64::from(row.sample_count)),
        DatabaseValue::Int64(i64::from(row.n_sample)),
        DatabaseValue::Int64(row.n_active),
        DatabaseValue::Int64(row.n_particles),
        DatabaseValue::Real64(row.est_count),
        DatabaseValue::Real64(row.local_score),
        DatabaseValue::Real64(row.regional_score),
        row.closest_km.map_or(DatabaseValue::Null, DatabaseValue::Real64),
        DatabaseValue::Real64(row.density_km2),
        DatabaseValue::String(row.risk_level.as_ref().to_string()),
    ]
}

/// Builds a snapshot from a `drift_predictions` row, skipping rows whose
/// day offset is missing or negative.
fn snapshot_from_row(row: &Row) -> Option<DriftSnapshot> {
    let id: i64 = row.to_value("id").unwrap_or(0);
    let day_offset: Option<i64> = row.to_value("day_offset").unwrap_or(None);
    let Some(day_offset) = day_offset.and_then(|d| u32::try_from(d).ok()) else {
        log::warn!("Skipping drift snapshot {id} with invalid day_offset {day_offset:?}");
        return None;
    };

    let n_particles: Option<i64> = row.to_value("n_particles").unwrap_or(None);
    let active_fraction: Option<f64> = row.to_value("active_fraction").unwrap_or(None);

    Some(DriftSnapshot {
        simulated_at: row.to_value("simulated_at").unwrap_or_default(),
        day_offset,
        n_particles: n_particles.unwrap_or(0),
        active_fraction: active_fraction.unwrap_or(0.0),
        positions_json: row.to_value("positions_json").unwrap_or(None),
    })
}

/// Builds a stored score from a `beach_risk_scores` row.
///
/// Required columns must parse; columns that older schema versions lack,
/// or that older tools left `NULL`, read as `None`.
fn stored_score_from_row(row: &Row) -> Result<StoredBeachScore, DbError> {
    let conversion = |column: &str, e: &dyn std::fmt::Display| DbError::Conversion {
        message: format!("Failed to parse beach_risk_scores.{column}: {e}"),
    };

    let computed_at: String = row
        .to_value("computed_at")
        .map_err(|e| conversion("computed_at", &e))?;
    let beach_name: String = row
        .to_value("beach_name")
        .map_err(|e| conversion("beach_name", &e))?;
    let day_offset: i64 = row
        .to_value("day_offset")
        .map_err(|e| conversion("day_offset", &e))?;
    let sample_count: i64 = row
        .to_value("sample_count")
        .map_err(|e| conversion("sample_count", &e))?;
    let risk_level: String = row.to_value("risk_level").unwrap_or_default();
    let n_sample: Option<i64> = row.to_value("n_sample").unwrap_or(None);

    Ok(StoredBeachScore {
        computed_at,
        simulated_at: row.to_value("simulated_at").unwrap_or_default(),
        beach_name,
        radius_km: row.to_value("radius_km").unwrap_or(0.0),
        day_offset: u32::try_from(day_offset).map_err(|e| conversion("day_offset", &e))?,
        sample_count: u32::try_from(sample_count)
            .map_err(|e| conversion("sample_count", &e))?,
        n_sample: n_sample.and_then(|n| u32::try_from(n).ok()),
        n_active: row.to_value("n_active").unwrap_or(None),
        n_particles: row.to_value("n_particles").unwrap_or(None),
        est_count: row.to_value("est_count").unwrap_or(None),
        local_score: row.to_value("local_score").unwrap_or(None),
        regional_score: row.to_value("regional_score").unwrap_or(None),
        closest_km: row.to_value("closest_km").unwrap_or(None),
        density_km2: row.to_value("density_km2").unwrap_or(None),
        risk_level: risk_level.parse().ok(),
    })
}
