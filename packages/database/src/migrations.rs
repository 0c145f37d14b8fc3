//! Versioned schema migrations.
//!
//! The schema version lives in `PRAGMA user_version`. Each [`Migration`]
//! moves the schema from `version - 1` to `version` inside one transaction,
//! so a crash mid-migration leaves the previous version intact. Migrations
//! are forward-only and additive: new columns are nullable, so rows written
//! before a column existed read back as `NULL`.
//!
//! Databases first created by the drift collector or by earlier scoring
//! tools report version 0 but may already contain some tables or columns.
//! Tables are therefore created with `IF NOT EXISTS` and columns are added
//! only when missing. Those tools could also write two batches within the
//! same second, so no migration may add a uniqueness constraint over rows
//! they already wrote; batch keys are kept unique when they are generated.

use moosicbox_json_utils::database::ToValue as _;
use switchy_database::Database;

use crate::DbError;

/// One schema change inside a migration.
#[derive(Debug, Clone, Copy)]
pub enum MigrationStep {
    /// A single SQL statement.
    Sql(&'static str),
    /// `ALTER TABLE ... ADD COLUMN`, skipped if the column already exists.
    AddColumn {
        /// Table to alter.
        table: &'static str,
        /// Column name.
        column: &'static str,
        /// Column type and constraints.
        definition: &'static str,
    },
}

/// A forward step from `version - 1` to `version`.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Schema version after this migration.
    pub version: u32,
    /// Short human-readable summary.
    pub description: &'static str,
    /// Changes applied in order.
    pub steps: &'static [MigrationStep],
}

/// All migrations, in version order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "drift snapshots and beach risk scores",
        steps: &[
            MigrationStep::Sql(
                "CREATE TABLE IF NOT EXISTS drift_predictions (
                    id               INTEGER PRIMARY KEY AUTOINCREMENT,
                    simulated_at     TEXT    NOT NULL,
                    sim_start        TEXT,
                    sim_end          TEXT,
                    n_particles      INTEGER,
                    current_source   TEXT,
                    day_offset       INTEGER,
                    lon_min          REAL,
                    lon_max          REAL,
                    lat_min          REAL,
                    lat_max          REAL,
                    active_fraction  REAL,
                    positions_json   TEXT,
                    raw_metadata     TEXT
                )",
            ),
            MigrationStep::Sql(
                "CREATE TABLE IF NOT EXISTS beach_risk_scores (
                    id             INTEGER PRIMARY KEY AUTOINCREMENT,
                    computed_at    TEXT    NOT NULL,
                    simulated_at   TEXT    NOT NULL,
                    beach_name     TEXT    NOT NULL,
                    beach_lat      REAL    NOT NULL,
                    beach_lon      REAL    NOT NULL,
                    radius_km      REAL    NOT NULL,
                    day_offset     INTEGER NOT NULL,
                    sample_count   INTEGER NOT NULL,
                    n_sample       INTEGER,
                    n_active       INTEGER,
                    n_particles    INTEGER,
                    est_count      REAL,
                    risk_level     TEXT    NOT NULL
                )",
            ),
        ],
    },
    Migration {
        version: 2,
        description: "Gaussian scores, closest particle, and density",
        steps: &[
            MigrationStep::AddColumn {
                table: "beach_risk_scores",
                column: "local_score",
                definition: "REAL",
            },
            MigrationStep::AddColumn {
                table: "beach_risk_scores",
                column: "regional_score",
                definition: "REAL",
            },
            MigrationStep::AddColumn {
                table: "beach_risk_scores",
                column: "closest_km",
                definition: "REAL",
            },
            MigrationStep::AddColumn {
                table: "beach_risk_scores",
                column: "density_km2",
                definition: "REAL",
            },
        ],
    },
    Migration {
        version: 3,
        description: "batch and snapshot lookup indexes",
        steps: &[
            MigrationStep::Sql(
                "CREATE INDEX IF NOT EXISTS idx_beach_risk_scores_batch
                 ON beach_risk_scores (computed_at, beach_name, day_offset)",
            ),
            MigrationStep::Sql(
                "CREATE INDEX IF NOT EXISTS idx_drift_predictions_sim
                 ON drift_predictions (simulated_at, day_offset)",
            ),
        ],
    },
];

/// Schema version after all [`MIGRATIONS`] have been applied.
#[allow(clippy::cast_possible_truncation)]
pub const SCHEMA_VERSION: u32 = MIGRATIONS.len() as u32;

/// Reads the schema version recorded in the database.
///
/// # Errors
///
/// Returns [`DbError`] if the pragma cannot be read.
pub async fn current_version(db: &dyn Database) -> Result<u32, DbError> {
    let rows = db.query_raw_params("PRAGMA user_version", &[]).await?;
    let version: i64 = match rows.first() {
        Some(row) => row.to_value("user_version").map_err(|e| DbError::Conversion {
            message: format!("Failed to parse user_version: {e}"),
        })?,
        None => 0,
    };

    u32::try_from(version).map_err(|_| DbError::Conversion {
        message: format!("Invalid user_version {version}"),
    })
}

/// Applies every migration newer than the database's version.
///
/// Running it on an up-to-date database is a no-op.
///
/// # Errors
///
/// Returns [`DbError::Migration`] if the database is newer than this build
/// supports, or the underlying error if a migration fails (that migration
/// is rolled back).
pub async fn run(db: &dyn Database) -> Result<(), DbError> {
    let current = current_version(db).await?;

    if current > SCHEMA_VERSION {
        return Err(DbError::Migration(format!(
            "Database schema version {current} is newer than supported {SCHEMA_VERSION}"
        )));
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        log::info!(
            "Migrating database to v{}: {}",
            migration.version,
            migration.description
        );
        apply(db, migration).await?;
    }

    Ok(())
}

async fn apply(db: &dyn Database, migration: &Migration) -> Result<(), DbError> {
    let txn = db.begin_transaction().await?;

    let result = async {
        for step in migration.steps {
            apply_step(txn.as_ref(), step).await?;
        }
        txn.exec_raw(&format!("PRAGMA user_version = {}", migration.version))
            .await?;
        Ok::<(), DbError>(())
    }
    .await;

    match result {
        Ok(()) => {
            txn.commit().await?;
            Ok(())
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                log::error!(
                    "Failed to roll back migration v{}: {rollback_err}",
                    migration.version
                );
            }
            Err(e)
        }
    }
}

async fn apply_step(db: &dyn Database, step: &MigrationStep) -> Result<(), DbError> {
    match *step {
        MigrationStep::Sql(sql) => {
            db.exec_raw(sql).await?;
        }
        MigrationStep::AddColumn {
            table,
            column,
            definition,
        } => {
            if has_column(db, table, column).await? {
                log::debug!("{table}.{column} already exists, skipping");
            } else {
                db.exec_raw(&format!(
                    "ALTER TABLE {table} ADD COLUMN {column} {definition}"
                ))
                .await?;
            }
        }
    }
    Ok(())
}

/// Whether `table` has a column named `column`.
///
/// # Errors
///
/// Returns [`DbError`] if the table info cannot be read.
pub async fn has_column(db: &dyn Database, table: &str, column: &str) -> Result<bool, DbError> {
    let rows = db
        .query_raw_params(&format!("PRAGMA table_info({table})"), &[])
        .await?;
    Ok(rows.iter().any(|row| {
        let name: String = row.to_value("name").unwrap_or_default();
        name.eq_ignore_ascii_case(column)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_contiguous() {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version as usize, i + 1, "{}", migration.description);
            assert!(!migration.steps.is_empty());
        }
        assert_eq!(SCHEMA_VERSION as usize, MIGRATIONS.len());
    }
}
