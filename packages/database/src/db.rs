//! Database connection utilities.

use std::path::Path;

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

use crate::{DbError, migrations, paths};

/// Milliseconds a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Opens (or creates) the `SQLite` database at `path`, switches it to WAL
/// mode, and applies pending migrations.
///
/// # Errors
///
/// Returns [`DbError`] if the file cannot be created or opened, or if a
/// migration fails.
pub async fn open(path: &Path) -> Result<Box<dyn Database>, DbError> {
    if let Some(parent) = path.parent() {
        paths::ensure_dir(parent)?;
    }

    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Connection(e.to_string()))?;

    configure(db.as_ref()).await?;
    migrations::run(db.as_ref()).await?;

    log::debug!("Opened score database at {}", path.display());

    Ok(db)
}

/// Sets the connection pragmas.
///
/// WAL lets readers proceed while the batch computer holds its write
/// transaction. The pragmas report their new value as a row, so they go
/// through the query path.
async fn configure(db: &dyn Database) -> Result<(), DbError> {
    db.query_raw_params("PRAGMA journal_mode = WAL", &[]).await?;
    db.query_raw_params(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"), &[])
        .await?;
    Ok(())
}
