//! Default location of the score database.

use std::path::{Path, PathBuf};

/// Environment variable overriding the database path.
pub const DB_PATH_ENV: &str = "SARGASSUM_DB_PATH";

/// Database file used when neither a flag nor [`DB_PATH_ENV`] is given.
///
/// Shared with the drift collector, which writes its snapshots into the
/// same file.
pub const DEFAULT_DB_FILE: &str = "sargassum_data.db";

/// Resolves the database path from [`DB_PATH_ENV`], falling back to
/// [`DEFAULT_DB_FILE`] in the working directory.
#[must_use]
pub fn db_path_from_env() -> PathBuf {
    std::env::var(DB_PATH_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_DB_FILE), PathBuf::from)
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
