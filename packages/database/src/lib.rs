#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! `SQLite` storage for drift snapshots and beach risk scores.
//!
//! Uses `switchy_database` over `rusqlite`. The database is opened in WAL
//! mode so a report or dashboard can read while a batch is being written,
//! and readers only ever see committed batches. The schema is managed by a
//! versioned migration list (see [`migrations`]) applied on open.

pub mod db;
pub mod migrations;
pub mod paths;
pub mod store;

pub use store::SqliteScoreStore;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The database file could not be opened.
    #[error("Failed to open database: {0}")]
    Connection(String),

    /// A migration could not be applied.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// An I/O operation failed (e.g., creating the database directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
