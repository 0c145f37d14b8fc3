//! Storage seam for the batch score computer.
//!
//! The scoring core only talks to storage through [`ScoreRepository`], so
//! it carries no SQL. The `SQLite` implementation lives in
//! `sargassum_database`; tests use an in-memory implementation.

use async_trait::async_trait;
use sargassum_scoring_models::{BeachRiskScore, DriftSnapshot, StoredBeachScore};

/// Typed reads and writes needed to compute and report beach scores.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Error type surfaced by the storage engine.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the most recent `simulated_at` among stored drift snapshots.
    async fn latest_simulation(&self) -> Result<Option<String>, Self::Error>;

    /// Returns the snapshots of `simulated_at` whose day offset is in
    /// `offsets`, ordered by day offset. Missing offsets are simply absent.
    async fn snapshots_for(
        &self,
        simulated_at: &str,
        offsets: &[u32],
    ) -> Result<Vec<DriftSnapshot>, Self::Error>;

    /// Returns the most recent `computed_at` batch key, if any.
    async fn latest_computed_at(&self) -> Result<Option<String>, Self::Error>;

    /// Inserts a full batch atomically and returns the number of rows
    /// written. Either every row becomes visible or none does.
    async fn insert_batch(&self, rows: &[BeachRiskScore]) -> Result<usize, Self::Error>;

    /// Returns every row of the latest batch, ordered by beach name and day
    /// offset. Empty when no batch has been stored yet.
    async fn latest_batch(&self) -> Result<Vec<StoredBeachScore>, Self::Error>;
}
