#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Beach stranding-risk scoring for drifting sargassum.
//!
//! Turns the sub-sampled particle positions of a drift simulation into
//! per-beach risk estimates for several forecast days:
//!
//! - [`geodesy`] computes haversine distances.
//! - [`scorer`] sums two Gaussian kernels per beach (local and regional)
//!   and extrapolates them from the sample to the active population.
//! - [`classify`] maps the regional score to a [`RiskLevel`].
//! - [`batch`] orchestrates a full run over a [`ScoreRepository`] and
//!   stores it as one atomic batch.
//! - [`report`] renders the latest stored batch.
//! - [`catalog`] loads beach catalogs ([`ScoringConfig`]) from TOML.
//!
//! [`RiskLevel`]: sargassum_scoring_models::RiskLevel
//! [`ScoringConfig`]: sargassum_scoring_models::ScoringConfig

pub mod batch;
pub mod catalog;
pub mod classify;
pub mod geodesy;
pub mod positions;
pub mod report;
pub mod repository;
pub mod scorer;

pub use batch::ScoreComputer;
pub use repository::ScoreRepository;
