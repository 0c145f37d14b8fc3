//! Beach catalogs.
//!
//! A catalog is a TOML document describing one [`ScoringConfig`]: the
//! beaches of an island plus the horizons, regional bandwidth, and risk
//! thresholds to score them with. Built-in catalogs are baked into the
//! binary with [`include_str!`]; others can be loaded from disk.

use std::collections::BTreeSet;
use std::path::Path;

use sargassum_scoring_models::ScoringConfig;

/// Catalogs embedded at compile time.
const CATALOG_TOMLS: &[(&str, &str)] = &[(
    "saint_barthelemy",
    include_str!("../catalogs/saint_barthelemy.toml"),
)];

/// Identifier of the catalog used when none is specified.
pub const DEFAULT_CATALOG: &str = "saint_barthelemy";

/// Errors that can occur while loading a beach catalog.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The catalog file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        /// Path of the catalog file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The catalog is not valid TOML or is missing required fields.
    #[error("Invalid catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The catalog parsed but describes an unusable configuration.
    #[error("Invalid catalog: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },

    /// No embedded catalog has the requested identifier.
    #[error("Unknown catalog: {0}")]
    UnknownCatalog(String),
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        message: message.into(),
    }
}

/// Parses and validates a catalog from a TOML string.
///
/// # Errors
///
/// Returns [`ConfigError`] if the TOML is malformed or fails validation.
pub fn parse_catalog_toml(toml_str: &str) -> Result<ScoringConfig, ConfigError> {
    let config: ScoringConfig = toml::de::from_str(toml_str)?;
    validate(&config)?;
    Ok(config)
}

/// Loads and validates a catalog file.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read, parsed, or validated.
pub fn load_catalog(path: &Path) -> Result<ScoringConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = parse_catalog_toml(&contents)?;
    log::info!(
        "Loaded catalog '{}' ({} beaches) from {}",
        config.name,
        config.beaches.len(),
        path.display()
    );
    Ok(config)
}

/// Returns an embedded catalog by identifier.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownCatalog`] if no catalog has that
/// identifier, or a parse/validation error for a broken embedded catalog.
pub fn embedded_catalog(id: &str) -> Result<ScoringConfig, ConfigError> {
    let (_, toml) = CATALOG_TOMLS
        .iter()
        .find(|(name, _)| *name == id)
        .ok_or_else(|| ConfigError::UnknownCatalog(id.to_string()))?;
    parse_catalog_toml(toml)
}

/// Identifiers of all embedded catalogs.
#[must_use]
pub fn embedded_catalog_ids() -> Vec<&'static str> {
    CATALOG_TOMLS.iter().map(|(name, _)| *name).collect()
}

/// Checks that a configuration can be scored.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] for an empty or duplicated beach list,
/// non-finite coordinates, a negative radius, a non-positive regional
/// bandwidth, or unordered thresholds.
pub fn validate(config: &ScoringConfig) -> Result<(), ConfigError> {
    if config.beaches.is_empty() {
        return Err(invalid("catalog has no beaches"));
    }

    let mut names = BTreeSet::new();
    for beach in &config.beaches {
        if beach.name.trim().is_empty() {
            return Err(invalid("beach with an empty name"));
        }
        if !names.insert(beach.name.as_str()) {
            return Err(invalid(format!("duplicate beach name '{}'", beach.name)));
        }
        if !beach.lat.is_finite() || !beach.lon.is_finite() {
            return Err(invalid(format!("{}: non-finite coordinates", beach.name)));
        }
        if !beach.radius_km.is_finite() || beach.radius_km < 0.0 {
            return Err(invalid(format!(
                "{}: radius_km must be a non-negative number, got {}",
                beach.name, beach.radius_km
            )));
        }
    }

    if !(config.regional_sigma_km.is_finite() && config.regional_sigma_km > 0.0) {
        return Err(invalid(format!(
            "regional_sigma_km must be positive, got {}",
            config.regional_sigma_km
        )));
    }

    if !config.thresholds.is_ordered() {
        return Err(invalid(format!(
            "thresholds must satisfy low <= medium <= high, got {:?}",
            config.thresholds
        )));
    }

    Ok(())
}
