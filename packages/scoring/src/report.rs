//! Text rendering of the latest stored score batch.
//!
//! One line per beach, one column per configured day offset. Each cell
//! shows the risk marker, the regional score, the local score, and the
//! distance to the closest particle. Cells with no stored row, or values
//! from older batches that predate a column, render as a dash.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use sargassum_scoring_models::{RiskLevel, ScoringConfig, StoredBeachScore};

use crate::batch::extrapolation_ratio;
use crate::repository::ScoreRepository;

const RULE_WIDTH: usize = 72;
const NAME_WIDTH: usize = 20;
const CELL_WIDTH: usize = 18;
const MISSING: &str = "—";

/// Message shown when no batch has been stored yet.
pub const NO_SCORES_MESSAGE: &str =
    "No beach risk scores stored yet. Run `sargassum_beaches` to compute them.";

/// Loads the latest batch from `repository` and renders it.
///
/// # Errors
///
/// Returns the repository's error if the batch cannot be read.
pub async fn render_latest_report<R: ScoreRepository>(
    repository: &R,
    config: &ScoringConfig,
) -> Result<String, R::Error> {
    let rows = repository.latest_batch().await?;
    Ok(render_report(&rows, config))
}

/// Renders one batch of stored rows.
///
/// Returns [`NO_SCORES_MESSAGE`] for an empty batch.
#[must_use]
pub fn render_report(rows: &[StoredBeachScore], config: &ScoringConfig) -> String {
    let Some(first) = rows.first() else {
        return format!("{NO_SCORES_MESSAGE}\n");
    };

    let mut by_beach: BTreeMap<&str, Vec<&StoredBeachScore>> = BTreeMap::new();
    for row in rows {
        by_beach.entry(row.beach_name.as_str()).or_default().push(row);
    }

    let mut out = String::new();
    let rule = "═".repeat(RULE_WIDTH);

    writeln!(out).unwrap();
    writeln!(out, "{rule}").unwrap();
    writeln!(
        out,
        "  🏖️  Sargassum risk — {}  (computed {})",
        config.name, first.computed_at
    )
    .unwrap();
    writeln!(out, "{rule}").unwrap();

    let mut header = format!("{:<NAME_WIDTH$}", "Beach");
    let mut subheader = format!("{:<NAME_WIDTH$}", "");
    for day in &config.day_offsets {
        write!(header, "  {:<CELL_WIDTH$}", format!("D+{day}")).unwrap();
        write!(subheader, "  {:<CELL_WIDTH$}", "reg / loc / prox").unwrap();
    }
    writeln!(out, "{header}").unwrap();
    writeln!(out, "{subheader}").unwrap();
    writeln!(out, "{}", "─".repeat(header.chars().count())).unwrap();

    for (beach_name, beach_rows) in &by_beach {
        let mut line = format!("{beach_name:<NAME_WIDTH$}");
        for day in &config.day_offsets {
            match beach_rows.iter().find(|r| r.day_offset == *day) {
                Some(row) => line.push_str(&render_cell(row)),
                None => {
                    line.push_str("  ");
                    line.push_str(&MISSING.repeat(CELL_WIDTH));
                }
            }
        }
        writeln!(out, "{line}").unwrap();
    }

    writeln!(out).unwrap();
    writeln!(out, "{}", provenance_line(first)).unwrap();
    writeln!(
        out,
        "  Columns     : risk | regional_score (σ={}km) | local_score (σ=radius) | closest_km",
        config.regional_sigma_km
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out, "  risk_level thresholds (extrapolated regional_score):").unwrap();
    let t = &config.thresholds;
    writeln!(
        out,
        "    {} < {}   {} ≥ {}   {} ≥ {}   {} ≥ {}",
        RiskLevel::None.icon(),
        t.low,
        RiskLevel::Low.icon(),
        t.low,
        RiskLevel::Medium.icon(),
        t.medium,
        RiskLevel::High.icon(),
        t.high
    )
    .unwrap();

    out
}

fn render_cell(row: &StoredBeachScore) -> String {
    let icon = row.risk_level.map_or("?", RiskLevel::icon);
    let prox = row
        .closest_km
        .map_or_else(|| MISSING.to_string(), |d| format!("{d:.0}km"));
    format!(
        "  {icon} {} /{} /{prox:>5}",
        score_cell(row.regional_score),
        score_cell(row.local_score)
    )
}

fn score_cell(value: Option<f64>) -> String {
    value.map_or_else(|| format!("{MISSING:>5}"), |v| format!("{v:5.1}"))
}

fn provenance_line(row: &StoredBeachScore) -> String {
    let fmt_count =
        |v: Option<i64>| v.map_or_else(|| MISSING.to_string(), |n| n.to_string());
    let ratio = match (row.n_active, row.n_sample) {
        (Some(active), Some(sample)) => extrapolation_ratio(active, sample),
        _ => 0.0,
    };
    format!(
        "  Simulation  : {} particles | {} active | sample of {} pts (x{ratio:.1})",
        fmt_count(row.n_particles),
        fmt_count(row.n_active),
        fmt_count(row.n_sample.map(i64::from)),
    )
}

#[cfg(test)]
mod tests {
    use sargassum_scoring_models::Beach;

    use super::*;

    fn config() -> ScoringConfig {
        ScoringConfig::new(
            "Test Island",
            vec![
                Beach::new("Anse", 17.90, -62.85, 3.0),
                Beach::new("Baie", 17.95, -62.80, 2.0),
            ],
        )
    }

    fn row(beach_name: &str, day_offset: u32, regional: f64) -> StoredBeachScore {
        StoredBeachScore {
            computed_at: "2026-02-16T12:00:00Z".to_string(),
            simulated_at: "2026-02-16T06:00:00Z".to_string(),
            beach_name: beach_name.to_string(),
            radius_km: 3.0,
            day_offset,
            sample_count: 1,
            n_sample: Some(500),
            n_active: Some(5000),
            n_particles: Some(6000),
            est_count: Some(10.0),
            local_score: Some(10.4),
            regional_score: Some(regional),
            closest_km: Some(1.26),
            density_km2: Some(0.353_678),
            risk_level: Some(crate::classify::risk_level(regional)),
        }
    }

    #[test]
    fn empty_history_renders_guidance() {
        let report = render_report(&[], &config());
        assert!(report.contains(NO_SCORES_MESSAGE));
    }

    #[test]
    fn renders_one_line_per_beach_sorted_by_name() {
        let rows = vec![row("Baie", 0, 80.0), row("Anse", 0, 19.9), row("Anse", 1, 3.0)];
        let report = render_report(&rows, &config());

        assert!(report.contains("Test Island"));
        assert!(report.contains("(computed 2026-02-16T12:00:00Z)"));
        assert!(report.contains("D+0"));
        assert!(report.contains("D+3"));

        let anse = report.lines().position(|l| l.starts_with("Anse")).unwrap();
        let baie = report.lines().position(|l| l.starts_with("Baie")).unwrap();
        assert!(anse < baie);

        let anse_line = report.lines().nth(anse).unwrap();
        assert!(anse_line.contains("🟡  19.9 / 10.4 /  1km"), "{anse_line}");
        assert!(anse_line.contains("🟢   3.0"), "{anse_line}");
        // D+2 and D+3 have no rows
        assert!(anse_line.contains(&MISSING.repeat(CELL_WIDTH)));

        let baie_line = report.lines().nth(baie).unwrap();
        assert!(baie_line.contains("🔴  80.0"), "{baie_line}");
    }

    #[test]
    fn footer_shows_provenance_and_thresholds() {
        let report = render_report(&[row("Anse", 0, 1.0)], &config());
        assert!(report.contains("6000 particles | 5000 active | sample of 500 pts (x10.0)"));
        assert!(report.contains("≥ 75"));
    }

    #[test]
    fn older_rows_without_newer_columns_render_dashes() {
        let legacy = StoredBeachScore {
            n_sample: None,
            n_active: None,
            est_count: None,
            local_score: None,
            regional_score: None,
            closest_km: None,
            density_km2: None,
            risk_level: None,
            ..row("Anse", 0, 0.0)
        };
        let report = render_report(&[legacy], &config());
        let line = report.lines().find(|l| l.starts_with("Anse")).unwrap();
        assert!(line.contains("?     — /    — /    —"), "{line}");
        assert!(report.contains("— active"));
    }
}
