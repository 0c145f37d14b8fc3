//! Lenient parsing of stored particle positions.
//!
//! The drift collector stores each snapshot's sample as a JSON array of
//! `[lon, lat]` pairs. A bad record never aborts a batch: unparseable JSON
//! degrades to an empty sample and unusable entries are skipped.

use geo::Point;
use serde_json::Value;

/// Parses a `positions_json` column into `(lon, lat)` points.
///
/// Returns an empty list for `None`, invalid JSON, or a non-array document.
/// Entries with fewer than two elements, or whose first two elements are
/// not numbers (or numeric strings), are skipped.
#[must_use]
pub fn parse_positions(json: Option<&str>) -> Vec<Point<f64>> {
    let Some(json) = json else {
        return Vec::new();
    };

    let entries = match serde_json::from_str::<Value>(json) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            log::warn!("positions_json is not an array, treating sample as empty");
            return Vec::new();
        }
        Err(e) => {
            log::warn!("Failed to parse positions_json ({e}), treating sample as empty");
            return Vec::new();
        }
    };

    let total = entries.len();
    let points: Vec<Point<f64>> = entries.iter().filter_map(parse_entry).collect();

    if points.len() < total {
        log::debug!(
            "Skipped {} malformed position entries out of {total}",
            total - points.len()
        );
    }

    points
}

fn parse_entry(entry: &Value) -> Option<Point<f64>> {
    let pair = entry.as_array()?;
    if pair.len() < 2 {
        return None;
    }
    let lon = coordinate(&pair[0])?;
    let lat = coordinate(&pair[1])?;
    Some(Point::new(lon, lat))
}

fn coordinate(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lon_lat_pairs() {
        let points = parse_positions(Some("[[-62.85, 17.9], [-62.9, 17.95]]"));
        assert_eq!(points.len(), 2);
        assert!((points[0].x() - -62.85).abs() < f64::EPSILON);
        assert!((points[0].y() - 17.9).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_or_invalid_json_is_empty() {
        assert!(parse_positions(None).is_empty());
        assert!(parse_positions(Some("")).is_empty());
        assert!(parse_positions(Some("not json")).is_empty());
        assert!(parse_positions(Some("{\"lon\": 1}")).is_empty());
        assert!(parse_positions(Some("null")).is_empty());
    }

    #[test]
    fn skips_short_and_non_numeric_entries() {
        let points = parse_positions(Some(
            r#"[[-62.85], [], "x", [null, 17.9], ["a", "b"], [-62.8, 17.9, 0.0], ["-62.7", "17.8"]]"#,
        ));
        assert_eq!(points.len(), 2);
        assert!((points[0].x() - -62.8).abs() < f64::EPSILON);
        assert!((points[1].y() - 17.8).abs() < f64::EPSILON);
    }
}
