//! Great-circle distances on a spherical Earth.

use geo::Point;

/// Mean Earth radius used by [`distance_km`], in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two WGS84 coordinates, in kilometers.
///
/// Inputs are decimal degrees and are not range-checked.
#[must_use]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);

    // Rounding can push `a` a hair past 1 for antipodal points.
    EARTH_RADIUS_KM * 2.0 * a.sqrt().min(1.0).asin()
}

/// [`distance_km`] between two points whose `x` is longitude and `y` is
/// latitude.
#[must_use]
pub fn point_distance_km(a: Point<f64>, b: Point<f64>) -> f64 {
    distance_km(a.y(), a.x(), b.y(), b.x())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[(f64, f64)] = &[
        (17.90, -62.85),
        (17.95, -62.90),
        (0.0, 0.0),
        (-33.86, 151.21),
        (89.9, 179.9),
        (51.5, -0.12),
    ];

    #[test]
    fn distance_is_symmetric() {
        for &(lat1, lon1) in SAMPLES {
            for &(lat2, lon2) in SAMPLES {
                let ab = distance_km(lat1, lon1, lat2, lon2);
                let ba = distance_km(lat2, lon2, lat1, lon1);
                assert!((ab - ba).abs() < 1e-9, "{ab} != {ba}");
            }
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        for &(lat, lon) in SAMPLES {
            assert!(distance_km(lat, lon, lat, lon).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = distance_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.195).abs() < 0.01, "got {d}");
    }

    #[test]
    fn nearby_saint_barth_points() {
        let d = distance_km(17.90, -62.85, 17.95, -62.90);
        assert!((7.5..7.8).contains(&d), "got {d}");
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let d = distance_km(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn point_distance_uses_lon_lat_order() {
        let beach = Point::new(-62.85, 17.90);
        let particle = Point::new(-62.90, 17.95);
        let expected = distance_km(17.90, -62.85, 17.95, -62.90);
        assert!((point_distance_km(beach, particle) - expected).abs() < f64::EPSILON);
    }
}
