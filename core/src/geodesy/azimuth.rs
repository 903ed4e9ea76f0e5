use super::coord::Coordinate;
use super::GeoError;
use geo::{GeodesicBearing, Point};

/// Initial bearing from `from` to `to` along the WGS84 geodesic, degrees
/// clockwise from north in `[0, 360)`.
///
/// The bearing of a point to itself is mathematically undefined; this
/// returns 0.0 for that case so callers see a deterministic number rather
/// than whatever the geodesic solver does at zero distance.
pub fn azimuth(from: &Coordinate, to: &Coordinate) -> Result<f64, GeoError> {
    from.validate()?;
    to.validate()?;
    if from == to {
        return Ok(0.0);
    }
    let origin = Point::new(from.longitude, from.latitude);
    let target = Point::new(to.longitude, to.latitude);
    let raw = origin.geodesic_bearing(target);
    Ok(normalize_degrees(raw))
}

/// Maps any finite degree value into `[0, 360)`.
pub fn normalize_degrees(raw: f64) -> f64 {
    let wrapped = raw % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn azimuth_of_coincident_points_is_sentinel_zero() {
        let point = Coordinate::new(50.4218266, 30.7049994);
        let bearing = azimuth(&point, &point).unwrap();
        assert_eq!(bearing, 0.0);
        assert!(!bearing.is_nan());
    }

    #[test]
    fn azimuth_tower_to_subscriber_points_west_northwest() {
        let tower = Coordinate::new(50.46621758686562, 30.61527026448282);
        let subscriber = Coordinate::new(50.46855313570581, 30.603747494373835);
        let bearing = azimuth(&tower, &subscriber).unwrap();
        assert!(bearing > 285.0 && bearing < 290.0, "got {bearing}");

        // The reverse path leaves roughly opposite.
        let reverse = azimuth(&subscriber, &tower).unwrap();
        assert!((reverse - (bearing - 180.0)).abs() < 1.0, "got {reverse}");
    }

    #[test]
    fn azimuth_due_east_is_near_ninety() {
        let a = Coordinate::new(50.4218266, 30.7049994);
        let b = Coordinate::new(50.4218266, 30.7200000);
        let bearing = azimuth(&a, &b).unwrap();
        assert!(bearing > 89.0 && bearing < 91.0, "got {bearing}");
    }

    #[test]
    fn azimuth_result_is_always_normalized() {
        let a = Coordinate::new(50.0, 30.0);
        let b = Coordinate::new(49.0, 29.0);
        let bearing = azimuth(&a, &b).unwrap();
        assert!((0.0..360.0).contains(&bearing));
    }

    #[test]
    fn azimuth_rejects_malformed_input() {
        let bad = Coordinate::new(120.0, 30.0);
        let good = Coordinate::new(50.0, 30.0);
        assert!(azimuth(&bad, &good).is_err());
    }

    #[test]
    fn normalize_wraps_both_directions() {
        assert_eq!(normalize_degrees(-70.0), 290.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert_eq!(normalize_degrees(180.0), 180.0);
    }
}
