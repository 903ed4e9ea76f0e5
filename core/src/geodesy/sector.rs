/// Default half-width of a sector antenna's coverage cone, degrees.
/// A 60 degree tolerance on either side models a 120 degree sector.
pub const DEFAULT_SECTOR_ARC_DEG: f64 = 60.0;

/// Whether an observed bearing falls within `arc_deg` of a sector's
/// nominal azimuth.
///
/// The `360 - diff` fold handles wraparound at 0/360: observed 359 against
/// sector 10 differs by 11 degrees, not 349. Comparison is inclusive at
/// exactly `arc_deg`. Inputs outside `[0, 360)` are the caller's problem;
/// the predicate does not normalize.
pub fn is_within_arc(observed_deg: f64, sector_deg: f64, arc_deg: f64) -> bool {
    let mut difference = (observed_deg - sector_deg).abs();
    if difference > 180.0 {
        difference = 360.0 - difference;
    }
    difference <= arc_deg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn within(observed: f64, sector: f64) -> bool {
        is_within_arc(observed, sector, DEFAULT_SECTOR_ARC_DEG)
    }

    #[test]
    fn accepts_bearings_inside_the_arc() {
        assert!(within(360.0, 60.0));
        assert!(within(120.0, 60.0));
        assert!(within(340.0, 0.0));
        assert!(within(60.0, 0.0));

        assert!(within(50.0, 350.0));
        assert!(within(290.0, 350.0));

        assert!(within(60.0, 120.0));
        assert!(within(180.0, 120.0));

        assert!(within(70.0, 10.0));
        assert!(within(359.0, 10.0));
    }

    #[test]
    fn rejects_bearings_one_degree_outside() {
        assert!(!within(359.0, 60.0));
        assert!(!within(121.0, 60.0));
        assert!(!within(299.0, 0.0));
        assert!(!within(61.0, 0.0));

        assert!(!within(51.0, 350.0));
        assert!(!within(289.0, 350.0));

        assert!(!within(59.0, 120.0));
        assert!(!within(181.0, 120.0));

        assert!(!within(71.0, 10.0));
        assert!(!within(309.0, 10.0));
    }

    #[test]
    fn boundary_difference_equal_to_arc_is_inside() {
        assert!(is_within_arc(100.0, 40.0, 60.0));
        assert!(is_within_arc(40.0, 100.0, 60.0));
    }

    #[test]
    fn opposite_bearings_only_match_a_half_circle_arc() {
        // Folded difference of 180 stays 180.
        assert!(!is_within_arc(180.0, 0.0, 60.0));
        assert!(!is_within_arc(180.0, 0.0, 179.9));
        assert!(is_within_arc(180.0, 0.0, 180.0));
    }

    #[test]
    fn zero_arc_requires_exact_match() {
        assert!(is_within_arc(45.0, 45.0, 0.0));
        assert!(!is_within_arc(45.1, 45.0, 0.0));
    }
}
