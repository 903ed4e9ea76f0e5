use celltracecore::geodesy::{normalize_degrees, Coordinate};
use celltracecore::traffic::TrafficRecord;
use chrono::{Duration, NaiveDate};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for the synthetic traffic dataset offline runs use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub records: usize,
    pub towers: usize,
    pub days: u32,
    pub seed: u64,
    pub center_latitude: f64,
    pub center_longitude: f64,
    /// Farthest a synthetic tower lands from the subscriber, meters.
    pub tower_spread_m: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            records: 240,
            towers: 6,
            days: 7,
            seed: 0,
            center_latitude: 50.4686032,
            center_longitude: 30.6030372,
            tower_spread_m: 1200.0,
        }
    }
}

/// Builds a deterministic synthetic dataset: a ring of towers around the
/// subscriber, sectors roughly facing back at it, connections spread
/// across days and hours. Tower coordinates come pre-resolved so offline
/// runs never need a geocoder.
pub fn build_sample_dataset(
    config: &SampleConfig,
) -> anyhow::Result<(Coordinate, Vec<TrafficRecord>)> {
    let subscriber = Coordinate::new(config.center_latitude, config.center_longitude);
    subscriber.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);

    let towers: Vec<(String, Coordinate, f64)> = (0..config.towers.max(1))
        .map(|index| {
            let bearing = rng.gen_range(0.0..360.0);
            let distance = rng.gen_range(200.0..config.tower_spread_m.max(300.0));
            let coord = subscriber.destination(bearing, distance);
            // The sector nominally faces back toward the subscriber,
            // wobbled so some records fall outside the arc.
            let facing = normalize_degrees(bearing + 180.0 + rng.gen_range(-90.0..90.0));
            (format!("Sample site {}", index + 1), coord, facing)
        })
        .collect();

    let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default();
    let mut records = Vec::with_capacity(config.records);
    for _ in 0..config.records {
        let (address, coord, facing) = &towers[rng.gen_range(0..towers.len())];
        let day = rng.gen_range(0..config.days.max(1)) as i64;
        let hour = rng.gen_range(0u32..24);
        let minute = rng.gen_range(0u32..60);
        let timestamp = (base + Duration::days(day))
            .and_hms_opt(hour, minute, 0)
            .unwrap_or_default();

        let mut record = TrafficRecord::new(timestamp, address.clone(), *facing);
        record.tower_coord = Some(*coord);
        records.push(record);
    }

    Ok((subscriber, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_deterministic_per_seed() {
        let config = SampleConfig::default();
        let (_, first) = build_sample_dataset(&config).unwrap();
        let (_, second) = build_sample_dataset(&config).unwrap();
        assert_eq!(first.len(), config.records);
        assert_eq!(first[0].tower_address, second[0].tower_address);
        assert_eq!(first[0].timestamp, second[0].timestamp);
    }

    #[test]
    fn every_record_carries_a_resolved_tower() {
        let config = SampleConfig {
            records: 32,
            towers: 3,
            ..Default::default()
        };
        let (subscriber, records) = build_sample_dataset(&config).unwrap();
        for record in &records {
            let coord = record.tower_coord.unwrap();
            let distance = subscriber.distance_m(&coord).unwrap();
            // Placement is spherical, measurement geodesic; allow the
            // sub-percent disagreement between the two models.
            assert!(distance < config.tower_spread_m * 1.01);
            assert!((0.0..360.0).contains(&record.sector_azimuth_deg));
        }
    }
}
