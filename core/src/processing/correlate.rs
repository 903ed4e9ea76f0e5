use crate::geodesy::{azimuth, is_within_arc, normalize_degrees};
use crate::prelude::{
    PipelineStep, StepConfig, StepError, StepInput, StepMetadata, StepOutput, StepResult,
};
use crate::telemetry::log::LogManager;

/// Correlation step computing the distance, the tower-to-subscriber
/// bearing, and the sector match flag for every row with a resolved
/// tower coordinate.
///
/// A row whose coordinate fails validation is flagged and skipped; the
/// rest of the batch still goes through.
pub struct CorrelationStep {
    config: Option<StepConfig>,
    logger: LogManager,
}

impl CorrelationStep {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }
}

impl Default for CorrelationStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for CorrelationStep {
    fn initialize(&mut self, config: &StepConfig) -> StepResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StepInput) -> StepResult<StepOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StepError::Internal("step not initialized".into()))?;
        let subscriber = input
            .subscriber
            .ok_or_else(|| StepError::InvalidInput("no subscriber coordinate".into()))?;
        subscriber
            .validate()
            .map_err(|err| StepError::MalformedCoordinate(err.to_string()))?;

        let mut records = input.records;
        let mut matched = 0usize;
        let mut failed_rows = 0usize;

        for record in records.iter_mut() {
            let Some(tower) = record.tower_coord else {
                continue;
            };
            match (subscriber.distance_m(&tower), azimuth(&tower, &subscriber)) {
                (Ok(distance), Ok(bearing)) => {
                    // The recorded sector azimuth comes straight from the
                    // export; normalize before the arc comparison.
                    let sector = normalize_degrees(record.sector_azimuth_deg);
                    let in_range = is_within_arc(bearing, sector, config.sector_arc_deg);
                    record.distance_m = Some(distance);
                    record.azimuth_deg = Some(bearing);
                    record.azimuth_in_range = Some(in_range);
                    if in_range {
                        matched += 1;
                    }
                }
                (Err(err), _) | (_, Err(err)) => {
                    failed_rows += 1;
                    self.logger.flag(&format!(
                        "row at {} skipped: {}",
                        record.timestamp, err
                    ));
                }
            }
        }

        self.logger
            .record(&format!("CorrelationStep matched {}", matched));

        let metadata = StepMetadata {
            matched_count: Some(matched),
            notes: vec![format!("failed rows {}", failed_rows)],
            ..Default::default()
        };

        Ok(StepOutput { records, metadata })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::Coordinate;
    use crate::traffic::TrafficRecord;
    use chrono::NaiveDate;

    fn config() -> StepConfig {
        StepConfig {
            sector_arc_deg: 60.0,
            max_distance_m: 1500.0,
            hour_start: 0,
            hour_end: 6,
            dedup_max_edit_distance: 3,
        }
    }

    fn record(sector_azimuth: f64, tower: Option<Coordinate>) -> TrafficRecord {
        let timestamp = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(1, 28, 4)
            .unwrap();
        let mut record = TrafficRecord::new(timestamp, "tower", sector_azimuth);
        record.tower_coord = tower;
        record
    }

    #[test]
    fn correlation_computes_triple_for_resolved_rows() {
        let subscriber = Coordinate::new(50.4686032, 30.6030372);
        let tower = Coordinate::new(50.4662097, 30.6152663);

        let mut step = CorrelationStep::new();
        step.initialize(&config()).unwrap();
        let output = step
            .execute(StepInput {
                records: vec![record(290.0, Some(tower)), record(100.0, Some(tower))],
                subscriber: Some(subscriber),
            })
            .unwrap();
        step.cleanup();

        let first = &output.records[0];
        let distance = first.distance_m.unwrap();
        assert!(distance > 850.0 && distance < 950.0, "got {distance}");
        let bearing = first.azimuth_deg.unwrap();
        assert!(bearing > 285.0 && bearing < 290.0, "got {bearing}");
        assert_eq!(first.azimuth_in_range, Some(true));

        // Same geometry, sector pointing the other way.
        assert_eq!(output.records[1].azimuth_in_range, Some(false));
        assert_eq!(output.metadata.matched_count, Some(1));
    }

    #[test]
    fn unresolved_rows_pass_through_untouched() {
        let subscriber = Coordinate::new(50.4686032, 30.6030372);
        let mut step = CorrelationStep::new();
        step.initialize(&config()).unwrap();
        let output = step
            .execute(StepInput {
                records: vec![record(290.0, None)],
                subscriber: Some(subscriber),
            })
            .unwrap();

        assert!(output.records[0].distance_m.is_none());
        assert!(output.records[0].azimuth_in_range.is_none());
        assert_eq!(output.metadata.matched_count, Some(0));
    }

    #[test]
    fn malformed_tower_coordinate_fails_that_row_only() {
        let subscriber = Coordinate::new(50.4686032, 30.6030372);
        let good_tower = Coordinate::new(50.4662097, 30.6152663);
        let bad_tower = Coordinate::new(95.0, 30.0);

        let mut step = CorrelationStep::new();
        step.initialize(&config()).unwrap();
        let output = step
            .execute(StepInput {
                records: vec![record(290.0, Some(bad_tower)), record(290.0, Some(good_tower))],
                subscriber: Some(subscriber),
            })
            .unwrap();

        assert!(output.records[0].distance_m.is_none());
        assert!(output.records[1].distance_m.is_some());
        assert_eq!(output.metadata.notes[0], "failed rows 1");
    }

    #[test]
    fn missing_subscriber_is_an_input_error() {
        let mut step = CorrelationStep::new();
        step.initialize(&config()).unwrap();
        let result = step.execute(StepInput {
            records: vec![],
            subscriber: None,
        });
        assert!(matches!(result, Err(StepError::InvalidInput(_))));
    }
}
