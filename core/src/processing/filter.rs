use crate::prelude::{
    PipelineStep, StepConfig, StepError, StepInput, StepMetadata, StepOutput, StepResult,
};
use crate::telemetry::log::LogManager;
use chrono::Timelike;

/// Screening step retaining the plausible connections: sector match flag
/// set, distance under the threshold, hour-of-day inside the window.
///
/// Rows without computed fields (unresolved towers, failed rows) never
/// pass. A window with `hour_start > hour_end` wraps midnight; equal
/// bounds select nothing.
pub struct FilterStep {
    config: Option<StepConfig>,
    logger: LogManager,
}

impl FilterStep {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }
}

impl Default for FilterStep {
    fn default() -> Self {
        Self::new()
    }
}

fn hour_in_window(hour: u32, start: u32, end: u32) -> bool {
    if start <= end {
        hour >= start && hour < end
    } else {
        hour >= start || hour < end
    }
}

impl PipelineStep for FilterStep {
    fn initialize(&mut self, config: &StepConfig) -> StepResult<()> {
        if config.max_distance_m <= 0.0 {
            return Err(StepError::InvalidInput(format!(
                "distance threshold must be positive, got {}",
                config.max_distance_m
            )));
        }
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StepInput) -> StepResult<StepOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StepError::Internal("step not initialized".into()))?;

        let total = input.records.len();
        let records: Vec<_> = input
            .records
            .into_iter()
            .filter(|record| {
                record.azimuth_in_range == Some(true)
                    && record
                        .distance_m
                        .map(|d| d < config.max_distance_m)
                        .unwrap_or(false)
                    && hour_in_window(
                        record.timestamp.hour(),
                        config.hour_start,
                        config.hour_end,
                    )
            })
            .collect();

        self.logger.record(&format!(
            "FilterStep retained {} of {}",
            records.len(),
            total
        ));

        let metadata = StepMetadata {
            matched_count: Some(records.len()),
            notes: vec![format!("screened out {}", total - records.len())],
            ..Default::default()
        };

        Ok(StepOutput { records, metadata })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
