use crate::prelude::{
    DailyCount, PipelineStep, StepConfig, StepError, StepInput, StepMetadata, StepOutput,
    StepResult, TowerCount,
};
use crate::telemetry::log::LogManager;
use std::collections::BTreeMap;

/// Aggregation step partitioning the screened records by calendar day and
/// by tower address.
///
/// Day keys come out chronologically, tower keys lexically; both orderings
/// fall out of the BTreeMap grouping.
pub struct AggregationStep {
    config: Option<StepConfig>,
    logger: LogManager,
}

impl AggregationStep {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }
}

impl Default for AggregationStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AggregationStep {
    fn initialize(&mut self, config: &StepConfig) -> StepResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StepInput) -> StepResult<StepOutput> {
        if self.config.is_none() {
            return Err(StepError::Internal("step not initialized".into()));
        }

        let records = input.records;
        let mut daily: BTreeMap<chrono::NaiveDate, usize> = BTreeMap::new();
        let mut towers: BTreeMap<String, usize> = BTreeMap::new();
        for record in &records {
            *daily.entry(record.timestamp.date()).or_insert(0) += 1;
            *towers.entry(record.tower_address.clone()).or_insert(0) += 1;
        }

        let daily_counts: Vec<DailyCount> = daily
            .into_iter()
            .map(|(day, connections)| DailyCount { day, connections })
            .collect();
        let tower_counts: Vec<TowerCount> = towers
            .into_iter()
            .map(|(address, connections)| TowerCount {
                address,
                connections,
            })
            .collect();

        let busiest = tower_counts
            .iter()
            .map(|count| count.connections)
            .max()
            .unwrap_or(0);
        self.logger.record(&format!(
            "AggregationStep {} days, {} towers, busiest {}",
            daily_counts.len(),
            tower_counts.len(),
            busiest
        ));

        let metadata = StepMetadata {
            matched_count: Some(records.len()),
            daily_counts: Some(daily_counts),
            tower_counts: Some(tower_counts),
            notes: vec![format!("busiest tower carries {}", busiest)],
            ..Default::default()
        };

        Ok(StepOutput { records, metadata })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
