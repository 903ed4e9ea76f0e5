use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use celltracecore::geodesy::Coordinate;
use celltracecore::prelude::{DailyCount, PipelineStep, StepInput, TowerCount};
use celltracecore::processing::{AddressDedupStep, AggregationStep, CorrelationStep, FilterStep};
use celltracecore::traffic::TrafficRecord;

pub struct AnalysisResult {
    /// Every input row, enriched in place.
    pub records: Vec<TrafficRecord>,
    /// The rows that survived the screening.
    pub matched: Vec<TrafficRecord>,
    pub daily_counts: Vec<DailyCount>,
    pub tower_counts: Vec<TowerCount>,
    pub merged_addresses: usize,
    /// Rows whose bearing fell inside the sector arc, before screening.
    pub in_range_count: usize,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(
        &self,
        records: Vec<TrafficRecord>,
        subscriber: Coordinate,
    ) -> anyhow::Result<AnalysisResult> {
        let step_config = self.config.to_step_config();

        let mut dedup_step = AddressDedupStep::new();
        dedup_step
            .initialize(&step_config)
            .context("initializing dedup step")?;
        let dedup_output = dedup_step
            .execute(StepInput {
                records,
                subscriber: Some(subscriber),
            })
            .context("executing dedup step")?;
        dedup_step.cleanup();
        let merged_addresses = dedup_output.metadata.merged_addresses.unwrap_or(0);

        let mut correlation_step = CorrelationStep::new();
        correlation_step
            .initialize(&step_config)
            .context("initializing correlation step")?;
        let correlation_output = correlation_step
            .execute(StepInput {
                records: dedup_output.records,
                subscriber: Some(subscriber),
            })
            .context("executing correlation step")?;
        correlation_step.cleanup();
        let enriched = correlation_output.records.clone();
        let in_range_count = correlation_output.metadata.matched_count.unwrap_or(0);

        let mut filter_step = FilterStep::new();
        filter_step
            .initialize(&step_config)
            .context("initializing filter step")?;
        let filter_output = filter_step
            .execute(StepInput {
                records: correlation_output.records,
                subscriber: Some(subscriber),
            })
            .context("executing filter step")?;
        filter_step.cleanup();

        let mut aggregation_step = AggregationStep::new();
        aggregation_step
            .initialize(&step_config)
            .context("initializing aggregation step")?;
        let aggregation_output = aggregation_step
            .execute(StepInput {
                records: filter_output.records,
                subscriber: Some(subscriber),
            })
            .context("executing aggregation step")?;
        aggregation_step.cleanup();

        let daily_counts = aggregation_output.metadata.daily_counts.unwrap_or_default();
        let tower_counts = aggregation_output.metadata.tower_counts.unwrap_or_default();

        Ok(AnalysisResult {
            records: enriched,
            matched: aggregation_output.records,
            daily_counts,
            tower_counts,
            merged_addresses,
            in_range_count,
        })
    }
}
