use crate::geodesy::Coordinate;
use crate::traffic::TrafficRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Shared configuration for each correlation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Half-width of a sector antenna's tolerance arc, degrees.
    pub sector_arc_deg: f64,
    /// Records farther than this from the subscriber are screened out.
    pub max_distance_m: f64,
    /// Hour-of-day window `[hour_start, hour_end)`; may wrap midnight.
    pub hour_start: u32,
    pub hour_end: u32,
    /// Address strings closer than this edit distance merge during dedup.
    pub dedup_max_edit_distance: usize,
}

/// Input payload for a correlation step.
#[derive(Debug, Clone)]
pub struct StepInput {
    pub records: Vec<TrafficRecord>,
    /// Resolved location of the subscriber's address, when the step needs it.
    pub subscriber: Option<Coordinate>,
}

/// Output produced by each step.
#[derive(Debug, Clone)]
pub struct StepOutput {
    pub records: Vec<TrafficRecord>,
    pub metadata: StepMetadata,
}

/// Connection count for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub connections: usize,
}

/// Connection count for one tower address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerCount {
    pub address: String,
    pub connections: usize,
}

/// Metadata used for chaining steps and reporting.
#[derive(Debug, Clone, Default)]
pub struct StepMetadata {
    pub matched_count: Option<usize>,
    pub merged_addresses: Option<usize>,
    pub daily_counts: Option<Vec<DailyCount>>,
    pub tower_counts: Option<Vec<TowerCount>>,
    pub notes: Vec<String>,
}

/// Common error type for step execution.
#[derive(thiserror::Error, Debug)]
pub enum StepError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("malformed coordinate: {0}")]
    MalformedCoordinate(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StepResult<T> = Result<T, StepError>;

/// Trait describing the record-table correlation steps.
pub trait PipelineStep {
    fn initialize(&mut self, config: &StepConfig) -> StepResult<()>;
    fn execute(&mut self, input: StepInput) -> StepResult<StepOutput>;
    fn cleanup(&mut self);
}
