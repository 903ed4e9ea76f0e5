use crate::prelude::{
    PipelineStep, StepConfig, StepError, StepInput, StepMetadata, StepOutput, StepResult,
};
use crate::telemetry::log::LogManager;
use std::collections::HashMap;
use strsim::levenshtein;

/// Heuristic merge of near-duplicate tower address strings.
///
/// Operators export the same site under slightly different spellings.
/// When two distinct strings resolved to the same coordinate and their
/// edit distance is under the configured cap, rows carrying the later
/// spelling are rewritten to the first-seen label so grouping keys line
/// up. This is a heuristic, not a guarantee: short strings can merge
/// falsely, which is why the cap stays small.
pub struct AddressDedupStep {
    config: Option<StepConfig>,
    logger: LogManager,
}

impl AddressDedupStep {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }
}

impl Default for AddressDedupStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AddressDedupStep {
    fn initialize(&mut self, config: &StepConfig) -> StepResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StepInput) -> StepResult<StepOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StepError::Internal("step not initialized".into()))?;

        let mut records = input.records;
        let mut canonical: HashMap<(u64, u64), String> = HashMap::new();
        let mut renames: HashMap<String, String> = HashMap::new();

        for record in &records {
            let Some(coord) = record.tower_coord else {
                continue;
            };
            // Exact bit pattern is the right key here: every row of one
            // address carries the coordinate from the same resolver
            // response.
            let key = (coord.latitude.to_bits(), coord.longitude.to_bits());
            if let Some(existing) = canonical.get(&key) {
                if *existing != record.tower_address {
                    let distance = levenshtein(existing, &record.tower_address);
                    if distance > 0 && distance < config.dedup_max_edit_distance {
                        renames.insert(record.tower_address.clone(), existing.clone());
                    }
                }
            } else {
                canonical.insert(key, record.tower_address.clone());
            }
        }

        for (from, to) in &renames {
            self.logger
                .record(&format!("merged address {:?} into {:?}", from, to));
        }
        for record in records.iter_mut() {
            if let Some(label) = renames.get(&record.tower_address) {
                record.tower_address = label.clone();
            }
        }

        let metadata = StepMetadata {
            merged_addresses: Some(renames.len()),
            ..Default::default()
        };

        Ok(StepOutput { records, metadata })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
