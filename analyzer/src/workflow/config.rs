use crate::ingest::ColumnMap;
use anyhow::Context;
use celltracecore::geodesy::DEFAULT_SECTOR_ARC_DEG;
use celltracecore::prelude::StepConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Workflow parameters, either loaded from YAML or assembled from CLI
/// flags. The defaults mirror the worked example: night-hour window,
/// 1500 m screening radius, 120 degree sectors.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub subscriber_address: Option<String>,
    /// `lat,lon`; takes precedence over the address when both are set.
    pub subscriber_position: Option<String>,
    pub columns: ColumnMap,
    /// Preamble lines above the header row of the export.
    pub skip_rows: usize,
    pub max_distance_m: f64,
    pub hour_start: u32,
    pub hour_end: u32,
    pub sector_arc_deg: f64,
    pub dedup_max_edit_distance: usize,
    pub map_zoom: u32,
    pub wedge_radius_m: f64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            subscriber_address: None,
            subscriber_position: None,
            columns: ColumnMap::default(),
            skip_rows: 0,
            max_distance_m: 1500.0,
            hour_start: 0,
            hour_end: 6,
            sector_arc_deg: DEFAULT_SECTOR_ARC_DEG,
            dedup_max_edit_distance: 3,
            map_zoom: 12,
            wedge_radius_m: 1000.0,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn to_step_config(&self) -> StepConfig {
        StepConfig {
            sector_arc_deg: self.sector_arc_deg,
            max_distance_m: self.max_distance_m,
            hour_start: self.hour_start,
            hour_end: self.hour_end,
            dedup_max_edit_distance: self.dedup_max_edit_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_produce_the_example_step_config() {
        let config = WorkflowConfig::default();
        let step = config.to_step_config();
        assert_eq!(step.max_distance_m, 1500.0);
        assert_eq!(step.hour_end, 6);
        assert_eq!(step.sector_arc_deg, 60.0);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"max_distance_m: 1000\nhour_start: 22\nhour_end: 6\ncolumns:\n  tower_address: \"Site\"\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let config = WorkflowConfig::load(&path).unwrap();
        assert_eq!(config.max_distance_m, 1000.0);
        assert_eq!(config.hour_start, 22);
        assert_eq!(config.columns.tower_address, "Site");
        // Unset keys keep their defaults.
        assert_eq!(config.columns.timestamp, "timestamp");
        assert_eq!(config.wedge_radius_m, 1000.0);
    }

    #[test]
    fn load_rejects_missing_file() {
        assert!(WorkflowConfig::load("no/such/workflow.yaml").is_err());
    }
}
