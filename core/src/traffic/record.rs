use crate::geodesy::Coordinate;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row of call/connection data.
///
/// Read from a tabular export, then enriched with the resolved tower
/// coordinate and the computed distance/azimuth/match fields. A `None`
/// anywhere past the recorded columns means that enrichment step could
/// not run for this row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficRecord {
    pub timestamp: NaiveDateTime,
    /// Serving base station as the operator exported it.
    pub tower_address: String,
    /// Sector azimuth recorded for the connection, degrees.
    pub sector_azimuth_deg: f64,
    pub tower_coord: Option<Coordinate>,
    pub distance_m: Option<f64>,
    pub azimuth_deg: Option<f64>,
    pub azimuth_in_range: Option<bool>,
}

impl TrafficRecord {
    pub fn new(
        timestamp: NaiveDateTime,
        tower_address: impl Into<String>,
        sector_azimuth_deg: f64,
    ) -> Self {
        Self {
            timestamp,
            tower_address: tower_address.into(),
            sector_azimuth_deg,
            tower_coord: None,
            distance_m: None,
            azimuth_deg: None,
            azimuth_in_range: None,
        }
    }
}
