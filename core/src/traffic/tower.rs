use crate::geodesy::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One base station row from the tower-catalog service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tower {
    pub cell_id: u64,
    pub coord: Coordinate,
    /// Location area code.
    pub area_code: u32,
    pub mcc: u16,
    pub mnc: u16,
    pub radio: String,
}

impl Tower {
    /// Column header matching the `Display` row layout.
    pub fn table_header() -> String {
        format!(
            "{:^10}|{:^10}, {:^10}|{:^7}|{:^5}|{:^4}| radio",
            "cellid", "lat", "lon", "lac", "mcc", "mnc"
        )
    }
}

impl fmt::Display for Tower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:9} | {:8.6}, {:8.6} | {:5} | {:3} | {} | {}",
            self.cell_id,
            self.coord.latitude,
            self.coord.longitude,
            self.area_code,
            self.mcc,
            self.mnc,
            self.radio
        )
    }
}
