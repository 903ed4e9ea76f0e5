use anyhow::Context;
use celltracecore::geodesy::{BoundingBox, Coordinate};
use celltracecore::traffic::Tower;
use serde::Deserialize;

const GET_IN_AREA_URL: &str = "https://opencellid.org/cell/getInArea";

/// Client for the external cell-tower database, keyed by an API
/// credential. Queries are area lookups over a bounding box.
pub struct OpenCellIdClient {
    client: reqwest::blocking::Client,
    key: String,
}

#[derive(Debug, Deserialize)]
struct CellsResponse {
    count: usize,
    #[serde(default)]
    cells: Vec<WireCell>,
}

#[derive(Debug, Deserialize)]
struct WireCell {
    cellid: u64,
    lat: f64,
    lon: f64,
    lac: u32,
    mcc: u16,
    mnc: u16,
    radio: String,
}

impl OpenCellIdClient {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            key: key.into(),
        }
    }

    /// Towers known inside the bounding box.
    pub fn query_towers(&self, bbox: &BoundingBox) -> anyhow::Result<Vec<Tower>> {
        let bbox_param = bbox.to_query();
        let body = self
            .client
            .get(GET_IN_AREA_URL)
            .query(&[
                ("key", self.key.as_str()),
                ("BBOX", bbox_param.as_str()),
                ("format", "json"),
            ])
            .send()
            .context("calling tower catalog")?
            .text()
            .context("reading tower catalog response")?;
        towers_from_response(&body)
    }
}

fn towers_from_response(body: &str) -> anyhow::Result<Vec<Tower>> {
    let response: CellsResponse =
        serde_json::from_str(body).context("decoding tower catalog response")?;
    log::info!("{} stations found", response.count);
    Ok(response
        .cells
        .into_iter()
        .map(|cell| Tower {
            cell_id: cell.cellid,
            coord: Coordinate::new(cell.lat, cell.lon),
            area_code: cell.lac,
            mcc: cell.mcc,
            mnc: cell.mnc,
            radio: cell.radio,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_cells_map_to_towers() {
        let body = r#"{
            "count": 2,
            "cells": [
                {"cellid": 21771782, "lat": 50.465088, "lon": 30.616821,
                 "lac": 32011, "mcc": 255, "mnc": 1, "radio": "GSM"},
                {"cellid": 190434323, "lat": 50.467202, "lon": 30.612925,
                 "lac": 12105, "mcc": 255, "mnc": 3, "radio": "LTE"}
            ]
        }"#;
        let towers = towers_from_response(body).unwrap();
        assert_eq!(towers.len(), 2);
        assert_eq!(towers[0].cell_id, 21771782);
        assert_eq!(towers[1].radio, "LTE");
        assert!((towers[1].coord.longitude - 30.612925).abs() < 1e-9);
    }

    #[test]
    fn error_body_fails_to_decode() {
        assert!(towers_from_response(r#"{"error": "bad key"}"#).is_err());
    }

    #[test]
    fn bbox_query_uses_min_then_max_corners() {
        let center = Coordinate::new(50.466091, 30.614973);
        let bbox = BoundingBox::from_center_area(center, 0.1).unwrap();
        let query = bbox.to_query();
        let parts: Vec<&str> = query.split(',').collect();
        assert_eq!(parts.len(), 4);
        assert!(parts[0].parse::<f64>().unwrap() < parts[2].parse::<f64>().unwrap());
    }
}
