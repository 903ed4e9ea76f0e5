use anyhow::{bail, Context};
use celltracecore::traffic::TrafficRecord;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Header names of the columns the pipeline reads. Operator exports name
/// these differently, so they are configuration, not fixed positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub timestamp: String,
    pub tower_address: String,
    pub sector_azimuth: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            timestamp: "timestamp".to_string(),
            tower_address: "tower_address".to_string(),
            sector_azimuth: "azimuth".to_string(),
        }
    }
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%d.%m.%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

fn parse_timestamp(text: &str) -> anyhow::Result<NaiveDateTime> {
    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text.trim(), format) {
            return Ok(parsed);
        }
    }
    bail!("unrecognized timestamp {text:?}")
}

fn skip_lines(text: &str, skip: usize) -> String {
    if skip == 0 {
        return text.to_string();
    }
    text.lines().skip(skip).collect::<Vec<_>>().join("\n")
}

fn column_index(headers: &[String], name: &str) -> anyhow::Result<usize> {
    headers
        .iter()
        .position(|header| header.trim() == name)
        .with_context(|| format!("column {name:?} not found in header {headers:?}"))
}

fn cell(cells: &[String], index: usize) -> &str {
    cells.get(index).map(String::as_str).unwrap_or("")
}

/// In-memory traffic table: the parsed records plus everything needed to
/// write the original columns back out unchanged.
#[derive(Debug, Clone)]
pub struct TrafficTable {
    pub headers: Vec<String>,
    pub records: Vec<TrafficRecord>,
    raw_rows: Vec<Vec<String>>,
    address_idx: usize,
}

impl TrafficTable {
    /// Reads a traffic export. `skip_rows` drops the preamble lines
    /// spreadsheet exports tend to carry above the header row.
    pub fn read<P: AsRef<Path>>(
        path: P,
        columns: &ColumnMap,
        skip_rows: usize,
    ) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading traffic export {}", path_ref.display()))?;
        Self::from_csv_text(&contents, columns, skip_rows)
            .with_context(|| format!("parsing traffic export {}", path_ref.display()))
    }

    pub fn from_csv_text(
        text: &str,
        columns: &ColumnMap,
        skip_rows: usize,
    ) -> anyhow::Result<Self> {
        let body = skip_lines(text, skip_rows);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(body.as_bytes());
        let headers: Vec<String> = reader
            .headers()
            .context("reading header row")?
            .iter()
            .map(str::to_string)
            .collect();

        let timestamp_idx = column_index(&headers, &columns.timestamp)?;
        let address_idx = column_index(&headers, &columns.tower_address)?;
        let azimuth_idx = column_index(&headers, &columns.sector_azimuth)?;

        let mut records = Vec::new();
        let mut raw_rows = Vec::new();
        for (row_number, row) in reader.records().enumerate() {
            let row = row.with_context(|| format!("reading row {}", row_number + 1))?;
            let cells: Vec<String> = row.iter().map(str::to_string).collect();
            let timestamp = parse_timestamp(cell(&cells, timestamp_idx))
                .with_context(|| format!("row {}", row_number + 1))?;
            let sector_azimuth = cell(&cells, azimuth_idx)
                .trim()
                .parse::<f64>()
                .with_context(|| format!("row {}: bad sector azimuth", row_number + 1))?;
            records.push(TrafficRecord::new(
                timestamp,
                cell(&cells, address_idx).trim(),
                sector_azimuth,
            ));
            raw_rows.push(cells);
        }

        Ok(Self {
            headers,
            records,
            raw_rows,
            address_idx,
        })
    }

    /// Writes the original columns plus `lat`, `lon`, `distance_m`,
    /// `azimuth_deg`, `azimuth_in_range`. Rows whose enrichment did not
    /// run leave the new cells empty; canonicalized address spellings go
    /// back into their original column.
    pub fn write_enriched<P: AsRef<Path>>(
        &self,
        path: P,
        records: &[TrafficRecord],
    ) -> anyhow::Result<()> {
        if records.len() != self.raw_rows.len() {
            bail!(
                "enriched table has {} rows, export had {}",
                records.len(),
                self.raw_rows.len()
            );
        }

        let path_ref = path.as_ref();
        let mut writer = csv::Writer::from_path(path_ref)
            .with_context(|| format!("creating {}", path_ref.display()))?;

        let mut header = self.headers.clone();
        header.extend(
            ["lat", "lon", "distance_m", "azimuth_deg", "azimuth_in_range"]
                .map(str::to_string),
        );
        writer.write_record(&header)?;

        for (cells, record) in self.raw_rows.iter().zip(records) {
            let mut row = cells.clone();
            row[self.address_idx] = record.tower_address.clone();
            match record.tower_coord {
                Some(coord) => {
                    row.push(format!("{:.7}", coord.latitude));
                    row.push(format!("{:.7}", coord.longitude));
                }
                None => {
                    row.push(String::new());
                    row.push(String::new());
                }
            }
            row.push(
                record
                    .distance_m
                    .map(|meters| format!("{meters:.2}"))
                    .unwrap_or_default(),
            );
            row.push(
                record
                    .azimuth_deg
                    .map(|degrees| format!("{degrees:.2}"))
                    .unwrap_or_default(),
            );
            row.push(
                record
                    .azimuth_in_range
                    .map(|matched| matched.to_string())
                    .unwrap_or_default(),
            );
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }
}
