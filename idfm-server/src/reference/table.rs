//! Row types and CSV parsing for the bulk reference exports.
//!
//! Both exports are semicolon-separated with a header row. Columns are
//! located by name, never by position, because the portal reorders them
//! from time to time.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};

use crate::domain::LineId;

use super::error::ReferenceError;

/// One row of the line reference table (`referentiel-des-lignes`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineReference {
    pub id: LineId,
    /// Raw `TransportMode` value (`metro`, `bus`, `rail`, `tram`, ...).
    pub transport_mode: String,
    pub short_name: String,
    pub operator: String,
}

/// One row of the stop/line association table (`arrets-lignes`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopReference {
    /// Raw prefixed id, e.g. `IDFM:monomodalStopPlace:43238`.
    pub stop_id: String,
    pub stop_name: String,
    /// Owning line, with the `IDFM:` prefix removed.
    pub line_id: LineId,
}

/// Parse the line reference export.
pub fn parse_lines(reader: impl Read) -> Result<Vec<LineReference>, ReferenceError> {
    const DATASET: &str = "lines";

    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();
    let idx_id = column(&headers, DATASET, "ID_Line")?;
    let idx_mode = column(&headers, DATASET, "TransportMode")?;
    let idx_name = column(&headers, DATASET, "ShortName_Line")?;
    let idx_operator = column(&headers, DATASET, "OperatorName")?;

    let mut lines = Vec::new();
    for result in rdr.records() {
        let record = result?;
        lines.push(LineReference {
            id: LineId::new(field(&record, idx_id)),
            transport_mode: field(&record, idx_mode).to_string(),
            short_name: field(&record, idx_name).to_string(),
            operator: field(&record, idx_operator).to_string(),
        });
    }
    Ok(lines)
}

/// Parse the stop/line association export.
pub fn parse_stops(reader: impl Read) -> Result<Vec<StopReference>, ReferenceError> {
    const DATASET: &str = "stops";

    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();
    let idx_id = column(&headers, DATASET, "stop_id")?;
    let idx_name = column(&headers, DATASET, "stop_name")?;
    let idx_route = column(&headers, DATASET, "route_id")?;

    let mut stops = Vec::new();
    for result in rdr.records() {
        let record = result?;
        stops.push(StopReference {
            stop_id: field(&record, idx_id).to_string(),
            stop_name: field(&record, idx_name).to_string(),
            line_id: LineId::from_route_id(field(&record, idx_route)),
        });
    }
    Ok(stops)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(reader)
}

/// Find a named column. The first header may carry a UTF-8 BOM.
fn column(
    headers: &StringRecord,
    dataset: &'static str,
    name: &'static str,
) -> Result<usize, ReferenceError> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == name)
        .ok_or(ReferenceError::MissingColumn {
            dataset,
            column: name,
        })
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}
