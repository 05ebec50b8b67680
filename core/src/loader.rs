//! CSV ingestion for the trip and patron sources.
//!
//! Validates required columns on both sources before reading any rows,
//! then coerces TRIPS / COIN_IN to numbers. A value that does not parse,
//! or a cell absent from a short row, becomes missing; the row itself is kept.

use crate::{
    error::{PromoError, PromoResult},
    types::{PatronId, PropertyId},
};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

pub const TRIP_FILE: &str = "TRIP_FILE.csv";
pub const PATRON_FILE: &str = "PATRON_DATABASE.csv";

pub const PATRON_ID_COL: &str = "PATRON_ID";
pub const PROPERTY_COL: &str = "PROP_NUM";
pub const TRIPS_COL: &str = "TRIPS";
pub const COIN_IN_COL: &str = "COIN_IN";

pub const REQUIRED_TRIP_COLUMNS: [&str; 4] = [PATRON_ID_COL, PROPERTY_COL, TRIPS_COL, COIN_IN_COL];
pub const REQUIRED_PATRON_COLUMNS: [&str; 2] = [PATRON_ID_COL, PROPERTY_COL];

#[derive(Debug, Clone, PartialEq)]
pub struct TripRow {
    pub patron_id:   PatronId,
    pub property_id: PropertyId,
    pub trips:       Option<f64>,
    pub coin_in:     Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatronRow {
    pub patron_id:   PatronId,
    pub property_id: PropertyId,
    /// Descriptive columns carried along for display. Unused by the core.
    pub attributes:  BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct RawSources {
    pub trips:   Vec<TripRow>,
    pub patrons: Vec<PatronRow>,
    /// Number of TRIPS / COIN_IN cells that failed numeric coercion.
    pub coerced_cells: usize,
}

/// Parse a numeric cell. Blank, non-numeric and non-finite values are missing.
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn column_index(headers: &csv::StringRecord) -> BTreeMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_string(), i))
        .collect()
}

fn missing_columns(index: &BTreeMap<String, usize>, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|c| !index.contains_key(**c))
        .map(|c| c.to_string())
        .collect()
}

/// Read both sources. Column validation covers both files before any
/// row is parsed, so a caller sees every missing column at once.
pub fn read_sources<T: Read, P: Read>(trip: T, patron: P) -> PromoResult<RawSources> {
    let mut trip_csv = csv_reader(trip);
    let mut patron_csv = csv_reader(patron);

    let trip_headers = trip_csv.headers()?.clone();
    let patron_headers = patron_csv.headers()?.clone();
    let trip_index = column_index(&trip_headers);
    let patron_index = column_index(&patron_headers);

    let missing_trip = missing_columns(&trip_index, &REQUIRED_TRIP_COLUMNS);
    let missing_patron = missing_columns(&patron_index, &REQUIRED_PATRON_COLUMNS);
    if !missing_trip.is_empty() || !missing_patron.is_empty() {
        return Err(PromoError::MissingColumns {
            trip: missing_trip,
            patron: missing_patron,
        });
    }

    let mut out = RawSources::default();

    let (t_pid, t_prop, t_trips, t_coin) = (
        trip_index[PATRON_ID_COL],
        trip_index[PROPERTY_COL],
        trip_index[TRIPS_COL],
        trip_index[COIN_IN_COL],
    );
    for result in trip_csv.records() {
        let record = result?;
        let cell = |i: usize| record.get(i).unwrap_or("");

        let trips = coerce_numeric(cell(t_trips));
        let coin_in = coerce_numeric(cell(t_coin));
        if trips.is_none() && !cell(t_trips).is_empty() {
            out.coerced_cells += 1;
        }
        if coin_in.is_none() && !cell(t_coin).is_empty() {
            out.coerced_cells += 1;
        }

        out.trips.push(TripRow {
            patron_id: cell(t_pid).to_string(),
            property_id: cell(t_prop).to_string(),
            trips,
            coin_in,
        });
    }

    let (p_pid, p_prop) = (patron_index[PATRON_ID_COL], patron_index[PROPERTY_COL]);
    for result in patron_csv.records() {
        let record = result?;
        let attributes = patron_headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != p_pid && *i != p_prop)
            .map(|(i, h)| (h.to_string(), record.get(i).unwrap_or("").to_string()))
            .collect();

        out.patrons.push(PatronRow {
            patron_id: record.get(p_pid).unwrap_or("").to_string(),
            property_id: record.get(p_prop).unwrap_or("").to_string(),
            attributes,
        });
    }

    if out.trips.is_empty() {
        return Err(PromoError::EmptySource { source_name: TRIP_FILE.into() });
    }
    if out.patrons.is_empty() {
        return Err(PromoError::EmptySource { source_name: PATRON_FILE.into() });
    }

    if out.coerced_cells > 0 {
        log::warn!(
            "loader: {} non-numeric {TRIPS_COL}/{COIN_IN_COL} cells coerced to missing",
            out.coerced_cells
        );
    }
    log::info!(
        "loader: read {} trip rows, {} patron rows",
        out.trips.len(),
        out.patrons.len()
    );

    Ok(out)
}

/// Read TRIP_FILE.csv and PATRON_DATABASE.csv from a directory.
pub fn read_sources_from_dir(dir: impl AsRef<Path>) -> PromoResult<RawSources> {
    let dir = dir.as_ref();
    let trip = std::fs::File::open(dir.join(TRIP_FILE))?;
    let patron = std::fs::File::open(dir.join(PATRON_FILE))?;
    read_sources(trip, patron)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_numeric_handles_junk() {
        assert_eq!(coerce_numeric("12"), Some(12.0));
        assert_eq!(coerce_numeric(" 3.5 "), Some(3.5));
        assert_eq!(coerce_numeric(""), None);
        assert_eq!(coerce_numeric("n/a"), None);
        assert_eq!(coerce_numeric("1,000"), None);
        assert_eq!(coerce_numeric("inf"), None);
        assert_eq!(coerce_numeric("NaN"), None);
    }

    #[test]
    fn missing_columns_reported_for_both_sources() {
        let trip = "PATRON_ID,PROP_NUM,TRIPS\n1,A,3\n";
        let patron = "PATRON_ID,NAME\n1,Ann\n";

        let err = read_sources(trip.as_bytes(), patron.as_bytes()).unwrap_err();
        match err {
            PromoError::MissingColumns { trip, patron } => {
                assert_eq!(trip, vec!["COIN_IN".to_string()]);
                assert_eq!(patron, vec!["PROP_NUM".to_string()]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn patron_attributes_kept() {
        let trip = "PATRON_ID,PROP_NUM,TRIPS,COIN_IN\n1,A,3,100\n";
        let patron = "PATRON_ID,PROP_NUM,CLUB_LEVEL\n1,A,Gold\n";

        let raw = read_sources(trip.as_bytes(), patron.as_bytes()).unwrap();
        assert_eq!(raw.patrons[0].attributes.get("CLUB_LEVEL").map(String::as_str), Some("Gold"));
    }
}
