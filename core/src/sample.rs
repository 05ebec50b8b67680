//! Synthetic trip/patron sources for demos and tests.
//!
//! Trip counts and COIN_IN are heavy-tailed, as casino play is. A share
//! of trip rows have no patron row (dropped by the join) and a share of
//! cells are blank (coerced to missing).

use crate::{
    error::PromoResult,
    loader::{
        PatronRow, RawSources, TripRow, COIN_IN_COL, PATRON_FILE, PATRON_ID_COL, PROPERTY_COL,
        TRIPS_COL, TRIP_FILE,
    },
    rng::SampleRng,
    types::PatronRecord,
};
use std::collections::BTreeMap;
use std::path::Path;

const PROPERTIES: [&str; 3] = ["101", "205", "310"];
const CLUB_LEVELS: [&str; 3] = ["Core", "Gold", "Platinum"];

#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub patrons:       usize,
    /// Share of trip rows with no matching patron row.
    pub orphan_share:  f64,
    /// Share of TRIPS / COIN_IN cells left blank.
    pub blank_share:   f64,
}

impl SampleSpec {
    pub fn new(patrons: usize) -> Self {
        Self {
            patrons,
            orphan_share: 0.05,
            blank_share:  0.01,
        }
    }
}

pub fn generate(seed: u64, spec: &SampleSpec) -> RawSources {
    let mut rng = SampleRng::new(seed);
    let mut raw = RawSources::default();

    for i in 0..spec.patrons {
        let patron_id = format!("P{:06}", i + 1);
        let property_id =
            PROPERTIES[rng.next_u64_below(PROPERTIES.len() as u64) as usize].to_string();

        let trips = rng.pareto(1.0, 1.1).floor().min(90.0);
        let coin_in = (rng.pareto(150.0, 1.2) * 100.0).round() / 100.0;

        let trips = if rng.chance(spec.blank_share) { None } else { Some(trips) };
        let coin_in = if rng.chance(spec.blank_share) { None } else { Some(coin_in) };

        raw.trips.push(TripRow {
            patron_id: patron_id.clone(),
            property_id: property_id.clone(),
            trips,
            coin_in,
        });

        if !rng.chance(spec.orphan_share) {
            let level = CLUB_LEVELS[rng.next_u64_below(CLUB_LEVELS.len() as u64) as usize];
            let mut attributes = BTreeMap::new();
            attributes.insert("CLUB_LEVEL".to_string(), level.to_string());
            raw.patrons.push(PatronRow { patron_id, property_id, attributes });
        }
    }

    raw
}

/// Unclassified records straight from the trip rows, skipping the join.
pub fn generate_records(seed: u64, patrons: usize) -> Vec<PatronRecord> {
    generate(seed, &SampleSpec::new(patrons))
        .trips
        .into_iter()
        .map(|t| PatronRecord::new(t.patron_id, t.property_id, t.trips, t.coin_in))
        .collect()
}

/// Write TRIP_FILE.csv and PATRON_DATABASE.csv into `dir`.
pub fn write_csv(raw: &RawSources, dir: impl AsRef<Path>) -> PromoResult<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let fmt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();

    let mut trip = csv::Writer::from_path(dir.join(TRIP_FILE))?;
    trip.write_record([PATRON_ID_COL, PROPERTY_COL, TRIPS_COL, COIN_IN_COL])?;
    for row in &raw.trips {
        let trips = fmt(row.trips);
        let coin_in = fmt(row.coin_in);
        trip.write_record([
            row.patron_id.as_str(),
            row.property_id.as_str(),
            trips.as_str(),
            coin_in.as_str(),
        ])?;
    }
    trip.flush()?;

    let mut patron = csv::Writer::from_path(dir.join(PATRON_FILE))?;
    patron.write_record([PATRON_ID_COL, PROPERTY_COL, "CLUB_LEVEL"])?;
    for row in &raw.patrons {
        let level = row.attributes.get("CLUB_LEVEL").map(String::as_str).unwrap_or("");
        patron.write_record([row.patron_id.as_str(), row.property_id.as_str(), level])?;
    }
    patron.flush()?;

    log::info!(
        "sample: wrote {} trip rows, {} patron rows to {}",
        raw.trips.len(),
        raw.patrons.len(),
        dir.display()
    );
    Ok(())
}
