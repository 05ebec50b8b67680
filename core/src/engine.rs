//! The promotion engine — wires reference data, the dataset store and
//! the segmentation / economics components together.
//!
//! FLOW (strictly forward):
//!   1. Load trip + patron sources into the store
//!   2. Inner-join into PatronRecords
//!   3. Tier classifier assigns Value / Frequency tiers
//!   4. Each evaluation: LTV estimate → ROI projection
//!
//! RULES:
//!   - Reference tables are built once and never mutated.
//!   - The classifier is the only writer of tier fields.
//!   - Evaluations read the snapshot; results are not stored.

use crate::{
    config::PromoConfig,
    economics::EconomicsTables,
    error::{PromoError, PromoResult},
    loader::{self, RawSources},
    roi::{project_roi, CampaignRequest, ProjectionOutcome},
    segmentation::{self, ValueBinning},
    store::DatasetStore,
    summary::{segment_summary, SegmentCell},
    types::PatronRecord,
};
use chrono::{DateTime, Utc};
use std::io::Read;
use std::path::Path;
use uuid::Uuid;

/// One loaded, classified dataset.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    pub snapshot_id:     String,
    pub loaded_at:       DateTime<Utc>,
    pub records:         Vec<PatronRecord>,
    pub binning:         Option<ValueBinning>,
    pub trip_rows:       i64,
    pub patron_rows:     i64,
    /// Trip rows with no patron row, excluded by the join.
    pub dropped_by_join: i64,
    pub coerced_cells:   usize,
}

pub struct PromoEngine {
    pub config: PromoConfig,
    pub tables: EconomicsTables,
    store:      DatasetStore,
    snapshot:   Option<DatasetSnapshot>,
}

impl PromoEngine {
    pub fn new(config: PromoConfig, store: DatasetStore) -> Self {
        let tables = EconomicsTables::from_config(&config);
        Self {
            config,
            tables,
            store,
            snapshot: None,
        }
    }

    /// Build an engine from the reference data in `data_dir`.
    /// No dataset is loaded yet.
    pub fn build(data_dir: &str) -> PromoResult<Self> {
        let config = PromoConfig::load(data_dir)?;
        let store = DatasetStore::in_memory()?;
        store.migrate()?;
        Ok(Self::new(config, store))
    }

    /// Engine with in-code reference data. Used by tests.
    pub fn build_test() -> PromoResult<Self> {
        let store = DatasetStore::in_memory()?;
        store.migrate()?;
        Ok(Self::new(PromoConfig::default_test(), store))
    }

    pub fn load_sources<T: Read, P: Read>(
        &mut self,
        trip: T,
        patron: P,
    ) -> PromoResult<&DatasetSnapshot> {
        let raw = loader::read_sources(trip, patron)?;
        self.load_raw(&raw)
    }

    /// Load TRIP_FILE.csv and PATRON_DATABASE.csv from a directory.
    pub fn load_data_dir(&mut self, dir: impl AsRef<Path>) -> PromoResult<&DatasetSnapshot> {
        let raw = loader::read_sources_from_dir(dir)?;
        self.load_raw(&raw)
    }

    /// Replace the current snapshot with `raw`, joined and classified.
    pub fn load_raw(&mut self, raw: &RawSources) -> PromoResult<&DatasetSnapshot> {
        self.store.replace_sources(raw)?;

        let mut records = self.store.merged_records()?;
        let binning = segmentation::classify(&mut records);

        let snapshot = DatasetSnapshot {
            snapshot_id:     Uuid::new_v4().to_string(),
            loaded_at:       Utc::now(),
            trip_rows:       self.store.trip_count()?,
            patron_rows:     self.store.patron_count()?,
            dropped_by_join: self.store.unmatched_trip_count()?,
            coerced_cells:   raw.coerced_cells,
            records,
            binning,
        };

        if snapshot.records.is_empty() {
            log::warn!("engine: join produced no records; every segment will be empty");
        }
        log::info!(
            "engine: snapshot {} loaded ({} records, {} trip rows dropped by join)",
            snapshot.snapshot_id,
            snapshot.records.len(),
            snapshot.dropped_by_join
        );

        Ok(self.snapshot.insert(snapshot))
    }

    /// Re-run the tier classifier over the current snapshot.
    pub fn reclassify(&mut self) -> PromoResult<Option<ValueBinning>> {
        let snapshot = self.snapshot.as_mut().ok_or(PromoError::DatasetNotLoaded)?;
        snapshot.binning = segmentation::classify(&mut snapshot.records);
        Ok(snapshot.binning)
    }

    pub fn snapshot(&self) -> Option<&DatasetSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn records(&self) -> PromoResult<&[PatronRecord]> {
        self.snapshot
            .as_ref()
            .map(|s| s.records.as_slice())
            .ok_or(PromoError::DatasetNotLoaded)
    }

    pub fn binning(&self) -> Option<ValueBinning> {
        self.snapshot.as_ref().and_then(|s| s.binning)
    }

    /// Validate the request at the boundary, then project.
    pub fn evaluate(&self, request: &CampaignRequest) -> PromoResult<ProjectionOutcome> {
        request.validate(&self.tables)?;
        let records = self.records()?;
        let outcome = project_roi(records, &self.tables, &self.config.ltv_model, request)?;

        match &outcome {
            ProjectionOutcome::Projected(p) => log::info!(
                "engine: {}/{} '{}' x{} -> roi {:.2}",
                request.value_tier,
                request.freq_tier,
                request.promotion,
                request.campaign_size,
                p.roi
            ),
            ProjectionOutcome::NoResponseAssumption => log::info!(
                "engine: {}/{} '{}' has no response assumption",
                request.value_tier,
                request.freq_tier,
                request.promotion
            ),
        }
        Ok(outcome)
    }

    pub fn segment_summary(&self) -> PromoResult<Vec<SegmentCell>> {
        Ok(segment_summary(self.records()?))
    }

    pub fn promotion_names(&self) -> &[String] {
        self.tables.promotion_names()
    }
}
