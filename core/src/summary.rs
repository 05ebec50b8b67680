//! Segment summary — per-tier aggregates of a classified dataset for display.

use crate::{
    ltv::segment_mean_coin_in,
    types::{FreqTier, PatronRecord, ValueTier},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentCell {
    pub value_tier:    ValueTier,
    pub freq_tier:     FreqTier,
    pub patrons:       usize,
    pub total_coin_in: f64,
    /// Mean over observed COIN_IN, the same basis as the LTV estimate.
    pub avg_coin_in:   f64,
    pub avg_trips:     f64,
}

/// One cell per Value × Frequency combination, Low/Rare first.
/// Empty segments are present with zeros. Missing COIN_IN is left out of
/// the totals and the average; missing TRIPS counts as zero.
pub fn segment_summary(records: &[PatronRecord]) -> Vec<SegmentCell> {
    let mut cells = Vec::with_capacity(9);
    for value_tier in ValueTier::ALL {
        for freq_tier in FreqTier::ALL {
            let members: Vec<&PatronRecord> = records
                .iter()
                .filter(|r| r.in_segment(value_tier, freq_tier))
                .collect();

            let patrons = members.len();
            let total_coin_in: f64 = members.iter().filter_map(|r| r.coin_in).sum();
            let avg_coin_in =
                segment_mean_coin_in(records, value_tier, freq_tier).unwrap_or(0.0);
            let total_trips: f64 = members.iter().map(|r| r.trips_or_zero()).sum();
            let avg_trips = if patrons > 0 { total_trips / patrons as f64 } else { 0.0 };

            cells.push(SegmentCell {
                value_tier,
                freq_tier,
                patrons,
                total_coin_in,
                avg_coin_in,
                avg_trips,
            });
        }
    }
    cells
}
