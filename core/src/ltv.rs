//! Lifetime-value estimate for a Value × Frequency segment.
//!
//!   ltv = mean(COIN_IN over segment) × hold_rate × retention_months
//!
//! An empty segment has no projectable value and yields 0.

use crate::{
    config::LtvModelConfig,
    types::{FreqTier, PatronRecord, ValueTier},
};

/// Mean COIN_IN over records in the segment. Missing amounts are skipped;
/// a segment with no observed amount yields None.
pub fn segment_mean_coin_in(
    records: &[PatronRecord],
    value_tier: ValueTier,
    freq_tier: FreqTier,
) -> Option<f64> {
    let (sum, n) = records
        .iter()
        .filter(|r| r.in_segment(value_tier, freq_tier))
        .filter_map(|r| r.coin_in)
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));

    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Average projected lifetime value for one segment.
pub fn average_ltv(
    records: &[PatronRecord],
    value_tier: ValueTier,
    freq_tier: FreqTier,
    model: &LtvModelConfig,
) -> f64 {
    match segment_mean_coin_in(records, value_tier, freq_tier) {
        Some(mean) => mean * model.hold_rate * model.retention_months,
        None => 0.0,
    }
}
