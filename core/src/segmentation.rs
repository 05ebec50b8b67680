//! Tier classifier — Value tier from COIN_IN, Frequency tier from TRIPS.
//!
//! Value tiers are quantile bins recomputed from the current dataset:
//!   Low  = bottom 20%   (x <= p20, lowest value inclusive)
//!   Mid  = next 40%     (p20 < x <= p60)
//!   High = top 40%      (x > p60)
//!
//! When two of the quantile cut points coincide the bins cannot produce
//! three tiers, and a fixed scheme over the median and the 80th
//! percentile is used instead. The choice is made up front by
//! `ValueBinning::plan`; nothing here fails.
//!
//! Frequency tiers use fixed boundaries: Rare <= 2 < Occasional <= 5 < Frequent.
//!
//! Missing numbers count as zero for tiering. Every record leaves with
//! both tiers set.

use crate::types::{FreqTier, PatronRecord, ValueTier};
use serde::{Deserialize, Serialize};

/// Quantile cut points for the primary value binning.
pub const VALUE_QUANTILES: [f64; 4] = [0.0, 0.2, 0.6, 1.0];

/// Quantiles used as boundaries by the fallback value binning.
pub const FALLBACK_LOWER_QUANTILE: f64 = 0.5;
pub const FALLBACK_UPPER_QUANTILE: f64 = 0.8;

pub const RARE_MAX_TRIPS: f64 = 2.0;
pub const OCCASIONAL_MAX_TRIPS: f64 = 5.0;

/// How value tiers were assigned for one classification pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ValueBinning {
    /// Quantile bins with distinct cut points at p20 and p60.
    Quantile { low_cut: f64, mid_cut: f64 },
    /// Fixed bins at the median and p80 of observed COIN_IN.
    Fixed { median: f64, p80: f64, max: f64 },
}

impl ValueBinning {
    /// Decide the binning for a set of COIN_IN values (missing = 0).
    /// Returns None for an empty set.
    pub fn plan(coin_in: &[Option<f64>]) -> Option<Self> {
        let filled = sorted(coin_in.iter().map(|v| v.unwrap_or(0.0)));
        if filled.is_empty() {
            return None;
        }

        let edges = VALUE_QUANTILES.map(|q| quantile(&filled, q));
        if !has_duplicate_edges(&edges) {
            return Some(ValueBinning::Quantile {
                low_cut: edges[1],
                mid_cut: edges[2],
            });
        }

        // Fallback boundaries come from observed values only.
        let observed = sorted(coin_in.iter().flatten().copied());
        let basis = if observed.is_empty() { &filled } else { &observed };
        let binning = ValueBinning::Fixed {
            median: quantile(basis, FALLBACK_LOWER_QUANTILE),
            p80: quantile(basis, FALLBACK_UPPER_QUANTILE),
            max: filled[filled.len() - 1],
        };
        log::warn!("segmentation: duplicate quantile edges {edges:?}; using fixed bins {binning:?}");
        Some(binning)
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ValueBinning::Fixed { .. })
    }

    /// Tier for one COIN_IN amount (missing already mapped to 0).
    pub fn assign(&self, coin_in: f64) -> ValueTier {
        match *self {
            ValueBinning::Quantile { low_cut, mid_cut } => {
                if coin_in <= low_cut {
                    ValueTier::Low
                } else if coin_in <= mid_cut {
                    ValueTier::Mid
                } else {
                    ValueTier::High
                }
            }
            ValueBinning::Fixed { median, p80, .. } if median < p80 => {
                if coin_in <= median {
                    ValueTier::Low
                } else if coin_in <= p80 {
                    ValueTier::Mid
                } else {
                    ValueTier::High
                }
            }
            // Median and p80 coincide: Mid is empty. A boundary sitting on the
            // maximum separates nothing above it, so values at it go High.
            ValueBinning::Fixed { median, max, .. } => {
                let is_high = if median < max {
                    coin_in > median
                } else {
                    coin_in >= median
                };
                if is_high { ValueTier::High } else { ValueTier::Low }
            }
        }
    }
}

/// Frequency tier for a trip count (missing already mapped to 0).
/// Counts below zero are treated as Rare.
pub fn freq_tier_for(trips: f64) -> FreqTier {
    if trips <= RARE_MAX_TRIPS {
        FreqTier::Rare
    } else if trips <= OCCASIONAL_MAX_TRIPS {
        FreqTier::Occasional
    } else {
        FreqTier::Frequent
    }
}

/// Assign both tiers to every record in place. Re-running on the same
/// numbers reproduces the same labels.
pub fn classify(records: &mut [PatronRecord]) -> Option<ValueBinning> {
    let coin_in: Vec<Option<f64>> = records.iter().map(|r| r.coin_in).collect();
    let binning = ValueBinning::plan(&coin_in)?;

    for record in records.iter_mut() {
        record.value_tier = Some(binning.assign(record.coin_in_or_zero()));
        record.freq_tier = Some(freq_tier_for(record.trips_or_zero()));
    }

    log::info!(
        "segmentation: classified {} records ({})",
        records.len(),
        if binning.is_fallback() { "fixed fallback" } else { "quantile" }
    );
    Some(binning)
}

fn sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.collect();
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    v
}

fn has_duplicate_edges(edges: &[f64]) -> bool {
    edges.windows(2).any(|w| w[0] == w[1])
}

/// Linearly interpolated quantile of an ascending, non-empty slice.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    let h = q * (n - 1) as f64;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = h - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
