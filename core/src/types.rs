//! Shared primitive types used across the promotion engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A patron identifier as it appears in the source files.
pub type PatronId = String;

/// A property (casino site) identifier as it appears in the source files.
pub type PropertyId = String;

/// Spend-based tier derived from COIN_IN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValueTier {
    Low,
    Mid,
    High,
}

/// Visit-based tier derived from TRIPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FreqTier {
    Rare,
    Occasional,
    Frequent,
}

impl ValueTier {
    pub const ALL: [ValueTier; 3] = [ValueTier::Low, ValueTier::Mid, ValueTier::High];

    pub fn label(&self) -> &'static str {
        match self {
            ValueTier::Low  => "Low",
            ValueTier::Mid  => "Mid",
            ValueTier::High => "High",
        }
    }
}

impl FreqTier {
    pub const ALL: [FreqTier; 3] = [FreqTier::Rare, FreqTier::Occasional, FreqTier::Frequent];

    pub fn label(&self) -> &'static str {
        match self {
            FreqTier::Rare       => "Rare",
            FreqTier::Occasional => "Occasional",
            FreqTier::Frequent   => "Frequent",
        }
    }
}

impl fmt::Display for ValueTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for FreqTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ValueTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low"  => Ok(ValueTier::Low),
            "mid"  => Ok(ValueTier::Mid),
            "high" => Ok(ValueTier::High),
            other  => Err(format!("unknown value tier '{other}'")),
        }
    }
}

impl FromStr for FreqTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rare"       => Ok(FreqTier::Rare),
            "occasional" => Ok(FreqTier::Occasional),
            "frequent"   => Ok(FreqTier::Frequent),
            other        => Err(format!("unknown frequency tier '{other}'")),
        }
    }
}

/// One row per patron × property after the trip/patron join.
///
/// `trips` and `coin_in` are `None` when the source value was blank or
/// non-numeric. Tiers are `None` only until the classifier has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatronRecord {
    pub patron_id:   PatronId,
    pub property_id: PropertyId,
    pub trips:       Option<f64>,
    pub coin_in:     Option<f64>,
    pub value_tier:  Option<ValueTier>,
    pub freq_tier:   Option<FreqTier>,
}

impl PatronRecord {
    pub fn new(
        patron_id: impl Into<PatronId>,
        property_id: impl Into<PropertyId>,
        trips: Option<f64>,
        coin_in: Option<f64>,
    ) -> Self {
        Self {
            patron_id:   patron_id.into(),
            property_id: property_id.into(),
            trips,
            coin_in,
            value_tier:  None,
            freq_tier:   None,
        }
    }

    /// COIN_IN with missing treated as zero.
    pub fn coin_in_or_zero(&self) -> f64 {
        self.coin_in.unwrap_or(0.0)
    }

    /// TRIPS with missing treated as zero.
    pub fn trips_or_zero(&self) -> f64 {
        self.trips.unwrap_or(0.0)
    }

    pub fn in_segment(&self, value_tier: ValueTier, freq_tier: FreqTier) -> bool {
        self.value_tier == Some(value_tier) && self.freq_tier == Some(freq_tier)
    }
}
