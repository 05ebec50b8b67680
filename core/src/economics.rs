//! Economics tables — promotion unit costs and default response rates.
//!
//! Pure read-only lookup built once from `PromoConfig`. A missing
//! response-rate entry means "no historical response assumption" and
//! reads as 0.0; an unknown promotion name is a catalog mismatch and
//! fails loudly.

use crate::{
    config::PromoConfig,
    error::{PromoError, PromoResult},
    types::{FreqTier, ValueTier},
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct EconomicsTables {
    unit_costs:     HashMap<String, f64>,
    /// Catalog order, for pickers and summaries.
    names:          Vec<String>,
    response_rates: HashMap<(ValueTier, FreqTier), HashMap<String, f64>>,
}

impl EconomicsTables {
    pub fn from_config(config: &PromoConfig) -> Self {
        let mut unit_costs = HashMap::new();
        let mut names = Vec::new();
        for p in &config.promotions {
            if unit_costs.insert(p.name.clone(), p.unit_cost).is_none() {
                names.push(p.name.clone());
            } else {
                log::warn!("economics: duplicate promotion '{}', last entry wins", p.name);
            }
        }

        let mut response_rates: HashMap<(ValueTier, FreqTier), HashMap<String, f64>> =
            HashMap::new();
        for r in &config.response_rates {
            response_rates
                .entry((r.value_tier, r.freq_tier))
                .or_default()
                .insert(r.promotion.clone(), r.rate);
        }

        Self { unit_costs, names, response_rates }
    }

    /// Unit cost per targeted patron.
    pub fn cost_of(&self, promotion: &str) -> PromoResult<f64> {
        self.unit_costs
            .get(promotion)
            .copied()
            .ok_or_else(|| PromoError::UnknownPromotion { name: promotion.to_string() })
    }

    /// Default response probability for a segment and promotion.
    /// Returns 0.0 when the table has no entry.
    pub fn response_rate_of(
        &self,
        value_tier: ValueTier,
        freq_tier: FreqTier,
        promotion: &str,
    ) -> f64 {
        self.response_rates
            .get(&(value_tier, freq_tier))
            .and_then(|by_promo| by_promo.get(promotion))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn contains(&self, promotion: &str) -> bool {
        self.unit_costs.contains_key(promotion)
    }

    pub fn promotion_names(&self) -> &[String] {
        &self.names
    }
}
