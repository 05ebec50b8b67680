//! ROI projector — campaign economics for one segment and promotion.
//!
//!   expected_responders = campaign_size × response_rate
//!   incremental_revenue = expected_responders × average_ltv
//!   total_promo_cost    = campaign_size × unit_cost
//!   roi                 = (incremental_revenue − total_promo_cost) / total_promo_cost
//!
//! A resolved response rate of exactly zero has no projection; the result
//! is `ProjectionOutcome::NoResponseAssumption`, never a numeric ROI.
//! A zero total cost gives roi = 0.

use crate::{
    config::LtvModelConfig,
    economics::EconomicsTables,
    error::{PromoError, PromoResult},
    ltv::average_ltv,
    types::{FreqTier, PatronRecord, ValueTier},
};
use serde::{Deserialize, Serialize};

/// One ROI evaluation, as selected by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRequest {
    pub value_tier:    ValueTier,
    pub freq_tier:     FreqTier,
    pub promotion:     String,
    pub campaign_size: u64,
    #[serde(default)]
    pub response_rate_override: Option<f64>,
}

impl CampaignRequest {
    pub fn new(
        value_tier: ValueTier,
        freq_tier: FreqTier,
        promotion: impl Into<String>,
        campaign_size: u64,
    ) -> Self {
        Self {
            value_tier,
            freq_tier,
            promotion: promotion.into(),
            campaign_size,
            response_rate_override: None,
        }
    }

    pub fn with_response_rate(mut self, rate: f64) -> Self {
        self.response_rate_override = Some(rate);
        self
    }

    /// Boundary check for user-supplied inputs.
    pub fn validate(&self, tables: &EconomicsTables) -> PromoResult<()> {
        if self.campaign_size == 0 {
            return Err(PromoError::InvalidRequest {
                reason: "campaign size must be positive".into(),
            });
        }
        if let Some(rate) = self.response_rate_override {
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(PromoError::InvalidRequest {
                    reason: format!("response rate override {rate} outside [0, 1]"),
                });
            }
        }
        tables.cost_of(&self.promotion)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiProjection {
    pub average_ltv:         f64,
    pub expected_responders: f64,
    pub incremental_revenue: f64,
    pub total_promo_cost:    f64,
    pub roi:                 f64,
    // Inputs as resolved, for display.
    pub response_rate:       f64,
    pub cost_per_patron:     f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProjectionOutcome {
    Projected(RoiProjection),
    /// Response rate resolved to zero: no valid projection exists.
    NoResponseAssumption,
}

impl ProjectionOutcome {
    pub fn projection(&self) -> Option<&RoiProjection> {
        match self {
            ProjectionOutcome::Projected(p) => Some(p),
            ProjectionOutcome::NoResponseAssumption => None,
        }
    }
}

/// Project campaign ROI. Pure: reads its inputs, mutates nothing.
pub fn project_roi(
    records: &[PatronRecord],
    tables: &EconomicsTables,
    model: &LtvModelConfig,
    request: &CampaignRequest,
) -> PromoResult<ProjectionOutcome> {
    let cost_per_patron = tables.cost_of(&request.promotion)?;
    let response_rate = request.response_rate_override.unwrap_or_else(|| {
        tables.response_rate_of(request.value_tier, request.freq_tier, &request.promotion)
    });

    if response_rate == 0.0 {
        return Ok(ProjectionOutcome::NoResponseAssumption);
    }

    let avg_ltv = average_ltv(records, request.value_tier, request.freq_tier, model);
    let campaign_size = request.campaign_size as f64;
    let expected_responders = campaign_size * response_rate;
    let incremental_revenue = expected_responders * avg_ltv;
    let total_promo_cost = campaign_size * cost_per_patron;
    let roi = if total_promo_cost == 0.0 {
        0.0
    } else {
        (incremental_revenue - total_promo_cost) / total_promo_cost
    };

    Ok(ProjectionOutcome::Projected(RoiProjection {
        average_ltv: avg_ltv,
        expected_responders,
        incremental_revenue,
        total_promo_cost,
        roi,
        response_rate,
        cost_per_patron,
    }))
}
