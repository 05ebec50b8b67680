//! Reference data: promotion catalog, response-rate table, LTV assumptions.
//!
//! Loaded once at startup from the data/ directory and handed to the
//! engine. Nothing mutates these after load.

use crate::types::{FreqTier, ValueTier};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOLD_RATE: f64 = 0.08;
pub const DEFAULT_RETENTION_MONTHS: f64 = 12.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionConfig {
    pub name: String,
    /// Fixed currency amount per targeted patron.
    pub unit_cost: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct PromotionCatalogFile {
    promotions: Vec<PromotionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRateConfig {
    pub value_tier: ValueTier,
    pub freq_tier: FreqTier,
    pub promotion: String,
    pub rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseRateFile {
    rates: Vec<ResponseRateConfig>,
}

/// Business assumptions behind the lifetime-value projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LtvModelConfig {
    /// Share of wagered volume the house keeps.
    #[serde(default = "default_hold_rate")]
    pub hold_rate: f64,
    /// Projection horizon.
    #[serde(default = "default_retention_months")]
    pub retention_months: f64,
}

fn default_hold_rate() -> f64 { DEFAULT_HOLD_RATE }
fn default_retention_months() -> f64 { DEFAULT_RETENTION_MONTHS }

impl Default for LtvModelConfig {
    fn default() -> Self {
        Self {
            hold_rate: DEFAULT_HOLD_RATE,
            retention_months: DEFAULT_RETENTION_MONTHS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PromoConfig {
    pub promotions: Vec<PromotionConfig>,
    pub response_rates: Vec<ResponseRateConfig>,
    pub ltv_model: LtvModelConfig,
}

impl PromoConfig {
    /// Load from the data/ directory.
    /// In tests, use PromoConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let catalog_path = format!("{data_dir}/economics/promotion_catalog.json");
        let catalog_content = std::fs::read_to_string(&catalog_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {catalog_path}: {e}"))?;
        let catalog_file: PromotionCatalogFile = serde_json::from_str(&catalog_content)?;

        let rates_path = format!("{data_dir}/economics/response_rates.json");
        let rates_content = std::fs::read_to_string(&rates_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {rates_path}: {e}"))?;
        let rates_file: ResponseRateFile = serde_json::from_str(&rates_content)?;

        let ltv_path = format!("{data_dir}/economics/ltv_model.json");
        let ltv_content = std::fs::read_to_string(&ltv_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {ltv_path}: {e}"))?;
        let ltv_model: LtvModelConfig = serde_json::from_str(&ltv_content)?;

        let config = Self {
            promotions: catalog_file.promotions,
            response_rates: rates_file.rates,
            ltv_model,
        };
        config.validate()?;

        log::info!(
            "config: loaded {} promotions, {} response rates from {data_dir}",
            config.promotions.len(),
            config.response_rates.len()
        );
        Ok(config)
    }

    /// Reject reference data the projector cannot use.
    pub fn validate(&self) -> anyhow::Result<()> {
        for p in &self.promotions {
            if !p.unit_cost.is_finite() || p.unit_cost < 0.0 {
                anyhow::bail!("promotion '{}' has invalid unit cost {}", p.name, p.unit_cost);
            }
        }
        for r in &self.response_rates {
            if !(0.0..=1.0).contains(&r.rate) {
                anyhow::bail!(
                    "response rate {} for {}/{}/{} outside [0, 1]",
                    r.rate, r.value_tier, r.freq_tier, r.promotion
                );
            }
            if !self.promotions.iter().any(|p| p.name == r.promotion) {
                anyhow::bail!("response rate references unknown promotion '{}'", r.promotion);
            }
        }
        if !(self.ltv_model.hold_rate.is_finite() && self.ltv_model.hold_rate >= 0.0) {
            anyhow::bail!("hold_rate must be a non-negative number");
        }
        if !(self.ltv_model.retention_months.is_finite() && self.ltv_model.retention_months >= 0.0) {
            anyhow::bail!("retention_months must be a non-negative number");
        }
        Ok(())
    }

    /// Config with hardcoded defaults for use in tests.
    /// Mirrors data/economics/*.json.
    pub fn default_test() -> Self {
        let promotions = vec![
            promo("$25 Free Play", 25.0),
            promo("$50 Free Play", 50.0),
            promo("$100 Free Play", 100.0),
            promo("Hotel Comp", 120.0),
            promo("Dining Credit", 40.0),
        ];

        use FreqTier::*;
        use ValueTier::*;
        let response_rates = vec![
            rate(High, Frequent,   "$50 Free Play",  0.40),
            rate(High, Frequent,   "$100 Free Play", 0.50),
            rate(High, Frequent,   "Hotel Comp",     0.55),
            rate(High, Frequent,   "Dining Credit",  0.35),
            rate(High, Occasional, "$50 Free Play",  0.30),
            rate(High, Occasional, "$100 Free Play", 0.40),
            rate(High, Occasional, "Hotel Comp",     0.45),
            rate(High, Rare,       "$50 Free Play",  0.15),
            rate(High, Rare,       "$100 Free Play", 0.25),
            rate(High, Rare,       "Hotel Comp",     0.30),
            rate(Mid,  Frequent,   "$25 Free Play",  0.30),
            rate(Mid,  Frequent,   "$50 Free Play",  0.35),
            rate(Mid,  Frequent,   "Dining Credit",  0.30),
            rate(Mid,  Occasional, "$25 Free Play",  0.20),
            rate(Mid,  Occasional, "$50 Free Play",  0.25),
            rate(Mid,  Occasional, "Dining Credit",  0.20),
            rate(Mid,  Rare,       "$25 Free Play",  0.10),
            rate(Mid,  Rare,       "$50 Free Play",  0.12),
            rate(Low,  Frequent,   "$25 Free Play",  0.20),
            rate(Low,  Occasional, "$25 Free Play",  0.10),
            rate(Low,  Rare,       "$25 Free Play",  0.05),
        ];

        Self {
            promotions,
            response_rates,
            ltv_model: LtvModelConfig::default(),
        }
    }
}

fn promo(name: &str, unit_cost: f64) -> PromotionConfig {
    PromotionConfig { name: name.into(), unit_cost }
}

fn rate(value_tier: ValueTier, freq_tier: FreqTier, promotion: &str, rate: f64) -> ResponseRateConfig {
    ResponseRateConfig { value_tier, freq_tier, promotion: promotion.into(), rate }
}
