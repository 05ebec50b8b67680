//! LTV estimator and ROI projector tests.

use promoplay_core::{
    config::{LtvModelConfig, PromoConfig},
    economics::EconomicsTables,
    error::PromoError,
    ltv::average_ltv,
    roi::{project_roi, CampaignRequest, ProjectionOutcome},
    segmentation::classify,
    types::{FreqTier, PatronRecord, ValueTier},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn tables() -> EconomicsTables {
    EconomicsTables::from_config(&PromoConfig::default_test())
}

fn classified(rows: &[(f64, f64)]) -> Vec<PatronRecord> {
    let mut records: Vec<PatronRecord> = rows
        .iter()
        .enumerate()
        .map(|(i, (trips, coin_in))| {
            PatronRecord::new(format!("{}", i + 1), "101", Some(*trips), Some(*coin_in))
        })
        .collect();
    classify(&mut records);
    records
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ── LTV ──────────────────────────────────────────────────────────────────────

#[test]
fn empty_segment_ltv_is_zero() {
    let records = classified(&[(6.0, 1000.0)]);
    let ltv = average_ltv(&records, ValueTier::Low, FreqTier::Rare, &LtvModelConfig::default());
    assert_eq!(ltv, 0.0);
}

#[test]
fn ltv_is_mean_coin_in_times_hold_times_horizon() {
    // Ten distinct values: 700..1000 are High, all Frequent.
    let rows: Vec<(f64, f64)> = (1..=10).map(|v| (8.0, v as f64 * 100.0)).collect();
    let records = classified(&rows);

    let ltv = average_ltv(&records, ValueTier::High, FreqTier::Frequent, &LtvModelConfig::default());
    let mean = (700.0 + 800.0 + 900.0 + 1000.0) / 4.0;
    assert!(approx(ltv, mean * 0.08 * 12.0), "ltv {ltv}");
}

#[test]
fn ltv_respects_configured_assumptions() {
    let records = classified(&[(6.0, 1000.0)]);
    let model = LtvModelConfig { hold_rate: 0.1, retention_months: 6.0 };
    let ltv = average_ltv(&records, ValueTier::High, FreqTier::Frequent, &model);
    assert!(approx(ltv, 600.0), "ltv {ltv}");
}

#[test]
fn ltv_skips_missing_coin_in() {
    let mut records = vec![
        PatronRecord::new("1", "101", Some(9.0), Some(500.0)),
        PatronRecord::new("2", "101", Some(9.0), None),
    ];
    for r in &mut records {
        r.value_tier = Some(ValueTier::High);
        r.freq_tier = Some(FreqTier::Frequent);
    }
    let ltv = average_ltv(&records, ValueTier::High, FreqTier::Frequent, &LtvModelConfig::default());
    assert!(approx(ltv, 500.0 * 0.08 * 12.0), "ltv {ltv}");
}

// ── ROI ──────────────────────────────────────────────────────────────────────

/// Single High/Frequent patron, "$50 Free Play" at the table rate of 0.4,
/// campaign of 1000: ROI = (384000 - 50000) / 50000 = 6.68.
#[test]
fn end_to_end_projection() {
    let records = classified(&[(6.0, 1000.0)]);
    assert_eq!(records[0].value_tier, Some(ValueTier::High));
    assert_eq!(records[0].freq_tier, Some(FreqTier::Frequent));

    let request = CampaignRequest::new(ValueTier::High, FreqTier::Frequent, "$50 Free Play", 1000);
    let outcome = project_roi(&records, &tables(), &LtvModelConfig::default(), &request).unwrap();

    let p = outcome.projection().expect("table rate is non-zero");
    assert!(approx(p.expected_responders, 400.0), "responders {}", p.expected_responders);
    assert!(approx(p.average_ltv, 960.0), "ltv {}", p.average_ltv);
    assert!(approx(p.incremental_revenue, 384_000.0), "revenue {}", p.incremental_revenue);
    assert!(approx(p.total_promo_cost, 50_000.0), "cost {}", p.total_promo_cost);
    assert!(approx(p.roi, 6.68), "roi {}", p.roi);
}

/// No override and no table entry: the outcome is the no-result sentinel.
#[test]
fn zero_response_rate_yields_no_result() {
    let records = classified(&[(6.0, 1000.0)]);
    let request = CampaignRequest::new(ValueTier::Low, FreqTier::Rare, "Hotel Comp", 500);

    let outcome = project_roi(&records, &tables(), &LtvModelConfig::default(), &request).unwrap();
    assert_eq!(outcome, ProjectionOutcome::NoResponseAssumption);
    assert!(outcome.projection().is_none());
}

#[test]
fn zero_override_yields_no_result() {
    let records = classified(&[(6.0, 1000.0)]);
    let request = CampaignRequest::new(ValueTier::High, FreqTier::Frequent, "$50 Free Play", 1000)
        .with_response_rate(0.0);

    let outcome = project_roi(&records, &tables(), &LtvModelConfig::default(), &request).unwrap();
    assert_eq!(outcome, ProjectionOutcome::NoResponseAssumption);
}

#[test]
fn override_replaces_table_rate() {
    let records = classified(&[(6.0, 1000.0)]);
    let request = CampaignRequest::new(ValueTier::High, FreqTier::Frequent, "$50 Free Play", 1000)
        .with_response_rate(0.1);

    let outcome = project_roi(&records, &tables(), &LtvModelConfig::default(), &request).unwrap();
    let p = outcome.projection().unwrap();
    assert!(approx(p.response_rate, 0.1));
    assert!(approx(p.expected_responders, 100.0));
    assert!(approx(p.roi, (96_000.0 - 50_000.0) / 50_000.0), "roi {}", p.roi);
}

/// An override supplies an assumption where the table has none.
#[test]
fn override_fills_missing_table_entry() {
    let records = classified(&[(6.0, 1000.0)]);
    let request = CampaignRequest::new(ValueTier::High, FreqTier::Frequent, "$25 Free Play", 200)
        .with_response_rate(0.5);

    let outcome = project_roi(&records, &tables(), &LtvModelConfig::default(), &request).unwrap();
    assert!(outcome.projection().is_some());
}

/// A zero-cost promotion defines roi as 0 rather than dividing by zero.
#[test]
fn zero_cost_promotion_roi_is_zero() {
    let mut config = PromoConfig::default_test();
    config.promotions.iter_mut().for_each(|p| {
        if p.name == "$50 Free Play" {
            p.unit_cost = 0.0;
        }
    });
    let tables = EconomicsTables::from_config(&config);
    let records = classified(&[(6.0, 1000.0)]);
    let request = CampaignRequest::new(ValueTier::High, FreqTier::Frequent, "$50 Free Play", 1000);

    let outcome = project_roi(&records, &tables, &config.ltv_model, &request).unwrap();
    let p = outcome.projection().unwrap();
    assert_eq!(p.total_promo_cost, 0.0);
    assert_eq!(p.roi, 0.0);
    assert!(p.roi.is_finite());
}

/// Empty segment with a response assumption: revenue is zero, ROI is -100%.
#[test]
fn empty_segment_loses_the_whole_spend() {
    let records = classified(&[(6.0, 1000.0)]);
    let request = CampaignRequest::new(ValueTier::Mid, FreqTier::Rare, "$25 Free Play", 100);

    let outcome = project_roi(&records, &tables(), &LtvModelConfig::default(), &request).unwrap();
    let p = outcome.projection().unwrap();
    assert_eq!(p.average_ltv, 0.0);
    assert_eq!(p.incremental_revenue, 0.0);
    assert!(approx(p.roi, -1.0));
}

#[test]
fn unknown_promotion_is_reported() {
    let records = classified(&[(6.0, 1000.0)]);
    let request = CampaignRequest::new(ValueTier::High, FreqTier::Frequent, "Spa Day", 10);

    let err = project_roi(&records, &tables(), &LtvModelConfig::default(), &request).unwrap_err();
    assert!(matches!(err, PromoError::UnknownPromotion { .. }), "got {err:?}");
}

/// Projection is pure: same inputs, same answer, inputs untouched.
#[test]
fn projection_is_pure() {
    let records = classified(&[(6.0, 1000.0), (1.0, 20.0), (3.0, 300.0)]);
    let before = records.clone();
    let request = CampaignRequest::new(ValueTier::High, FreqTier::Frequent, "$50 Free Play", 750);
    let t = tables();
    let model = LtvModelConfig::default();

    let a = project_roi(&records, &t, &model, &request).unwrap();
    let b = project_roi(&records, &t, &model, &request).unwrap();
    assert_eq!(a, b);
    assert_eq!(records, before);
}

// ── Request validation ───────────────────────────────────────────────────────

#[test]
fn zero_campaign_size_rejected() {
    let request = CampaignRequest::new(ValueTier::High, FreqTier::Frequent, "$50 Free Play", 0);
    assert!(matches!(
        request.validate(&tables()),
        Err(PromoError::InvalidRequest { .. })
    ));
}

#[test]
fn override_outside_unit_interval_rejected() {
    for bad in [-0.1, 1.01, f64::NAN] {
        let request =
            CampaignRequest::new(ValueTier::High, FreqTier::Frequent, "$50 Free Play", 10)
                .with_response_rate(bad);
        assert!(
            matches!(request.validate(&tables()), Err(PromoError::InvalidRequest { .. })),
            "override {bad} should be rejected"
        );
    }
}

#[test]
fn valid_request_passes() {
    let request = CampaignRequest::new(ValueTier::Mid, FreqTier::Rare, "$25 Free Play", 10)
        .with_response_rate(1.0);
    assert!(request.validate(&tables()).is_ok());
}
