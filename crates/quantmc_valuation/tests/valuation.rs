//! End-to-end valuations against closed forms and invariants.

use std::sync::Arc;

use approx::assert_relative_eq;
use quantmc_core::market_data::{
    FlatDiscountCurve, FloatingIndex, ForwardParityFxSource, HazardCurve, ReferenceEntity,
};
use quantmc_core::types::{Currency, CurrencyPair, Date};
use quantmc_models::products::{BermudanSwaption, Cds, FixedLeg, InterestRateSwap, Product};
use quantmc_models::simulation::{DeterministicCreditFxJump, HullWhite1f};
use quantmc_valuation::{Coordinator, ValuationError, ValuationSettings};

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd(y, m, day).unwrap()
}

fn value_date() -> Date {
    d(2016, 9, 17)
}

fn coordinator(paths: usize) -> Coordinator {
    Coordinator::new(
        ValuationSettings::builder()
            .paths(paths)
            .seed(42)
            .build()
            .unwrap(),
    )
}

fn flat_hull_white(volatility: f64) -> HullWhite1f {
    HullWhite1f::new(Currency::ZAR, 0.05, volatility, 0.07, 0.07, value_date()).unwrap()
}

fn quarterly_payer_swap(fixed_rate: f64) -> InterestRateSwap {
    let start = value_date();
    let payments: Vec<Date> = (1..=4).map(|q| start.add_months(3 * q)).collect();
    InterestRateSwap::flat(
        true,
        fixed_rate,
        FloatingIndex::jibar_3m(),
        start,
        payments,
        1_000_000.0,
        0.25,
    )
    .unwrap()
}

#[test]
fn zero_vol_fixed_leg_matches_deterministic_discounting() {
    let sim = flat_hull_white(0.0);
    let payments = vec![d(2017, 3, 17), d(2017, 9, 17)];
    let leg = FixedLeg::flat(Currency::ZAR, payments.clone(), 1_000_000.0, 0.07, 0.5).unwrap();
    let products: Vec<Box<dyn Product>> = vec![Box::new(leg)];

    let result = coordinator(8).value(&products, &sim).unwrap();

    let expected: f64 = payments
        .iter()
        .map(|&date| {
            let t = (date - value_date()) as f64 / 365.0;
            1_000_000.0 * 0.07 * 0.5 * (-0.07 * t).exp()
        })
        .sum();
    assert_relative_eq!(result.pv, expected, max_relative = 1e-9);
    assert!(result.std_error.abs() < 1e-9);
    assert_eq!(result.paths, 8);
}

#[test]
fn swap_at_fair_fixed_rate_has_zero_pv_under_deterministic_rates() {
    let mut sim = flat_hull_white(0.0);
    sim.add_forecast(FloatingIndex::jibar_3m()).unwrap();

    // With zero volatility the short rate stays at 0.07, so every fixing
    // is the same simple forward rate.
    let fair = ((0.07f64 * 0.25).exp() - 1.0) / 0.25;
    let products: Vec<Box<dyn Product>> = vec![Box::new(quarterly_payer_swap(fair))];

    let result = coordinator(16).value(&products, &sim).unwrap();
    assert!(result.pv.abs() < 1e-6, "pv = {}", result.pv);
}

#[test]
fn valuation_is_deterministic_and_thread_invariant() {
    let mut sim = flat_hull_white(0.01);
    sim.add_forecast(FloatingIndex::jibar_3m()).unwrap();
    let products: Vec<Box<dyn Product>> = vec![Box::new(quarterly_payer_swap(0.07))];
    let coordinator = coordinator(512);

    let first = coordinator.value(&products, &sim).unwrap();
    let second = coordinator.value(&products, &sim).unwrap();
    assert_eq!(first.pv, second.pv);
    assert_eq!(first.std_error, second.std_error);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap();
    let single_threaded = pool.install(|| coordinator.value(&products, &sim).unwrap());
    assert_eq!(first.pv, single_threaded.pv);
    assert_eq!(first.std_error, single_threaded.std_error);
}

fn credit_simulator() -> DeterministicCreditFxJump {
    let anchor = value_date();
    let usd = FlatDiscountCurve::new(Currency::USD, anchor, 0.05);
    let eur = FlatDiscountCurve::new(Currency::EUR, anchor, 0.03);
    let pair = CurrencyPair::new(Currency::EUR, Currency::USD).unwrap();
    let forwards =
        ForwardParityFxSource::new(pair, 1.1, Arc::new(eur), Arc::new(usd.clone())).unwrap();
    let survival = HazardCurve::new(
        ReferenceEntity::new("XYZ"),
        anchor,
        &[anchor.add_months(60)],
        &[0.02],
    )
    .unwrap();
    DeterministicCreditFxJump::new(
        anchor,
        Arc::new(usd),
        Arc::new(forwards),
        Arc::new(survival),
        0.15,
        -0.3,
        0.4,
    )
    .unwrap()
}

fn quarterly_cds(bought_protection: bool) -> Cds {
    let payments: Vec<Date> = (1..=4).map(|q| value_date().add_months(3 * q)).collect();
    Cds::new(
        ReferenceEntity::new("XYZ"),
        Currency::USD,
        bought_protection,
        payments,
        vec![1_000_000.0; 4],
        vec![0.02; 4],
        vec![0.25; 4],
    )
    .unwrap()
}

#[test]
fn cds_pv_flips_sign_with_protection_direction() {
    let sim = credit_simulator();
    let coordinator = coordinator(2000);

    let bought: Vec<Box<dyn Product>> = vec![Box::new(quarterly_cds(true))];
    let sold: Vec<Box<dyn Product>> = vec![Box::new(quarterly_cds(false))];
    let bought_result = coordinator.value(&bought, &sim).unwrap();
    let sold_result = coordinator.value(&sold, &sim).unwrap();

    // Path by path the two contracts are exact mirrors.
    assert_relative_eq!(bought_result.pv, -sold_result.pv, max_relative = 1e-12);
    assert_relative_eq!(
        bought_result.std_error,
        sold_result.std_error,
        max_relative = 1e-12
    );
}

#[test]
fn bermudan_with_more_exercise_dates_is_worth_at_least_as_much() {
    let mut sim = flat_hull_white(0.01);
    sim.add_forecast(FloatingIndex::jibar_3m()).unwrap();

    let start = value_date().add_months(3);
    let payments: Vec<Date> = (2..=5).map(|q| value_date().add_months(3 * q)).collect();
    let swap = InterestRateSwap::flat(
        true,
        0.07,
        FloatingIndex::jibar_3m(),
        start,
        payments,
        1_000_000.0,
        0.25,
    )
    .unwrap();

    let single = BermudanSwaption::on_swap(vec![start], &swap).unwrap();
    let multi =
        BermudanSwaption::on_swap(vec![start, value_date().add_months(9)], &swap).unwrap();

    let coordinator = coordinator(2000);
    let single_result = coordinator.value_early_exercise(&single, &sim).unwrap();
    let multi_result = coordinator.value_early_exercise(&multi, &sim).unwrap();

    let tolerance = 3.0 * (single_result.std_error + multi_result.std_error);
    assert!(
        multi_result.pv >= single_result.pv - tolerance,
        "multi = {}, single = {}",
        multi_result.pv,
        single_result.pv
    );
    // The option is a right, not an obligation.
    assert!(single_result.pv >= -tolerance);
}

#[test]
fn exposure_profile_shape_and_quantiles() {
    let mut sim = flat_hull_white(0.01);
    sim.add_forecast(FloatingIndex::jibar_3m()).unwrap();
    let products: Vec<Box<dyn Product>> = vec![Box::new(quarterly_payer_swap(0.07))];
    let exposure_dates: Vec<Date> = [2, 5, 8, 11]
        .iter()
        .map(|&m| value_date().add_months(m))
        .collect();

    let result = coordinator(1000)
        .exposure_profile(&products, &sim, &exposure_dates)
        .unwrap();

    assert_eq!(result.values.len(), 1000);
    assert!(result.values.iter().all(|row| row.len() == 4));
    let profile = &result.profile;
    assert_eq!(profile.dates(), exposure_dates.as_slice());
    assert_eq!(profile.expected_exposure().len(), 4);
    assert_eq!(profile.pfe().len(), 4);
    assert_relative_eq!(profile.confidence(), 0.95);
    for (ee, pfe) in profile.expected_exposure().iter().zip(profile.pfe()) {
        assert!(*ee >= 0.0);
        assert!(pfe + 1e-9 >= *ee, "pfe = {}, ee = {}", pfe, ee);
    }
    assert!(profile.epe() >= 0.0);
}

#[test]
fn configuration_errors_are_reported() {
    let sim = flat_hull_white(0.0);
    let coordinator = coordinator(16);

    let empty: Vec<Box<dyn Product>> = Vec::new();
    assert!(matches!(
        coordinator.value(&empty, &sim),
        Err(ValuationError::EmptyPortfolio)
    ));

    // The swap needs a JIBAR forecast the simulator was never given.
    let products: Vec<Box<dyn Product>> = vec![Box::new(quarterly_payer_swap(0.07))];
    assert!(matches!(
        coordinator.value(&products, &sim),
        Err(ValuationError::UnsupportedObservable { .. })
    ));

    assert!(matches!(
        coordinator.exposure_profile(&products, &sim, &[]),
        Err(ValuationError::InvalidExposureDates { .. })
    ));
    let out_of_order = vec![value_date().add_months(6), value_date().add_months(3)];
    assert!(matches!(
        coordinator.exposure_profile(&products, &sim, &out_of_order),
        Err(ValuationError::InvalidExposureDates { .. })
    ));
}
