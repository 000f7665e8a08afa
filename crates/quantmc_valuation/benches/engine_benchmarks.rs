//! Monte Carlo engine throughput benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quantmc_core::market_data::FloatingIndex;
use quantmc_core::types::{Currency, Date};
use quantmc_models::products::{InterestRateSwap, Product};
use quantmc_models::simulation::HullWhite1f;
use quantmc_valuation::{Coordinator, ValuationSettings};

fn swap_valuation_setup() -> (Coordinator, Vec<Box<dyn Product>>, HullWhite1f) {
    let value_date = Date::from_ymd(2016, 9, 17).unwrap();
    let mut sim = HullWhite1f::new(Currency::ZAR, 0.05, 0.01, 0.07, 0.07, value_date).unwrap();
    sim.add_forecast(FloatingIndex::jibar_3m()).unwrap();

    let payments: Vec<Date> = (1..=8).map(|q| value_date.add_months(3 * q)).collect();
    let swap = InterestRateSwap::flat(
        true,
        0.07,
        FloatingIndex::jibar_3m(),
        value_date,
        payments,
        1_000_000.0,
        0.25,
    )
    .unwrap();

    let settings = ValuationSettings::builder()
        .paths(1000)
        .seed(42)
        .build()
        .unwrap();
    (Coordinator::new(settings), vec![Box::new(swap)], sim)
}

fn bench_swap_valuation(c: &mut Criterion) {
    let (coordinator, products, sim) = swap_valuation_setup();
    c.bench_function("hull_white_swap_1000_paths", |b| {
        b.iter(|| black_box(coordinator.value(&products, &sim).unwrap()))
    });
}

criterion_group!(benches, bench_swap_valuation);
criterion_main!(benches);
