use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use validator::Validate;
use wallet_service_core::domain::{
    OnRampEstimateRequest, OnRampRequest, WalletBalance, ensure_unique_currencies,
};
use wallet_service_core::test_utils::fixtures;

fn bench_validation(c: &mut Criterion) {
    let request = OnRampRequest::new(OnRampEstimateRequest::new("USD", "USDC", 250.0), "wallet-addr");

    c.bench_function("validate_onramp_request", |b| {
        b.iter(|| {
            let _ = black_box(&request).validate();
        })
    });

    let wallet = fixtures::wallet_with_balances(
        (0..32)
            .map(|i| WalletBalance::new(format!("TOK{}", i), f64::from(i)))
            .collect(),
    );

    c.bench_function("validate_wallet", |b| {
        b.iter(|| {
            let wallet = black_box(&wallet);
            let _ = wallet.validate();
            let _ = ensure_unique_currencies(&wallet.balances);
        })
    });
}

criterion_group!(benches, bench_validation);
criterion_main!(benches);
