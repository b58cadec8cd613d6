//! Performance Benchmarks for the cipherlend ledger
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use cipherlend::prelude::*;

// =============================================================================
// FIXTURES
// =============================================================================

fn admin() -> Address {
    Address::from_label("admin")
}

fn collateral() -> AssetId {
    AssetId::from_label("A")
}

fn debt() -> AssetId {
    AssetId::from_label("B")
}

fn pool<B: FheBackend>(backend: B) -> LendingPool<B> {
    let mut pool = LendingPool::new(backend, PriceOracle::new(admin(), PRICE_SCALE), RoleRegistry::new(admin()));
    pool.grant_role(&admin(), Role::PoolAdmin, admin()).unwrap();
    pool.init_reserve(admin(), collateral(), ReserveConfig::collateral(7_500).with_supply_cap(u64::MAX / 2))
        .unwrap();
    pool.init_reserve(admin(), debt(), ReserveConfig::borrowable()).unwrap();
    pool.set_collateral_asset(admin(), collateral()).unwrap();
    pool
}

// =============================================================================
// CLEAR BACKEND BENCHMARKS
// =============================================================================

fn bench_clear_supply(c: &mut Criterion) {
    let mut pool = pool(ClearBackend);
    let user = Address::from_label("alice");
    let amount = ClearU64::new(1);

    c.bench_function("clear_supply_capped", |b| {
        b.iter(|| pool.supply(user, collateral(), &amount).unwrap())
    });
}

fn bench_clear_borrow_repay(c: &mut Criterion) {
    let mut group = c.benchmark_group("clear_borrow_repay");

    for users in [1u8, 16, 256] {
        let mut pool = pool(ClearBackend);
        for i in 0..users {
            let user = Address([i; 32]);
            pool.supply(user, collateral(), &ClearU64::new(1_000_000)).unwrap();
            pool.set_user_use_reserve_as_collateral(user, collateral(), true).unwrap();
        }
        pool.drain_events();

        group.bench_with_input(BenchmarkId::from_parameter(users), &users, |b, &users| {
            b.iter(|| {
                for i in 0..users {
                    let user = Address([i; 32]);
                    pool.borrow(user, debt(), &ClearU64::new(100)).unwrap();
                    pool.repay(user, debt(), &ClearU64::new(100), true).unwrap();
                }
                pool.drain_events();
            })
        });
    }

    group.finish();
}

// =============================================================================
// TFHE BENCHMARKS
// =============================================================================

fn bench_tfhe_supply(c: &mut Criterion) {
    let keys = KeyPair::generate(&FheConfig::default()).unwrap();
    let mut pool = pool(TfheBackend::new(keys.server.clone()));
    let user = Address::from_label("alice");
    let amount = keys.client.seal(1).unwrap();

    let mut group = c.benchmark_group("tfhe");
    group.sample_size(10);
    group.bench_function("supply_capped", |b| {
        b.iter(|| pool.supply(user, collateral(), &amount).unwrap())
    });
    group.bench_function("withdraw", |b| {
        b.iter(|| pool.withdraw(user, collateral(), &amount).unwrap())
    });
    group.finish();
}

criterion_group!(clear, bench_clear_supply, bench_clear_borrow_repay);

criterion_group!(encrypted, bench_tfhe_supply);

criterion_main!(clear, encrypted);
