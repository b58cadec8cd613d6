//! Thread-safe handle to a pool
//!
//! Every call holds the lock for its whole duration, so concurrent callers
//! observe each operation as a single transition.

use std::sync::Arc;

use cipherlend_fhe::FheBackend;
use parking_lot::{Mutex, MutexGuard};

use crate::errors::LendingResult;
use crate::events::PoolEvent;
use crate::oracle::{PriceOracle, PriceSource};
use crate::pool::LendingPool;
use crate::types::{Address, AssetId};

pub struct SharedPool<B: FheBackend, P: PriceSource = PriceOracle> {
    inner: Arc<Mutex<LendingPool<B, P>>>,
}

impl<B: FheBackend, P: PriceSource> Clone for SharedPool<B, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: FheBackend, P: PriceSource> SharedPool<B, P> {
    pub fn new(pool: LendingPool<B, P>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    /// Exclusive access for admin calls and reads spanning several getters.
    pub fn lock(&self) -> MutexGuard<'_, LendingPool<B, P>> {
        self.inner.lock()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut LendingPool<B, P>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn supply(&self, user: Address, asset: AssetId, amount: &B::Uint) -> LendingResult<PoolEvent> {
        self.inner.lock().supply(user, asset, amount)
    }

    pub fn withdraw(&self, user: Address, asset: AssetId, amount: &B::Uint) -> LendingResult<PoolEvent> {
        self.inner.lock().withdraw(user, asset, amount)
    }

    pub fn borrow(&self, user: Address, asset: AssetId, amount: &B::Uint) -> LendingResult<PoolEvent> {
        self.inner.lock().borrow(user, asset, amount)
    }

    pub fn repay(
        &self,
        user: Address,
        asset: AssetId,
        amount: &B::Uint,
        is_repaying_all: bool,
    ) -> LendingResult<PoolEvent> {
        self.inner.lock().repay(user, asset, amount, is_repaying_all)
    }

    pub fn set_user_use_reserve_as_collateral(
        &self,
        user: Address,
        asset: AssetId,
        enabled: bool,
    ) -> LendingResult<PoolEvent> {
        self.inner
            .lock()
            .set_user_use_reserve_as_collateral(user, asset, enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reserve::ReserveConfig;
    use crate::roles::{Role, RoleRegistry};
    use crate::types::PRICE_SCALE;
    use cipherlend_fhe::{ClearBackend, ClearU64};
    use std::thread;

    #[test]
    fn test_concurrent_supplies_respect_cap() {
        let admin = Address::from_label("admin");
        let asset = AssetId::from_label("ETH");
        let mut pool = LendingPool::new(
            ClearBackend,
            PriceOracle::new(admin, PRICE_SCALE),
            RoleRegistry::new(admin),
        );
        pool.grant_role(&admin, Role::PoolAdmin, admin).unwrap();
        pool.init_reserve(admin, asset, ReserveConfig::default().with_supply_cap(1_000))
            .unwrap();
        let shared = SharedPool::new(pool);

        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let user = Address([i; 32]);
                    for _ in 0..10 {
                        shared.supply(user, asset, &ClearU64::new(50)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let pool = shared.lock();
        assert_eq!(pool.reserve_data(&asset).unwrap().total_supplied.value(), 1_000);
        let credited: u64 = (0..8u8)
            .map(|i| pool.user_supplied_balance(&Address([i; 32]), &asset).value())
            .sum();
        assert_eq!(credited, 1_000);
        assert_eq!(pool.events().len(), 81);
    }
}
