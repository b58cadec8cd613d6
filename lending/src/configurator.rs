//! Reserve configurator
//!
//! Admin-only listing and tuning of reserves. Structural wiring (listing,
//! activation, borrowing, collateral eligibility) needs `PoolAdmin`; risk
//! parameters and the per-reserve pause need `RiskAdmin`.

use cipherlend_fhe::FheBackend;

use crate::errors::{LendingError, LendingResult};
use crate::events::{PoolEvent, ReserveSetting};
use crate::oracle::PriceSource;
use crate::pool::LendingPool;
use crate::reserve::{Reserve, ReserveConfig};
use crate::roles::Role;
use crate::types::{Address, AssetId, BPS};

impl<B: FheBackend, P: PriceSource> LendingPool<B, P> {
    /// List a new reserve with zeroed encrypted aggregates.
    pub fn init_reserve(
        &mut self,
        caller: Address,
        asset: AssetId,
        config: ReserveConfig,
    ) -> LendingResult<PoolEvent> {
        let outcome = self.list_reserve(caller, asset, config);
        self.commit("init_reserve", outcome)
    }

    fn list_reserve(&mut self, caller: Address, asset: AssetId, config: ReserveConfig) -> LendingResult<PoolEvent> {
        self.roles.require_role(Role::PoolAdmin, &caller)?;
        if self.store.contains_reserve(&asset) {
            return Err(LendingError::ReserveAlreadyInitialized(asset));
        }
        config.validate()?;

        let reserve = Reserve::new(asset, config, self.store.zero(), self.now());
        self.store.insert_reserve(reserve);
        Ok(PoolEvent::ReserveConfigured {
            asset,
            admin: caller,
            setting: ReserveSetting::Initialized,
        })
    }

    pub fn set_reserve_active(&mut self, caller: Address, asset: AssetId, active: bool) -> LendingResult<PoolEvent> {
        self.configure(caller, Role::PoolAdmin, asset, ReserveSetting::Active(active), |config| {
            config.active = active;
            Ok(())
        })
    }

    pub fn set_reserve_borrowing(
        &mut self,
        caller: Address,
        asset: AssetId,
        enabled: bool,
    ) -> LendingResult<PoolEvent> {
        self.configure(caller, Role::PoolAdmin, asset, ReserveSetting::Borrowing(enabled), |config| {
            config.borrowing_enabled = enabled;
            Ok(())
        })
    }

    /// Revoking collateral eligibility also zeroes the collateral factor.
    pub fn set_reserve_collateral(
        &mut self,
        caller: Address,
        asset: AssetId,
        enabled: bool,
    ) -> LendingResult<PoolEvent> {
        self.configure(caller, Role::PoolAdmin, asset, ReserveSetting::Collateral(enabled), |config| {
            config.is_collateral = enabled;
            if !enabled {
                config.collateral_factor = 0;
            }
            Ok(())
        })
    }

    pub fn set_collateral_factor(
        &mut self,
        caller: Address,
        asset: AssetId,
        factor: u16,
    ) -> LendingResult<PoolEvent> {
        self.configure(
            caller,
            Role::RiskAdmin,
            asset,
            ReserveSetting::CollateralFactor(factor),
            |config| {
                let in_range = if config.is_collateral {
                    factor > 0 && factor <= BPS
                } else {
                    factor == 0
                };
                if !in_range {
                    return Err(LendingError::InvalidCollateralFactor { factor });
                }
                config.collateral_factor = factor;
                Ok(())
            },
        )
    }

    /// `0` lifts the cap.
    pub fn set_supply_cap(&mut self, caller: Address, asset: AssetId, cap: u64) -> LendingResult<PoolEvent> {
        self.configure(caller, Role::RiskAdmin, asset, ReserveSetting::SupplyCap(cap), |config| {
            config.supply_cap = cap;
            Ok(())
        })
    }

    /// `0` lifts the cap.
    pub fn set_borrow_cap(&mut self, caller: Address, asset: AssetId, cap: u64) -> LendingResult<PoolEvent> {
        self.configure(caller, Role::RiskAdmin, asset, ReserveSetting::BorrowCap(cap), |config| {
            config.borrow_cap = cap;
            Ok(())
        })
    }

    /// Pausing an already paused reserve is accepted and still emits.
    pub fn pause_reserve(&mut self, caller: Address, asset: AssetId) -> LendingResult<PoolEvent> {
        self.configure(caller, Role::RiskAdmin, asset, ReserveSetting::Paused(true), |config| {
            config.is_paused = true;
            Ok(())
        })
    }

    pub fn unpause_reserve(&mut self, caller: Address, asset: AssetId) -> LendingResult<PoolEvent> {
        self.configure(caller, Role::RiskAdmin, asset, ReserveSetting::Paused(false), |config| {
            config.is_paused = false;
            Ok(())
        })
    }

    /// Apply `update` to a copy of the config and store it only if it succeeds.
    fn configure<F>(
        &mut self,
        caller: Address,
        role: Role,
        asset: AssetId,
        setting: ReserveSetting,
        update: F,
    ) -> LendingResult<PoolEvent>
    where
        F: FnOnce(&mut ReserveConfig) -> LendingResult<()>,
    {
        let outcome = (|| {
            self.roles.require_role(role, &caller)?;
            let reserve = self.store.reserve_mut(&asset)?;
            let mut config = reserve.config;
            update(&mut config)?;
            reserve.config = config;
            Ok(PoolEvent::ReserveConfigured {
                asset,
                admin: caller,
                setting,
            })
        })();
        self.commit("configure_reserve", outcome)
    }
}
