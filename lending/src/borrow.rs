//! Borrow/Repay engine
//!
//! Borrowing power comes from the user's balance of the designated
//! collateral asset. A borrow is clamped to the smallest of the request, the
//! borrowing power and the borrow cap headroom; a repay is clamped to the
//! outstanding debt. Which asset is owed is public and tracked in the
//! position's `DebtSlot`.

use cipherlend_fhe::{clamp, FheBackend};
use tracing::debug;

use crate::context::EngineContext;
use crate::errors::{LendingError, LendingResult};
use crate::events::PoolEvent;
use crate::oracle::PriceSource;
use crate::store::LedgerStore;
use crate::types::{Address, AssetId};
use crate::valuation;

pub struct BorrowEngine;

impl BorrowEngine {
    pub fn borrow<B: FheBackend, P: PriceSource>(
        ctx: &EngineContext<'_, B, P>,
        store: &mut LedgerStore<B::Uint>,
        user: Address,
        asset: AssetId,
        amount: &B::Uint,
    ) -> LendingResult<PoolEvent> {
        let backend = ctx.backend;
        let reserve = store.reserve(&asset)?;

        let collateral_asset = ctx
            .protocol
            .collateral_asset
            .ok_or(LendingError::NoCollateralEnabled)?;
        let position = store
            .position(&user)
            .filter(|p| p.is_collateral_enabled(&collateral_asset))
            .ok_or(LendingError::NoCollateralEnabled)?;

        reserve.require_active()?;
        if !reserve.config.borrowing_enabled {
            return Err(LendingError::BorrowingNotEnabled);
        }
        reserve.require_unpaused()?;
        ctx.protocol.require_unpaused()?;

        let price = ctx.oracle.price(&asset);
        if price == 0 {
            return Err(LendingError::OraclePriceZero(asset));
        }
        if !position.admits_debt(&asset) {
            return Err(LendingError::MultipleDebtsNotAllowed);
        }

        let collateral_factor = store.reserve(&collateral_asset)?.config.collateral_factor;
        let weighted = valuation::weighted_value(
            backend,
            store.supplied_balance(&user, &collateral_asset),
            ctx.oracle.price(&collateral_asset),
            collateral_factor,
        );
        let debt = valuation::debt_value(ctx, position);
        let power = valuation::borrowing_power(backend, &weighted, &debt, price);

        let effective = clamp::clamp_to_cap(
            backend,
            &backend.min(amount, &power),
            &reserve.total_borrowed,
            reserve.config.borrow_cap,
        );
        let total_borrowed = backend.add(&reserve.total_borrowed, &effective);
        let liquidity = clamp::saturating_sub(backend, &reserve.total_supplied, &total_borrowed);

        let zero = store.zero().clone();
        let (reserve, position) = store.reserve_and_position(&asset, &user)?;
        let balance = position.borrowed_balance.entry(asset).or_insert(zero);
        *balance = backend.add(balance, &effective);
        position.current_debt_asset.occupy(asset);

        reserve.total_borrowed = total_borrowed;
        reserve.available_liquidity = liquidity;
        reserve.touch(ctx.now);

        Ok(PoolEvent::Borrow { asset, user })
    }

    /// `is_repaying_all` is the only way the debt slot is released; without
    /// it the slot stays occupied even when the repayment covers the whole
    /// debt.
    ///
    /// Whether the tendered amount covered the debt is encrypted, so the
    /// slot clears on the flag alone. A short repay-all leaves its residual
    /// in the borrowed balance, where it still counts as debt, still pins the
    /// user to this asset and can still be repaid with the slot empty.
    pub fn repay<B: FheBackend, P: PriceSource>(
        ctx: &EngineContext<'_, B, P>,
        store: &mut LedgerStore<B::Uint>,
        user: Address,
        asset: AssetId,
        amount: &B::Uint,
        is_repaying_all: bool,
    ) -> LendingResult<PoolEvent> {
        let backend = ctx.backend;
        let reserve = store.reserve(&asset)?;
        reserve.require_active()?;
        ctx.protocol.require_unpaused()?;

        let event = PoolEvent::Repay { asset, user };
        let Some(position) = store.position(&user) else {
            debug!(%asset, %user, "repay from untouched account");
            return Ok(event);
        };
        match position.current_debt_asset.asset() {
            Some(debt_asset) if *debt_asset != asset => {
                return Err(LendingError::InvalidDebtRepayment);
            }
            Some(_) => {}
            None if position.borrowed(&asset).is_some() => {
                debug!(%asset, %user, "repaying residual after cleared debt slot");
            }
            None => {
                debug!(%asset, %user, "repay without outstanding debt");
                return Ok(event);
            }
        }

        let outstanding = store.borrowed_balance(&user, &asset).clone();
        let effective = backend.min(amount, &outstanding);
        let remaining = backend.sub(&outstanding, &effective);
        // effective <= outstanding <= total_borrowed
        let total_borrowed = backend.sub(&reserve.total_borrowed, &effective);
        let liquidity = clamp::saturating_sub(backend, &reserve.total_supplied, &total_borrowed);

        let (reserve, position) = store.reserve_and_position(&asset, &user)?;
        position.borrowed_balance.insert(asset, remaining);
        if is_repaying_all {
            position.current_debt_asset.clear();
        }

        reserve.total_borrowed = total_borrowed;
        reserve.available_liquidity = liquidity;
        reserve.touch(ctx.now);

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ProtocolState;
    use crate::oracle::PriceOracle;
    use crate::position::DebtSlot;
    use crate::reserve::{Reserve, ReserveConfig};
    use crate::types::PRICE_SCALE;
    use cipherlend_fhe::{ClearBackend, ClearU64};

    fn collateral() -> AssetId {
        AssetId::from_label("A")
    }

    fn debt() -> AssetId {
        AssetId::from_label("B")
    }

    fn other() -> AssetId {
        AssetId::from_label("C")
    }

    fn user() -> Address {
        Address([1u8; 32])
    }

    fn feeder() -> Address {
        Address([0u8; 32])
    }

    struct Fixture {
        backend: ClearBackend,
        oracle: PriceOracle,
        protocol: ProtocolState,
        store: LedgerStore<ClearU64>,
    }

    impl Fixture {
        /// 1000 of A supplied and enabled at 75%, B and C borrowable
        fn new() -> Self {
            let backend = ClearBackend;
            let mut store = LedgerStore::new(backend.trivial(0));
            store.insert_reserve(Reserve::new(collateral(), ReserveConfig::collateral(7_500), store.zero(), 0));
            store.insert_reserve(Reserve::new(debt(), ReserveConfig::borrowable(), store.zero(), 0));
            store.insert_reserve(Reserve::new(other(), ReserveConfig::borrowable(), store.zero(), 0));

            let position = store.position_or_init(&user());
            position.supplied_balance.insert(collateral(), ClearU64::new(1_000));
            position.set_collateral_enabled(collateral(), true);

            let mut oracle = PriceOracle::new(feeder(), PRICE_SCALE);
            oracle.add_feeder(&feeder(), feeder()).unwrap();

            Self {
                backend,
                oracle,
                protocol: ProtocolState {
                    paused: false,
                    collateral_asset: Some(collateral()),
                },
                store,
            }
        }

        fn ctx(&self) -> EngineContext<'_, ClearBackend, PriceOracle> {
            EngineContext {
                backend: &self.backend,
                oracle: &self.oracle,
                protocol: &self.protocol,
                now: 42,
            }
        }

        fn borrow(&mut self, asset: AssetId, amount: u64) -> LendingResult<PoolEvent> {
            let ctx = EngineContext {
                backend: &self.backend,
                oracle: &self.oracle,
                protocol: &self.protocol,
                now: 42,
            };
            BorrowEngine::borrow(&ctx, &mut self.store, user(), asset, &ClearU64::new(amount))
        }

        fn repay(&mut self, asset: AssetId, amount: u64, all: bool) -> LendingResult<PoolEvent> {
            let ctx = EngineContext {
                backend: &self.backend,
                oracle: &self.oracle,
                protocol: &self.protocol,
                now: 43,
            };
            BorrowEngine::repay(&ctx, &mut self.store, user(), asset, &ClearU64::new(amount), all)
        }

        fn owed(&self, asset: AssetId) -> u64 {
            self.store.borrowed_balance(&user(), &asset).value()
        }

        fn slot(&self) -> DebtSlot {
            self.store.position(&user()).unwrap().current_debt_asset
        }
    }

    #[test]
    fn test_borrow_clamped_to_power() {
        let mut f = Fixture::new();
        f.borrow(debt(), 5_000).unwrap();

        assert_eq!(f.owed(debt()), 750);
        assert_eq!(f.slot(), DebtSlot::Asset(debt()));
        let reserve = f.store.reserve(&debt()).unwrap();
        assert_eq!(reserve.total_borrowed.value(), 750);
        assert_eq!(reserve.available_liquidity.value(), 0);
        assert_eq!(reserve.last_update_timestamp, 42);
    }

    #[test]
    fn test_repeat_borrow_uses_remaining_power() {
        let mut f = Fixture::new();
        f.borrow(debt(), 500).unwrap();
        f.borrow(debt(), 500).unwrap();

        assert_eq!(f.owed(debt()), 750);
    }

    #[test]
    fn test_borrow_priced_in_debt_units() {
        let mut f = Fixture::new();
        f.oracle.set_price(&feeder(), debt(), 3 * PRICE_SCALE).unwrap();
        f.borrow(debt(), 1_000).unwrap();

        assert_eq!(f.owed(debt()), 250);
        assert_eq!(valuation::debt_value(&f.ctx(), f.store.position(&user()).unwrap()).value(), 750);
    }

    #[test]
    fn test_borrow_cap_headroom() {
        let mut f = Fixture::new();
        f.store.reserve_mut(&debt()).unwrap().config.borrow_cap = 100;
        f.borrow(debt(), 500).unwrap();

        assert_eq!(f.owed(debt()), 100);
    }

    #[test]
    fn test_second_debt_asset_rejected() {
        let mut f = Fixture::new();
        f.borrow(debt(), 10).unwrap();

        assert_eq!(f.borrow(other(), 10), Err(LendingError::MultipleDebtsNotAllowed));
        assert_eq!(f.owed(other()), 0);
    }

    #[test]
    fn test_borrow_structural_rejections() {
        let mut f = Fixture::new();
        f.oracle.set_price(&feeder(), debt(), 0).unwrap();
        assert_eq!(f.borrow(debt(), 10), Err(LendingError::OraclePriceZero(debt())));

        let mut f = Fixture::new();
        f.store.reserve_mut(&debt()).unwrap().config.borrowing_enabled = false;
        assert_eq!(f.borrow(debt(), 10), Err(LendingError::BorrowingNotEnabled));

        let mut f = Fixture::new();
        f.store.reserve_mut(&debt()).unwrap().config.active = false;
        assert_eq!(f.borrow(debt(), 10), Err(LendingError::ReserveNotActive));

        let mut f = Fixture::new();
        f.store
            .position_or_init(&user())
            .set_collateral_enabled(collateral(), false);
        assert_eq!(f.borrow(debt(), 10), Err(LendingError::NoCollateralEnabled));

        let mut f = Fixture::new();
        f.protocol.collateral_asset = None;
        assert_eq!(f.borrow(debt(), 10), Err(LendingError::NoCollateralEnabled));
        assert_eq!(f.slot(), DebtSlot::None);
    }

    #[test]
    fn test_repay_without_debt_is_noop() {
        let mut f = Fixture::new();
        let event = f.repay(debt(), 100, true).unwrap();

        assert_eq!(event, PoolEvent::Repay { asset: debt(), user: user() });
        assert_eq!(f.store.reserve(&debt()).unwrap().last_update_timestamp, 0);
    }

    #[test]
    fn test_repay_wrong_asset_rejected() {
        let mut f = Fixture::new();
        f.borrow(debt(), 100).unwrap();

        assert_eq!(f.repay(other(), 100, true), Err(LendingError::InvalidDebtRepayment));
        assert_eq!(f.owed(debt()), 100);
    }

    #[test]
    fn test_full_repay_without_flag_keeps_slot() {
        let mut f = Fixture::new();
        f.borrow(debt(), 100).unwrap();
        f.repay(debt(), 500, false).unwrap();

        assert_eq!(f.owed(debt()), 0);
        assert_eq!(f.slot(), DebtSlot::Asset(debt()));

        f.repay(debt(), 0, true).unwrap();
        assert_eq!(f.slot(), DebtSlot::None);
    }

    #[test]
    fn test_repay_all_clears_slot() {
        let mut f = Fixture::new();
        f.borrow(debt(), 400).unwrap();
        f.repay(debt(), 150, false).unwrap();
        assert_eq!(f.owed(debt()), 250);

        f.repay(debt(), 1_000, true).unwrap();
        assert_eq!(f.owed(debt()), 0);
        assert_eq!(f.slot(), DebtSlot::None);
        assert_eq!(f.store.reserve(&debt()).unwrap().total_borrowed.value(), 0);

        // the settled asset can be borrowed again
        f.borrow(debt(), 10).unwrap();
        assert_eq!(f.slot(), DebtSlot::Asset(debt()));
    }

    #[test]
    fn test_short_repay_all_leaves_residual_repayable() {
        let mut f = Fixture::new();
        f.borrow(debt(), 700).unwrap();
        f.repay(debt(), 100, true).unwrap();
        assert_eq!(f.slot(), DebtSlot::None);
        assert_eq!(f.owed(debt()), 600);

        // the residual still pins the user to B
        assert_eq!(f.borrow(other(), 10), Err(LendingError::MultipleDebtsNotAllowed));
        assert_eq!(f.owed(other()), 0);

        f.repay(debt(), 600, true).unwrap();
        assert_eq!(f.owed(debt()), 0);
        assert_eq!(f.store.reserve(&debt()).unwrap().total_borrowed.value(), 0);
        assert_eq!(f.store.reserve(&debt()).unwrap().last_update_timestamp, 43);
    }

    #[test]
    fn test_residual_counts_against_borrowing_power() {
        let mut f = Fixture::new();
        f.borrow(debt(), 700).unwrap();
        f.repay(debt(), 100, true).unwrap();

        // 750 weighted - 600 residual leaves 150 of power
        f.borrow(debt(), 1_000).unwrap();
        assert_eq!(f.owed(debt()), 750);
        assert_eq!(f.slot(), DebtSlot::Asset(debt()));
    }

    #[test]
    fn test_repay_other_asset_with_empty_slot_is_noop() {
        let mut f = Fixture::new();
        f.borrow(debt(), 100).unwrap();
        f.repay(debt(), 100, true).unwrap();

        let event = f.repay(other(), 50, true).unwrap();
        assert_eq!(event, PoolEvent::Repay { asset: other(), user: user() });
        assert_eq!(f.store.reserve(&other()).unwrap().last_update_timestamp, 0);
    }
}
