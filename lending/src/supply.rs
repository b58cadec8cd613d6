//! Supply/Withdraw engine
//!
//! Moves value into and out of a reserve. Over-requests are clamped, never
//! rejected: a supply above the cap is cut to the remaining headroom, a
//! withdrawal is cut to the user's balance and, for the collateral asset of
//! an indebted user, to the amount that keeps the debt covered.

use cipherlend_fhe::{clamp, FheBackend};
use tracing::debug;

use crate::context::EngineContext;
use crate::errors::LendingResult;
use crate::events::PoolEvent;
use crate::oracle::PriceSource;
use crate::store::LedgerStore;
use crate::types::{Address, AssetId};
use crate::valuation;

pub struct SupplyEngine;

impl SupplyEngine {
    pub fn supply<B: FheBackend, P: PriceSource>(
        ctx: &EngineContext<'_, B, P>,
        store: &mut LedgerStore<B::Uint>,
        user: Address,
        asset: AssetId,
        amount: &B::Uint,
    ) -> LendingResult<PoolEvent> {
        let backend = ctx.backend;
        let reserve = store.reserve(&asset)?;
        reserve.require_active()?;
        reserve.require_unpaused()?;
        ctx.protocol.require_unpaused()?;

        let effective = clamp::clamp_to_cap(
            backend,
            amount,
            &reserve.total_supplied,
            reserve.config.supply_cap,
        );
        let total_supplied = backend.add(&reserve.total_supplied, &effective);
        let liquidity = clamp::saturating_sub(backend, &total_supplied, &reserve.total_borrowed);

        let zero = store.zero().clone();
        let (reserve, position) = store.reserve_and_position(&asset, &user)?;
        let balance = position.supplied_balance.entry(asset).or_insert(zero);
        *balance = backend.add(balance, &effective);

        reserve.total_supplied = total_supplied;
        reserve.available_liquidity = liquidity;
        reserve.touch(ctx.now);

        Ok(PoolEvent::Supply { asset, user })
    }

    pub fn withdraw<B: FheBackend, P: PriceSource>(
        ctx: &EngineContext<'_, B, P>,
        store: &mut LedgerStore<B::Uint>,
        user: Address,
        asset: AssetId,
        amount: &B::Uint,
    ) -> LendingResult<PoolEvent> {
        let backend = ctx.backend;
        let reserve = store.reserve(&asset)?;
        reserve.require_active()?;
        reserve.require_unpaused()?;
        ctx.protocol.require_unpaused()?;

        let event = PoolEvent::Withdraw { asset, user };
        let Some(position) = store.position(&user) else {
            debug!(%asset, %user, "withdraw from untouched account");
            return Ok(event);
        };

        let balance = store.supplied_balance(&user, &asset).clone();
        let mut effective = backend.min(amount, &balance);

        if ctx.protocol.is_collateral_asset(&asset) && position.has_debt_exposure() {
            let debt = valuation::debt_value(ctx, position);
            let ceiling = valuation::withdraw_ceiling(
                backend,
                &balance,
                &debt,
                ctx.oracle.price(&asset),
                reserve.config.collateral_factor,
            );
            effective = backend.min(&effective, &ceiling);
        }

        // effective <= balance <= total_supplied
        let remaining = backend.sub(&balance, &effective);
        let total_supplied = backend.sub(&reserve.total_supplied, &effective);
        let liquidity = clamp::saturating_sub(backend, &total_supplied, &reserve.total_borrowed);

        let (reserve, position) = store.reserve_and_position(&asset, &user)?;
        position.supplied_balance.insert(asset, remaining);
        reserve.total_supplied = total_supplied;
        reserve.available_liquidity = liquidity;
        reserve.touch(ctx.now);

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ProtocolState;
    use crate::errors::LendingError;
    use crate::oracle::PriceOracle;
    use crate::reserve::{Reserve, ReserveConfig};
    use crate::types::PRICE_SCALE;
    use cipherlend_fhe::{ClearBackend, ClearU64};

    struct Fixture {
        backend: ClearBackend,
        oracle: PriceOracle,
        protocol: ProtocolState,
        store: LedgerStore<ClearU64>,
    }

    fn asset() -> AssetId {
        AssetId::from_label("A")
    }

    fn user() -> Address {
        Address([1u8; 32])
    }

    fn fixture(config: ReserveConfig) -> Fixture {
        let backend = ClearBackend;
        let mut store = LedgerStore::new(backend.trivial(0));
        store.insert_reserve(Reserve::new(asset(), config, store.zero(), 0));
        Fixture {
            backend,
            oracle: PriceOracle::new(Address([0u8; 32]), PRICE_SCALE),
            protocol: ProtocolState::default(),
            store,
        }
    }

    impl Fixture {
        fn supply(&mut self, amount: u64) -> LendingResult<PoolEvent> {
            let ctx = EngineContext {
                backend: &self.backend,
                oracle: &self.oracle,
                protocol: &self.protocol,
                now: 10,
            };
            SupplyEngine::supply(&ctx, &mut self.store, user(), asset(), &ClearU64::new(amount))
        }

        fn withdraw(&mut self, amount: u64) -> LendingResult<PoolEvent> {
            let ctx = EngineContext {
                backend: &self.backend,
                oracle: &self.oracle,
                protocol: &self.protocol,
                now: 20,
            };
            SupplyEngine::withdraw(&ctx, &mut self.store, user(), asset(), &ClearU64::new(amount))
        }

        fn balance(&self) -> u64 {
            self.store.supplied_balance(&user(), &asset()).value()
        }

        fn reserve(&self) -> &Reserve<ClearU64> {
            self.store.reserve(&asset()).unwrap()
        }
    }

    #[test]
    fn test_supply_credits_reserve_and_user() {
        let mut f = fixture(ReserveConfig::default());
        let event = f.supply(1_000).unwrap();

        assert_eq!(event, PoolEvent::Supply { asset: asset(), user: user() });
        assert_eq!(f.balance(), 1_000);
        assert_eq!(f.reserve().total_supplied.value(), 1_000);
        assert_eq!(f.reserve().available_liquidity.value(), 1_000);
        assert_eq!(f.reserve().last_update_timestamp, 10);
        assert!(f.store.position(&user()).unwrap().initialized);
    }

    #[test]
    fn test_supply_clamped_to_cap() {
        let mut f = fixture(ReserveConfig::default().with_supply_cap(1_500));
        f.supply(1_000).unwrap();
        f.supply(1_000).unwrap();
        f.supply(1_000).unwrap();

        assert_eq!(f.balance(), 1_500);
        assert_eq!(f.reserve().total_supplied.value(), 1_500);
    }

    #[test]
    fn test_supply_structural_rejections_write_nothing() {
        let mut f = fixture(ReserveConfig {
            active: false,
            ..Default::default()
        });
        assert_eq!(f.supply(5), Err(LendingError::ReserveNotActive));
        assert!(f.store.position(&user()).is_none());

        let mut f = fixture(ReserveConfig {
            is_paused: true,
            ..Default::default()
        });
        assert_eq!(f.supply(5), Err(LendingError::ReservePaused));

        let mut f = fixture(ReserveConfig::default());
        f.protocol.paused = true;
        assert_eq!(f.supply(5), Err(LendingError::ProtocolPaused));
        assert_eq!(f.reserve().total_supplied.value(), 0);
    }

    #[test]
    fn test_withdraw_capped_to_balance() {
        let mut f = fixture(ReserveConfig::default());
        f.supply(400).unwrap();
        f.withdraw(1_000).unwrap();

        assert_eq!(f.balance(), 0);
        assert_eq!(f.reserve().total_supplied.value(), 0);
        assert_eq!(f.reserve().last_update_timestamp, 20);
    }

    #[test]
    fn test_withdraw_without_position_is_noop() {
        let mut f = fixture(ReserveConfig::default());
        let event = f.withdraw(10).unwrap();

        assert_eq!(event, PoolEvent::Withdraw { asset: asset(), user: user() });
        assert!(f.store.position(&user()).is_none());
    }

    #[test]
    fn test_withdraw_collateral_respects_debt() {
        let mut f = fixture(ReserveConfig::collateral(7_500));
        f.protocol.collateral_asset = Some(asset());
        f.supply(1_000).unwrap();

        let debt_asset = AssetId::from_label("B");
        let position = f.store.position_or_init(&user());
        position.borrowed_balance.insert(debt_asset, ClearU64::new(600));
        position.current_debt_asset.occupy(debt_asset);

        f.withdraw(1_000).unwrap();
        assert_eq!(f.balance(), 800);

        f.withdraw(1).unwrap();
        assert_eq!(f.balance(), 800);
    }
}
