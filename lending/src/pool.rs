//! Lending pool
//!
//! Owns every piece of ledger state and is the only entry point that writes
//! it. Each call checks roles and structural preconditions, runs an engine
//! against an `EngineContext`, then records the resulting event.

use cipherlend_fhe::FheBackend;
use tracing::{debug, info, warn};

use crate::borrow::BorrowEngine;
use crate::clock::{Clock, SystemClock};
use crate::context::{EngineContext, ProtocolState};
use crate::errors::{LendingError, LendingResult};
use crate::events::PoolEvent;
use crate::oracle::{PriceOracle, PriceSource};
use crate::position::UserPosition;
use crate::reserve::Reserve;
use crate::roles::{Role, RoleRegistry};
use crate::store::LedgerStore;
use crate::supply::SupplyEngine;
use crate::types::{Address, AssetId};

/// The confidential lending pool
///
/// Events accumulate in memory until `drain_events` is called; a long-lived
/// pool must be drained by its owner.
pub struct LendingPool<B: FheBackend, P: PriceSource = PriceOracle> {
    pub(crate) backend: B,
    pub(crate) oracle: P,
    pub(crate) roles: RoleRegistry,
    pub(crate) protocol: ProtocolState,
    pub(crate) store: LedgerStore<B::Uint>,
    pub(crate) events: Vec<PoolEvent>,
    pub(crate) clock: Box<dyn Clock>,
}

impl<B: FheBackend, P: PriceSource> LendingPool<B, P> {
    /// Create an empty, unpaused pool with no reserves.
    pub fn new(backend: B, oracle: P, roles: RoleRegistry) -> Self {
        backend.activate();
        let zero = backend.trivial(0);
        Self {
            backend,
            oracle,
            roles,
            protocol: ProtocolState::default(),
            store: LedgerStore::new(zero),
            events: Vec::new(),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    // ===== User operations =====

    /// Deposit `amount` of `asset`, clamped to the supply cap headroom.
    pub fn supply(&mut self, user: Address, asset: AssetId, amount: &B::Uint) -> LendingResult<PoolEvent> {
        let outcome = self.run_engine(|ctx, store| SupplyEngine::supply(ctx, store, user, asset, amount));
        self.commit("supply", outcome)
    }

    /// Withdraw up to `amount` of `asset`.
    ///
    /// For the collateral asset of an indebted user the amount is further
    /// limited so that the remaining collateral still covers the debt.
    pub fn withdraw(&mut self, user: Address, asset: AssetId, amount: &B::Uint) -> LendingResult<PoolEvent> {
        let outcome = self.run_engine(|ctx, store| SupplyEngine::withdraw(ctx, store, user, asset, amount));
        self.commit("withdraw", outcome)
    }

    /// Borrow up to `amount` of `asset` against the designated collateral.
    pub fn borrow(&mut self, user: Address, asset: AssetId, amount: &B::Uint) -> LendingResult<PoolEvent> {
        let outcome = self.run_engine(|ctx, store| BorrowEngine::borrow(ctx, store, user, asset, amount));
        self.commit("borrow", outcome)
    }

    /// Repay up to `amount` of the outstanding debt in `asset`.
    ///
    /// Only `is_repaying_all` releases the debt slot.
    pub fn repay(
        &mut self,
        user: Address,
        asset: AssetId,
        amount: &B::Uint,
        is_repaying_all: bool,
    ) -> LendingResult<PoolEvent> {
        let outcome = self.run_engine(|ctx, store| {
            BorrowEngine::repay(ctx, store, user, asset, amount, is_repaying_all)
        });
        self.commit("repay", outcome)
    }

    /// Opt in or out of using the designated collateral asset.
    pub fn set_user_use_reserve_as_collateral(
        &mut self,
        user: Address,
        asset: AssetId,
        enabled: bool,
    ) -> LendingResult<PoolEvent> {
        let outcome = self.toggle_collateral(user, asset, enabled);
        self.commit("set_user_use_reserve_as_collateral", outcome)
    }

    fn toggle_collateral(&mut self, user: Address, asset: AssetId, enabled: bool) -> LendingResult<PoolEvent> {
        let reserve = self.store.reserve(&asset)?;
        if !self.protocol.is_collateral_asset(&asset) {
            return Err(LendingError::NotTheDesignatedCollateral);
        }
        if !reserve.config.is_collateral {
            return Err(LendingError::ReserveNotCollateral);
        }
        if enabled && reserve.config.collateral_factor == 0 {
            return Err(LendingError::InvalidCollateralFactor { factor: 0 });
        }
        reserve.require_active()?;
        self.protocol.require_unpaused()?;

        self.store
            .position_or_init(&user)
            .set_collateral_enabled(asset, enabled);
        Ok(PoolEvent::CollateralToggled { asset, user, enabled })
    }

    // ===== Protocol administration =====

    /// Designate the single asset users may borrow against.
    pub fn set_collateral_asset(&mut self, caller: Address, asset: AssetId) -> LendingResult<PoolEvent> {
        let outcome = self.designate_collateral(caller, asset);
        self.commit("set_collateral_asset", outcome)
    }

    fn designate_collateral(&mut self, caller: Address, asset: AssetId) -> LendingResult<PoolEvent> {
        self.roles.require_role(Role::PoolAdmin, &caller)?;
        let config = self.store.reserve(&asset)?.config;
        if !config.is_collateral {
            return Err(LendingError::ReserveNotCollateral);
        }
        if config.collateral_factor == 0 {
            return Err(LendingError::InvalidCollateralFactor { factor: 0 });
        }
        self.protocol.collateral_asset = Some(asset);
        Ok(PoolEvent::CollateralAssetSet { asset, admin: caller })
    }

    /// Halt every user operation. Pausing a paused pool is accepted.
    pub fn pause(&mut self, caller: Address) -> LendingResult<PoolEvent> {
        let outcome = self.set_paused(caller, true);
        self.commit("pause", outcome)
    }

    pub fn unpause(&mut self, caller: Address) -> LendingResult<PoolEvent> {
        let outcome = self.set_paused(caller, false);
        self.commit("unpause", outcome)
    }

    fn set_paused(&mut self, caller: Address, paused: bool) -> LendingResult<PoolEvent> {
        self.roles.require_role(Role::EmergencyAdmin, &caller)?;
        self.protocol.paused = paused;
        warn!(admin = %caller, paused, "protocol pause state set");
        Ok(if paused {
            PoolEvent::Paused { admin: caller }
        } else {
            PoolEvent::Unpaused { admin: caller }
        })
    }

    pub fn grant_role(&mut self, caller: &Address, role: Role, account: Address) -> LendingResult<bool> {
        self.roles.grant_role(caller, role, account)
    }

    pub fn revoke_role(&mut self, caller: &Address, role: Role, account: &Address) -> LendingResult<bool> {
        self.roles.revoke_role(caller, role, account)
    }

    // ===== Getters =====

    pub fn reserve_data(&self, asset: &AssetId) -> LendingResult<&Reserve<B::Uint>> {
        self.store.reserve(asset)
    }

    pub fn reserve_assets(&self) -> impl Iterator<Item = &AssetId> {
        self.store.reserve_assets()
    }

    pub fn user_position(&self, user: &Address) -> Option<&UserPosition<B::Uint>> {
        self.store.position(user)
    }

    /// Encrypted supplied balance, or a trivial zero for untouched accounts
    pub fn user_supplied_balance(&self, user: &Address, asset: &AssetId) -> &B::Uint {
        self.store.supplied_balance(user, asset)
    }

    /// Encrypted borrowed balance, or a trivial zero for untouched accounts
    pub fn user_borrowed_balance(&self, user: &Address, asset: &AssetId) -> &B::Uint {
        self.store.borrowed_balance(user, asset)
    }

    pub fn is_paused(&self) -> bool {
        self.protocol.paused
    }

    pub fn collateral_asset(&self) -> Option<AssetId> {
        self.protocol.collateral_asset
    }

    pub fn protocol(&self) -> &ProtocolState {
        &self.protocol
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.roles.has_role(role, account)
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    pub fn oracle(&self) -> &P {
        &self.oracle
    }

    /// Feeder and owner checks are enforced by the oracle itself.
    pub fn oracle_mut(&mut self) -> &mut P {
        &mut self.oracle
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Every event emitted so far, oldest first
    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    /// Hand over and forget every recorded event. Nothing else trims the log.
    pub fn drain_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }

    // ===== Internals =====

    fn run_engine<F>(&mut self, engine: F) -> LendingResult<PoolEvent>
    where
        F: FnOnce(&EngineContext<'_, B, P>, &mut LedgerStore<B::Uint>) -> LendingResult<PoolEvent>,
    {
        self.backend.activate();
        let ctx = EngineContext {
            backend: &self.backend,
            oracle: &self.oracle,
            protocol: &self.protocol,
            now: self.clock.now(),
        };
        engine(&ctx, &mut self.store)
    }

    pub(crate) fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Record a successful call's event, or log why it was refused.
    pub(crate) fn commit(
        &mut self,
        operation: &'static str,
        outcome: LendingResult<PoolEvent>,
    ) -> LendingResult<PoolEvent> {
        match outcome {
            Ok(event) => {
                info!(
                    operation,
                    asset = ?event.asset(),
                    account = %event.account(),
                    "ledger updated"
                );
                self.events.push(event);
                Ok(event)
            }
            Err(err) => {
                debug!(operation, error = %err, "call rejected");
                Err(err)
            }
        }
    }
}
