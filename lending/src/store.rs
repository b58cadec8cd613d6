//! Reserve & position store
//!
//! Plain record keeping. Business rules live in the engines and the pool.

use std::collections::HashMap;

use crate::errors::{LendingError, LendingResult};
use crate::position::UserPosition;
use crate::reserve::Reserve;
use crate::types::{Address, AssetId};

#[derive(Clone, Debug)]
pub struct LedgerStore<U> {
    reserves: HashMap<AssetId, Reserve<U>>,
    positions: HashMap<Address, UserPosition<U>>,
    /// Encrypted zero every fresh balance starts from
    zero: U,
}

impl<U: Clone> LedgerStore<U> {
    pub fn new(zero: U) -> Self {
        Self {
            reserves: HashMap::new(),
            positions: HashMap::new(),
            zero,
        }
    }

    pub fn zero(&self) -> &U {
        &self.zero
    }

    pub fn contains_reserve(&self, asset: &AssetId) -> bool {
        self.reserves.contains_key(asset)
    }

    pub fn reserve(&self, asset: &AssetId) -> LendingResult<&Reserve<U>> {
        self.reserves
            .get(asset)
            .ok_or(LendingError::ReserveNotFound(*asset))
    }

    pub fn reserve_mut(&mut self, asset: &AssetId) -> LendingResult<&mut Reserve<U>> {
        self.reserves
            .get_mut(asset)
            .ok_or(LendingError::ReserveNotFound(*asset))
    }

    pub fn insert_reserve(&mut self, reserve: Reserve<U>) {
        self.reserves.insert(reserve.underlying_asset, reserve);
    }

    pub fn reserve_assets(&self) -> impl Iterator<Item = &AssetId> {
        self.reserves.keys()
    }

    pub fn position(&self, user: &Address) -> Option<&UserPosition<U>> {
        self.positions.get(user)
    }

    /// First touch creates and initializes the record.
    pub fn position_or_init(&mut self, user: &Address) -> &mut UserPosition<U> {
        let position = self.positions.entry(*user).or_default();
        position.initialized = true;
        position
    }

    /// Split borrow of a reserve and a position for engines that write both.
    pub fn reserve_and_position(
        &mut self,
        asset: &AssetId,
        user: &Address,
    ) -> LendingResult<(&mut Reserve<U>, &mut UserPosition<U>)> {
        let reserve = self
            .reserves
            .get_mut(asset)
            .ok_or(LendingError::ReserveNotFound(*asset))?;
        let position = self.positions.entry(*user).or_default();
        position.initialized = true;
        Ok((reserve, position))
    }

    /// Encrypted balance or the shared zero
    pub fn supplied_balance(&self, user: &Address, asset: &AssetId) -> &U {
        self.position(user)
            .and_then(|p| p.supplied(asset))
            .unwrap_or(&self.zero)
    }

    pub fn borrowed_balance(&self, user: &Address, asset: &AssetId) -> &U {
        self.position(user)
            .and_then(|p| p.borrowed(asset))
            .unwrap_or(&self.zero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reserve::ReserveConfig;

    #[test]
    fn test_missing_reserve() {
        let store = LedgerStore::new(0u64);
        let asset = AssetId::from_label("NOPE");
        assert_eq!(store.reserve(&asset).err(), Some(LendingError::ReserveNotFound(asset)));
    }

    #[test]
    fn test_position_created_on_first_touch() {
        let mut store = LedgerStore::new(0u64);
        let user = Address([7u8; 32]);
        assert!(store.position(&user).is_none());

        store.position_or_init(&user);
        assert!(store.position(&user).unwrap().initialized);
    }

    #[test]
    fn test_balances_default_to_zero() {
        let mut store = LedgerStore::new(0u64);
        let asset = AssetId::from_label("A");
        let user = Address([7u8; 32]);
        store.insert_reserve(Reserve::new(asset, ReserveConfig::default(), &0, 0));

        let (_, position) = store.reserve_and_position(&asset, &user).unwrap();
        position.supplied_balance.insert(asset, 40);

        assert_eq!(*store.supplied_balance(&user, &asset), 40);
        assert_eq!(*store.borrowed_balance(&user, &asset), 0);
        assert_eq!(store.reserve_assets().count(), 1);
    }
}
