//! Price oracle
//!
//! Per-asset prices written by authorized feeders, with a fallback used for
//! assets that have no feed yet. A price of zero is the "unset or failed"
//! sentinel; the borrow engine refuses to price a loan with it.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::errors::{LendingError, LendingResult};
use crate::types::{Address, AssetId};

/// Anything that can price an asset in `PRICE_SCALE` fixed point
pub trait PriceSource: Send + Sync {
    fn price(&self, asset: &AssetId) -> u64;
}

#[derive(Clone, Debug)]
pub struct PriceOracle {
    owner: Address,
    feeders: HashSet<Address>,
    prices: HashMap<AssetId, u64>,
    fallback_price: u64,
}

impl PriceOracle {
    pub fn new(owner: Address, fallback_price: u64) -> Self {
        Self {
            owner,
            feeders: HashSet::new(),
            prices: HashMap::new(),
            fallback_price,
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    fn require_owner(&self, caller: &Address) -> LendingResult<()> {
        if caller != &self.owner {
            return Err(LendingError::NotOracleOwner);
        }
        Ok(())
    }

    pub fn add_feeder(&mut self, caller: &Address, feeder: Address) -> LendingResult<()> {
        self.require_owner(caller)?;
        self.feeders.insert(feeder);
        Ok(())
    }

    pub fn remove_feeder(&mut self, caller: &Address, feeder: &Address) -> LendingResult<()> {
        self.require_owner(caller)?;
        self.feeders.remove(feeder);
        Ok(())
    }

    pub fn is_feeder(&self, account: &Address) -> bool {
        self.feeders.contains(account)
    }

    pub fn set_fallback_price(&mut self, caller: &Address, price: u64) -> LendingResult<()> {
        self.require_owner(caller)?;
        self.fallback_price = price;
        Ok(())
    }

    pub fn fallback_price(&self) -> u64 {
        self.fallback_price
    }

    pub fn set_price(&mut self, caller: &Address, asset: AssetId, price: u64) -> LendingResult<()> {
        if !self.is_feeder(caller) {
            return Err(LendingError::NotAuthorizedFeeder(*caller));
        }
        debug!(%asset, price, "price updated");
        self.prices.insert(asset, price);
        Ok(())
    }

    /// Whether the asset has its own feed rather than the fallback
    pub fn has_feed(&self, asset: &AssetId) -> bool {
        self.prices.contains_key(asset)
    }
}

impl PriceSource for PriceOracle {
    fn price(&self, asset: &AssetId) -> u64 {
        self.prices.get(asset).copied().unwrap_or(self.fallback_price)
    }
}
