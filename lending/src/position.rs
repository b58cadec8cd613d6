//! Per-user positions

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::AssetId;

/// The one asset a user currently owes, if any.
///
/// Moving back to `None` is never a side effect of a balance reaching zero:
/// only `clear` does it, and only a repay flagged as repaying all calls it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebtSlot {
    #[default]
    None,
    Asset(AssetId),
}

impl DebtSlot {
    pub fn asset(&self) -> Option<&AssetId> {
        match self {
            DebtSlot::None => None,
            DebtSlot::Asset(asset) => Some(asset),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, DebtSlot::None)
    }

    /// A new borrow of `asset` fits this slot.
    pub fn admits(&self, asset: &AssetId) -> bool {
        match self {
            DebtSlot::None => true,
            DebtSlot::Asset(current) => current == asset,
        }
    }

    pub fn occupy(&mut self, asset: AssetId) {
        *self = DebtSlot::Asset(asset);
    }

    pub fn clear(&mut self) {
        *self = DebtSlot::None;
    }
}

/// A user's balances, collateral opt-ins and debt slot
#[derive(Clone, Debug)]
pub struct UserPosition<U> {
    pub initialized: bool,
    pub supplied_balance: BTreeMap<AssetId, U>,
    pub borrowed_balance: BTreeMap<AssetId, U>,
    pub collateral_enabled: BTreeSet<AssetId>,
    pub current_debt_asset: DebtSlot,
}

impl<U> Default for UserPosition<U> {
    fn default() -> Self {
        Self {
            initialized: false,
            supplied_balance: BTreeMap::new(),
            borrowed_balance: BTreeMap::new(),
            collateral_enabled: BTreeSet::new(),
            current_debt_asset: DebtSlot::None,
        }
    }
}

impl<U: Clone> UserPosition<U> {
    pub fn supplied(&self, asset: &AssetId) -> Option<&U> {
        self.supplied_balance.get(asset)
    }

    pub fn borrowed(&self, asset: &AssetId) -> Option<&U> {
        self.borrowed_balance.get(asset)
    }

    pub fn is_collateral_enabled(&self, asset: &AssetId) -> bool {
        self.collateral_enabled.contains(asset)
    }

    pub fn set_collateral_enabled(&mut self, asset: AssetId, enabled: bool) {
        if enabled {
            self.collateral_enabled.insert(asset);
        } else {
            self.collateral_enabled.remove(&asset);
        }
    }

    /// Whether any borrowed balance could be non-zero.
    ///
    /// A repay flagged as repaying all clears the slot without inspecting the
    /// encrypted remainder, so balances that were ever borrowed still count.
    pub fn has_debt_exposure(&self) -> bool {
        !self.current_debt_asset.is_none() || !self.borrowed_balance.is_empty()
    }

    /// A new borrow of `asset` keeps the user on a single debt asset.
    ///
    /// Besides the slot, every borrowed balance must be in `asset`: one left
    /// behind by a cleared slot may still hold a residual, and which assets
    /// carry a balance is public.
    pub fn admits_debt(&self, asset: &AssetId) -> bool {
        self.current_debt_asset.admits(asset) && self.borrowed_balance.keys().all(|owed| owed == asset)
    }
}
