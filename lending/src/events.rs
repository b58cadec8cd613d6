//! Ledger events
//!
//! Events identify what happened and to whom. They never carry an amount,
//! encrypted or otherwise.

use serde::{Deserialize, Serialize};

use crate::types::{Address, AssetId};

/// Which admin setting a `ReserveConfigured` event refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReserveSetting {
    Initialized,
    Active(bool),
    Borrowing(bool),
    Collateral(bool),
    CollateralFactor(u16),
    SupplyCap(u64),
    BorrowCap(u64),
    Paused(bool),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEvent {
    Supply { asset: AssetId, user: Address },
    Withdraw { asset: AssetId, user: Address },
    Borrow { asset: AssetId, user: Address },
    Repay { asset: AssetId, user: Address },
    CollateralToggled { asset: AssetId, user: Address, enabled: bool },
    CollateralAssetSet { asset: AssetId, admin: Address },
    ReserveConfigured { asset: AssetId, admin: Address, setting: ReserveSetting },
    Paused { admin: Address },
    Unpaused { admin: Address },
}

impl PoolEvent {
    pub fn asset(&self) -> Option<&AssetId> {
        match self {
            PoolEvent::Supply { asset, .. }
            | PoolEvent::Withdraw { asset, .. }
            | PoolEvent::Borrow { asset, .. }
            | PoolEvent::Repay { asset, .. }
            | PoolEvent::CollateralToggled { asset, .. }
            | PoolEvent::CollateralAssetSet { asset, .. }
            | PoolEvent::ReserveConfigured { asset, .. } => Some(asset),
            PoolEvent::Paused { .. } | PoolEvent::Unpaused { .. } => None,
        }
    }

    /// Account that triggered the event
    pub fn account(&self) -> &Address {
        match self {
            PoolEvent::Supply { user, .. }
            | PoolEvent::Withdraw { user, .. }
            | PoolEvent::Borrow { user, .. }
            | PoolEvent::Repay { user, .. }
            | PoolEvent::CollateralToggled { user, .. } => user,
            PoolEvent::CollateralAssetSet { admin, .. }
            | PoolEvent::ReserveConfigured { admin, .. }
            | PoolEvent::Paused { admin }
            | PoolEvent::Unpaused { admin } => admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let asset = AssetId::from_label("A");
        let user = Address([3u8; 32]);
        let admin = Address([4u8; 32]);

        let supply = PoolEvent::Supply { asset, user };
        assert_eq!(supply.asset(), Some(&asset));
        assert_eq!(supply.account(), &user);

        let paused = PoolEvent::Paused { admin };
        assert_eq!(paused.asset(), None);
        assert_eq!(paused.account(), &admin);
    }
}
