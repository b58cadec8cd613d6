//! Reserve records
//!
//! One reserve per listed asset. Aggregates are encrypted; flags, factor
//! and caps are public admin settings.

use serde::{Deserialize, Serialize};

use crate::errors::{LendingError, LendingResult};
use crate::types::{AssetId, BPS};

/// Public admin settings of a reserve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveConfig {
    pub active: bool,
    pub borrowing_enabled: bool,
    pub is_collateral: bool,
    pub is_paused: bool,
    /// Basis points applied to this asset's value when it backs a loan
    pub collateral_factor: u16,
    /// 0 means unlimited
    pub supply_cap: u64,
    /// 0 means unlimited
    pub borrow_cap: u64,
}

impl Default for ReserveConfig {
    fn default() -> Self {
        Self {
            active: true,
            borrowing_enabled: false,
            is_collateral: false,
            is_paused: false,
            collateral_factor: 0,
            supply_cap: 0,
            borrow_cap: 0,
        }
    }
}

impl ReserveConfig {
    /// A borrowable, non-collateral reserve
    pub fn borrowable() -> Self {
        Self {
            borrowing_enabled: true,
            ..Default::default()
        }
    }

    /// A collateral reserve weighted at `collateral_factor` bps
    pub fn collateral(collateral_factor: u16) -> Self {
        Self {
            is_collateral: true,
            collateral_factor,
            ..Default::default()
        }
    }

    pub fn with_borrowing(mut self, enabled: bool) -> Self {
        self.borrowing_enabled = enabled;
        self
    }

    pub fn with_supply_cap(mut self, cap: u64) -> Self {
        self.supply_cap = cap;
        self
    }

    pub fn with_borrow_cap(mut self, cap: u64) -> Self {
        self.borrow_cap = cap;
        self
    }

    /// Collateral reserves weigh in (0, 10000] bps, all others exactly 0.
    pub fn validate(&self) -> LendingResult<()> {
        let factor = self.collateral_factor;
        let valid = if self.is_collateral {
            factor > 0 && factor <= BPS
        } else {
            factor == 0
        };
        if !valid {
            return Err(LendingError::InvalidCollateralFactor { factor });
        }
        Ok(())
    }
}

/// Ledger record for one asset, generic over the ciphertext type
#[derive(Clone, Debug)]
pub struct Reserve<U> {
    pub underlying_asset: AssetId,
    pub total_supplied: U,
    pub total_borrowed: U,
    /// `total_supplied - total_borrowed`, floored at zero
    pub available_liquidity: U,
    pub last_update_timestamp: u64,
    pub config: ReserveConfig,
}

impl<U: Clone> Reserve<U> {
    pub fn new(underlying_asset: AssetId, config: ReserveConfig, zero: &U, now: u64) -> Self {
        Self {
            underlying_asset,
            total_supplied: zero.clone(),
            total_borrowed: zero.clone(),
            available_liquidity: zero.clone(),
            last_update_timestamp: now,
            config,
        }
    }

    pub fn require_active(&self) -> LendingResult<()> {
        if !self.config.active {
            return Err(LendingError::ReserveNotActive);
        }
        Ok(())
    }

    pub fn require_unpaused(&self) -> LendingResult<()> {
        if self.config.is_paused {
            return Err(LendingError::ReservePaused);
        }
        Ok(())
    }

    pub fn touch(&mut self, now: u64) {
        self.last_update_timestamp = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collateral_factor_range() {
        assert!(ReserveConfig::collateral(7_500).validate().is_ok());
        assert!(ReserveConfig::collateral(10_000).validate().is_ok());
        assert_eq!(
            ReserveConfig::collateral(0).validate(),
            Err(LendingError::InvalidCollateralFactor { factor: 0 })
        );
        assert_eq!(
            ReserveConfig::collateral(10_001).validate(),
            Err(LendingError::InvalidCollateralFactor { factor: 10_001 })
        );
    }

    #[test]
    fn test_non_collateral_factor_must_be_zero() {
        assert!(ReserveConfig::borrowable().validate().is_ok());

        let config = ReserveConfig {
            collateral_factor: 5_000,
            ..ReserveConfig::borrowable()
        };
        assert_eq!(
            config.validate(),
            Err(LendingError::InvalidCollateralFactor { factor: 5_000 })
        );
    }

    #[test]
    fn test_flag_checks() {
        let mut reserve = Reserve::new(AssetId::from_label("A"), ReserveConfig::default(), &0u64, 7);
        assert!(reserve.require_active().is_ok());
        assert!(reserve.require_unpaused().is_ok());

        reserve.config.active = false;
        reserve.config.is_paused = true;
        assert_eq!(reserve.require_active(), Err(LendingError::ReserveNotActive));
        assert_eq!(reserve.require_unpaused(), Err(LendingError::ReservePaused));
        assert_eq!(reserve.last_update_timestamp, 7);
    }
}
