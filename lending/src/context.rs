//! Protocol-wide state and the read-only context engines run against

use cipherlend_fhe::FheBackend;

use crate::errors::{LendingError, LendingResult};
use crate::oracle::PriceSource;
use crate::types::AssetId;

/// Global admin state owned by the pool
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProtocolState {
    /// Emergency pause
    pub paused: bool,
    /// The single asset users may opt into as collateral
    pub collateral_asset: Option<AssetId>,
}

impl ProtocolState {
    pub fn require_unpaused(&self) -> LendingResult<()> {
        if self.paused {
            return Err(LendingError::ProtocolPaused);
        }
        Ok(())
    }

    pub fn is_collateral_asset(&self, asset: &AssetId) -> bool {
        self.collateral_asset.as_ref() == Some(asset)
    }
}

/// Everything an engine may read but not own
pub struct EngineContext<'a, B: FheBackend, P: PriceSource> {
    pub backend: &'a B,
    pub oracle: &'a P,
    pub protocol: &'a ProtocolState,
    pub now: u64,
}
