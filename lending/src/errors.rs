//! Lending Error Types
//!
//! Only structural and authorization failures live here. Anything that
//! depends on an encrypted amount is clamped by the engines instead.

use cipherlend_fhe::FheError;
use thiserror::Error;

use crate::roles::Role;
use crate::types::{Address, AssetId};

/// Errors that abort a ledger call before anything is written
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LendingError {
    // Authorization
    #[error("Account {account} is missing role {role:?}")]
    MissingRole { role: Role, account: Address },

    #[error("Account {0} is not an authorized price feeder")]
    NotAuthorizedFeeder(Address),

    #[error("Only the oracle owner may do this")]
    NotOracleOwner,

    // Reserve state
    #[error("Reserve not found: {0}")]
    ReserveNotFound(AssetId),

    #[error("Reserve already initialized: {0}")]
    ReserveAlreadyInitialized(AssetId),

    #[error("Reserve is not active")]
    ReserveNotActive,

    #[error("Reserve is paused")]
    ReservePaused,

    #[error("Borrowing is not enabled on this reserve")]
    BorrowingNotEnabled,

    #[error("Reserve cannot be used as collateral")]
    ReserveNotCollateral,

    #[error("Invalid collateral factor: {factor} bps")]
    InvalidCollateralFactor { factor: u16 },

    // Protocol state
    #[error("Protocol is paused")]
    ProtocolPaused,

    #[error("Asset is not the designated collateral asset")]
    NotTheDesignatedCollateral,

    // Positions
    #[error("Collateral is not enabled for this account")]
    NoCollateralEnabled,

    #[error("Oracle price is zero for {0}")]
    OraclePriceZero(AssetId),

    #[error("Account already owes a different asset")]
    MultipleDebtsNotAllowed,

    #[error("Repayment asset does not match the outstanding debt asset")]
    InvalidDebtRepayment,

    // FHE
    #[error("FHE error: {0}")]
    Fhe(#[from] FheError),
}

/// Result type for ledger operations
pub type LendingResult<T> = Result<T, LendingError>;
