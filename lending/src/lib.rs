//! cipherlend ledger core
//!
//! A lending pool whose balances and aggregates are encrypted integers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     LendingPool                           │
//! │  roles · oracle · ProtocolState · events · clock         │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌──────────────────┐        ┌──────────────────┐        │
//! │  │  SupplyEngine    │        │  BorrowEngine    │        │
//! │  │  supply/withdraw │        │  borrow/repay    │        │
//! │  └────────┬─────────┘        └────────┬─────────┘        │
//! │           └────────────┬──────────────┘                  │
//! │                        ▼                                 │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  LedgerStore: reserves + positions (FheBackend)    │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Features
//!
//! - **Clamp, don't reject**: amount-dependent limits (caps, balances,
//!   borrowing power) are applied obliviously; only public facts fail a call
//! - **Single debt slot**: each user owes at most one asset at a time
//! - **Designated collateral**: one protocol-wide asset backs every loan
//! - **Amount-free events**: events carry `(asset, account)` only

pub mod borrow;
pub mod clock;
pub mod configurator;
pub mod context;
pub mod errors;
pub mod events;
pub mod oracle;
pub mod pool;
pub mod position;
pub mod reserve;
pub mod roles;
pub mod shared;
pub mod store;
pub mod supply;
pub mod types;
pub mod valuation;

// Re-export main types
pub use borrow::BorrowEngine;
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{EngineContext, ProtocolState};
pub use errors::{LendingError, LendingResult};
pub use events::{PoolEvent, ReserveSetting};
pub use oracle::{PriceOracle, PriceSource};
pub use pool::LendingPool;
pub use position::{DebtSlot, UserPosition};
pub use reserve::{Reserve, ReserveConfig};
pub use roles::{Role, RoleRegistry};
pub use shared::SharedPool;
pub use store::LedgerStore;
pub use supply::SupplyEngine;
pub use types::{Address, AssetId, BPS, PRICE_SCALE};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::errors::{LendingError, LendingResult};
    pub use crate::events::PoolEvent;
    pub use crate::oracle::{PriceOracle, PriceSource};
    pub use crate::pool::LendingPool;
    pub use crate::position::DebtSlot;
    pub use crate::reserve::ReserveConfig;
    pub use crate::roles::{Role, RoleRegistry};
    pub use crate::shared::SharedPool;
    pub use crate::types::{Address, AssetId, PRICE_SCALE};
}
