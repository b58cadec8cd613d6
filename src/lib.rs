//! cipherlend: confidential lending ledger
//!
//! Root crate that re-exports the ledger components for integration tests
//! and benchmarks.
//!
//! ## Crate Organization
//!
//! - `cipherlend-fhe`: encrypted u64 backends (TFHE-rs and clear) and the
//!   branchless clamp helpers
//! - `cipherlend-lending`: reserves, positions, engines and the pool
//! - `cipherlend-cli`: deployment files and the scenario simulator

pub use cipherlend_fhe as fhe;
pub use cipherlend_lending as lending;

/// cipherlend version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol-wide defaults
pub mod config {
    /// Fixed-point scale of oracle prices
    pub const PRICE_SCALE: u64 = cipherlend_lending::PRICE_SCALE;

    /// Basis points in one whole collateral factor
    pub const BPS: u16 = cipherlend_lending::BPS;

    /// FHE security parameter shipped by default
    pub const DEFAULT_SECURITY_BITS: u32 = 128;
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use cipherlend_fhe::{ClearBackend, ClearU64, Codec, FheBackend, FheConfig, KeyPair, TfheBackend};
    pub use cipherlend_lending::prelude::*;
}
