//! cipherlend FHE layer
//!
//! Encrypted 64-bit integers for the confidential lending ledger.
//!
//! # Key Features:
//! - `FheBackend`: the seam the ledger computes through (add, sub,
//!   comparisons, select, min, scaled multiply-divide)
//! - `TfheBackend`: TFHE-rs ciphertexts, server key installed per thread
//! - `ClearBackend`: transparent values with identical semantics, for
//!   simulation and fast tests
//! - `clamp`: branchless min/headroom/saturating helpers shared by every
//!   engine of the ledger
//!
//! # Architecture:
//! - ClientKey: encrypts inputs and decrypts balances (held by the user)
//! - ServerKey: evaluates circuits (held by the ledger)

pub mod backend;
pub mod clamp;
pub mod clear;
pub mod errors;
mod tfhe_impl;

pub use backend::{Codec, FheBackend};
pub use clear::{ClearBackend, ClearBool, ClearU64};
pub use errors::FheError;
pub use tfhe_impl::{ClientKey, EncryptedBool, EncryptedU64, KeyPair, ServerKey, TfheBackend};

/// FHE Configuration
#[derive(Clone, Debug)]
pub struct FheConfig {
    /// Security parameter (bits)
    pub security_bits: u32,
}

impl Default for FheConfig {
    fn default() -> Self {
        Self { security_bits: 128 }
    }
}

impl FheConfig {
    /// Only the default 128-bit parameter set is shipped.
    pub fn validate(&self) -> FheResult<()> {
        if self.security_bits != 128 {
            return Err(FheError::ConfigError(format!(
                "unsupported security level: {} bits",
                self.security_bits
            )));
        }
        Ok(())
    }
}

/// Result type for FHE operations
pub type FheResult<T> = Result<T, FheError>;
