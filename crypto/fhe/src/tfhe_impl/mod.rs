//! TFHE-rs implementation
//!
//! Radix ciphertexts from TFHE-rs behind the `FheBackend` seam.

mod backend;
mod ciphertext;
mod keys;

pub use backend::TfheBackend;
pub use ciphertext::{EncryptedBool, EncryptedU64};
pub use keys::{ClientKey, KeyPair, ServerKey};
