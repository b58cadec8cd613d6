//! FHE Ciphertext types with TFHE-rs
//!
//! `EncryptedU64` is the handle type for every balance and total the
//! ledger stores.

use tfhe::prelude::*;
use tfhe::{FheBool as TfheFheBool, FheUint64 as TfheFheUint64};

use super::keys::ClientKey;
use crate::{FheError, FheResult};

/// Encrypted 64-bit unsigned integer
#[derive(Clone)]
pub struct EncryptedU64 {
    inner: TfheFheUint64,
}

impl EncryptedU64 {
    /// Encrypt a u64 value with client key
    pub fn encrypt(value: u64, client_key: &ClientKey) -> Self {
        Self {
            inner: TfheFheUint64::encrypt(value, client_key.inner()),
        }
    }

    /// Public constant; carries no secret
    pub fn trivial(value: u64) -> Self {
        Self {
            inner: TfheFheUint64::encrypt_trivial(value),
        }
    }

    /// Decrypt to u64 using client key
    pub fn decrypt(&self, client_key: &ClientKey) -> u64 {
        self.inner.decrypt(client_key.inner())
    }

    pub fn inner(&self) -> &TfheFheUint64 {
        &self.inner
    }

    pub fn from_tfhe(inner: TfheFheUint64) -> Self {
        Self { inner }
    }

    /// Serialize for storage/transmission
    pub fn to_bytes(&self) -> FheResult<Vec<u8>> {
        bincode::serialize(&self.inner).map_err(|e| FheError::SerializationError(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> FheResult<Self> {
        let inner: TfheFheUint64 =
            bincode::deserialize(bytes).map_err(|e| FheError::SerializationError(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Opaque identifier of this ciphertext, for display and lookups.
    pub fn handle(&self) -> FheResult<[u8; 32]> {
        Ok(blake3::hash(&self.to_bytes()?).into())
    }
}

impl std::fmt::Debug for EncryptedU64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptedU64(<encrypted>)")
    }
}

/// Encrypted boolean for comparison results
#[derive(Clone)]
pub struct EncryptedBool {
    inner: TfheFheBool,
}

impl EncryptedBool {
    pub fn from_tfhe(inner: TfheFheBool) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &TfheFheBool {
        &self.inner
    }

    pub fn decrypt(&self, client_key: &ClientKey) -> bool {
        self.inner.decrypt(client_key.inner())
    }
}

impl std::fmt::Debug for EncryptedBool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptedBool(<encrypted>)")
    }
}
