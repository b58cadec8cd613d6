//! FHE Key Management with TFHE-rs
//!
//! - ClientKey: encrypts inputs and decrypts balances (held by the user)
//! - ServerKey: evaluates circuits on ciphertexts (held by the ledger)

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tfhe::{generate_keys, ConfigBuilder};
use tfhe::{ClientKey as TfheClientKey, ServerKey as TfheServerKey};

use crate::{FheConfig, FheResult};

static NEXT_KEY_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    // TFHE-rs keeps the evaluation key per thread.
    static INSTALLED_KEY: Cell<u64> = const { Cell::new(0) };
}

fn config_hash(config: &FheConfig) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"cipherlend-fhe");
    hasher.update(&config.security_bits.to_le_bytes());
    *hasher.finalize().as_bytes()
}

/// Client key for encryption and decryption
/// This key must be kept secret by the balance owner
#[derive(Clone)]
pub struct ClientKey {
    pub(crate) inner: TfheClientKey,
    config_hash: [u8; 32],
}

impl ClientKey {
    /// Derive the matching server key
    pub fn derive_server_key(&self) -> ServerKey {
        ServerKey::from_tfhe(TfheServerKey::new(&self.inner), self.config_hash)
    }

    pub fn inner(&self) -> &TfheClientKey {
        &self.inner
    }
}

impl std::fmt::Debug for ClientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientKey")
            .field("config_hash", &hex::encode(&self.config_hash[..8]))
            .finish()
    }
}

/// Server key for homomorphic operations
#[derive(Clone)]
pub struct ServerKey {
    inner: Arc<TfheServerKey>,
    key_id: u64,
    config_hash: [u8; 32],
}

impl ServerKey {
    fn from_tfhe(inner: TfheServerKey, config_hash: [u8; 32]) -> Self {
        Self {
            inner: Arc::new(inner),
            key_id: NEXT_KEY_ID.fetch_add(1, Ordering::Relaxed),
            config_hash,
        }
    }

    /// Verify this key matches the expected configuration
    pub fn verify_config(&self, config: &FheConfig) -> bool {
        config_hash(config) == self.config_hash
    }

    /// Install this key for the calling thread. Cheap when already installed.
    pub fn install(&self) {
        INSTALLED_KEY.with(|installed| {
            if installed.get() != self.key_id {
                tfhe::set_server_key((*self.inner).clone());
                installed.set(self.key_id);
            }
        });
    }
}

impl std::fmt::Debug for ServerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerKey")
            .field("key_id", &self.key_id)
            .field("config_hash", &hex::encode(&self.config_hash[..8]))
            .finish()
    }
}

/// Complete key pair for FHE operations
#[derive(Clone, Debug)]
pub struct KeyPair {
    /// Client key (secret)
    pub client: ClientKey,
    /// Server key (handed to the ledger)
    pub server: ServerKey,
}

impl KeyPair {
    /// Generate a new key pair
    ///
    /// WARNING: Key generation is slow (several seconds in release builds)
    pub fn generate(config: &FheConfig) -> FheResult<Self> {
        config.validate()?;

        let (client_key, server_key) = generate_keys(ConfigBuilder::default().build());
        let hash = config_hash(config);

        Ok(Self {
            client: ClientKey {
                inner: client_key,
                config_hash: hash,
            },
            server: ServerKey::from_tfhe(server_key, hash),
        })
    }
}
