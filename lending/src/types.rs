//! Identities and fixed-point scales

use serde::{Deserialize, Serialize};

/// Oracle prices are fixed-point with 8 decimals.
pub const PRICE_SCALE: u64 = 100_000_000;

/// Collateral factors are expressed in basis points.
pub const BPS: u16 = 10_000;

macro_rules! identity {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// Deterministic identity from a human-readable label
            pub fn from_label(label: &str) -> Self {
                Self(blake3::hash(label.as_bytes()).into())
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(&self.0[..8]))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "0x{}", hex::encode(&self.0[..8]))
            }
        }
    };
}

identity!(
    /// Identity of a listed asset
    AssetId
);

identity!(
    /// Identity of an account (user or admin)
    Address
);
