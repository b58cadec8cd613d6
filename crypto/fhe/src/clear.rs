//! Transparent backend
//!
//! Same circuit semantics as `TfheBackend`, but values are stored in the
//! clear. Used by the simulator and by tests that need thousands of ledger
//! operations; it provides no confidentiality at all.

use serde::{Deserialize, Serialize};

use crate::backend::{Codec, FheBackend};
use crate::FheResult;

/// Transparent stand-in for an encrypted u64
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearU64(u64);

impl ClearU64 {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Transparent stand-in for an encrypted boolean
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClearBool(bool);

impl ClearBool {
    pub fn value(&self) -> bool {
        self.0
    }
}

/// Backend that evaluates every operation on plaintext values
#[derive(Clone, Copy, Debug, Default)]
pub struct ClearBackend;

fn saturate(wide: Option<u128>) -> u64 {
    wide.map_or(u64::MAX, |w| w.min(u128::from(u64::MAX)) as u64)
}

impl FheBackend for ClearBackend {
    type Uint = ClearU64;
    type Bool = ClearBool;

    fn trivial(&self, value: u64) -> ClearU64 {
        ClearU64(value)
    }

    fn add(&self, lhs: &ClearU64, rhs: &ClearU64) -> ClearU64 {
        ClearU64(lhs.0.wrapping_add(rhs.0))
    }

    fn sub(&self, lhs: &ClearU64, rhs: &ClearU64) -> ClearU64 {
        ClearU64(lhs.0.wrapping_sub(rhs.0))
    }

    fn ge(&self, lhs: &ClearU64, rhs: &ClearU64) -> ClearBool {
        ClearBool(lhs.0 >= rhs.0)
    }

    fn le(&self, lhs: &ClearU64, rhs: &ClearU64) -> ClearBool {
        ClearBool(lhs.0 <= rhs.0)
    }

    fn select(&self, cond: &ClearBool, if_true: &ClearU64, if_false: &ClearU64) -> ClearU64 {
        if cond.0 {
            *if_true
        } else {
            *if_false
        }
    }

    fn min(&self, lhs: &ClearU64, rhs: &ClearU64) -> ClearU64 {
        ClearU64(lhs.0.min(rhs.0))
    }

    fn mul_div_floor(&self, value: &ClearU64, num: u128, den: u128) -> ClearU64 {
        let quotient = u128::from(value.0)
            .checked_mul(num)
            .and_then(|scaled| scaled.checked_div(den));
        ClearU64(saturate(quotient))
    }

    fn mul_div_ceil(&self, value: &ClearU64, num: u128, den: u128) -> ClearU64 {
        let quotient = u128::from(value.0)
            .checked_mul(num)
            .and_then(|scaled| scaled.checked_add(den.saturating_sub(1)))
            .and_then(|rounded| rounded.checked_div(den));
        ClearU64(saturate(quotient))
    }
}

impl Codec<ClearBackend> for ClearBackend {
    fn seal(&self, value: u64) -> FheResult<ClearU64> {
        Ok(ClearU64(value))
    }

    fn open(&self, value: &ClearU64) -> FheResult<u64> {
        Ok(value.0)
    }
}
