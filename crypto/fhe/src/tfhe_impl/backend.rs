//! `FheBackend` over TFHE-rs radix ciphertexts

use tfhe::prelude::*;
use tfhe::{FheBool, FheUint128, FheUint64};

use super::ciphertext::{EncryptedBool, EncryptedU64};
use super::keys::{ClientKey, ServerKey};
use crate::backend::{Codec, FheBackend};
use crate::FheResult;

/// Evaluates ledger circuits with the server key
#[derive(Clone, Debug)]
pub struct TfheBackend {
    server_key: ServerKey,
}

impl TfheBackend {
    pub fn new(server_key: ServerKey) -> Self {
        server_key.install();
        Self { server_key }
    }

    pub fn server_key(&self) -> &ServerKey {
        &self.server_key
    }

    fn widen(value: &EncryptedU64) -> FheUint128 {
        FheUint128::cast_from(value.inner().clone())
    }

    /// Largest input for which `value * num + bias` stays within 128 bits,
    /// if that bound is below `u64::MAX`.
    fn product_limit(num: u128, bias: u128) -> Option<u64> {
        let limit = u128::MAX.saturating_sub(bias).checked_div(num)?;
        u64::try_from(limit).ok()
    }

    /// `(value * num + bias) / den`, saturated to `u64::MAX`.
    fn mul_div(value: &EncryptedU64, num: u128, den: u128, bias: u128) -> EncryptedU64 {
        let scaled = &Self::widen(value) * num;
        let biased = &scaled + bias;
        let quotient = &biased / den;

        let fits: FheBool = quotient.le(u128::from(u64::MAX));
        let narrowed = FheUint64::cast_from(quotient);
        let saturated = FheUint64::encrypt_trivial(u64::MAX);
        let mut result = fits.if_then_else(&narrowed, &saturated);

        // The 128-bit product wraps past this bound.
        if let Some(limit) = Self::product_limit(num, bias) {
            let wraps: FheBool = value.inner().gt(limit);
            result = wraps.if_then_else(&saturated, &result);
        }
        EncryptedU64::from_tfhe(result)
    }
}

impl FheBackend for TfheBackend {
    type Uint = EncryptedU64;
    type Bool = EncryptedBool;

    fn activate(&self) {
        self.server_key.install();
    }

    fn trivial(&self, value: u64) -> EncryptedU64 {
        EncryptedU64::trivial(value)
    }

    fn add(&self, lhs: &EncryptedU64, rhs: &EncryptedU64) -> EncryptedU64 {
        EncryptedU64::from_tfhe(lhs.inner() + rhs.inner())
    }

    fn sub(&self, lhs: &EncryptedU64, rhs: &EncryptedU64) -> EncryptedU64 {
        EncryptedU64::from_tfhe(lhs.inner() - rhs.inner())
    }

    fn ge(&self, lhs: &EncryptedU64, rhs: &EncryptedU64) -> EncryptedBool {
        EncryptedBool::from_tfhe(lhs.inner().ge(rhs.inner()))
    }

    fn le(&self, lhs: &EncryptedU64, rhs: &EncryptedU64) -> EncryptedBool {
        EncryptedBool::from_tfhe(lhs.inner().le(rhs.inner()))
    }

    fn select(
        &self,
        cond: &EncryptedBool,
        if_true: &EncryptedU64,
        if_false: &EncryptedU64,
    ) -> EncryptedU64 {
        EncryptedU64::from_tfhe(cond.inner().if_then_else(if_true.inner(), if_false.inner()))
    }

    fn min(&self, lhs: &EncryptedU64, rhs: &EncryptedU64) -> EncryptedU64 {
        EncryptedU64::from_tfhe(lhs.inner().min(rhs.inner()))
    }

    fn mul_div_floor(&self, value: &EncryptedU64, num: u128, den: u128) -> EncryptedU64 {
        Self::mul_div(value, num, den, 0)
    }

    fn mul_div_ceil(&self, value: &EncryptedU64, num: u128, den: u128) -> EncryptedU64 {
        Self::mul_div(value, num, den, den.saturating_sub(1))
    }
}

impl Codec<TfheBackend> for ClientKey {
    fn seal(&self, value: u64) -> FheResult<EncryptedU64> {
        Ok(EncryptedU64::encrypt(value, self))
    }

    fn open(&self, value: &EncryptedU64) -> FheResult<u64> {
        Ok(value.decrypt(self))
    }
}
