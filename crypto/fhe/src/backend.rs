//! Backend seam for encrypted arithmetic
//!
//! The ledger never sees a plaintext amount. Everything it computes goes
//! through `FheBackend`, whose comparison results are themselves encrypted
//! and can only feed `select`/`min`, never an `if`.

use std::fmt;

use crate::FheResult;

/// Homomorphic operations over encrypted unsigned 64-bit integers.
///
/// `add` and `sub` wrap modulo 2^64 like the underlying radix ciphertexts;
/// the scaled `mul_div_*` operations saturate instead.
/// Scalar parameters (`num`, `den`) are public.
pub trait FheBackend: Send + Sync {
    /// Encrypted u64
    type Uint: Clone + Send + Sync + fmt::Debug;
    /// Encrypted boolean produced by comparisons
    type Bool: Clone + Send + Sync;

    /// Make the evaluation key available on the calling thread.
    fn activate(&self) {}

    /// Trivial (noiseless, public) encryption of a constant.
    fn trivial(&self, value: u64) -> Self::Uint;

    fn add(&self, lhs: &Self::Uint, rhs: &Self::Uint) -> Self::Uint;

    fn sub(&self, lhs: &Self::Uint, rhs: &Self::Uint) -> Self::Uint;

    /// Encrypted `lhs >= rhs`
    fn ge(&self, lhs: &Self::Uint, rhs: &Self::Uint) -> Self::Bool;

    /// Encrypted `lhs <= rhs`
    fn le(&self, lhs: &Self::Uint, rhs: &Self::Uint) -> Self::Bool;

    /// `cond ? if_true : if_false`, evaluated obliviously
    fn select(&self, cond: &Self::Bool, if_true: &Self::Uint, if_false: &Self::Uint) -> Self::Uint;

    fn min(&self, lhs: &Self::Uint, rhs: &Self::Uint) -> Self::Uint;

    /// `floor(value * num / den)` with a 128-bit intermediate.
    /// `den` must be non-zero. Results above `u64::MAX` saturate, as do
    /// products that do not fit in 128 bits.
    fn mul_div_floor(&self, value: &Self::Uint, num: u128, den: u128) -> Self::Uint;

    /// `ceil(value * num / den)`, saturating like `mul_div_floor`.
    fn mul_div_ceil(&self, value: &Self::Uint, num: u128, den: u128) -> Self::Uint;
}

/// Client side of a backend: seals plaintext inputs and opens results.
///
/// The ledger itself never holds a `Codec`.
pub trait Codec<B: FheBackend> {
    fn seal(&self, value: u64) -> FheResult<B::Uint>;

    fn open(&self, value: &B::Uint) -> FheResult<u64>;
}
