//! Branchless clamping
//!
//! Every amount-dependent limit of the ledger is expressed with these
//! helpers: the limit narrows the accepted amount, it never fails the call.
//! Only public parameters (a cap being zero) change the circuit shape.

use crate::backend::FheBackend;

/// `max(lhs - rhs, 0)`
pub fn saturating_sub<B: FheBackend>(backend: &B, lhs: &B::Uint, rhs: &B::Uint) -> B::Uint {
    let taken = backend.min(lhs, rhs);
    backend.sub(lhs, &taken)
}

/// Room left under a plaintext `cap` given an encrypted running `total`.
pub fn headroom<B: FheBackend>(backend: &B, total: &B::Uint, cap: u64) -> B::Uint {
    saturating_sub(backend, &backend.trivial(cap), total)
}

/// Accept at most the headroom under `cap`. A zero cap means unlimited,
/// which still stops `total` at `u64::MAX`.
pub fn clamp_to_cap<B: FheBackend>(
    backend: &B,
    amount: &B::Uint,
    total: &B::Uint,
    cap: u64,
) -> B::Uint {
    let cap = if cap == 0 { u64::MAX } else { cap };
    backend.min(amount, &headroom(backend, total, cap))
}

/// `min(lhs + rhs, u64::MAX)`
pub fn saturating_add<B: FheBackend>(backend: &B, lhs: &B::Uint, rhs: &B::Uint) -> B::Uint {
    let sum = backend.add(lhs, rhs);
    let fits = backend.ge(&sum, lhs);
    backend.select(&fits, &sum, &backend.trivial(u64::MAX))
}

pub fn min3<B: FheBackend>(backend: &B, a: &B::Uint, b: &B::Uint, c: &B::Uint) -> B::Uint {
    backend.min(&backend.min(a, b), c)
}

/// `value` if the encrypted `gate` is zero, otherwise zero.
pub fn zero_unless_zero<B: FheBackend>(backend: &B, gate: &B::Uint, value: &B::Uint) -> B::Uint {
    let zero = backend.trivial(0);
    let is_zero = backend.le(gate, &zero);
    backend.select(&is_zero, value, &zero)
}
