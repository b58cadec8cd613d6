//! Encrypted valuation shared by both engines
//!
//! value  = balance * price / PRICE_SCALE
//! weight = value * collateral_factor / BPS
//!
//! Prices and factors are public; balances are not.

use cipherlend_fhe::{clamp, FheBackend};

use crate::context::EngineContext;
use crate::oracle::PriceSource;
use crate::position::UserPosition;
use crate::types::{BPS, PRICE_SCALE};

const WEIGHT_SCALE: u128 = PRICE_SCALE as u128 * BPS as u128;

/// Value of `balance` units at `price`
pub fn value<B: FheBackend>(backend: &B, balance: &B::Uint, price: u64) -> B::Uint {
    backend.mul_div_floor(balance, price as u128, PRICE_SCALE as u128)
}

/// Collateral value weighted by the collateral factor, rounded down
pub fn weighted_value<B: FheBackend>(
    backend: &B,
    balance: &B::Uint,
    price: u64,
    collateral_factor: u16,
) -> B::Uint {
    backend.mul_div_floor(balance, price as u128 * collateral_factor as u128, WEIGHT_SCALE)
}

/// Total value owed across the user's borrowed balances, saturating.
///
/// A residual left by a short repay-all is still counted after the debt
/// slot has been cleared.
pub fn debt_value<B: FheBackend, P: PriceSource>(
    ctx: &EngineContext<'_, B, P>,
    position: &UserPosition<B::Uint>,
) -> B::Uint {
    let backend = ctx.backend;
    position
        .borrowed_balance
        .iter()
        .fold(backend.trivial(0), |acc, (asset, balance)| {
            let owed = value(backend, balance, ctx.oracle.price(asset));
            clamp::saturating_add(backend, &acc, &owed)
        })
}

/// Units of a debt asset priced at `debt_price` that `weighted - debt` buys.
/// `debt_price` must be non-zero.
pub fn borrowing_power<B: FheBackend>(
    backend: &B,
    weighted: &B::Uint,
    debt: &B::Uint,
    debt_price: u64,
) -> B::Uint {
    let headroom = clamp::saturating_sub(backend, weighted, debt);
    backend.mul_div_floor(&headroom, PRICE_SCALE as u128, debt_price as u128)
}

/// Largest amount of collateral removable from `balance` while keeping
/// `weighted_value(remaining) >= debt`.
pub fn withdraw_ceiling<B: FheBackend>(
    backend: &B,
    balance: &B::Uint,
    debt: &B::Uint,
    price: u64,
    collateral_factor: u16,
) -> B::Uint {
    let weight = price as u128 * collateral_factor as u128;
    if weight == 0 {
        // Collateral counts for nothing: free only when nothing is owed.
        return clamp::zero_unless_zero(backend, debt, balance);
    }
    let required = backend.mul_div_ceil(debt, WEIGHT_SCALE, weight);
    clamp::saturating_sub(backend, balance, &required)
}
