use ethers::types::U256;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::error::SwapError;

/// Scale a human-readable decimal amount into the token's integer base-unit
/// representation: `amount * 10^decimals`, computed exactly.
///
/// Fails closed with [`SwapError::Precision`] when the amount is negative,
/// carries more fractional digits than `decimals` allows, or does not fit
/// the decimal representation. Truncation would silently change the amount
/// being traded.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<U256, SwapError> {
    let precision_error = || SwapError::Precision { amount, decimals };

    if amount.is_sign_negative() {
        return Err(precision_error());
    }

    let factor = 10u128
        .checked_pow(u32::from(decimals))
        .and_then(Decimal::from_u128)
        .ok_or_else(precision_error)?;

    let scaled = amount.checked_mul(factor).ok_or_else(precision_error)?;
    if !scaled.fract().is_zero() {
        return Err(precision_error());
    }

    let base_units = scaled.trunc().to_u128().ok_or_else(precision_error)?;
    Ok(U256::from(base_units))
}

/// Inverse of [`to_base_units`], used for display. `None` when the value
/// does not fit the decimal representation.
pub fn from_base_units(base_units: U256, decimals: u8) -> Option<Decimal> {
    if base_units > U256::from(u128::MAX) {
        return None;
    }

    let factor = 10u128
        .checked_pow(u32::from(decimals))
        .and_then(Decimal::from_u128)?;

    Decimal::from_u128(base_units.as_u128())?.checked_div(factor)
}
