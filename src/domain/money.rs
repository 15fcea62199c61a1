use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::Error;

/// Currency amounts carry at most 4 decimal places.
pub const TARGET_DECIMALS: u32 = 4;

/// Validate an operation amount: strictly positive, normalized to the target
/// scale with banker's rounding (round half to even). `Decimal` is finite by
/// construction, so positivity and scale are the only concerns.
pub fn checked_amount(amount: Decimal) -> Result<Decimal, Error> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount(amount.to_string()));
    }
    let normalized = if amount.scale() > TARGET_DECIMALS {
        amount.round_dp_with_strategy(TARGET_DECIMALS, RoundingStrategy::MidpointNearestEven)
    } else {
        amount
    };
    // Rounding a sub-minimum amount like 0.00001 can collapse it to zero.
    if normalized <= Decimal::ZERO {
        return Err(Error::InvalidAmount(amount.to_string()));
    }
    Ok(normalized)
}

/// Parse a decimal amount from caller input, then validate it.
pub fn parse_amount(s: &str) -> Result<Decimal, Error> {
    let parsed =
        Decimal::from_str(s.trim()).map_err(|_| Error::InvalidAmount(s.to_owned()))?;
    checked_amount(parsed)
}
