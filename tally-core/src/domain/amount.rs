//! Amount validation and conversion
//!
//! `Decimal` cannot hold NaN or infinity, so the "finite" rule is enforced
//! where values enter the model: text input and `f64` conversions.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::result::{Error, Result};

/// Check that an operation amount is strictly positive
pub fn validate_amount(amount: Decimal) -> Result<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(Error::invalid_amount(format!(
            "{} (must be greater than zero)",
            amount
        )));
    }
    Ok(amount)
}

/// Parse an operation amount from user input
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let amount = Decimal::from_str(input.trim())
        .map_err(|_| Error::invalid_amount(format!("'{}' is not a number", input)))?;
    validate_amount(amount)
}

/// Convert a floating point amount, rejecting NaN and infinities
pub fn amount_from_f64(value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(Error::invalid_amount(format!("{} is not finite", value)));
    }
    let amount = Decimal::from_f64(value)
        .ok_or_else(|| Error::invalid_amount(format!("{} is out of range", value)))?;
    validate_amount(amount)
}

/// Check that an opening balance is zero or positive
pub fn validate_initial_balance(balance: Decimal) -> Result<Decimal> {
    if balance < Decimal::ZERO {
        return Err(Error::invalid_initial_balance(format!(
            "{} (must not be negative)",
            balance
        )));
    }
    Ok(balance)
}

/// Parse an opening balance from user input
pub fn parse_initial_balance(input: &str) -> Result<Decimal> {
    let balance = Decimal::from_str(input.trim())
        .map_err(|_| Error::invalid_initial_balance(format!("'{}' is not a number", input)))?;
    validate_initial_balance(balance)
}
