//! Decimal-exact multiplication for ordinary decimal inputs.
//!
//! Each operand is read from its shortest decimal rendering into a
//! [`Decimal`], multiplied there, and only then converted back to `f64`.
//! `0.1 * 0.2` therefore yields the double nearest to `0.02` rather than
//! `0.020000000000000004`.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Multiplies two decimal strings exactly, or `None` if either is not a plain
/// decimal that fits a [`Decimal`] (scientific notation, stray characters,
/// more than 28 significant digits) or the product overflows.
pub fn multiply_decimal_str(lhs: &str, rhs: &str) -> Option<f64> {
    let a = Decimal::from_str_exact(lhs.trim()).ok()?;
    let b = Decimal::from_str_exact(rhs.trim()).ok()?;
    a.checked_mul(b)?.to_f64()
}

/// Multiplies string operands, falling back to native float multiplication
/// when the exact path does not apply.
pub fn multiply_str(lhs: &str, rhs: &str) -> Option<f64> {
    multiply_decimal_str(lhs, rhs).or_else(|| {
        let a = lhs.trim().parse::<f64>().ok()?;
        let b = rhs.trim().parse::<f64>().ok()?;
        Some(a * b)
    })
}

/// Multiplies two floats through their shortest decimal representation.
pub fn multiply(lhs: f64, rhs: f64) -> f64 {
    if !lhs.is_finite() || !rhs.is_finite() {
        return lhs * rhs;
    }
    multiply_decimal_str(&lhs.to_string(), &rhs.to_string()).unwrap_or(lhs * rhs)
}
