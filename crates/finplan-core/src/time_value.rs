use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::FinPlanError;
use crate::types::{Money, Rate};
use crate::FinPlanResult;

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
pub fn compound_factor(rate: Rate, periods: u32) -> Decimal {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..periods {
        result *= factor;
    }
    result
}

/// Level payment that fully amortizes `principal` over `periods` at `rate`
/// per period: M = P·r·(1+r)^n / ((1+r)^n − 1).
///
/// The zero-rate case is handled explicitly as P/n; the general formula
/// divides by zero there.
pub fn level_payment(principal: Money, rate: Rate, periods: u32) -> FinPlanResult<Money> {
    if periods == 0 {
        return Err(FinPlanError::InvalidInput {
            field: "periods".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let factor = compound_factor(rate, periods);
    let denom = factor - Decimal::ONE;
    if denom.is_zero() {
        return Err(FinPlanError::DivisionByZero {
            context: "level payment annuity factor".into(),
        });
    }

    Ok(principal * rate * factor / denom)
}

/// Number of periods needed to amortize `balance` with a fixed `payment` at
/// `rate` per period, solved in closed form from the annuity equation:
/// n = ln(M / (M − r·B)) / ln(1 + r).
///
/// Returns None when the payment never overtakes the accruing interest
/// (M ≤ r·B), i.e. the loan never amortizes.
pub fn periods_to_amortize(balance: Money, rate: Rate, payment: Money) -> Option<Decimal> {
    if balance <= Decimal::ZERO || payment <= Decimal::ZERO {
        return None;
    }

    if rate.is_zero() {
        return Some(balance / payment);
    }

    let interest_only = rate * balance;
    if payment <= interest_only {
        return None;
    }

    let numerator = (payment / (payment - interest_only)).ln();
    let denominator = (Decimal::ONE + rate).ln();
    if denominator.is_zero() {
        return None;
    }

    Some(numerator / denominator)
}
