use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::fpl::{applicable_figure, get_fpl, Location};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::FinPlanResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const SUBSIDY_CLIFF_PCT: Decimal = dec!(400);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PtcInputs {
    pub tax_year: i32,
    pub family_size: u32,
    /// Modified Adjusted Gross Income for the household.
    pub magi: Money,
    pub location: Location,
    /// Monthly premium of the second-lowest-cost silver plan.
    pub slcsp_monthly_premium: Money,
    /// Treat income at or above 400% of FPL as ineligible instead of
    /// applying the flat top rate.
    #[serde(default)]
    pub apply_subsidy_cliff: bool,
}

/// Outcome marker. Degenerate inputs and the subsidy cliff are sentinel
/// states in the result, never errors, so the caller can render a message
/// without special-casing exceptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PtcStatus {
    Eligible,
    IncomeAboveCliff,
    InvalidInput,
}

impl std::fmt::Display for PtcStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eligible => write!(f, "Eligible"),
            Self::IncomeAboveCliff => write!(f, "Income above 400% FPL cliff"),
            Self::InvalidInput => write!(f, "Invalid input"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PtcResults {
    pub status: PtcStatus,
    pub fpl: Money,
    /// Household income as a percent of FPL (283.7 means 283.7%).
    pub fpl_percentage: Decimal,
    pub applicable_percentage: Rate,
    pub annual_contribution: Money,
    pub monthly_contribution: Money,
    pub annual_credit: Money,
    pub monthly_credit: Money,
}

impl PtcResults {
    fn invalid() -> Self {
        Self {
            status: PtcStatus::InvalidInput,
            fpl: Decimal::ZERO,
            fpl_percentage: Decimal::ZERO,
            applicable_percentage: Decimal::ZERO,
            annual_contribution: Decimal::ZERO,
            monthly_contribution: Decimal::ZERO,
            annual_credit: Decimal::ZERO,
            monthly_credit: Decimal::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Estimate the Premium Tax Credit from household income, family size, and
/// the benchmark silver-plan premium.
///
/// Degenerate inputs (family size, MAGI, or premium at or below zero)
/// short-circuit to an explicit invalid-input result instead of propagating
/// NaN/Infinity-style states.
pub fn calculate_ptc(inputs: &PtcInputs) -> FinPlanResult<ComputationOutput<PtcResults>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let methodology = "Premium Tax Credit (FPL lookup, piecewise-linear applicable figure)";
    let assumptions = serde_json::json!({
        "tax_year": inputs.tax_year,
        "family_size": inputs.family_size,
        "location": format!("{:?}", inputs.location),
        "apply_subsidy_cliff": inputs.apply_subsidy_cliff,
    });

    if inputs.family_size == 0
        || inputs.magi <= Decimal::ZERO
        || inputs.slcsp_monthly_premium <= Decimal::ZERO
    {
        warnings.push(
            "Family size, MAGI, and benchmark premium must all be positive; returning the invalid-input sentinel"
                .to_string(),
        );
        let elapsed = start.elapsed().as_micros() as u64;
        return Ok(with_metadata(
            methodology,
            &assumptions,
            warnings,
            elapsed,
            PtcResults::invalid(),
        ));
    }

    let fpl = get_fpl(inputs.tax_year, inputs.location, inputs.family_size);
    let fpl_percentage = inputs.magi / fpl * dec!(100);
    let applicable_percentage = applicable_figure(fpl_percentage);

    let annual_contribution = inputs.magi * applicable_percentage;
    let annual_benchmark = inputs.slcsp_monthly_premium * MONTHS_PER_YEAR;

    let above_cliff = fpl_percentage >= SUBSIDY_CLIFF_PCT;
    let (status, annual_credit) = if inputs.apply_subsidy_cliff && above_cliff {
        warnings.push(format!(
            "Income at {}% of FPL exceeds the 400% cliff; credit is zero",
            fpl_percentage.round_dp(1)
        ));
        (PtcStatus::IncomeAboveCliff, Decimal::ZERO)
    } else {
        let credit = (annual_benchmark - annual_contribution).max(Decimal::ZERO);
        (PtcStatus::Eligible, credit)
    };

    let output = PtcResults {
        status,
        fpl,
        fpl_percentage,
        applicable_percentage,
        annual_contribution,
        monthly_contribution: annual_contribution / MONTHS_PER_YEAR,
        annual_credit,
        monthly_credit: annual_credit / MONTHS_PER_YEAR,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
