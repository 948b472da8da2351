use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::time_value::{level_payment, periods_to_amortize};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::{FinPlanError, FinPlanResult};

const MONTHS_PER_YEAR: u32 = 12;

// Decision-table thresholds (months / dollars)
const BREAK_EVEN_EXCELLENT: Decimal = dec!(24);
const BREAK_EVEN_GOOD: Decimal = dec!(60);
const BREAK_EVEN_MARGINAL: Decimal = dec!(120);
const TERM_REDUCTION_OVERRIDE: Decimal = dec!(60);
const INTEREST_OVERRIDE_EXCELLENT: Decimal = dec!(50_000);
const INTEREST_OVERRIDE_GOOD: Decimal = dec!(20_000);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceParameters {
    pub current_balance: Money,
    /// Annual nominal rate as a decimal.
    pub current_rate: Rate,
    pub current_payment: Money,
    pub new_rate: Rate,
    pub new_term_years: u32,
    /// Discount points on the new loan: 1.0 = 1% of the financed base.
    #[serde(default)]
    pub new_points: Decimal,
    #[serde(default)]
    pub closing_costs: Money,
    #[serde(default)]
    pub cash_out: Money,
    /// Roll closing costs into the new loan instead of paying out of pocket.
    #[serde(default)]
    pub finance_costs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefinanceVerdict {
    Excellent,
    Good,
    Marginal,
    NotRecommended,
}

impl std::fmt::Display for RefinanceVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "Excellent"),
            Self::Good => write!(f, "Good"),
            Self::Marginal => write!(f, "Marginal"),
            Self::NotRecommended => write!(f, "Not Recommended"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceResult {
    /// Remaining term on the current loan, solved from balance/rate/payment.
    /// None when the stated payment never amortizes the balance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_term_months: Option<Decimal>,
    pub new_loan_amount: Money,
    pub new_monthly_payment: Money,
    pub point_cost: Money,
    /// Current payment minus new payment; negative when the new payment is
    /// higher.
    pub monthly_savings: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_even_months: Option<Decimal>,
    /// Remaining interest on the current loan minus total interest on the
    /// new loan. None when the current remaining term is unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_savings: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_reduction_months: Option<Decimal>,
    pub recommendation: RefinanceVerdict,
    pub rationale: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Analyze a refinance offer against the current loan state.
///
/// The current loan's remaining term is derived from its balance, rate, and
/// payment by solving the annuity equation for n; it is never assumed from a
/// stated original term, since current loans are usually partway amortized.
pub fn analyze_refinance(
    params: &RefinanceParameters,
) -> FinPlanResult<ComputationOutput<RefinanceResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(params)?;

    let current_monthly_rate = params.current_rate / Decimal::from(MONTHS_PER_YEAR);
    let remaining_term_months = periods_to_amortize(
        params.current_balance,
        current_monthly_rate,
        params.current_payment,
    );
    if remaining_term_months.is_none() {
        warnings.push(
            "Current payment does not cover accruing interest; remaining term and interest savings are unknown"
                .to_string(),
        );
    }

    // Points are financed into the new loan; closing costs optionally so
    let financed_base = params.current_balance + params.cash_out;
    let point_cost = financed_base * params.new_points / dec!(100);
    let mut new_loan_amount = financed_base + point_cost;
    if params.finance_costs {
        new_loan_amount += params.closing_costs;
    }

    let new_term_months = params.new_term_years * MONTHS_PER_YEAR;
    let new_monthly_payment = level_payment(
        new_loan_amount,
        params.new_rate / Decimal::from(MONTHS_PER_YEAR),
        new_term_months,
    )?;

    let monthly_savings = params.current_payment - new_monthly_payment;
    let upfront_costs = point_cost + params.closing_costs;
    let break_even_months = if monthly_savings > Decimal::ZERO {
        Some(upfront_costs / monthly_savings)
    } else {
        None
    };

    let new_total_interest =
        new_monthly_payment * Decimal::from(new_term_months) - new_loan_amount;
    let interest_savings = remaining_term_months.map(|n| {
        let current_remaining_interest = params.current_payment * n - params.current_balance;
        current_remaining_interest - new_total_interest
    });
    let term_reduction_months =
        remaining_term_months.map(|n| n - Decimal::from(new_term_months));

    let (recommendation, rationale) =
        classify(break_even_months, interest_savings, term_reduction_months);

    let output = RefinanceResult {
        remaining_term_months,
        new_loan_amount,
        new_monthly_payment,
        point_cost,
        monthly_savings,
        break_even_months,
        interest_savings,
        term_reduction_months,
        recommendation,
        rationale,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Refinance analysis (derived remaining term, break-even decision table)",
        &serde_json::json!({
            "current_balance": params.current_balance.to_string(),
            "current_rate": params.current_rate.to_string(),
            "new_rate": params.new_rate.to_string(),
            "new_term_years": params.new_term_years,
            "finance_costs": params.finance_costs,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Deterministic rules table, not a continuous score. Break-even horizon
/// sets the base verdict; a term reduction of five or more years combined
/// with large interest savings upgrades it.
fn classify(
    break_even_months: Option<Decimal>,
    interest_savings: Option<Money>,
    term_reduction_months: Option<Decimal>,
) -> (RefinanceVerdict, String) {
    let base = match break_even_months {
        Some(be) if be < BREAK_EVEN_EXCELLENT => RefinanceVerdict::Excellent,
        Some(be) if be < BREAK_EVEN_GOOD => RefinanceVerdict::Good,
        Some(be) if be < BREAK_EVEN_MARGINAL => RefinanceVerdict::Marginal,
        _ => RefinanceVerdict::NotRecommended,
    };

    let upgraded = match (term_reduction_months, interest_savings) {
        (Some(tr), Some(is)) if tr >= TERM_REDUCTION_OVERRIDE => {
            if is >= INTEREST_OVERRIDE_EXCELLENT {
                RefinanceVerdict::Excellent
            } else if is >= INTEREST_OVERRIDE_GOOD && base != RefinanceVerdict::Excellent {
                RefinanceVerdict::Good
            } else {
                base.clone()
            }
        }
        _ => base.clone(),
    };

    let rationale = match (&upgraded, break_even_months) {
        (RefinanceVerdict::Excellent, Some(be)) if be < BREAK_EVEN_EXCELLENT => format!(
            "Costs are recovered in {} months, well under two years",
            be.round_dp(0)
        ),
        (RefinanceVerdict::Excellent, _) => format!(
            "Term drops by {} months with {} of interest saved",
            term_reduction_months.unwrap_or_default().round_dp(0),
            format_dollars(interest_savings.unwrap_or_default())
        ),
        (RefinanceVerdict::Good, Some(be)) if be < BREAK_EVEN_GOOD => format!(
            "Costs are recovered in {} months, under five years",
            be.round_dp(0)
        ),
        (RefinanceVerdict::Good, _) => format!(
            "Term drops by {} months with {} of interest saved",
            term_reduction_months.unwrap_or_default().round_dp(0),
            format_dollars(interest_savings.unwrap_or_default())
        ),
        (RefinanceVerdict::Marginal, Some(be)) => format!(
            "Break-even takes {} months; worthwhile only if you stay that long",
            be.round_dp(0)
        ),
        (RefinanceVerdict::NotRecommended, Some(be)) => format!(
            "Break-even takes {} months, beyond the ten-year horizon",
            be.round_dp(0)
        ),
        (RefinanceVerdict::NotRecommended, None) => {
            "The new payment never recovers the up-front costs".to_string()
        }
        (RefinanceVerdict::Marginal, None) => {
            "No positive monthly savings to recover the up-front costs".to_string()
        }
    };

    (upgraded, rationale)
}

fn format_dollars(amount: Money) -> String {
    format!("${}", amount.round_dp(0))
}

fn validate(params: &RefinanceParameters) -> FinPlanResult<()> {
    if params.current_balance <= Decimal::ZERO {
        return Err(FinPlanError::InvalidInput {
            field: "current_balance".into(),
            reason: "Current balance must be > 0".into(),
        });
    }
    if params.current_payment <= Decimal::ZERO {
        return Err(FinPlanError::InvalidInput {
            field: "current_payment".into(),
            reason: "Current payment must be > 0".into(),
        });
    }
    if params.current_rate < Decimal::ZERO || params.new_rate < Decimal::ZERO {
        return Err(FinPlanError::InvalidInput {
            field: "rate".into(),
            reason: "Rates must be >= 0".into(),
        });
    }
    if params.new_term_years == 0 {
        return Err(FinPlanError::InvalidInput {
            field: "new_term_years".into(),
            reason: "New term must be at least 1 year".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
