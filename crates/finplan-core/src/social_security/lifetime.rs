use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::benefits::{
    add_months, benefit_at_claim, first_of_month, spousal_topup, validate_inputs, SsInputs,
};
use crate::time_value::compound_factor;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::FinPlanResult;

const MONTHS_PER_YEAR: u32 = 12;

/// Fixed horizon cutoff, not a mortality model: the simulation stops at the
/// earlier claimant's age-90 anniversary.
const HORIZON_AGE_YEARS: u32 = 90;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyBenefit {
    pub year: i32,
    pub month: u32,
    pub primary_benefit: Money,
    pub spouse_benefit: Money,
    pub spousal_topup: Money,
    pub total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnualProjection {
    pub year: i32,
    /// Age attained on the claimant's birthday in this calendar year.
    pub primary_age: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse_age: Option<u32>,
    pub primary_benefit: Money,
    pub spouse_benefit: Money,
    pub spousal_topup: Money,
    pub total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifetimeBenefitOutput {
    pub total_lifetime_benefit: Money,
    pub monthly: Vec<MonthlyBenefit>,
    pub annual: Vec<AnnualProjection>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project household Social Security cash flow month by month from the
/// earliest claim date to the age-90 horizon.
pub fn calculate_lifetime_benefit(
    inputs: &SsInputs,
) -> FinPlanResult<ComputationOutput<LifetimeBenefitOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_inputs(inputs)?;
    let output = simulate(inputs, &mut warnings);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly benefit simulation (claim-age adjustments, spousal top-up, age-90 horizon)",
        &serde_json::json!({
            "marital_status": format!("{:?}", inputs.marital_status),
            "primary_claim_date": inputs.primary.claim_date.to_string(),
            "spouse_claim_date": inputs.spouse.as_ref().map(|s| s.claim_date.to_string()),
            "inflation_rate": inputs.inflation_rate.to_string(),
            "horizon_age": HORIZON_AGE_YEARS,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Core simulation loop, shared with the strategy generator. Inputs must
/// already be validated.
pub(crate) fn simulate(inputs: &SsInputs, warnings: &mut Vec<String>) -> LifetimeBenefitOutput {
    let primary = &inputs.primary;
    let spouse = inputs.spouse.as_ref();
    let spousal_claim = inputs.effective_spousal_claim_date();

    let primary_base = benefit_at_claim(primary);
    let spouse_base = spouse.map(benefit_at_claim).unwrap_or(Decimal::ZERO);
    let topup_base = match (spouse, spousal_claim) {
        (Some(s), Some(claim)) => spousal_topup(primary.pia, s, claim),
        _ => Decimal::ZERO,
    };

    // Simulation window: earliest claim month through the earlier
    // claimant's age-90 anniversary
    let mut sim_start = first_of_month(primary.claim_date);
    if let Some(s) = spouse {
        sim_start = sim_start.min(first_of_month(s.claim_date));
    }
    let mut horizon = add_months(primary.birth_date, HORIZON_AGE_YEARS * MONTHS_PER_YEAR);
    if let Some(s) = spouse {
        horizon = horizon.min(add_months(s.birth_date, HORIZON_AGE_YEARS * MONTHS_PER_YEAR));
    }

    if sim_start >= horizon {
        warnings.push("Simulation horizon is empty; no benefit months to project".to_string());
    }

    let primary_active_from = first_of_month(primary.claim_date);
    let spouse_active_from = spouse.map(|s| first_of_month(s.claim_date));
    let topup_active_from = match (spouse_active_from, spousal_claim) {
        // Payable only once the primary has claimed and the spousal claim
        // date has arrived
        (Some(_), Some(claim)) => Some(first_of_month(claim).max(primary_active_from)),
        _ => None,
    };

    let monthly_inflation = inputs.inflation_rate / Decimal::from(MONTHS_PER_YEAR);

    let mut monthly: Vec<MonthlyBenefit> = Vec::new();
    let mut annual: Vec<AnnualProjection> = Vec::new();
    let mut total = Decimal::ZERO;

    let mut current = sim_start;
    let mut elapsed_months: u32 = 0;
    while current < horizon {
        let inflation = compound_factor(monthly_inflation, elapsed_months);

        let primary_amount = if current >= primary_active_from {
            primary_base * inflation
        } else {
            Decimal::ZERO
        };
        let spouse_amount = match spouse_active_from {
            Some(from) if current >= from => spouse_base * inflation,
            _ => Decimal::ZERO,
        };
        let topup_amount = match topup_active_from {
            Some(from) if current >= from => topup_base * inflation,
            _ => Decimal::ZERO,
        };
        let month_total = primary_amount + spouse_amount + topup_amount;
        total += month_total;

        monthly.push(MonthlyBenefit {
            year: current.year(),
            month: current.month(),
            primary_benefit: primary_amount,
            spouse_benefit: spouse_amount,
            spousal_topup: topup_amount,
            total: month_total,
        });

        match annual.last_mut() {
            Some(bucket) if bucket.year == current.year() => {
                bucket.primary_benefit += primary_amount;
                bucket.spouse_benefit += spouse_amount;
                bucket.spousal_topup += topup_amount;
                bucket.total += month_total;
            }
            _ => {
                annual.push(AnnualProjection {
                    year: current.year(),
                    primary_age: age_attained_in_year(primary.birth_date, current.year()),
                    spouse_age: spouse
                        .map(|s| age_attained_in_year(s.birth_date, current.year())),
                    primary_benefit: primary_amount,
                    spouse_benefit: spouse_amount,
                    spousal_topup: topup_amount,
                    total: month_total,
                });
            }
        }

        current = add_months(current, 1);
        elapsed_months += 1;
    }

    LifetimeBenefitOutput {
        total_lifetime_benefit: total,
        monthly,
        annual,
    }
}

fn age_attained_in_year(birth_date: NaiveDate, year: i32) -> u32 {
    (year - birth_date.year()).max(0) as u32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
