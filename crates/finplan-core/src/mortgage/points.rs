use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::time_value::level_payment;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::{FinPlanError, FinPlanResult};

const MONTHS_PER_YEAR: u32 = 12;
const HORIZON_5YR_MONTHS: u32 = 60;
const HORIZON_10YR_MONTHS: u32 = 120;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// A named rate/points combination. Exactly one scenario in a comparison set
/// must be the baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsScenario {
    pub name: String,
    /// Annual nominal rate as a decimal (0.05625 = 5.625%).
    pub rate: Rate,
    /// Discount points: 1.0 = 1% of the loan amount paid up front.
    pub points: Decimal,
    #[serde(default)]
    pub is_baseline: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsComparisonInput {
    pub scenarios: Vec<PointsScenario>,
    pub loan_amount: Money,
    pub term_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub name: String,
    pub rate: Rate,
    pub points: Decimal,
    pub is_baseline: bool,
    pub monthly_payment: Money,
    pub point_cost: Money,
    /// Months until the extra point cost is recovered from the lower
    /// payment, relative to the baseline. None when the scenario has no
    /// positive monthly savings (including the baseline against itself).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_even_months: Option<Decimal>,
    pub total_cost_5yr: Money,
    pub total_cost_10yr: Money,
    pub total_cost_full_term: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsComparisonOutput {
    pub results: Vec<ComparisonResult>,
    pub baseline: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare rate/points scenarios for the same loan amount and term against
/// the designated baseline scenario.
pub fn compare_scenarios(
    input: &PointsComparisonInput,
) -> FinPlanResult<ComputationOutput<PointsComparisonOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    if input.loan_amount <= Decimal::ZERO {
        return Err(FinPlanError::InvalidInput {
            field: "loan_amount".into(),
            reason: "Loan amount must be > 0".into(),
        });
    }
    if input.term_years == 0 {
        return Err(FinPlanError::InvalidInput {
            field: "term_years".into(),
            reason: "Term must be at least 1 year".into(),
        });
    }
    if input.scenarios.is_empty() {
        return Err(FinPlanError::InvalidInput {
            field: "scenarios".into(),
            reason: "At least one scenario is required".into(),
        });
    }
    let baseline_count = input.scenarios.iter().filter(|s| s.is_baseline).count();
    if baseline_count != 1 {
        return Err(FinPlanError::InvalidInput {
            field: "scenarios".into(),
            reason: format!(
                "Exactly one scenario must be marked baseline (found {})",
                baseline_count
            ),
        });
    }

    let total_periods = input.term_years * MONTHS_PER_YEAR;

    // Baseline payment and point cost anchor every break-even figure
    let baseline = input
        .scenarios
        .iter()
        .find(|s| s.is_baseline)
        .ok_or_else(|| FinPlanError::InvalidInput {
            field: "scenarios".into(),
            reason: "Baseline scenario missing".into(),
        })?;
    let baseline_payment = scenario_payment(baseline, input.loan_amount, total_periods)?;
    let baseline_point_cost = point_cost(input.loan_amount, baseline.points);

    let mut results = Vec::with_capacity(input.scenarios.len());
    for scenario in &input.scenarios {
        let monthly_payment = scenario_payment(scenario, input.loan_amount, total_periods)?;
        let cost = point_cost(input.loan_amount, scenario.points);

        let monthly_savings = baseline_payment - monthly_payment;
        let break_even_months = if monthly_savings > Decimal::ZERO {
            Some((cost - baseline_point_cost) / monthly_savings)
        } else {
            None
        };

        results.push(ComparisonResult {
            name: scenario.name.clone(),
            rate: scenario.rate,
            points: scenario.points,
            is_baseline: scenario.is_baseline,
            monthly_payment,
            point_cost: cost,
            break_even_months,
            total_cost_5yr: horizon_cost(cost, monthly_payment, HORIZON_5YR_MONTHS, total_periods),
            total_cost_10yr: horizon_cost(cost, monthly_payment, HORIZON_10YR_MONTHS, total_periods),
            total_cost_full_term: horizon_cost(cost, monthly_payment, total_periods, total_periods),
        });
    }

    let output = PointsComparisonOutput {
        results,
        baseline: baseline.name.clone(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Discount point comparison (break-even vs baseline, fixed horizons)",
        &serde_json::json!({
            "loan_amount": input.loan_amount.to_string(),
            "term_years": input.term_years,
            "scenario_count": input.scenarios.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn scenario_payment(
    scenario: &PointsScenario,
    loan_amount: Money,
    total_periods: u32,
) -> FinPlanResult<Money> {
    if scenario.rate < Decimal::ZERO {
        return Err(FinPlanError::InvalidInput {
            field: "rate".into(),
            reason: format!("Scenario '{}' has a negative rate", scenario.name),
        });
    }
    level_payment(
        loan_amount,
        scenario.rate / Decimal::from(MONTHS_PER_YEAR),
        total_periods,
    )
}

fn point_cost(loan_amount: Money, points: Decimal) -> Money {
    loan_amount * points / dec!(100)
}

fn horizon_cost(
    point_cost: Money,
    monthly_payment: Money,
    horizon_months: u32,
    total_periods: u32,
) -> Money {
    let months = horizon_months.min(total_periods);
    point_cost + monthly_payment * Decimal::from(months)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn scenario(name: &str, rate: Decimal, points: Decimal, baseline: bool) -> PointsScenario {
        PointsScenario {
            name: name.to_string(),
            rate,
            points,
            is_baseline: baseline,
        }
    }

    // ---------------------------------------------------------------
    // 1. A zero-point baseline against itself: zero cost, null break-even
    // ---------------------------------------------------------------
    #[test]
    fn test_baseline_against_itself() {
        let input = PointsComparisonInput {
            scenarios: vec![scenario("5.625% / 0 pts", dec!(0.05625), Decimal::ZERO, true)],
            loan_amount: dec!(320_000),
            term_years: 30,
        };
        let out = compare_scenarios(&input).unwrap().result;

        assert_eq!(out.results.len(), 1);
        let baseline = &out.results[0];
        let expected =
            level_payment(dec!(320_000), dec!(0.05625) / dec!(12), 360).unwrap();
        assert_eq!(baseline.monthly_payment, expected);
        assert_eq!(baseline.point_cost, Decimal::ZERO);
        assert_eq!(baseline.break_even_months, None);
        assert_eq!(out.baseline, "5.625% / 0 pts");
    }

    // ---------------------------------------------------------------
    // 2. Buying down the rate: break-even = cost diff / monthly savings
    // ---------------------------------------------------------------
    #[test]
    fn test_break_even_formula() {
        let input = PointsComparisonInput {
            scenarios: vec![
                scenario("no points", dec!(0.0650), Decimal::ZERO, true),
                scenario("one point", dec!(0.0625), dec!(1.0), false),
            ],
            loan_amount: dec!(300_000),
            term_years: 30,
        };
        let out = compare_scenarios(&input).unwrap().result;

        let base = &out.results[0];
        let bought = &out.results[1];
        assert_eq!(bought.point_cost, dec!(3000));
        assert!(bought.monthly_payment < base.monthly_payment);

        let savings = base.monthly_payment - bought.monthly_payment;
        let expected = dec!(3000) / savings;
        assert_eq!(bought.break_even_months, Some(expected));
        // A quarter-point buydown on 300k saves ~$49/month: roughly 5 years
        assert!(expected > dec!(50) && expected < dec!(75), "be={}", expected);
    }

    // ---------------------------------------------------------------
    // 3. Higher rate than baseline: no positive savings, null break-even
    // ---------------------------------------------------------------
    #[test]
    fn test_no_savings_null_break_even() {
        let input = PointsComparisonInput {
            scenarios: vec![
                scenario("baseline", dec!(0.06), Decimal::ZERO, true),
                scenario("worse", dec!(0.0675), dec!(0.5), false),
            ],
            loan_amount: dec!(250_000),
            term_years: 30,
        };
        let out = compare_scenarios(&input).unwrap().result;
        assert_eq!(out.results[1].break_even_months, None);
    }

    // ---------------------------------------------------------------
    // 4. Horizon costs: points plus payments, capped at the term
    // ---------------------------------------------------------------
    #[test]
    fn test_horizon_costs() {
        let input = PointsComparisonInput {
            scenarios: vec![scenario("base", dec!(0.06), dec!(2.0), true)],
            loan_amount: dec!(200_000),
            term_years: 3,
        };
        let out = compare_scenarios(&input).unwrap().result;
        let r = &out.results[0];

        assert_eq!(r.point_cost, dec!(4000));
        // 3-year term: both the 5-year and 10-year horizons cap at 36 months
        assert_eq!(r.total_cost_5yr, r.total_cost_full_term);
        assert_eq!(r.total_cost_10yr, r.total_cost_full_term);
        assert_eq!(
            r.total_cost_full_term,
            dec!(4000) + r.monthly_payment * dec!(36)
        );
    }

    #[test]
    fn test_horizon_costs_long_term() {
        let input = PointsComparisonInput {
            scenarios: vec![scenario("base", dec!(0.055), Decimal::ZERO, true)],
            loan_amount: dec!(280_000),
            term_years: 30,
        };
        let r = compare_scenarios(&input).unwrap().result.results[0].clone();
        assert_eq!(r.total_cost_5yr, r.monthly_payment * dec!(60));
        assert_eq!(r.total_cost_10yr, r.monthly_payment * dec!(120));
        assert_eq!(r.total_cost_full_term, r.monthly_payment * dec!(360));
    }

    // ---------------------------------------------------------------
    // 5. Baseline marker validation
    // ---------------------------------------------------------------
    #[test]
    fn test_exactly_one_baseline_required() {
        let none = PointsComparisonInput {
            scenarios: vec![scenario("a", dec!(0.06), Decimal::ZERO, false)],
            loan_amount: dec!(100_000),
            term_years: 30,
        };
        assert!(compare_scenarios(&none).is_err());

        let two = PointsComparisonInput {
            scenarios: vec![
                scenario("a", dec!(0.06), Decimal::ZERO, true),
                scenario("b", dec!(0.0575), dec!(1.0), true),
            ],
            loan_amount: dec!(100_000),
            term_years: 30,
        };
        assert!(compare_scenarios(&two).is_err());
    }

    #[test]
    fn test_nonpositive_loan_rejected() {
        let input = PointsComparisonInput {
            scenarios: vec![scenario("a", dec!(0.06), Decimal::ZERO, true)],
            loan_amount: Decimal::ZERO,
            term_years: 30,
        };
        assert!(compare_scenarios(&input).is_err());
    }
}
