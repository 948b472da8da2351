use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::time_value::level_payment;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::{FinPlanError, FinPlanResult};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Hard ceiling on schedule loop iterations; bounds runaway loops from
/// pathological numeric inputs, it is not a business rule.
const MAX_SCHEDULE_ITERATIONS: u32 = 10_000;

/// Mortgage insurance drops off once loan-to-value reaches this threshold.
const PMI_LTV_CUTOFF: Decimal = dec!(0.78);

const MONTHS_PER_YEAR: u32 = 12;
const BIWEEKLY_PERIODS_PER_YEAR: u32 = 26;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Loan definition for a new purchase or an existing balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Purchase price for a new loan; drives the LTV cutoff for mortgage
    /// insurance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<Money>,
    /// Outstanding balance when `existing_loan` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_balance: Option<Money>,
    #[serde(default)]
    pub existing_loan: bool,
    /// Annual nominal rate as a decimal (0.05625 = 5.625%).
    pub annual_rate: Rate,
    pub term_years: u32,
    /// Stated monthly payment for an existing loan. Derived from the term
    /// when absent; existing loans are often partway amortized, so the
    /// stated payment is authoritative when given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_payment: Option<Money>,
    #[serde(default)]
    pub property_tax_annual: Money,
    #[serde(default)]
    pub home_insurance_annual: Money,
    /// Annual mortgage-insurance rate applied to the starting balance.
    #[serde(default)]
    pub mortgage_insurance_rate: Rate,
}

impl LoanParameters {
    /// Starting principal: existing balance, or home price less down payment.
    pub fn principal(&self) -> FinPlanResult<Money> {
        let principal = if self.existing_loan {
            self.existing_balance.ok_or_else(|| FinPlanError::InvalidInput {
                field: "existing_balance".into(),
                reason: "existing_balance is required when existing_loan is set".into(),
            })?
        } else {
            let price = self.home_price.ok_or_else(|| FinPlanError::InvalidInput {
                field: "home_price".into(),
                reason: "home_price is required for a new loan".into(),
            })?;
            price - self.down_payment.unwrap_or(Decimal::ZERO)
        };

        if principal <= Decimal::ZERO {
            return Err(FinPlanError::InvalidInput {
                field: "principal".into(),
                reason: "Derived principal must be > 0".into(),
            });
        }
        Ok(principal)
    }
}

/// Optional paydown modifiers. Extra monthly principal, principal doubling,
/// and the annual lump sum compose additively; the bi-weekly conversion
/// replaces the monthly cadence entirely and ignores the other modifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaydownStrategy {
    #[serde(default)]
    pub extra_monthly: Money,
    #[serde(default)]
    pub double_principal: bool,
    #[serde(default)]
    pub annual_lump_sum: Money,
    #[serde(default)]
    pub biweekly: bool,
}

impl PaydownStrategy {
    fn is_active(&self) -> bool {
        self.extra_monthly > Decimal::ZERO
            || self.double_principal
            || self.annual_lump_sum > Decimal::ZERO
            || self.biweekly
    }

    fn has_monthly_modifiers(&self) -> bool {
        self.extra_monthly > Decimal::ZERO
            || self.double_principal
            || self.annual_lump_sum > Decimal::ZERO
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub loan: LoanParameters,
    #[serde(default)]
    pub strategy: PaydownStrategy,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One emitted period of the schedule. In bi-weekly mode an entry covers two
/// bi-weekly payments (one elapsed month).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub period: u32,
    /// Scheduled portion only: principal + interest. The final period may be
    /// smaller than the level payment.
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub extra_principal: Money,
    pub balance: Money,
    pub cumulative_interest: Money,
    pub mortgage_insurance: Money,
    pub escrow: Money,
}

/// Savings realized by an active paydown strategy relative to the plain
/// monthly schedule of the same loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineSavings {
    pub baseline_total_interest: Money,
    pub baseline_payoff_periods: u32,
    pub interest_saved: Money,
    pub periods_saved: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub schedule: Vec<ScheduleEntry>,
    /// Level monthly payment for the loan (principal + interest only).
    pub scheduled_payment: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biweekly_payment: Option<Money>,
    /// Number of emitted schedule entries (months).
    pub payoff_periods: u32,
    pub total_interest: Money,
    /// False when the schedule was truncated: payment too low to cover
    /// interest, or the iteration ceiling was reached.
    pub fully_amortized: bool,
    pub monthly_escrow: Money,
    pub monthly_mortgage_insurance: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_vs_baseline: Option<BaselineSavings>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate a full payment schedule for the loan under the given paydown
/// strategy.
///
/// Never errors on a degenerate numeric state: a payment that does not cover
/// the period's interest truncates the schedule (the caller detects an
/// unexpectedly short or balance-non-zero schedule), and `Err` is reserved
/// for violations of the input contract (non-positive principal, zero term).
pub fn generate_schedule(
    input: &AmortizationInput,
) -> FinPlanResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let loan = &input.loan;
    let principal = loan.principal()?;

    if loan.annual_rate < Decimal::ZERO {
        return Err(FinPlanError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Annual rate must be >= 0".into(),
        });
    }
    if loan.term_years == 0 {
        return Err(FinPlanError::InvalidInput {
            field: "term_years".into(),
            reason: "Term must be at least 1 year".into(),
        });
    }

    let monthly_rate = loan.annual_rate / Decimal::from(MONTHS_PER_YEAR);
    let total_periods = loan.term_years * MONTHS_PER_YEAR;
    let level = level_payment(principal, monthly_rate, total_periods)?;
    let scheduled_payment = match loan.scheduled_payment {
        Some(stated) if loan.existing_loan => stated,
        _ => level,
    };

    let mi_monthly = principal * loan.mortgage_insurance_rate / Decimal::from(MONTHS_PER_YEAR);
    let (escrow_monthly, ltv_denominator) = if loan.existing_loan {
        (Decimal::ZERO, None)
    } else {
        (
            (loan.property_tax_annual + loan.home_insurance_annual)
                / Decimal::from(MONTHS_PER_YEAR),
            loan.home_price,
        )
    };

    let mut strategy = input.strategy.clone();
    if strategy.biweekly && strategy.has_monthly_modifiers() {
        warnings.push(
            "Bi-weekly conversion replaces the monthly cadence; other paydown modifiers are ignored"
                .to_string(),
        );
        strategy.extra_monthly = Decimal::ZERO;
        strategy.double_principal = false;
        strategy.annual_lump_sum = Decimal::ZERO;
    }

    let (schedule, fully_amortized, biweekly_payment) = if strategy.biweekly {
        let biweekly_payment = scheduled_payment / dec!(2);
        let biweekly_rate = loan.annual_rate / Decimal::from(BIWEEKLY_PERIODS_PER_YEAR);
        let (entries, full) = build_biweekly_schedule(
            principal,
            biweekly_rate,
            biweekly_payment,
            mi_monthly,
            ltv_denominator,
            escrow_monthly,
            &mut warnings,
        );
        (entries, full, Some(biweekly_payment))
    } else {
        let (entries, full) = build_monthly_schedule(
            principal,
            monthly_rate,
            scheduled_payment,
            mi_monthly,
            ltv_denominator,
            escrow_monthly,
            &strategy,
            &mut warnings,
        );
        (entries, full, None)
    };

    let total_interest = schedule
        .last()
        .map(|e| e.cumulative_interest)
        .unwrap_or(Decimal::ZERO);
    let payoff_periods = schedule.len() as u32;

    let savings_vs_baseline = if strategy.is_active() && fully_amortized {
        let (baseline, baseline_full) = build_monthly_schedule(
            principal,
            monthly_rate,
            scheduled_payment,
            mi_monthly,
            ltv_denominator,
            escrow_monthly,
            &PaydownStrategy::default(),
            &mut Vec::new(),
        );
        if baseline_full {
            let baseline_total_interest = baseline
                .last()
                .map(|e| e.cumulative_interest)
                .unwrap_or(Decimal::ZERO);
            let baseline_payoff_periods = baseline.len() as u32;
            Some(BaselineSavings {
                baseline_total_interest,
                baseline_payoff_periods,
                interest_saved: baseline_total_interest - total_interest,
                periods_saved: baseline_payoff_periods.saturating_sub(payoff_periods),
            })
        } else {
            None
        }
    } else {
        None
    };

    let output = AmortizationOutput {
        schedule,
        scheduled_payment,
        biweekly_payment,
        payoff_periods,
        total_interest,
        fully_amortized,
        monthly_escrow: escrow_monthly,
        monthly_mortgage_insurance: mi_monthly,
        savings_vs_baseline,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Amortization schedule (level monthly payment with paydown strategies)",
        &serde_json::json!({
            "principal": principal.to_string(),
            "annual_rate": loan.annual_rate.to_string(),
            "term_years": loan.term_years,
            "existing_loan": loan.existing_loan,
            "biweekly": input.strategy.biweekly,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Schedule builders
// ---------------------------------------------------------------------------

fn period_mortgage_insurance(
    balance: Money,
    mi_monthly: Money,
    ltv_denominator: Option<Money>,
) -> Money {
    match ltv_denominator {
        // New loan: charged only while loan-to-value exceeds the cutoff
        Some(value) if value > Decimal::ZERO => {
            if balance / value > PMI_LTV_CUTOFF {
                mi_monthly
            } else {
                Decimal::ZERO
            }
        }
        Some(_) => Decimal::ZERO,
        // Existing loan: flat recurring amount, home value unknown
        None => mi_monthly,
    }
}

#[allow(clippy::too_many_arguments)]
fn build_monthly_schedule(
    principal: Money,
    monthly_rate: Rate,
    scheduled_payment: Money,
    mi_monthly: Money,
    ltv_denominator: Option<Money>,
    escrow_monthly: Money,
    strategy: &PaydownStrategy,
    warnings: &mut Vec<String>,
) -> (Vec<ScheduleEntry>, bool) {
    let mut entries: Vec<ScheduleEntry> = Vec::new();
    let mut balance = principal;
    let mut cumulative_interest = Decimal::ZERO;

    for period in 1..=MAX_SCHEDULE_ITERATIONS {
        let interest = balance * monthly_rate;
        if scheduled_payment <= interest {
            log::warn!(
                "schedule truncated at period {}: payment {} does not cover interest {}",
                period,
                scheduled_payment,
                interest
            );
            warnings.push(format!(
                "Payment {} does not cover period {} interest {}; the loan never amortizes and the schedule was truncated",
                scheduled_payment, period, interest
            ));
            return (entries, false);
        }

        let mut principal_part = scheduled_payment - interest;
        let mut extra = strategy.extra_monthly;
        if strategy.double_principal {
            extra += principal_part;
        }
        if period % MONTHS_PER_YEAR == 0 {
            extra += strategy.annual_lump_sum;
        }

        // Total principal applied is capped at the remaining balance; the
        // final period may carry a smaller payment.
        if principal_part >= balance {
            principal_part = balance;
            extra = Decimal::ZERO;
        } else if extra > balance - principal_part {
            extra = balance - principal_part;
        }

        let mortgage_insurance = period_mortgage_insurance(balance, mi_monthly, ltv_denominator);

        cumulative_interest += interest;
        balance -= principal_part + extra;

        entries.push(ScheduleEntry {
            period,
            payment: principal_part + interest,
            principal: principal_part,
            interest,
            extra_principal: extra,
            balance,
            cumulative_interest,
            mortgage_insurance,
            escrow: escrow_monthly,
        });

        if balance <= Decimal::ZERO {
            return (entries, true);
        }
    }

    warnings.push(format!(
        "Schedule exceeded {} iterations and was truncated",
        MAX_SCHEDULE_ITERATIONS
    ));
    (entries, false)
}

/// Bi-weekly cadence: half the monthly level payment every two weeks at
/// annual_rate/26 per period. One schedule entry is emitted per *two*
/// bi-weekly periods (one elapsed month) carrying the combined amounts; a
/// payoff landing on an odd bi-weekly boundary emits a final single-period
/// entry.
fn build_biweekly_schedule(
    principal: Money,
    biweekly_rate: Rate,
    biweekly_payment: Money,
    mi_monthly: Money,
    ltv_denominator: Option<Money>,
    escrow_monthly: Money,
    warnings: &mut Vec<String>,
) -> (Vec<ScheduleEntry>, bool) {
    let mut entries: Vec<ScheduleEntry> = Vec::new();
    let mut balance = principal;
    let mut cumulative_interest = Decimal::ZERO;

    let mut month_start_balance = principal;
    let mut month_payment = Decimal::ZERO;
    let mut month_principal = Decimal::ZERO;
    let mut month_interest = Decimal::ZERO;
    let mut half_periods = 0u32;
    let mut month = 0u32;

    for biweek in 1..=MAX_SCHEDULE_ITERATIONS {
        let interest = balance * biweekly_rate;
        if biweekly_payment <= interest {
            log::warn!(
                "bi-weekly schedule truncated at period {}: payment {} does not cover interest {}",
                biweek,
                biweekly_payment,
                interest
            );
            warnings.push(format!(
                "Bi-weekly payment {} does not cover period {} interest {}; the loan never amortizes and the schedule was truncated",
                biweekly_payment, biweek, interest
            ));
            if half_periods > 0 {
                month += 1;
                entries.push(ScheduleEntry {
                    period: month,
                    payment: month_payment,
                    principal: month_principal,
                    interest: month_interest,
                    extra_principal: Decimal::ZERO,
                    balance,
                    cumulative_interest,
                    mortgage_insurance: period_mortgage_insurance(
                        month_start_balance,
                        mi_monthly,
                        ltv_denominator,
                    ),
                    escrow: escrow_monthly,
                });
            }
            return (entries, false);
        }

        let mut principal_part = biweekly_payment - interest;
        if principal_part >= balance {
            principal_part = balance;
        }

        cumulative_interest += interest;
        balance -= principal_part;
        month_payment += principal_part + interest;
        month_principal += principal_part;
        month_interest += interest;
        half_periods += 1;

        if half_periods == 2 || balance <= Decimal::ZERO {
            month += 1;
            entries.push(ScheduleEntry {
                period: month,
                payment: month_payment,
                principal: month_principal,
                interest: month_interest,
                extra_principal: Decimal::ZERO,
                balance,
                cumulative_interest,
                mortgage_insurance: period_mortgage_insurance(
                    month_start_balance,
                    mi_monthly,
                    ltv_denominator,
                ),
                escrow: escrow_monthly,
            });
            month_start_balance = balance;
            month_payment = Decimal::ZERO;
            month_principal = Decimal::ZERO;
            month_interest = Decimal::ZERO;
            half_periods = 0;
        }

        if balance <= Decimal::ZERO {
            return (entries, true);
        }
    }

    warnings.push(format!(
        "Schedule exceeded {} iterations and was truncated",
        MAX_SCHEDULE_ITERATIONS
    ));
    (entries, false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn new_loan(price: Decimal, down: Decimal, rate: Decimal, years: u32) -> LoanParameters {
        LoanParameters {
            home_price: Some(price),
            down_payment: Some(down),
            existing_balance: None,
            existing_loan: false,
            annual_rate: rate,
            term_years: years,
            scheduled_payment: None,
            property_tax_annual: Decimal::ZERO,
            home_insurance_annual: Decimal::ZERO,
            mortgage_insurance_rate: Decimal::ZERO,
        }
    }

    fn plain_input(loan: LoanParameters) -> AmortizationInput {
        AmortizationInput {
            loan,
            strategy: PaydownStrategy::default(),
        }
    }

    // ---------------------------------------------------------------
    // 1. Full amortization: principal paid back within rounding
    // ---------------------------------------------------------------
    #[test]
    fn test_principal_conservation() {
        let input = plain_input(new_loan(dec!(400_000), dec!(80_000), dec!(0.06), 30));
        let out = generate_schedule(&input).unwrap().result;

        assert!(out.fully_amortized);
        let paid: Decimal = out
            .schedule
            .iter()
            .map(|e| e.principal + e.extra_principal)
            .sum();
        assert!((paid - dec!(320_000)).abs() < dec!(0.01), "paid={}", paid);
        // 30-year loan pays off at or within a period of 360
        assert!(out.payoff_periods >= 359 && out.payoff_periods <= 361);
    }

    // ---------------------------------------------------------------
    // 2. Zero-rate loan: payoff = ceil(P / payment), zero interest
    // ---------------------------------------------------------------
    #[test]
    fn test_zero_rate_loan() {
        let input = plain_input(new_loan(dec!(120_000), Decimal::ZERO, Decimal::ZERO, 10));
        let out = generate_schedule(&input).unwrap().result;

        assert_eq!(out.scheduled_payment, dec!(1000));
        assert_eq!(out.payoff_periods, 120);
        assert!(out.schedule.iter().all(|e| e.interest.is_zero()));
        assert_eq!(out.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_zero_rate_payoff_is_ceiling_of_ratio() {
        // Stated payment that does not divide the balance evenly: the last
        // period carries the remainder, payoff = ceil(1000 / 300) = 4
        let input = plain_input(LoanParameters {
            home_price: None,
            down_payment: None,
            existing_balance: Some(dec!(1000)),
            existing_loan: true,
            annual_rate: Decimal::ZERO,
            term_years: 5,
            scheduled_payment: Some(dec!(300)),
            property_tax_annual: Decimal::ZERO,
            home_insurance_annual: Decimal::ZERO,
            mortgage_insurance_rate: Decimal::ZERO,
        });
        let out = generate_schedule(&input).unwrap().result;

        assert_eq!(out.payoff_periods, 4);
        assert_eq!(out.schedule[2].payment, dec!(300));
        assert_eq!(out.schedule[3].payment, dec!(100));
        assert!(out.schedule.iter().all(|e| e.interest.is_zero()));
    }

    // ---------------------------------------------------------------
    // 3. Balance recurrence and monotonicity invariants
    // ---------------------------------------------------------------
    #[test]
    fn test_balance_recurrence_and_monotonicity() {
        let input = plain_input(new_loan(dec!(300_000), dec!(50_000), dec!(0.055), 15));
        let out = generate_schedule(&input).unwrap().result;

        let mut prev_balance = dec!(250_000);
        let mut prev_cum = Decimal::ZERO;
        for entry in &out.schedule {
            let expected = prev_balance - entry.principal - entry.extra_principal;
            assert!((entry.balance - expected).abs() < dec!(0.0001));
            assert!(entry.balance <= prev_balance);
            assert!(entry.balance >= Decimal::ZERO);
            assert!(entry.cumulative_interest >= prev_cum);
            prev_balance = entry.balance;
            prev_cum = entry.cumulative_interest;
        }
        assert_eq!(out.schedule.last().unwrap().balance, Decimal::ZERO);
    }

    // ---------------------------------------------------------------
    // 4. principal + interest == scheduled payment except final period
    // ---------------------------------------------------------------
    #[test]
    fn test_payment_split_invariant() {
        let input = plain_input(new_loan(dec!(250_000), dec!(50_000), dec!(0.0475), 30));
        let out = generate_schedule(&input).unwrap().result;

        for entry in &out.schedule[..out.schedule.len() - 1] {
            assert!((entry.payment - out.scheduled_payment).abs() < dec!(0.0001));
            assert!((entry.principal + entry.interest - entry.payment).abs() < dec!(0.0001));
        }
        let last = out.schedule.last().unwrap();
        assert!(last.payment <= out.scheduled_payment + dec!(0.0001));
    }

    // ---------------------------------------------------------------
    // 5. Extra monthly principal shortens payoff and saves interest
    // ---------------------------------------------------------------
    #[test]
    fn test_extra_monthly_principal() {
        let loan = new_loan(dec!(350_000), dec!(70_000), dec!(0.065), 30);
        let plain = generate_schedule(&plain_input(loan.clone())).unwrap().result;

        let input = AmortizationInput {
            loan,
            strategy: PaydownStrategy {
                extra_monthly: dec!(300),
                ..Default::default()
            },
        };
        let accelerated = generate_schedule(&input).unwrap().result;

        assert!(accelerated.payoff_periods < plain.payoff_periods);
        assert!(accelerated.total_interest < plain.total_interest);

        let savings = accelerated.savings_vs_baseline.unwrap();
        assert_eq!(savings.baseline_payoff_periods, plain.payoff_periods);
        assert_eq!(
            savings.periods_saved,
            plain.payoff_periods - accelerated.payoff_periods
        );
        assert!(savings.interest_saved > Decimal::ZERO);
    }

    // ---------------------------------------------------------------
    // 6. Double-principal flag roughly halves the payoff horizon
    // ---------------------------------------------------------------
    #[test]
    fn test_double_principal() {
        let loan = new_loan(dec!(300_000), dec!(60_000), dec!(0.06), 30);
        let plain = generate_schedule(&plain_input(loan.clone())).unwrap().result;

        let input = AmortizationInput {
            loan,
            strategy: PaydownStrategy {
                double_principal: true,
                ..Default::default()
            },
        };
        let doubled = generate_schedule(&input).unwrap().result;

        assert!(doubled.payoff_periods < plain.payoff_periods / 2 + 24);
        // Away from the payoff tail the extra mirrors the scheduled principal
        for entry in &doubled.schedule[..100] {
            assert_eq!(entry.extra_principal, entry.principal);
        }
    }

    // ---------------------------------------------------------------
    // 7. Annual lump sum lands on period-12 boundaries only
    // ---------------------------------------------------------------
    #[test]
    fn test_annual_lump_sum_boundaries() {
        let loan = new_loan(dec!(200_000), dec!(40_000), dec!(0.05), 30);
        let input = AmortizationInput {
            loan,
            strategy: PaydownStrategy {
                annual_lump_sum: dec!(5000),
                ..Default::default()
            },
        };
        let out = generate_schedule(&input).unwrap().result;

        for entry in &out.schedule[..out.schedule.len() - 1] {
            if entry.period % 12 == 0 {
                assert_eq!(entry.extra_principal, dec!(5000));
            } else {
                assert_eq!(entry.extra_principal, Decimal::ZERO);
            }
        }
    }

    // ---------------------------------------------------------------
    // 8. Non-amortizing payment truncates with a warning, no error
    // ---------------------------------------------------------------
    #[test]
    fn test_non_amortizing_payment_truncates() {
        let input = plain_input(LoanParameters {
            home_price: None,
            down_payment: None,
            existing_balance: Some(dec!(100_000)),
            existing_loan: true,
            annual_rate: dec!(0.06),
            term_years: 30,
            scheduled_payment: Some(dec!(400)), // monthly interest is 500
            property_tax_annual: Decimal::ZERO,
            home_insurance_annual: Decimal::ZERO,
            mortgage_insurance_rate: Decimal::ZERO,
        });
        let out = generate_schedule(&input).unwrap();

        assert!(!out.result.fully_amortized);
        assert!(out.result.schedule.is_empty());
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("never amortizes"));
    }

    // ---------------------------------------------------------------
    // 9. Bi-weekly cadence accelerates payoff
    // ---------------------------------------------------------------
    #[test]
    fn test_biweekly_accelerates_payoff() {
        let loan = new_loan(dec!(320_000), Decimal::ZERO, dec!(0.06), 30);
        let plain = generate_schedule(&plain_input(loan.clone())).unwrap().result;

        let input = AmortizationInput {
            loan,
            strategy: PaydownStrategy {
                biweekly: true,
                ..Default::default()
            },
        };
        let biweekly = generate_schedule(&input).unwrap().result;

        assert!(biweekly.fully_amortized);
        assert_eq!(
            biweekly.biweekly_payment.unwrap(),
            plain.scheduled_payment / dec!(2)
        );
        // 26 half-payments a year is a 13th monthly payment: roughly 40
        // fewer emitted entries on a 30-year loan at 6%
        assert!(biweekly.payoff_periods < plain.payoff_periods - 36);
        assert!(biweekly.total_interest < plain.total_interest);
    }

    // ---------------------------------------------------------------
    // 10. Bi-weekly odd final period emits a single-period entry
    // ---------------------------------------------------------------
    #[test]
    fn test_biweekly_final_partial_period() {
        // Zero-rate keeps the arithmetic exact: a 1005 balance at 41 per
        // bi-weekly period needs 25 periods, so the 13th entry covers one.
        let input = AmortizationInput {
            loan: LoanParameters {
                home_price: None,
                down_payment: None,
                existing_balance: Some(dec!(1005)),
                existing_loan: true,
                annual_rate: Decimal::ZERO,
                term_years: 5,
                scheduled_payment: Some(dec!(82)),
                property_tax_annual: Decimal::ZERO,
                home_insurance_annual: Decimal::ZERO,
                mortgage_insurance_rate: Decimal::ZERO,
            },
            strategy: PaydownStrategy {
                biweekly: true,
                ..Default::default()
            },
        };
        let out = generate_schedule(&input).unwrap().result;

        assert_eq!(out.biweekly_payment.unwrap(), dec!(41));
        assert!(out.fully_amortized);
        assert_eq!(out.payoff_periods, 13);
        let last = out.schedule.last().unwrap();
        assert_eq!(last.payment, dec!(21));
        assert_eq!(last.balance, Decimal::ZERO);
    }

    // ---------------------------------------------------------------
    // 11. Mortgage insurance drops at 78% LTV on a new loan
    // ---------------------------------------------------------------
    #[test]
    fn test_mortgage_insurance_ltv_cutoff() {
        let mut loan = new_loan(dec!(110_000), dec!(10_000), dec!(0.06), 30);
        loan.mortgage_insurance_rate = dec!(0.005);
        let out = generate_schedule(&plain_input(loan)).unwrap().result;

        let mi = dec!(100_000) * dec!(0.005) / dec!(12);
        assert_eq!(out.monthly_mortgage_insurance, mi);
        assert_eq!(out.schedule[0].mortgage_insurance, mi);
        assert_eq!(
            out.schedule.last().unwrap().mortgage_insurance,
            Decimal::ZERO
        );

        // MI is charged exactly while the prior balance leaves LTV above 78%
        let cutoff = dec!(110_000) * dec!(0.78);
        let mut prev_balance = dec!(100_000);
        for entry in &out.schedule {
            if prev_balance / dec!(110_000) > dec!(0.78) {
                assert_eq!(entry.mortgage_insurance, mi, "period {}", entry.period);
            } else {
                assert_eq!(
                    entry.mortgage_insurance,
                    Decimal::ZERO,
                    "period {} balance {} cutoff {}",
                    entry.period,
                    prev_balance,
                    cutoff
                );
            }
            prev_balance = entry.balance;
        }
    }

    // ---------------------------------------------------------------
    // 12. Escrow on new loans only; flat MI on existing loans
    // ---------------------------------------------------------------
    #[test]
    fn test_escrow_and_existing_loan_mi() {
        let mut loan = new_loan(dec!(250_000), dec!(50_000), dec!(0.05), 30);
        loan.property_tax_annual = dec!(3600);
        loan.home_insurance_annual = dec!(1200);
        let out = generate_schedule(&plain_input(loan)).unwrap().result;
        assert_eq!(out.monthly_escrow, dec!(400));
        assert!(out.schedule.iter().all(|e| e.escrow == dec!(400)));

        let existing = plain_input(LoanParameters {
            home_price: None,
            down_payment: None,
            existing_balance: Some(dec!(180_000)),
            existing_loan: true,
            annual_rate: dec!(0.05),
            term_years: 25,
            scheduled_payment: None,
            property_tax_annual: dec!(3600),
            home_insurance_annual: dec!(1200),
            mortgage_insurance_rate: dec!(0.004),
        });
        let out = generate_schedule(&existing).unwrap().result;
        assert_eq!(out.monthly_escrow, Decimal::ZERO);
        let flat_mi = dec!(180_000) * dec!(0.004) / dec!(12);
        assert!(out
            .schedule
            .iter()
            .all(|e| e.mortgage_insurance == flat_mi));
    }

    // ---------------------------------------------------------------
    // 13. Bi-weekly ignores monthly modifiers with a warning
    // ---------------------------------------------------------------
    #[test]
    fn test_biweekly_ignores_monthly_modifiers() {
        let input = AmortizationInput {
            loan: new_loan(dec!(200_000), Decimal::ZERO, dec!(0.06), 30),
            strategy: PaydownStrategy {
                extra_monthly: dec!(500),
                biweekly: true,
                ..Default::default()
            },
        };
        let out = generate_schedule(&input).unwrap();
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("Bi-weekly conversion replaces")));
        assert!(out
            .result
            .schedule
            .iter()
            .all(|e| e.extra_principal.is_zero()));
    }

    // ---------------------------------------------------------------
    // Validation errors
    // ---------------------------------------------------------------
    #[test]
    fn test_validation_nonpositive_principal() {
        let input = plain_input(new_loan(dec!(100_000), dec!(100_000), dec!(0.05), 30));
        assert!(generate_schedule(&input).is_err());
    }

    #[test]
    fn test_validation_zero_term() {
        let input = plain_input(new_loan(dec!(100_000), Decimal::ZERO, dec!(0.05), 0));
        assert!(generate_schedule(&input).is_err());
    }

    #[test]
    fn test_validation_missing_existing_balance() {
        let input = plain_input(LoanParameters {
            home_price: None,
            down_payment: None,
            existing_balance: None,
            existing_loan: true,
            annual_rate: dec!(0.05),
            term_years: 30,
            scheduled_payment: None,
            property_tax_annual: Decimal::ZERO,
            home_insurance_annual: Decimal::ZERO,
            mortgage_insurance_rate: Decimal::ZERO,
        });
        assert!(generate_schedule(&input).is_err());
    }
}
