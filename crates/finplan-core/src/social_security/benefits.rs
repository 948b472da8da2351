use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};
use crate::{FinPlanError, FinPlanResult};

const MONTHS_PER_YEAR: u32 = 12;
const EARLIEST_CLAIM_AGE_YEARS: u32 = 62;
const DELAYED_CREDIT_CAP_AGE_YEARS: u32 = 70;

// Per-month reduction fractions: 5/9 of 1% (primary, first 36 months),
// 25/36 of 1% (spousal, first 36 months), 5/12 of 1% beyond 36 either way
const EARLY_FIRST_36_NUM: Decimal = dec!(5);
const EARLY_FIRST_36_DEN: Decimal = dec!(900);
const SPOUSAL_FIRST_36_NUM: Decimal = dec!(25);
const SPOUSAL_FIRST_36_DEN: Decimal = dec!(3600);
const BEYOND_36_NUM: Decimal = dec!(5);
const BEYOND_36_DEN: Decimal = dec!(1200);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonInput {
    pub birth_date: NaiveDate,
    /// Monthly Primary Insurance Amount at full retirement age.
    pub pia: Money,
    pub claim_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaritalStatus {
    Single,
    Married,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SsInputs {
    pub marital_status: MaritalStatus,
    pub primary: PersonInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse: Option<PersonInput>,
    /// Distinct claim date for the spousal top-up; defaults to the spouse's
    /// own claim date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spousal_claim_date: Option<NaiveDate>,
    /// Annual inflation rate, compounded monthly from simulation start.
    #[serde(default)]
    pub inflation_rate: Rate,
}

impl SsInputs {
    pub fn effective_spousal_claim_date(&self) -> Option<NaiveDate> {
        self.spousal_claim_date
            .or_else(|| self.spouse.as_ref().map(|s| s.claim_date))
    }
}

// ---------------------------------------------------------------------------
// Date helpers
// ---------------------------------------------------------------------------

pub(crate) fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

pub(crate) fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Whole calendar months from `from` to `to`; zero when `to` precedes `from`.
pub(crate) fn months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }
    let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0) as u32
}

// ---------------------------------------------------------------------------
// Full retirement age
// ---------------------------------------------------------------------------

/// FRA in (years, months) from birth year. Fixed statutory table: 65 through
/// 1937, sliding by two months per year to 66 for 1943-1954, sliding again
/// to 67 from 1960 on.
pub fn full_retirement_age(birth_year: i32) -> (u32, u32) {
    match birth_year {
        ..=1937 => (65, 0),
        1938 => (65, 2),
        1939 => (65, 4),
        1940 => (65, 6),
        1941 => (65, 8),
        1942 => (65, 10),
        1943..=1954 => (66, 0),
        1955 => (66, 2),
        1956 => (66, 4),
        1957 => (66, 6),
        1958 => (66, 8),
        1959 => (66, 10),
        _ => (67, 0),
    }
}

pub fn fra_date(birth_date: NaiveDate) -> NaiveDate {
    let (years, months) = full_retirement_age(birth_date.year());
    add_months(birth_date, years * MONTHS_PER_YEAR + months)
}

/// First month of full age-62 entitlement. A claimant born on the 1st or
/// 2nd is entitled in the month of the 62nd birthday, otherwise the
/// following month.
pub fn earliest_claim_date(birth_date: NaiveDate) -> NaiveDate {
    let sixty_second = add_months(birth_date, EARLIEST_CLAIM_AGE_YEARS * MONTHS_PER_YEAR);
    let month_start = first_of_month(sixty_second);
    if birth_date.day() <= 2 {
        month_start
    } else {
        add_months(month_start, 1)
    }
}

pub fn age_70_date(birth_date: NaiveDate) -> NaiveDate {
    add_months(birth_date, DELAYED_CREDIT_CAP_AGE_YEARS * MONTHS_PER_YEAR)
}

// ---------------------------------------------------------------------------
// Claim-age adjustment factors
// ---------------------------------------------------------------------------

/// Multiplier applied to the PIA for a claimant's own benefit.
///
/// After FRA: delayed retirement credit of 8%/year (8/12% per month),
/// earned only through age 70. Before FRA: reduction of 5/9% per month for
/// the first 36 early months and 5/12% per month beyond.
pub fn primary_adjustment_factor(birth_date: NaiveDate, claim_date: NaiveDate) -> Decimal {
    let fra = fra_date(birth_date);
    if claim_date >= fra {
        let cap = months_between(fra, age_70_date(birth_date));
        let credited = months_between(fra, claim_date).min(cap);
        Decimal::ONE + Decimal::from(credited) * dec!(0.08) / dec!(12)
    } else {
        let early = months_between(claim_date, fra);
        let first = early.min(36);
        let beyond = early.saturating_sub(36);
        let reduction = Decimal::from(first) * EARLY_FIRST_36_NUM / EARLY_FIRST_36_DEN
            + Decimal::from(beyond) * BEYOND_36_NUM / BEYOND_36_DEN;
        Decimal::ONE - reduction
    }
}

/// Multiplier applied to the spousal top-up. Steeper early reduction
/// (25/36% then 5/12% per month) and no delayed credit.
pub fn spousal_adjustment_factor(birth_date: NaiveDate, spousal_claim_date: NaiveDate) -> Decimal {
    let fra = fra_date(birth_date);
    if spousal_claim_date >= fra {
        return Decimal::ONE;
    }
    let early = months_between(spousal_claim_date, fra);
    let first = early.min(36);
    let beyond = early.saturating_sub(36);
    let reduction = Decimal::from(first) * SPOUSAL_FIRST_36_NUM / SPOUSAL_FIRST_36_DEN
        + Decimal::from(beyond) * BEYOND_36_NUM / BEYOND_36_DEN;
    Decimal::ONE - reduction
}

/// A claimant's own monthly benefit at their claim date.
pub fn benefit_at_claim(person: &PersonInput) -> Money {
    person.pia * primary_adjustment_factor(person.birth_date, person.claim_date)
}

/// Monthly spousal top-up: the reduced excess of half the primary's PIA
/// over the spouse's own PIA. Zero when the spouse's PIA is at least half
/// the primary's.
pub fn spousal_topup(primary_pia: Money, spouse: &PersonInput, spousal_claim_date: NaiveDate) -> Money {
    let excess = primary_pia / dec!(2) - spouse.pia;
    if excess <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    excess * spousal_adjustment_factor(spouse.birth_date, spousal_claim_date)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub(crate) fn validate_inputs(inputs: &SsInputs) -> FinPlanResult<()> {
    validate_person(&inputs.primary, "primary")?;
    if inputs.marital_status == MaritalStatus::Married && inputs.spouse.is_none() {
        return Err(FinPlanError::InvalidInput {
            field: "spouse".into(),
            reason: "Married inputs require a spouse record".into(),
        });
    }
    if let Some(spouse) = &inputs.spouse {
        validate_person(spouse, "spouse")?;
        if let Some(spousal_claim) = inputs.spousal_claim_date {
            if spousal_claim < earliest_claim_date(spouse.birth_date) {
                return Err(FinPlanError::InvalidInput {
                    field: "spousal_claim_date".into(),
                    reason: "Spousal claim date precedes first eligibility".into(),
                });
            }
        }
    }
    Ok(())
}

fn validate_person(person: &PersonInput, field: &str) -> FinPlanResult<()> {
    if person.pia < Decimal::ZERO {
        return Err(FinPlanError::InvalidInput {
            field: format!("{field}.pia"),
            reason: "PIA must be >= 0".into(),
        });
    }
    if person.claim_date < earliest_claim_date(person.birth_date) {
        return Err(FinPlanError::InvalidInput {
            field: format!("{field}.claim_date"),
            reason: format!(
                "Claim date precedes first eligibility ({})",
                earliest_claim_date(person.birth_date)
            ),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
