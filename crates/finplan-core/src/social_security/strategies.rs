use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::benefits::{
    age_70_date, benefit_at_claim, earliest_claim_date, fra_date, validate_inputs, MaritalStatus,
    PersonInput, SsInputs,
};
use super::lifetime::simulate;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::{FinPlanError, FinPlanResult};

/// The five fixed claiming archetypes. A deliberate simplification kept
/// from the product behavior: an enumeration, not an optimizer over the
/// full claim-date space.
const STRATEGY_COUNT: usize = 5;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimingStrategy {
    pub name: String,
    pub primary_claim_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse_claim_date: Option<NaiveDate>,
    pub total_lifetime_benefit: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategiesOutput {
    /// Ranked best-first by lifetime total; ties keep input order.
    pub strategies: Vec<ClaimingStrategy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurvivorScenario {
    /// Which claimant dies in this scenario.
    pub deceased: String,
    pub survivor_own_benefit: Money,
    pub deceased_benefit: Money,
    /// Excess over the survivor's own benefit; zero when the survivor's own
    /// benefit is already the larger.
    pub survivor_benefit: Money,
    pub combined_monthly_total: Money,
    pub combined_annual_total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurvivorOutput {
    pub primary_deceased: SurvivorScenario,
    pub spouse_deceased: SurvivorScenario,
}

// ---------------------------------------------------------------------------
// Strategy generation
// ---------------------------------------------------------------------------

/// Evaluate the five fixed claiming archetypes through the lifetime
/// simulation and rank them by total benefit, descending.
pub fn generate_strategies(
    inputs: &SsInputs,
) -> FinPlanResult<ComputationOutput<StrategiesOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validate_inputs(inputs)?;

    let archetypes: [(&str, Option<ClaimAge>, Option<ClaimAge>); STRATEGY_COUNT] = [
        ("As Selected", None, None),
        ("Both at Age 70", Some(ClaimAge::At70), Some(ClaimAge::At70)),
        (
            "Both at Full Retirement Age",
            Some(ClaimAge::AtFra),
            Some(ClaimAge::AtFra),
        ),
        (
            "Primary at 70, Spouse at FRA",
            Some(ClaimAge::At70),
            Some(ClaimAge::AtFra),
        ),
        ("Both at Age 62", Some(ClaimAge::At62), Some(ClaimAge::At62)),
    ];

    let mut strategies: Vec<ClaimingStrategy> = Vec::with_capacity(STRATEGY_COUNT);
    for (name, primary_age, spouse_age) in archetypes {
        let candidate = apply_archetype(inputs, primary_age, spouse_age);
        let result = simulate(&candidate, &mut Vec::new());
        strategies.push(ClaimingStrategy {
            name: name.to_string(),
            primary_claim_date: candidate.primary.claim_date,
            spouse_claim_date: candidate.spouse.as_ref().map(|s| s.claim_date),
            total_lifetime_benefit: result.total_lifetime_benefit,
        });
    }

    // Stable sort: ties keep enumeration order
    strategies.sort_by(|a, b| b.total_lifetime_benefit.cmp(&a.total_lifetime_benefit));

    let output = StrategiesOutput { strategies };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed claiming-strategy enumeration ranked by lifetime total",
        &serde_json::json!({
            "strategy_count": STRATEGY_COUNT,
            "marital_status": format!("{:?}", inputs.marital_status),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[derive(Clone, Copy)]
enum ClaimAge {
    At62,
    AtFra,
    At70,
}

fn claim_date_for(person: &PersonInput, age: ClaimAge) -> NaiveDate {
    match age {
        ClaimAge::At62 => earliest_claim_date(person.birth_date),
        ClaimAge::AtFra => fra_date(person.birth_date),
        ClaimAge::At70 => age_70_date(person.birth_date),
    }
}

fn apply_archetype(
    inputs: &SsInputs,
    primary_age: Option<ClaimAge>,
    spouse_age: Option<ClaimAge>,
) -> SsInputs {
    let mut candidate = inputs.clone();
    if let Some(age) = primary_age {
        candidate.primary.claim_date = claim_date_for(&candidate.primary, age);
        // Archetype claim dates supersede any distinct spousal claim date
        candidate.spousal_claim_date = None;
    }
    if let (Some(age), Some(spouse)) = (spouse_age, candidate.spouse.as_mut()) {
        spouse.claim_date = claim_date_for(spouse, age);
    }
    candidate
}

// ---------------------------------------------------------------------------
// Survivor benefits
// ---------------------------------------------------------------------------

/// On a claimant's death the survivor receives the larger of the two
/// benefits at their respective claim dates. Both death directions are
/// computed independently.
pub fn calculate_survivor_benefits(
    inputs: &SsInputs,
) -> FinPlanResult<ComputationOutput<SurvivorOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validate_inputs(inputs)?;
    let spouse = match (&inputs.marital_status, &inputs.spouse) {
        (MaritalStatus::Married, Some(spouse)) => spouse,
        _ => {
            return Err(FinPlanError::InvalidInput {
                field: "marital_status".into(),
                reason: "Survivor analysis requires a married couple".into(),
            })
        }
    };

    let primary_benefit = benefit_at_claim(&inputs.primary);
    let spouse_benefit = benefit_at_claim(spouse);

    let output = SurvivorOutput {
        primary_deceased: survivor_scenario("primary", spouse_benefit, primary_benefit),
        spouse_deceased: survivor_scenario("spouse", primary_benefit, spouse_benefit),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Survivor benefit analysis (larger-benefit continuation, both directions)",
        &serde_json::json!({
            "primary_claim_date": inputs.primary.claim_date.to_string(),
            "spouse_claim_date": spouse.claim_date.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn survivor_scenario(deceased: &str, survivor_own: Money, deceased_benefit: Money) -> SurvivorScenario {
    let excess = (deceased_benefit - survivor_own).max(Decimal::ZERO);
    let combined = survivor_own + excess;
    SurvivorScenario {
        deceased: deceased.to_string(),
        survivor_own_benefit: survivor_own,
        deceased_benefit,
        survivor_benefit: excess,
        combined_monthly_total: combined,
        combined_annual_total: combined * Decimal::from(12),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social_security::lifetime::calculate_lifetime_benefit;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn married_inputs() -> SsInputs {
        SsInputs {
            marital_status: MaritalStatus::Married,
            primary: PersonInput {
                birth_date: date(1960, 4, 15),
                pia: dec!(2400),
                claim_date: date(2027, 4, 1),
            },
            spouse: Some(PersonInput {
                birth_date: date(1962, 9, 10),
                pia: dec!(1100),
                claim_date: date(2029, 10, 1),
            }),
            spousal_claim_date: None,
            inflation_rate: Decimal::ZERO,
        }
    }

    fn single_inputs() -> SsInputs {
        SsInputs {
            marital_status: MaritalStatus::Single,
            primary: PersonInput {
                birth_date: date(1960, 4, 15),
                pia: dec!(2000),
                claim_date: date(2027, 4, 1),
            },
            spouse: None,
            spousal_claim_date: None,
            inflation_rate: Decimal::ZERO,
        }
    }

    // ---------------------------------------------------------------
    // 1. Exactly five strategies, ranked descending, As Selected present
    // ---------------------------------------------------------------
    #[test]
    fn test_five_strategies_ranked() {
        let out = generate_strategies(&married_inputs()).unwrap().result;

        assert_eq!(out.strategies.len(), 5);
        assert!(out.strategies.iter().any(|s| s.name == "As Selected"));
        for pair in out.strategies.windows(2) {
            assert!(pair[0].total_lifetime_benefit >= pair[1].total_lifetime_benefit);
        }
    }

    // ---------------------------------------------------------------
    // 2. As Selected reproduces the lifetime simulation exactly
    // ---------------------------------------------------------------
    #[test]
    fn test_as_selected_matches_lifetime() {
        let inputs = married_inputs();
        let lifetime = calculate_lifetime_benefit(&inputs).unwrap().result;
        let out = generate_strategies(&inputs).unwrap().result;

        let as_selected = out
            .strategies
            .iter()
            .find(|s| s.name == "As Selected")
            .unwrap();
        assert_eq!(
            as_selected.total_lifetime_benefit,
            lifetime.total_lifetime_benefit
        );
        assert_eq!(as_selected.primary_claim_date, inputs.primary.claim_date);
    }

    // ---------------------------------------------------------------
    // 3. Archetype claim dates land on 62/FRA/70 anchors
    // ---------------------------------------------------------------
    #[test]
    fn test_archetype_claim_dates() {
        let inputs = married_inputs();
        let out = generate_strategies(&inputs).unwrap().result;

        let at_70 = out
            .strategies
            .iter()
            .find(|s| s.name == "Both at Age 70")
            .unwrap();
        assert_eq!(at_70.primary_claim_date, date(2030, 4, 15));
        assert_eq!(at_70.spouse_claim_date, Some(date(2032, 9, 10)));

        let at_62 = out
            .strategies
            .iter()
            .find(|s| s.name == "Both at Age 62")
            .unwrap();
        assert_eq!(at_62.primary_claim_date, date(2022, 5, 1));
        assert_eq!(at_62.spouse_claim_date, Some(date(2024, 10, 1)));
    }

    // ---------------------------------------------------------------
    // 4. Single claimant still yields five entries
    // ---------------------------------------------------------------
    #[test]
    fn test_single_claimant_five_entries() {
        let out = generate_strategies(&single_inputs()).unwrap().result;
        assert_eq!(out.strategies.len(), 5);
        assert!(out
            .strategies
            .iter()
            .all(|s| s.spouse_claim_date.is_none()));
    }

    // ---------------------------------------------------------------
    // 5. Survivor: larger benefit continues, both directions
    // ---------------------------------------------------------------
    #[test]
    fn test_survivor_both_directions() {
        let out = calculate_survivor_benefits(&married_inputs())
            .unwrap()
            .result;

        let primary_benefit = benefit_at_claim(&married_inputs().primary);
        let spouse_benefit = benefit_at_claim(married_inputs().spouse.as_ref().unwrap());

        // Primary dies: spouse steps up to the primary's larger benefit
        let p = &out.primary_deceased;
        assert_eq!(p.survivor_own_benefit, spouse_benefit);
        assert_eq!(p.deceased_benefit, primary_benefit);
        assert_eq!(p.survivor_benefit, primary_benefit - spouse_benefit);
        assert_eq!(p.combined_monthly_total, primary_benefit);
        assert_eq!(p.combined_annual_total, primary_benefit * dec!(12));

        // Spouse dies: primary keeps the larger own benefit, no step-up
        let s = &out.spouse_deceased;
        assert_eq!(s.survivor_benefit, Decimal::ZERO);
        assert_eq!(s.combined_monthly_total, primary_benefit);
    }

    // ---------------------------------------------------------------
    // 6. Survivor analysis rejects single inputs
    // ---------------------------------------------------------------
    #[test]
    fn test_survivor_requires_couple() {
        assert!(calculate_survivor_benefits(&single_inputs()).is_err());
    }
}
