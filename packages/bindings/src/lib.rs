use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Mortgage
// ---------------------------------------------------------------------------

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: finplan_core::mortgage::amortization::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::mortgage::amortization::generate_schedule(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_points(input_json: String) -> NapiResult<String> {
    let input: finplan_core::mortgage::points::PointsComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        finplan_core::mortgage::points::compare_scenarios(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_refinance(input_json: String) -> NapiResult<String> {
    let input: finplan_core::mortgage::refinance::RefinanceParameters =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        finplan_core::mortgage::refinance::analyze_refinance(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Social Security
// ---------------------------------------------------------------------------

#[napi]
pub fn lifetime_benefit(input_json: String) -> NapiResult<String> {
    let input: finplan_core::social_security::benefits::SsInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::social_security::lifetime::calculate_lifetime_benefit(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn claiming_strategies(input_json: String) -> NapiResult<String> {
    let input: finplan_core::social_security::benefits::SsInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::social_security::strategies::generate_strategies(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn survivor_benefits(input_json: String) -> NapiResult<String> {
    let input: finplan_core::social_security::benefits::SsInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::social_security::strategies::calculate_survivor_benefits(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Premium Tax Credit
// ---------------------------------------------------------------------------

#[napi]
pub fn premium_tax_credit(input_json: String) -> NapiResult<String> {
    let input: finplan_core::premium_tax_credit::calculator::PtcInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::premium_tax_credit::calculator::calculate_ptc(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
