use clap::Args;
use serde_json::Value;

use finplan_core::mortgage::amortization::{self, AmortizationInput};
use finplan_core::mortgage::points::{self, PointsComparisonInput};
use finplan_core::mortgage::refinance::{self, RefinanceParameters};

use crate::input;

#[derive(Args)]
pub struct AmortizeArgs {
    /// JSON input file; piped stdin is read when omitted
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct ComparePointsArgs {
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct RefinanceArgs {
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: AmortizationInput = input::read_typed(&args.input, "amortization")?;
    let result = amortization::generate_schedule(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare_points(args: ComparePointsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: PointsComparisonInput = input::read_typed(&args.input, "points comparison")?;
    let result = points::compare_scenarios(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_refinance(args: RefinanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: RefinanceParameters = input::read_typed(&args.input, "refinance analysis")?;
    let result = refinance::analyze_refinance(&input)?;
    Ok(serde_json::to_value(result)?)
}
