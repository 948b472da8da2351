use clap::Args;
use serde_json::Value;

use finplan_core::social_security::benefits::SsInputs;
use finplan_core::social_security::lifetime;
use finplan_core::social_security::strategies;

use crate::input;

#[derive(Args)]
pub struct SsLifetimeArgs {
    /// JSON input file; piped stdin is read when omitted
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct SsStrategiesArgs {
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct SsSurvivorArgs {
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_lifetime(args: SsLifetimeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: SsInputs = input::read_typed(&args.input, "lifetime benefit projection")?;
    let result = lifetime::calculate_lifetime_benefit(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_strategies(args: SsStrategiesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: SsInputs = input::read_typed(&args.input, "claiming strategies")?;
    let result = strategies::generate_strategies(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_survivor(args: SsSurvivorArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: SsInputs = input::read_typed(&args.input, "survivor benefits")?;
    let result = strategies::calculate_survivor_benefits(&input)?;
    Ok(serde_json::to_value(result)?)
}
